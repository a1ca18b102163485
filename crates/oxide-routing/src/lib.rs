//! # oxide-routing
//!
//! A URI-pattern routing engine.
//!
//! This crate provides:
//! - Route templates with required `{name}` and optional `{name?}` placeholders
//! - Regex constraints per placeholder, shared or per route, keyed by alias sets
//! - Default values for optional placeholders
//! - Method-bucketed registration with first-match precedence
//! - Route groups sharing a prefix, namespace, constraints and defaults
//! - Closure handlers and `"Controller@action"` references
//!
//! ## Quick Start
//!
//! ```
//! use oxide_routing::{
//!     ControllerRegistry, Dispatcher, Request, Resolver, Response, RouteRegistry, RouterConfig,
//! };
//!
//! let mut routes = RouteRegistry::new(RouterConfig::default());
//! routes.get("/", Resolver::handler(|_| Response::text("Homepage"))).unwrap();
//! routes
//!     .delete(
//!         "/posts/{id}",
//!         Resolver::handler_with(&["id"], |b| {
//!             Response::text(format!("Remove post with id #{}", b.arg(0).unwrap_or_default()))
//!         }),
//!     )
//!     .unwrap()
//!     .with_constraints([("id", "[0-9]+")]);
//!
//! let dispatcher = Dispatcher::new(routes, ControllerRegistry::new()).unwrap();
//!
//! let response = dispatcher.dispatch(&Request::new("DELETE", "/posts/7/"));
//! assert_eq!(response.body_str(), Some("Remove post with id #7"));
//! assert_eq!(dispatcher.dispatch(&Request::new("DELETE", "/posts/x")).status, 404);
//! ```
//!
//! ## Optional Parameters and Defaults
//!
//! An optional placeholder must be a whole path segment. When the segment is
//! absent the parameter takes its default value, or no value:
//!
//! ```
//! # use oxide_routing::*;
//! let mut routes = RouteRegistry::default();
//! routes
//!     .get("/register/{form_id?}", "User::RegisterController@index")
//!     .unwrap()
//!     .with_constraints([("form_id", "[0-9]+")])
//!     .with_defaults([("form_id", "2")]);
//! ```
//!
//! ## Route Groups
//!
//! ```
//! # use oxide_routing::*;
//! let mut routes = RouteRegistry::default();
//! routes
//!     .group(GroupSettings::new().prefix("panel").namespace("Admin"), |group| {
//!         group.get("posts/{id}", "PostController@show")?;
//!         group.post("/posts", "PostController@store")?;
//!         Ok(())
//!     })
//!     .unwrap();
//! ```

mod config;
mod dispatcher;
mod error;
mod params;
mod path;
mod registry;
mod request;
mod resolver;
mod response;
mod route;

pub use config::RouterConfig;
pub use dispatcher::{Dispatcher, Outcome};
pub use error::{BindingError, Result, RouterError};
pub use params::{AliasMap, PathParams};
pub use path::{join_template, normalize_path, PathPattern, DEFAULT_FRAGMENT};
pub use registry::{GroupSetting, GroupSettings, RouteGroup, RouteId, RouteRegistry};
pub use request::{Method, Request};
pub use resolver::{
    qualify, Bindings, Controller, ControllerFactory, ControllerRegistry, Handler, Resolver,
};
pub use response::Response;
pub use route::{CompiledRoute, Route};
