//! Request dispatch.

use std::collections::HashMap;

use tracing::{debug, error, info};

use crate::config::RouterConfig;
use crate::error::Result;
use crate::params::PathParams;
use crate::path::normalize_path;
use crate::registry::{RouteId, RouteRegistry};
use crate::request::{Method, Request};
use crate::resolver::ControllerRegistry;
use crate::response::Response;
use crate::route::CompiledRoute;

/// Terminal state of a dispatch attempt.
#[derive(Debug)]
pub enum Outcome<'a> {
    /// A route matched; `params` holds its captured parameters.
    Matched {
        route: &'a CompiledRoute,
        params: PathParams,
    },
    /// The method is supported but no route matched the path.
    NotFound,
    /// The method is not in the supported set; no route was scanned.
    MethodNotAllowed,
}

/// Matches requests against a compiled route table and invokes resolvers.
///
/// A dispatcher is immutable once built and can be shared between threads.
///
/// # Example
///
/// ```
/// use oxide_routing::{
///     ControllerRegistry, Dispatcher, Request, Resolver, Response, RouteRegistry, RouterConfig,
/// };
///
/// let config = RouterConfig::default().shared_constraint("firstname|lastname", "[a-zA-Z]+");
/// let mut routes = RouteRegistry::new(config);
/// routes
///     .get(
///         "/users/{firstname}/{lastname}",
///         Resolver::handler_with(&["firstname", "lastname"], |b| {
///             Response::text(format!("Full name: {} {}", b.arg(0).unwrap(), b.arg(1).unwrap()))
///         }),
///     )
///     .unwrap();
///
/// let dispatcher = Dispatcher::new(routes, ControllerRegistry::new()).unwrap();
/// let response = dispatcher.dispatch(&Request::get("/users/John/Doe"));
/// assert_eq!(response.body_str(), Some("Full name: John Doe"));
/// assert_eq!(dispatcher.dispatch(&Request::get("/users/J0hn/Doe")).status, 404);
/// assert_eq!(dispatcher.dispatch(&Request::new("trace", "/")).status, 405);
/// ```
#[derive(Debug)]
pub struct Dispatcher {
    config: RouterConfig,
    routes: Vec<CompiledRoute>,
    buckets: HashMap<Method, Vec<RouteId>>,
    controllers: ControllerRegistry,
}

impl Dispatcher {
    /// Compiles every declared route.
    ///
    /// # Errors
    ///
    /// Returns the first template or constraint error found, so an invalid
    /// route table is rejected before any request is served.
    pub fn new(registry: RouteRegistry, controllers: ControllerRegistry) -> Result<Self> {
        let (config, routes, buckets) = registry.into_parts();

        let routes = routes
            .iter()
            .map(|route| route.compile(&config.shared_constraints, &config.controllers_namespace))
            .collect::<Result<Vec<_>>>()?;

        info!(
            routes = routes.len(),
            controllers = controllers.len(),
            "Route table compiled"
        );

        Ok(Self {
            config,
            routes,
            buckets,
            controllers,
        })
    }

    /// Finds the route for a method and path.
    ///
    /// The method is compared case-insensitively; the path is normalized
    /// before matching. Routes are tried in registration order and the first
    /// match wins.
    pub fn find(&self, method: &str, path: &str) -> Outcome<'_> {
        let Some(method) = method
            .parse::<Method>()
            .ok()
            .filter(|m| self.config.supports(*m))
        else {
            debug!(method, path, "Method not allowed");
            return Outcome::MethodNotAllowed;
        };

        let path = normalize_path(path);
        for route in self.routes_for(method) {
            if let Some(params) = route.attempt_match(&path) {
                debug!(%method, path = %path, template = route.template(), "Route matched");
                return Outcome::Matched { route, params };
            }
        }

        debug!(%method, path = %path, "No route matched");
        Outcome::NotFound
    }

    /// Dispatches a request and returns the response.
    ///
    /// Unsupported methods yield `405`, unmatched paths `404`. A resolver
    /// that cannot be bound yields `500`; the failure only affects this
    /// request.
    pub fn dispatch(&self, request: &Request) -> Response {
        match self.find(&request.method, &request.path) {
            Outcome::Matched { route, params } => {
                match route.resolve(&params, request, &self.controllers) {
                    Ok(response) => response,
                    Err(err) => {
                        error!(
                            error = %err,
                            method = %request.method,
                            path = %request.path,
                            template = route.template(),
                            "Failed to resolve route"
                        );
                        Response::internal_server_error()
                    }
                }
            }
            Outcome::NotFound => Response::not_found(),
            Outcome::MethodNotAllowed => Response::method_not_allowed(),
        }
    }

    /// Returns the compiled routes of a method, in registration order.
    pub fn routes_for(&self, method: Method) -> impl Iterator<Item = &CompiledRoute> {
        self.buckets
            .get(&method)
            .into_iter()
            .flatten()
            .map(|id| &self.routes[id.index()])
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}
