//! Resolvers: the business logic a route dispatches to.
//!
//! A route is bound either to a closure handler or to a
//! `"Controller@action"` reference. Both declare an ordered list of parameter
//! names; at dispatch time each name is looked up in the captured path
//! parameters and bound positionally into a [`Bindings`] bag, which also
//! carries the full parameter set and the request.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{BindingError, Result};
use crate::params::PathParams;
use crate::request::Request;
use crate::response::Response;

/// A boxed handler function.
pub type Handler = Arc<dyn Fn(&Bindings<'_>) -> Response + Send + Sync>;

/// Zero-argument constructor for a controller.
pub type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// Arguments handed to a resolver for one dispatch.
#[derive(Debug)]
pub struct Bindings<'a> {
    params: &'a PathParams,
    args: Vec<Option<&'a str>>,
    request: &'a Request,
}

impl<'a> Bindings<'a> {
    /// Binds `declared` parameter names, in order, to captured values.
    pub fn bind<S: AsRef<str>>(
        declared: &[S],
        params: &'a PathParams,
        request: &'a Request,
    ) -> Self {
        Self {
            params,
            args: declared.iter().map(|name| params.get(name.as_ref())).collect(),
            request,
        }
    }

    /// Returns the positional argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).copied().flatten()
    }

    /// Returns every positional argument in declaration order.
    pub fn args(&self) -> &[Option<&'a str>] {
        &self.args
    }

    /// Looks up a captured parameter by name.
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params.get(name)
    }

    /// Returns every captured parameter.
    pub fn params(&self) -> &'a PathParams {
        self.params
    }

    /// Returns the request being dispatched.
    pub fn request(&self) -> &'a Request {
        self.request
    }
}

/// The unit of business logic bound to a route.
#[derive(Clone)]
pub enum Resolver {
    /// A closure with its declared parameter names.
    Handler {
        params: Vec<String>,
        handler: Handler,
    },
    /// A `"Controller@action"` reference, resolved through a
    /// [`ControllerRegistry`].
    Controller(String),
}

impl Resolver {
    /// Creates a handler that declares no positional parameters.
    ///
    /// The handler still sees every captured parameter through
    /// [`Bindings::param`].
    pub fn handler<F>(handler: F) -> Self
    where
        F: Fn(&Bindings<'_>) -> Response + Send + Sync + 'static,
    {
        Self::Handler {
            params: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Creates a handler whose positional arguments are bound by name.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_routing::{Resolver, Response};
    ///
    /// let resolver = Resolver::handler_with(&["firstname", "lastname"], |b| {
    ///     Response::text(format!(
    ///         "Full name: {} {}",
    ///         b.arg(0).unwrap_or_default(),
    ///         b.arg(1).unwrap_or_default()
    ///     ))
    /// });
    /// ```
    pub fn handler_with<F>(params: &[&str], handler: F) -> Self
    where
        F: Fn(&Bindings<'_>) -> Response + Send + Sync + 'static,
    {
        Self::Handler {
            params: params.iter().map(|p| (*p).to_string()).collect(),
            handler: Arc::new(handler),
        }
    }

    /// Creates a controller reference such as `"User::RegisterController@index"`.
    pub fn controller(reference: impl Into<String>) -> Self {
        Self::Controller(reference.into())
    }

    /// Invokes the resolver with the captured parameters.
    ///
    /// `namespace` is the qualified namespace controller references are
    /// resolved in.
    ///
    /// # Errors
    ///
    /// Returns a [`BindingError`] when a controller reference has no action,
    /// names an unregistered controller, or an action the controller does not
    /// expose.
    pub fn invoke(
        &self,
        namespace: &str,
        params: &PathParams,
        request: &Request,
        controllers: &ControllerRegistry,
    ) -> Result<Response> {
        match self {
            Self::Handler {
                params: declared,
                handler,
            } => Ok(handler(&Bindings::bind(declared, params, request))),
            Self::Controller(reference) => {
                let (controller, action) = reference
                    .split_once('@')
                    .filter(|(_, action)| !action.is_empty())
                    .ok_or_else(|| BindingError::MissingAction(reference.clone()))?;

                let qualified = qualify(&[namespace, controller]);
                let mut instance = controllers.instantiate(&qualified)?;
                let unknown_action = || BindingError::UnknownAction {
                    controller: qualified.clone(),
                    action: action.to_string(),
                };

                let declared = instance.parameters(action).ok_or_else(unknown_action)?;
                let bindings = Bindings::bind(declared, params, request);
                Ok(instance
                    .call(action, &bindings)
                    .ok_or_else(unknown_action)?)
            }
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler { params, .. } => f
                .debug_struct("Handler")
                .field("params", params)
                .finish_non_exhaustive(),
            Self::Controller(reference) => f.debug_tuple("Controller").field(reference).finish(),
        }
    }
}

impl From<&str> for Resolver {
    fn from(reference: &str) -> Self {
        Self::controller(reference)
    }
}

impl From<String> for Resolver {
    fn from(reference: String) -> Self {
        Self::controller(reference)
    }
}

/// A controller whose actions can be bound to routes.
///
/// A fresh instance is constructed for every dispatch.
///
/// # Example
///
/// ```
/// use oxide_routing::{Bindings, Controller, Response};
///
/// #[derive(Default)]
/// struct PostController;
///
/// impl Controller for PostController {
///     fn parameters(&self, action: &str) -> Option<&'static [&'static str]> {
///         match action {
///             "show" => Some(&["id"]),
///             _ => None,
///         }
///     }
///
///     fn call(&mut self, action: &str, args: &Bindings<'_>) -> Option<Response> {
///         match action {
///             "show" => Some(Response::text(format!("Post #{}", args.arg(0)?))),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Controller {
    /// Declared parameter names of `action`, or `None` if there is no such
    /// action.
    fn parameters(&self, action: &str) -> Option<&'static [&'static str]>;

    /// Runs `action`, or returns `None` if there is no such action.
    fn call(&mut self, action: &str, args: &Bindings<'_>) -> Option<Response>;
}

/// Maps qualified controller names to their constructors.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, ControllerFactory>,
}

impl ControllerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller constructed with [`Default`].
    pub fn register<C>(&mut self, qualified_name: &str) -> &mut Self
    where
        C: Controller + Default + 'static,
    {
        self.register_with(qualified_name, || Box::new(C::default()))
    }

    /// Registers a controller with a custom zero-argument constructor.
    pub fn register_with<F>(&mut self, qualified_name: &str, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Controller> + Send + Sync + 'static,
    {
        self.factories
            .insert(qualify(&[qualified_name]), Arc::new(factory));
        self
    }

    /// Returns `true` if a controller is registered under the name.
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.factories.contains_key(&qualify(&[qualified_name]))
    }

    /// Returns the number of registered controllers.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no controller is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Constructs a new instance of the named controller.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::UnknownController`] if nothing is registered
    /// under the name.
    pub fn instantiate(
        &self,
        qualified_name: &str,
    ) -> std::result::Result<Box<dyn Controller>, BindingError> {
        let qualified = qualify(&[qualified_name]);
        self.factories
            .get(&qualified)
            .map(|factory| factory())
            .ok_or(BindingError::UnknownController(qualified))
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ControllerRegistry")
            .field("controllers", &names)
            .finish()
    }
}

/// Joins namespace parts into a `::`-separated qualified name.
///
/// `\` separators are accepted and rewritten, empty parts are skipped.
///
/// # Example
///
/// ```
/// use oxide_routing::qualify;
///
/// assert_eq!(qualify(&["app::controllers", "", "Admin\\PostController"]),
///            "app::controllers::Admin::PostController");
/// ```
pub fn qualify(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|part| part.split(['\\', ':']))
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("::")
}
