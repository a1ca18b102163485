//! Route declarations and their compiled form.

use tracing::debug;

use crate::error::Result;
use crate::params::{AliasMap, PathParams};
use crate::path::{join_template, PathPattern};
use crate::request::{Method, Request};
use crate::resolver::{qualify, ControllerRegistry, Resolver};
use crate::response::Response;

/// A declared route.
///
/// Routes are configured while the route table is being declared and
/// compiled into a [`CompiledRoute`] before any request is dispatched.
#[derive(Debug, Clone)]
pub struct Route {
    methods: Vec<Method>,
    template: String,
    constraints: AliasMap,
    defaults: AliasMap,
    prefix: Option<String>,
    namespace: Option<String>,
    resolver: Resolver,
}

impl Route {
    /// Creates a new route.
    pub fn new(methods: Vec<Method>, template: impl Into<String>, resolver: Resolver) -> Self {
        Self {
            methods,
            template: template.into(),
            constraints: AliasMap::new(),
            defaults: AliasMap::new(),
            prefix: None,
            namespace: None,
            resolver,
        }
    }

    /// Adds constraint fragments; keys may be `|`-separated alias sets.
    ///
    /// Entries replace earlier ones for the same placeholder.
    pub fn with_constraints<I, K, V>(&mut self, constraints: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.constraints.merge(&constraints.into_iter().collect());
        self
    }

    /// Adds default values for optional placeholders; keys may be alias sets.
    pub fn with_defaults<I, K, V>(&mut self, defaults: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.defaults.merge(&defaults.into_iter().collect());
        self
    }

    /// Sets the path prefix prepended to the template.
    pub fn with_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the namespace controller references are resolved in, relative to
    /// the base controller namespace.
    pub fn with_namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Returns the methods this route is registered for.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns the template as declared.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the prefixed, normalized template.
    pub fn effective_template(&self) -> String {
        join_template(self.prefix.as_deref(), &self.template)
    }

    /// Returns the path prefix.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the namespace suffix.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the route-local constraints.
    pub fn constraints(&self) -> &AliasMap {
        &self.constraints
    }

    /// Returns the default values.
    pub fn defaults(&self) -> &AliasMap {
        &self.defaults
    }

    /// Returns the resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Compiles the route against the current configuration.
    ///
    /// Route-local constraints take precedence over `shared` ones.
    /// Configuring the route afterwards does not affect the returned value;
    /// compile again to pick up changes.
    ///
    /// # Errors
    ///
    /// Returns the template or constraint error reported by
    /// [`PathPattern::compile`].
    pub fn compile(&self, shared: &AliasMap, base_namespace: &str) -> Result<CompiledRoute> {
        let mut constraints = shared.clone();
        constraints.merge(&self.constraints);

        let pattern = PathPattern::compile(&self.effective_template(), &constraints)?;
        debug!(
            template = %pattern.pattern(),
            regex = %pattern.as_regex_str(),
            "Compiled route"
        );

        Ok(CompiledRoute {
            methods: self.methods.clone(),
            pattern,
            defaults: self.defaults.clone(),
            namespace: qualify(&[base_namespace, self.namespace.as_deref().unwrap_or_default()]),
            resolver: self.resolver.clone(),
        })
    }
}

/// A route ready for dispatch.
///
/// Compiled routes are immutable; match results are returned to the caller
/// and never stored, so one instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    methods: Vec<Method>,
    pattern: PathPattern,
    defaults: AliasMap,
    namespace: String,
    resolver: Resolver,
}

impl CompiledRoute {
    /// Matches a normalized path.
    ///
    /// On success every placeholder of the template is present in the result:
    /// the captured text if non-empty, else its default, else no value.
    pub fn attempt_match(&self, path: &str) -> Option<PathParams> {
        self.pattern.match_path(path, &self.defaults)
    }

    /// Invokes the resolver with the parameters of a successful match.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RouterError::Binding`] when a controller reference
    /// cannot be resolved.
    pub fn resolve(
        &self,
        params: &PathParams,
        request: &Request,
        controllers: &ControllerRegistry,
    ) -> Result<Response> {
        self.resolver
            .invoke(&self.namespace, params, request, controllers)
    }

    /// Returns the compiled pattern.
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Returns the effective template.
    pub fn template(&self) -> &str {
        self.pattern.pattern()
    }

    /// Returns the methods this route serves.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns the qualified controller namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{Bindings, Controller};

    fn echo() -> Resolver {
        Resolver::handler(|b| {
            let params: Vec<String> = b
                .params()
                .iter()
                .map(|(k, v)| format!("{k}={}", v.unwrap_or("null")))
                .collect();
            Response::text(params.join(","))
        })
    }

    fn compiled(route: &Route) -> CompiledRoute {
        route.compile(&AliasMap::new(), "").unwrap()
    }

    #[test]
    fn test_literal_template() {
        let route = Route::new(vec![Method::Get], "/login/", echo());
        let compiled = compiled(&route);
        assert_eq!(compiled.template(), "/login");
        assert!(compiled.attempt_match("/login").is_some());
        assert!(compiled.attempt_match("/login/extra").is_none());
        assert!(compiled.attempt_match("/LOGIN").is_none());
    }

    #[test]
    fn test_constraints_and_defaults() {
        let mut route = Route::new(vec![Method::Get], "/register/{form_id?}", echo());
        route
            .with_constraints([("form_id", "[0-9]+")])
            .with_defaults([("form_id", "2")]);
        let compiled = compiled(&route);

        let params = compiled.attempt_match("/register").unwrap();
        assert_eq!(params.get("form_id"), Some("2"));
        let params = compiled.attempt_match("/register/8").unwrap();
        assert_eq!(params.get("form_id"), Some("8"));
        assert!(compiled.attempt_match("/register/abc").is_none());
    }

    #[test]
    fn test_local_constraints_override_shared() {
        let shared = AliasMap::new().with("id|name", "[0-9]+");
        let mut route = Route::new(vec![Method::Get], "/users/{name}", echo());

        let compiled = route.compile(&shared, "").unwrap();
        assert!(compiled.attempt_match("/users/jane").is_none());

        route.with_constraints([("name", "[a-z]+")]);
        let compiled = route.compile(&shared, "").unwrap();
        assert!(compiled.attempt_match("/users/jane").is_some());
        assert!(compiled.attempt_match("/users/42").is_none());
    }

    #[test]
    fn test_prefix_changes_effective_template() {
        let mut route = Route::new(vec![Method::Get], "posts/{pid}", echo());
        route
            .with_prefix("dashboard/{dashboard_id?}")
            .with_constraints([("dashboard_id|pid", "[0-9]+")])
            .with_defaults([("dashboard_id", "4")]);

        assert_eq!(route.effective_template(), "/dashboard/{dashboard_id?}/posts/{pid}");
        let compiled = compiled(&route);

        let params = compiled.attempt_match("/dashboard/posts/2").unwrap();
        assert_eq!(params.get("dashboard_id"), Some("4"));
        assert_eq!(params.get("pid"), Some("2"));

        let params = compiled.attempt_match("/dashboard/1/posts/4").unwrap();
        assert_eq!(params.get("dashboard_id"), Some("1"));
        assert_eq!(params.get("pid"), Some("4"));
    }

    #[test]
    fn test_attempt_match_is_repeatable() {
        let route = Route::new(vec![Method::Get], "/users/{id?}", echo());
        let compiled = compiled(&route);

        let first = compiled.attempt_match("/users/5");
        assert!(compiled.attempt_match("/posts/9").is_none());
        let second = compiled.attempt_match("/users/5");
        assert_eq!(first, second);

        let bare = compiled.attempt_match("/users").unwrap();
        assert_eq!(bare.get("id"), None);
    }

    #[test]
    fn test_resolve_handler_with_params() {
        let route = Route::new(vec![Method::Get], "/users/{firstname}/{lastname}", echo());
        let compiled = compiled(&route);
        let params = compiled.attempt_match("/users/John/Doe").unwrap();
        let res = compiled
            .resolve(&params, &Request::get("/users/John/Doe"), &ControllerRegistry::new())
            .unwrap();
        assert_eq!(res.body_str(), Some("firstname=John,lastname=Doe"));
    }

    #[derive(Default)]
    struct PostController;

    impl Controller for PostController {
        fn parameters(&self, action: &str) -> Option<&'static [&'static str]> {
            match action {
                "show" => Some(&["id"]),
                _ => None,
            }
        }

        fn call(&mut self, action: &str, args: &Bindings<'_>) -> Option<Response> {
            match action {
                "show" => Some(Response::text(format!("post {}", args.arg(0).unwrap_or("-")))),
                _ => None,
            }
        }
    }

    #[test]
    fn test_resolve_controller_in_namespace() {
        let mut controllers = ControllerRegistry::new();
        controllers.register::<PostController>("app::controllers::Admin::PostController");

        let mut route = Route::new(vec![Method::Get], "posts/{id}", "PostController@show".into());
        route.with_namespace("Admin").with_prefix("admin");
        let compiled = route.compile(&AliasMap::new(), "app::controllers").unwrap();
        assert_eq!(compiled.namespace(), "app::controllers::Admin");

        let params = compiled.attempt_match("/admin/posts/3").unwrap();
        let res = compiled
            .resolve(&params, &Request::get("/admin/posts/3"), &controllers)
            .unwrap();
        assert_eq!(res.body_str(), Some("post 3"));
    }

    #[test]
    fn test_malformed_template_fails_to_compile() {
        let route = Route::new(vec![Method::Get], "/files/{name?}.txt", echo());
        assert!(route.compile(&AliasMap::new(), "").is_err());
    }
}
