//! Route registry and grouped registration.

use std::collections::HashMap;

use tracing::debug;

use crate::config::RouterConfig;
use crate::error::{Result, RouterError};
use crate::params::AliasMap;
use crate::request::Method;
use crate::resolver::Resolver;
use crate::route::Route;

/// Index of a route in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(usize);

impl RouteId {
    /// Returns the registration index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// The route table being declared.
///
/// Each route is stored once; every method it serves holds its id in a
/// bucket that preserves registration order. Earlier routes shadow later
/// ones with overlapping templates.
///
/// # Example
///
/// ```
/// use oxide_routing::{Method, Resolver, Response, RouteRegistry, RouterConfig};
///
/// let mut routes = RouteRegistry::new(RouterConfig::default());
/// routes
///     .get("/users/{id}", Resolver::handler(|_| Response::text("user")))
///     .unwrap()
///     .with_constraints([("id", "[0-9]+")]);
/// routes
///     .match_methods(&["put", "patch"], "/users/{id}", Resolver::handler(|_| Response::ok()))
///     .unwrap();
///
/// assert_eq!(routes.len(), 2);
/// assert_eq!(routes.routes_for(Method::Patch).len(), 1);
/// assert!(routes.routes_for(Method::Delete).is_empty());
/// ```
#[derive(Debug, Default)]
pub struct RouteRegistry {
    config: RouterConfig,
    routes: Vec<Route>,
    buckets: HashMap<Method, Vec<RouteId>>,
}

impl RouteRegistry {
    /// Creates an empty registry.
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            routes: Vec::new(),
            buckets: HashMap::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Registers a route for the given methods.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::UnsupportedMethod`] if any method is outside the
    /// configured allow-list; nothing is registered in that case.
    pub fn add(
        &mut self,
        methods: &[Method],
        template: &str,
        resolver: impl Into<Resolver>,
    ) -> Result<&mut Route> {
        let id = self.insert(methods, template, resolver.into())?;
        Ok(&mut self.routes[id.0])
    }

    /// Registers a GET route.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add`].
    pub fn get(&mut self, template: &str, resolver: impl Into<Resolver>) -> Result<&mut Route> {
        self.add(&[Method::Get], template, resolver)
    }

    /// Registers a POST route.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add`].
    pub fn post(&mut self, template: &str, resolver: impl Into<Resolver>) -> Result<&mut Route> {
        self.add(&[Method::Post], template, resolver)
    }

    /// Registers a PUT route.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add`].
    pub fn put(&mut self, template: &str, resolver: impl Into<Resolver>) -> Result<&mut Route> {
        self.add(&[Method::Put], template, resolver)
    }

    /// Registers a PATCH route.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add`].
    pub fn patch(&mut self, template: &str, resolver: impl Into<Resolver>) -> Result<&mut Route> {
        self.add(&[Method::Patch], template, resolver)
    }

    /// Registers a DELETE route.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add`].
    pub fn delete(&mut self, template: &str, resolver: impl Into<Resolver>) -> Result<&mut Route> {
        self.add(&[Method::Delete], template, resolver)
    }

    /// Registers a route for methods given by name, e.g. `["put", "patch"]`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::UnsupportedMethod`] for an unknown or
    /// unsupported method name.
    pub fn match_methods(
        &mut self,
        methods: &[&str],
        template: &str,
        resolver: impl Into<Resolver>,
    ) -> Result<&mut Route> {
        let methods = parse_methods(methods)?;
        self.add(&methods, template, resolver)
    }

    /// Registers a route for every supported method.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add`].
    pub fn any(&mut self, template: &str, resolver: impl Into<Resolver>) -> Result<&mut Route> {
        let methods = self.config.methods.clone();
        self.add(&methods, template, resolver)
    }

    /// Starts declaring a group of routes.
    ///
    /// Routes registered through the returned [`RouteGroup`] are recorded as
    /// its members so settings can be applied to all of them.
    pub fn begin_group(&mut self) -> RouteGroup<'_> {
        RouteGroup {
            registry: self,
            members: Vec::new(),
        }
    }

    /// Declares a group of routes sharing `settings`.
    ///
    /// The settings are applied once `declare` returns, namespace and prefix
    /// first, then constraints and defaults.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by `declare`. Members registered before
    /// the error are removed again, so a failed group leaves the registry as
    /// it was.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_routing::{GroupSettings, RouteRegistry, RouterConfig};
    ///
    /// let mut routes = RouteRegistry::new(RouterConfig::default());
    /// routes
    ///     .group(GroupSettings::new().prefix("admin").namespace("Admin"), |group| {
    ///         group.get("posts/{id}", "PostController@show")?;
    ///         group.post("/posts", "PostController@store")?;
    ///         Ok(())
    ///     })
    ///     .unwrap();
    ///
    /// assert!(routes
    ///     .routes()
    ///     .iter()
    ///     .all(|r| r.prefix() == Some("admin") && r.namespace() == Some("Admin")));
    /// ```
    pub fn group<F>(&mut self, settings: GroupSettings, declare: F) -> Result<Vec<RouteId>>
    where
        F: FnOnce(&mut RouteGroup<'_>) -> Result<()>,
    {
        let mark = self.routes.len();
        let mut group = self.begin_group();
        if let Err(err) = declare(&mut group) {
            self.truncate(mark);
            return Err(err);
        }
        for setting in settings.into_settings() {
            group.apply(&setting);
        }
        Ok(group.end())
    }

    /// Returns the routes registered for a method, in registration order.
    pub fn routes_for(&self, method: Method) -> Vec<&Route> {
        self.buckets
            .get(&method)
            .map(|ids| ids.iter().map(|id| &self.routes[id.0]).collect())
            .unwrap_or_default()
    }

    /// Returns a route by id.
    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(id.0)
    }

    /// Returns every declared route once, in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns the number of declared routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no route is declared.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Drops every route registered at or after `mark`.
    fn truncate(&mut self, mark: usize) {
        debug!(dropped = self.routes.len() - mark, "Rolled back route group");
        self.routes.truncate(mark);
        for ids in self.buckets.values_mut() {
            ids.retain(|id| id.0 < mark);
        }
        self.buckets.retain(|_, ids| !ids.is_empty());
    }

    pub(crate) fn into_parts(self) -> (RouterConfig, Vec<Route>, HashMap<Method, Vec<RouteId>>) {
        (self.config, self.routes, self.buckets)
    }

    fn insert(&mut self, methods: &[Method], template: &str, resolver: Resolver) -> Result<RouteId> {
        if let Some(method) = methods.iter().find(|m| !self.config.supports(**m)) {
            return Err(RouterError::UnsupportedMethod {
                method: method.to_string(),
            });
        }

        let mut unique: Vec<Method> = Vec::with_capacity(methods.len());
        for method in methods {
            if !unique.contains(method) {
                unique.push(*method);
            }
        }

        let id = RouteId(self.routes.len());
        for method in &unique {
            self.buckets.entry(*method).or_default().push(id);
        }
        debug!(methods = ?unique, template, "Registered route");
        self.routes.push(Route::new(unique, template, resolver));

        Ok(id)
    }
}

/// A group of routes being declared.
///
/// Obtained from [`RouteRegistry::begin_group`]. The group borrows the
/// registry mutably, so a second group cannot be opened until this one ends.
#[derive(Debug)]
pub struct RouteGroup<'a> {
    registry: &'a mut RouteRegistry,
    members: Vec<RouteId>,
}

impl RouteGroup<'_> {
    /// Registers a member route for the given methods.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add`].
    pub fn add(
        &mut self,
        methods: &[Method],
        template: &str,
        resolver: impl Into<Resolver>,
    ) -> Result<&mut Route> {
        let id = self.registry.insert(methods, template, resolver.into())?;
        self.members.push(id);
        Ok(&mut self.registry.routes[id.0])
    }

    /// Registers a member GET route.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add`].
    pub fn get(&mut self, template: &str, resolver: impl Into<Resolver>) -> Result<&mut Route> {
        self.add(&[Method::Get], template, resolver)
    }

    /// Registers a member POST route.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add`].
    pub fn post(&mut self, template: &str, resolver: impl Into<Resolver>) -> Result<&mut Route> {
        self.add(&[Method::Post], template, resolver)
    }

    /// Registers a member PUT route.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add`].
    pub fn put(&mut self, template: &str, resolver: impl Into<Resolver>) -> Result<&mut Route> {
        self.add(&[Method::Put], template, resolver)
    }

    /// Registers a member PATCH route.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add`].
    pub fn patch(&mut self, template: &str, resolver: impl Into<Resolver>) -> Result<&mut Route> {
        self.add(&[Method::Patch], template, resolver)
    }

    /// Registers a member DELETE route.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add`].
    pub fn delete(&mut self, template: &str, resolver: impl Into<Resolver>) -> Result<&mut Route> {
        self.add(&[Method::Delete], template, resolver)
    }

    /// Registers a member route for methods given by name.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::match_methods`].
    pub fn match_methods(
        &mut self,
        methods: &[&str],
        template: &str,
        resolver: impl Into<Resolver>,
    ) -> Result<&mut Route> {
        let methods = parse_methods(methods)?;
        self.add(&methods, template, resolver)
    }

    /// Registers a member route for every supported method.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::add`].
    pub fn any(&mut self, template: &str, resolver: impl Into<Resolver>) -> Result<&mut Route> {
        let methods = self.registry.config.methods.clone();
        self.add(&methods, template, resolver)
    }

    /// Applies a setting to every member declared so far.
    pub fn apply(&mut self, setting: &GroupSetting) {
        for id in &self.members {
            let route = &mut self.registry.routes[id.0];
            match setting {
                GroupSetting::Prefix(prefix) => {
                    route.with_prefix(prefix.as_str());
                }
                GroupSetting::Namespace(namespace) => {
                    route.with_namespace(namespace.as_str());
                }
                GroupSetting::Constraints(constraints) => {
                    route.with_constraints(constraints.iter());
                }
                GroupSetting::Defaults(defaults) => {
                    route.with_defaults(defaults.iter());
                }
            }
        }
        debug!(setting = ?setting, members = self.members.len(), "Applied group setting");
    }

    /// Closes the group and returns its members.
    pub fn end(self) -> Vec<RouteId> {
        self.members
    }
}

/// One setting applied to every route of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSetting {
    /// Path prefix.
    Prefix(String),
    /// Controller namespace suffix.
    Namespace(String),
    /// Constraint fragments.
    Constraints(AliasMap),
    /// Default values.
    Defaults(AliasMap),
}

/// The settings bundle of [`RouteRegistry::group`].
#[derive(Debug, Clone, Default)]
pub struct GroupSettings {
    prefix: Option<String>,
    namespace: Option<String>,
    constraints: AliasMap,
    defaults: AliasMap,
}

impl GroupSettings {
    /// Creates an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the controller namespace suffix.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Adds a constraint fragment; the key may be an alias set.
    #[must_use]
    pub fn constraint(mut self, alias_set: &str, fragment: impl Into<String>) -> Self {
        self.constraints.insert(alias_set, fragment);
        self
    }

    /// Adds a default value; the key may be an alias set.
    #[must_use]
    pub fn default_value(mut self, alias_set: &str, value: impl Into<String>) -> Self {
        self.defaults.insert(alias_set, value);
        self
    }

    /// Returns the settings in application order.
    pub fn into_settings(self) -> Vec<GroupSetting> {
        let mut settings = Vec::new();
        if let Some(namespace) = self.namespace {
            settings.push(GroupSetting::Namespace(namespace));
        }
        if let Some(prefix) = self.prefix {
            settings.push(GroupSetting::Prefix(prefix));
        }
        if !self.constraints.is_empty() {
            settings.push(GroupSetting::Constraints(self.constraints));
        }
        if !self.defaults.is_empty() {
            settings.push(GroupSetting::Defaults(self.defaults));
        }
        settings
    }
}

fn parse_methods(methods: &[&str]) -> Result<Vec<Method>> {
    methods.iter().map(|m| m.parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;

    fn ok() -> Resolver {
        Resolver::handler(|_| Response::ok())
    }

    fn templates(routes: &[&Route]) -> Vec<String> {
        routes.iter().map(|r| r.effective_template()).collect()
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = RouteRegistry::default();
        registry.get("/b", ok()).unwrap();
        registry.get("/a", ok()).unwrap();
        registry.get("/b", ok()).unwrap();

        assert_eq!(templates(&registry.routes_for(Method::Get)), ["/b", "/a", "/b"]);
        assert!(registry.routes_for(Method::Post).is_empty());
    }

    #[test]
    fn test_multi_method_route_is_shared() {
        let mut registry = RouteRegistry::default();
        registry
            .match_methods(&["put", "PATCH", "put"], "/match/users/{id}", ok())
            .unwrap()
            .with_constraints([("id", "[0-9]+")]);

        assert_eq!(registry.len(), 1);
        let put = registry.routes_for(Method::Put);
        let patch = registry.routes_for(Method::Patch);
        assert_eq!(put.len(), 1);
        assert!(std::ptr::eq(put[0], patch[0]));
        assert_eq!(put[0].methods(), [Method::Put, Method::Patch]);
        assert_eq!(put[0].constraints().get("id"), Some("[0-9]+"));
    }

    #[test]
    fn test_any_uses_supported_methods() {
        let config = RouterConfig::default().methods([Method::Get, Method::Head]);
        let mut registry = RouteRegistry::new(config);
        registry.any("/any", ok()).unwrap();

        assert_eq!(registry.routes_for(Method::Get).len(), 1);
        assert_eq!(registry.routes_for(Method::Head).len(), 1);
        assert!(registry.routes_for(Method::Post).is_empty());
    }

    #[test]
    fn test_unsupported_method_is_rejected() {
        let mut registry = RouteRegistry::default();
        let err = registry.add(&[Method::Get, Method::Trace], "/x", ok()).unwrap_err();
        assert!(matches!(err, RouterError::UnsupportedMethod { method } if method == "TRACE"));
        assert!(registry.is_empty());
        assert!(registry.routes_for(Method::Get).is_empty());

        let err = registry.match_methods(&["get", "fetch"], "/x", ok()).unwrap_err();
        assert!(matches!(err, RouterError::UnsupportedMethod { method } if method == "fetch"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_group_applies_settings_to_members_only() {
        let mut registry = RouteRegistry::default();
        registry.get("/outside-before", ok()).unwrap();
        let members = registry
            .group(
                GroupSettings::new().prefix("admin").namespace("Admin"),
                |group| {
                    group.get("/posts", ok())?;
                    group.post("posts/{id}", ok())?;
                    group.delete("/", ok())?;
                    Ok(())
                },
            )
            .unwrap();
        registry.get("/outside-after", ok()).unwrap();

        assert_eq!(members.len(), 3);
        let grouped: Vec<_> = members.iter().map(|id| registry.route(*id).unwrap()).collect();
        assert_eq!(templates(&grouped), ["/admin/posts", "/admin/posts/{id}", "/admin"]);
        assert!(grouped.iter().all(|r| r.namespace() == Some("Admin")));

        for path in ["/outside-before", "/outside-after"] {
            let route = registry
                .routes()
                .iter()
                .find(|r| r.template() == path)
                .unwrap();
            assert_eq!(route.prefix(), None);
            assert_eq!(route.namespace(), None);
            assert_eq!(route.effective_template(), path);
        }
    }

    #[test]
    fn test_group_constraints_and_defaults() {
        let mut registry = RouteRegistry::default();
        registry
            .group(
                GroupSettings::new()
                    .prefix("dashboard/{dashboard_id?}")
                    .constraint("dashboard_id", "[0-9]+")
                    .default_value("dashboard_id", "4"),
                |group| {
                    group.get("/", ok())?;
                    group
                        .get("posts/{pid}", ok())?
                        .with_constraints([("pid", "[0-9]+")]);
                    Ok(())
                },
            )
            .unwrap();

        for route in registry.routes() {
            assert_eq!(route.constraints().get("dashboard_id"), Some("[0-9]+"));
            assert_eq!(route.defaults().get("dashboard_id"), Some("4"));
        }
        assert_eq!(registry.routes()[1].constraints().get("pid"), Some("[0-9]+"));
    }

    #[test]
    fn test_group_error_stops_declaration() {
        let mut registry = RouteRegistry::default();
        let result = registry.group(GroupSettings::new().prefix("api"), |group| {
            group.get("/first", ok())?;
            group.add(&[Method::Options], "/second", ok())?;
            group.get("/third", ok())?;
            Ok(())
        });

        assert!(matches!(result, Err(RouterError::UnsupportedMethod { .. })));
        assert!(registry.is_empty());
        assert!(registry.routes_for(Method::Get).is_empty());
    }

    #[test]
    fn test_group_error_keeps_earlier_routes() {
        let mut registry = RouteRegistry::default();
        registry.get("/before", ok()).unwrap();
        let result = registry.group(GroupSettings::new().prefix("admin"), |group| {
            group.get("/delete-everything", ok())?;
            group.match_methods(&["put", "patch"], "/users", ok())?;
            group.add(&[Method::Options], "/fail", ok())?;
            Ok(())
        });
        assert!(result.is_err());

        assert_eq!(registry.len(), 1);
        assert_eq!(templates(&registry.routes_for(Method::Get)), ["/before"]);
        assert!(registry.routes_for(Method::Put).is_empty());
        assert!(registry.routes_for(Method::Patch).is_empty());

        registry.get("/after", ok()).unwrap();
        assert_eq!(templates(&registry.routes_for(Method::Get)), ["/before", "/after"]);
    }

    #[test]
    fn test_manual_group_apply() {
        let mut registry = RouteRegistry::default();
        let mut group = registry.begin_group();
        group.get("/a", ok()).unwrap();
        group.apply(&GroupSetting::Prefix("v1".to_string()));
        group.get("/b", ok()).unwrap();
        let members = group.end();

        assert_eq!(members.len(), 2);
        assert_eq!(registry.route(members[0]).unwrap().effective_template(), "/v1/a");
        assert_eq!(registry.route(members[1]).unwrap().effective_template(), "/b");
    }

    #[test]
    fn test_settings_order() {
        let settings = GroupSettings::new()
            .default_value("id", "1")
            .prefix("p")
            .constraint("id", "[0-9]+")
            .namespace("N")
            .into_settings();

        assert!(matches!(settings[0], GroupSetting::Namespace(_)));
        assert!(matches!(settings[1], GroupSetting::Prefix(_)));
        assert!(matches!(settings[2], GroupSetting::Constraints(_)));
        assert!(matches!(settings[3], GroupSetting::Defaults(_)));
    }
}
