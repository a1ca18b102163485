//! Router configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, RouterError};
use crate::params::AliasMap;
use crate::request::Method;

/// Process-wide router settings, fixed before routes are declared.
///
/// # Example
///
/// ```
/// use oxide_routing::{Method, RouterConfig};
///
/// let config = RouterConfig::from_json(r#"{
///     "methods": ["get", "post"],
///     "controllers_namespace": "app::controllers",
///     "shared_constraints": { "id": "[0-9]+", "firstname|lastname": "[a-zA-Z]+" }
/// }"#).unwrap();
///
/// assert!(config.supports(Method::Post));
/// assert!(!config.supports(Method::Delete));
/// assert_eq!(config.shared_constraints.get("lastname"), Some("[a-zA-Z]+"));
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Methods routes may be declared and dispatched for.
    pub methods: Vec<Method>,
    /// Base namespace controller references are resolved in.
    pub controllers_namespace: String,
    /// Constraint fragments applied to every route.
    pub shared_constraints: AliasMap,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            methods: Method::DEFAULT_SUPPORTED.to_vec(),
            controllers_namespace: String::new(),
            shared_constraints: AliasMap::new(),
        }
    }
}

impl RouterConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Config`] if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::ConfigRead`] if the file cannot be read and
    /// [`RouterError::Config`] if its content is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RouterError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Replaces the supported methods.
    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Sets the base controller namespace.
    #[must_use]
    pub fn controllers_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.controllers_namespace = namespace.into();
        self
    }

    /// Adds a shared constraint; the key may be an alias set.
    #[must_use]
    pub fn shared_constraint(mut self, alias_set: &str, fragment: impl Into<String>) -> Self {
        self.shared_constraints.insert(alias_set, fragment);
        self
    }

    /// Returns `true` if routes may use the method.
    pub fn supports(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }
}
