//! Error types for routing.

use std::path::PathBuf;

use thiserror::Error;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A route was declared for a method outside the configured allow-list.
    #[error("method is not supported: {method}")]
    UnsupportedMethod { method: String },

    /// A route template could not be compiled.
    #[error("malformed route template '{template}': {reason}")]
    MalformedTemplate { template: String, reason: String },

    /// A constraint fragment is not a valid regular expression.
    #[error("invalid constraint in route template '{template}': {source}")]
    InvalidConstraint {
        template: String,
        #[source]
        source: regex::Error,
    },

    /// A resolver could not be bound to the matched route.
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// A path parameter required by a resolver is absent.
    #[error("missing path parameter: {0}")]
    MissingParameter(String),

    /// The router configuration could not be read.
    #[error("failed to read router configuration '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The router configuration is not valid JSON.
    #[error("invalid router configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Failures to bind a matched route to its resolver.
///
/// These are programming errors in the route table. They surface at dispatch
/// time and only affect the request being served.
#[derive(Debug, Error)]
pub enum BindingError {
    /// The controller reference has no `@action` part.
    #[error("controller reference '{0}' does not name an action")]
    MissingAction(String),

    /// No factory is registered under the qualified controller name.
    #[error("unknown controller: {0}")]
    UnknownController(String),

    /// The controller exists but does not expose the action.
    #[error("controller {controller} has no action '{action}'")]
    UnknownAction { controller: String, action: String },
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
