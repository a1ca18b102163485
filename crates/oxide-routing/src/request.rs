//! HTTP request type.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::RouterError;

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
    /// TRACE method
    Trace,
    /// CONNECT method
    Connect,
}

impl Method {
    /// Methods a router accepts when nothing else is configured.
    pub const DEFAULT_SUPPORTED: [Self; 5] =
        [Self::Get, Self::Post, Self::Put, Self::Delete, Self::Patch];

    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }
}

impl FromStr for Method {
    type Err = RouterError;

    /// Parses a method name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "patch" => Ok(Self::Patch),
            "delete" => Ok(Self::Delete),
            "head" => Ok(Self::Head),
            "options" => Ok(Self::Options),
            "trace" => Ok(Self::Trace),
            "connect" => Ok(Self::Connect),
            _ => Err(RouterError::UnsupportedMethod {
                method: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Method {
    type Error = RouterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An HTTP request as seen by the router.
///
/// The method is kept as the raw string sent by the client so that methods the
/// router does not know about still reach the dispatcher and can be answered
/// with `405 Method Not Allowed`.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// HTTP method, as received.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Form fields, passed through untouched to resolvers.
    pub form: HashMap<String, String>,
}

impl Request {
    /// Creates a new request.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            form: HashMap::new(),
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get.as_str(), path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post.as_str(), path)
    }

    /// Sets a form field.
    #[must_use]
    pub fn form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(key.into(), value.into());
        self
    }

    /// Gets a form field.
    pub fn get_form(&self, key: &str) -> Option<&str> {
        self.form.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<Method>().ok(), Some(Method::Get));
        assert_eq!("post".parse::<Method>().ok(), Some(Method::Post));
        assert_eq!("Trace".parse::<Method>().ok(), Some(Method::Trace));
        assert!(matches!(
            "INVALID".parse::<Method>(),
            Err(RouterError::UnsupportedMethod { method }) if method == "INVALID"
        ));
    }

    #[test]
    fn test_method_deserialize() {
        let methods: Vec<Method> = serde_json::from_str(r#"["get", "PATCH"]"#).unwrap();
        assert_eq!(methods, vec![Method::Get, Method::Patch]);
        assert!(serde_json::from_str::<Vec<Method>>(r#"["brew"]"#).is_err());
    }

    #[test]
    fn test_request_builder() {
        let req = Request::post("/register")
            .form_field("email", "jane@example.com")
            .form_field("name", "Jane");

        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/register");
        assert_eq!(req.get_form("email"), Some("jane@example.com"));
        assert_eq!(req.get_form("missing"), None);
    }
}
