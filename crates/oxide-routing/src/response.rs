//! HTTP response type.

use std::collections::HashMap;

/// An HTTP response.
///
/// The body is optional: routing outcomes such as 404 and 405 are
/// status-only responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Option<String>,
}

impl Response {
    /// Creates a new response with the given status and no body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Creates a 200 OK response.
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Creates a response with plain text content.
    pub fn text(body: impl Into<String>) -> Self {
        Self::ok()
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
    }

    /// Creates a response with JSON content.
    pub fn json<T: serde::Serialize>(data: &T) -> Self {
        match serde_json::to_string(data) {
            Ok(body) => Self::ok()
                .header("Content-Type", "application/json")
                .body(body),
            Err(_) => Self::internal_server_error(),
        }
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::new(404)
    }

    /// Creates a 405 Method Not Allowed response.
    pub fn method_not_allowed() -> Self {
        Self::new(405)
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_server_error() -> Self {
        Self::new(500)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the body, if any.
    pub fn body_str(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Returns the status text for the current status code.
    pub fn status_text(&self) -> &'static str {
        match self.status {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}
