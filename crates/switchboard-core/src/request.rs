//! The dispatcher's view of one incoming request.

use crate::method::Method;

/// One incoming request, as handed over by the transport layer.
///
/// The path is expected to be percent-decoded already, with a leading `/`
/// and without any query string. The body is the raw request body as text,
/// empty when none was sent.
#[derive(Debug, Clone)]
pub struct Request {
    /// The request method.
    pub method: Method,
    /// The percent-decoded request path.
    pub path: String,
    /// The raw request body.
    pub body: String,
}

impl Request {
    /// Create a request with an empty body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: String::new(),
        }
    }

    /// Attach a body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}
