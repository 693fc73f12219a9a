//! HTTP transport abstraction.
//!
//! The engine never talks to the network directly. Implement [`HttpClient`]
//! over the HTTP library of your choice (reqwest, ureq, hyper, ...) and hand
//! it to the dispatcher. Bounding each request with a timeout is the
//! implementation's responsibility; a timeout surfaces as a transport error.

use parking_lot::Mutex;
use std::collections::VecDeque;

/// HTTP method used against the exchange and document endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Create/replace commands and the credential exchange.
    Post,
    /// Delete commands.
    Delete,
}

impl Method {
    /// Returns the method name on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// A single request issued against the exchange or document endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Header name/value pairs in insertion order.
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Creates a request with no headers or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Appends a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the first header with the given name, if any.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A response from the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP client abstraction.
///
/// Errors are transport-level faults (connection refused, timeout, TLS);
/// a response with a non-success status is still an `Ok`.
pub trait HttpClient: Send + Sync {
    /// Sends one request and returns the raw response.
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, String>;
}

/// A scriptable client for tests.
///
/// Responses are served in FIFO order and every issued request is recorded;
/// running out of scripted responses yields a transport error.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    /// Creates an empty mock client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next response.
    pub fn push_response(&self, response: HttpResponse) {
        self.responses.lock().push_back(Ok(response));
    }

    /// Scripts the next call to fail at the transport level.
    pub fn push_transport_error(&self, message: impl Into<String>) {
        self.responses.lock().push_back(Err(message.into()));
    }

    /// Returns every request issued so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Returns the number of requests issued so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl HttpClient for MockHttpClient {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names() {
        assert_eq!(Method::Post.as_str(), "POST");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[test]
    fn request_builder() {
        let request = HttpRequest::new(Method::Post, "https://x.example.com/docs")
            .with_header("authorization", "rt-abc")
            .with_header("if-match", "\"v1\"")
            .with_body("{}");

        assert_eq!(request.header("authorization"), Some("rt-abc"));
        assert_eq!(request.header("if-match"), Some("\"v1\""));
        assert_eq!(request.header("missing"), None);
        assert_eq!(request.body.as_deref(), Some("{}"));
    }

    #[test]
    fn success_statuses() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(201, "").is_success());
        assert!(HttpResponse::new(299, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
        assert!(!HttpResponse::new(409, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[test]
    fn mock_serves_fifo_and_records() {
        let client = MockHttpClient::new();
        client.push_response(HttpResponse::new(200, "one"));
        client.push_transport_error("connection reset");

        let first = client
            .send(HttpRequest::new(Method::Post, "https://a"))
            .unwrap();
        assert_eq!(first.body, "one");

        let second = client.send(HttpRequest::new(Method::Delete, "https://b"));
        assert_eq!(second, Err("connection reset".to_string()));

        // Exhausted scripts fail rather than hang.
        let third = client.send(HttpRequest::new(Method::Post, "https://c"));
        assert!(third.is_err());

        let requests = client.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].url, "https://a");
        assert_eq!(requests[1].method, Method::Delete);
    }
}
