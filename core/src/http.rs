//! HTTP transport types and the transport delegate seam.
//!
//! # Design
//! Requests are plain data: `DooTaskClient::build_request` produces an
//! `HttpRequest` without touching the network, and a `Transport`
//! implementation performs the round-trip. This keeps every endpoint method
//! testable with an in-memory transport and lets callers plug in their own
//! HTTP stack.
//!
//! `HttpResponse` carries its body as a reader that can be consumed exactly
//! once. The decoder takes the response by value, reads the body to the end
//! and drops it before returning, so a response can never be decoded twice.

use std::fmt;
use std::io::{Cursor, Read};

use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is fully qualified (base URL, endpoint path and any query string).
/// `body` holds the JSON-encoded request payload; the upstream reads it for
/// every verb, GET included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing any existing value under the same name.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }
}

/// An HTTP response whose body stream is owned by whoever holds it.
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    body: Box<dyn Read>,
}

impl HttpResponse {
    /// Wrap a status code and a body stream.
    pub fn new(status: u16, body: impl Read + 'static) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Box::new(body),
        }
    }

    /// Build a response from an in-memory body.
    pub fn from_bytes(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, Cursor::new(body.into()))
    }

    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Give up the response, handing the body stream to the caller.
    pub fn into_body(self) -> Box<dyn Read> {
        self.body
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// The transport delegate: performs one HTTP round-trip.
///
/// Implementations must return 4xx/5xx responses as `Ok` values; status
/// interpretation is the decoder's job. Timeouts and cancellation are the
/// implementation's concern.
pub trait Transport {
    fn perform(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn perform(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_match_wire_verbs() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/api".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: None,
        };
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("token"), None);
    }

    #[test]
    fn set_header_replaces_regardless_of_case() {
        let mut req = HttpRequest {
            method: HttpMethod::Post,
            url: "http://localhost/api".to_string(),
            headers: vec![("User-Agent".to_string(), "sdk/1".to_string())],
            body: None,
        };
        req.set_header("user-agent", "bot/2");
        req.set_header("Language", "zh");
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.header("User-Agent"), Some("bot/2"));
        assert_eq!(req.header("language"), Some("zh"));
    }

    #[test]
    fn response_body_reads_back() {
        let response = HttpResponse::from_bytes(200, "hello");
        assert_eq!(response.status, 200);
        let mut body = String::new();
        response.into_body().read_to_string(&mut body).unwrap();
        assert_eq!(body, "hello");
    }

    #[test]
    fn closures_act_as_transports() {
        let transport = |req: HttpRequest| {
            Ok::<_, TransportError>(HttpResponse::from_bytes(204, req.url.into_bytes()))
        };
        let response = transport
            .perform(HttpRequest {
                method: HttpMethod::Delete,
                url: "http://x/y".to_string(),
                headers: Vec::new(),
                body: None,
            })
            .unwrap();
        assert_eq!(response.status, 204);
    }
}
