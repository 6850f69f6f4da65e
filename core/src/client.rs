//! The DooTask API client: request building, the call pipeline and service
//! accessors.
//!
//! # Design
//! `DooTaskClient` holds the base URL, an optional auth token, the
//! configuration and a [`Transport`]. It never mutates shared state while a
//! call is in flight, so one client can serve any number of sequential calls
//! and, with a `Sync` transport, concurrent ones.
//!
//! A call is split into the same steps as the rest of the crate:
//! `build_request` produces an [`HttpRequest`] without touching the network,
//! the transport performs it, and [`envelope::decode`] consumes the response.
//! Retry wraps the transport and decode steps together and only re-runs them
//! when the connection could not be established. Once a request may have
//! reached the server (timeouts, a body that breaks mid-read) the failure is
//! returned as-is, as are HTTP, envelope and payload failures.
//!
//! Endpoint methods live on borrowed service handles (`client.projects()`,
//! `client.files()`, ...) that all funnel into [`DooTaskClient::call`].

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::envelope;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::services::{DialogService, FileService, ProjectService, ReportService, UsersService};
#[cfg(feature = "ureq-transport")]
use crate::transport::UreqTransport;

/// Header carrying the user token.
pub const TOKEN_HEADER: &str = "Token";

/// Client for one DooTask instance.
#[derive(Clone)]
pub struct DooTaskClient<T> {
    base_url: String,
    token: Option<String>,
    config: ClientConfig,
    transport: T,
}

#[cfg(feature = "ureq-transport")]
impl DooTaskClient<UreqTransport> {
    /// Client with the default configuration and a `ureq` transport.
    pub fn new(base_url: &str) -> Self {
        Self::with_config(base_url, ClientConfig::default())
    }

    pub fn with_config(base_url: &str, config: ClientConfig) -> Self {
        let transport = UreqTransport::new(&config);
        Self::from_parts(base_url, transport, config)
    }
}

impl<T: Transport> DooTaskClient<T> {
    /// Client over a caller-supplied transport with the default configuration.
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self::from_parts(base_url, transport, ClientConfig::default())
    }

    pub fn from_parts(base_url: &str, transport: T, config: ClientConfig) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            config,
            transport,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.set_token(token);
        self
    }

    /// Set the token sent with every following request. An empty token
    /// clears it.
    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -----------------------------------------------------------------------
    // Service handles
    // -----------------------------------------------------------------------

    pub fn dialog(&self) -> DialogService<'_, T> {
        DialogService::new(self)
    }

    pub fn files(&self) -> FileService<'_, T> {
        FileService::new(self)
    }

    pub fn projects(&self) -> ProjectService<'_, T> {
        ProjectService::new(self)
    }

    pub fn reports(&self) -> ReportService<'_, T> {
        ReportService::new(self)
    }

    pub fn users(&self) -> UsersService<'_, T> {
        UsersService::new(self)
    }

    // -----------------------------------------------------------------------
    // Request pipeline
    // -----------------------------------------------------------------------

    /// Describe a request without sending it.
    ///
    /// `path` is the endpoint path (`/api/project/lists`); `query` pairs are
    /// percent-encoded into the URL; `body` is JSON-encoded and sent for
    /// every verb.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<HttpRequest> {
        let mut url = format!("{}{}", self.base_url, path);
        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encode_query(query));
        }

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(ApiError::Serialization)?;

        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.config.user_agent.clone()),
        ];
        if let Some(token) = &self.token {
            headers.push((TOKEN_HEADER.to_string(), token.clone()));
        }

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Perform one round-trip for an already-built request.
    pub fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        if self.config.debug {
            if let Some(body) = &request.body {
                tracing::debug!(body = %body, "request body");
            }
        }
        let response = self.transport.perform(request)?;
        tracing::debug!(status = response.status, "received response");
        Ok(response)
    }

    /// Build, send and decode one call into `R`.
    pub fn call<R, B>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call_with_headers(method, path, query, &[], body)
    }

    /// Like [`call`](Self::call) with extra headers for this request only.
    /// They are applied last and replace defaults of the same name.
    pub fn call_with_headers<R, B>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, String)],
        headers: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.build_request(method, path, query, body)?;
        for (name, value) in headers {
            request.set_header(name, value);
        }
        self.with_retry(&request, || envelope::decode(self.execute(request.clone())?))
    }

    /// Like [`call`](Self::call) for endpoints whose payload carries nothing
    /// the caller needs.
    pub fn call_unit<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<()> {
        self.call::<serde::de::IgnoredAny, B>(method, path, query, body)
            .map(|_| ())
    }

    /// Build, send and read one call whose response is file content rather
    /// than an envelope.
    pub fn call_raw<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Vec<u8>> {
        let request = self.build_request(method, path, query, body)?;
        self.with_retry(&request, || envelope::decode_raw(self.execute(request.clone())?))
    }

    fn with_retry<R>(&self, request: &HttpRequest, mut attempt: impl FnMut() -> Result<R>) -> Result<R> {
        let mut retries = 0;
        loop {
            match attempt() {
                Err(err) if err.is_retryable() && retries < self.config.retry_count => {
                    retries += 1;
                    tracing::warn!(
                        method = %request.method,
                        url = %request.url,
                        attempt = retries,
                        max = self.config.retry_count,
                        error = %err,
                        "retrying request after connection failure"
                    );
                }
                result => return result,
            }
        }
    }
}

impl<T> fmt::Debug for DooTaskClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DooTaskClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn encode_query(query: &[(&str, String)]) -> String {
    query
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Reject empty required string arguments before anything is sent.
pub(crate) fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidArgument(format!("{name} must not be empty")));
    }
    Ok(())
}

/// Reject empty required lists before anything is sent.
pub(crate) fn require_any<V>(name: &str, values: &[V]) -> Result<()> {
    if values.is_empty() {
        return Err(ApiError::InvalidArgument(format!("{name} must not be empty")));
    }
    Ok(())
}

/// Reject non-positive required ids before anything is sent.
pub(crate) fn require_id(name: &str, id: i64) -> Result<()> {
    if id <= 0 {
        return Err(ApiError::InvalidArgument(format!("{name} must be a positive id, got {id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::error::{ErrorKind, TransportError};

    fn ok(body: &'static str) -> impl Fn(HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        move |_req: HttpRequest| Ok(HttpResponse::from_bytes(200, body))
    }

    #[test]
    fn build_request_sets_json_and_agent_headers() {
        let client = DooTaskClient::with_transport("http://localhost:2222/", ok("{}"));
        let req = client
            .build_request(HttpMethod::Get, "/api/project/lists", &[], None::<&()>)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:2222/api/project/lists");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert!(req.header("user-agent").unwrap().starts_with("dootask-rust-sdk/"));
        assert_eq!(req.header("token"), None);
        assert!(req.body.is_none());
    }

    #[test]
    fn token_header_follows_set_token() {
        let mut client = DooTaskClient::with_transport("http://h", ok("{}")).with_token("abc");
        let req = client
            .build_request(HttpMethod::Post, "/api/x", &[], None::<&()>)
            .unwrap();
        assert_eq!(req.header("Token"), Some("abc"));

        client.set_token("");
        assert_eq!(client.token(), None);
        let req = client
            .build_request(HttpMethod::Post, "/api/x", &[], None::<&()>)
            .unwrap();
        assert_eq!(req.header("Token"), None);
    }

    #[test]
    fn query_pairs_are_percent_encoded() {
        let client = DooTaskClient::with_transport("http://h", ok("{}"));
        let req = client
            .build_request(
                HttpMethod::Get,
                "/api/file/search",
                &[("key", "q3 report & notes".to_string()), ("take", "10".to_string())],
                None::<&()>,
            )
            .unwrap();
        assert_eq!(req.url, "http://h/api/file/search?key=q3%20report%20%26%20notes&take=10");
    }

    #[test]
    fn get_requests_carry_json_bodies() {
        let client = DooTaskClient::with_transport("http://h", ok("{}"));
        let req = client
            .build_request(HttpMethod::Get, "/api/file/add", &[], Some(&json!({"name": "a"})))
            .unwrap();
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"a"}"#));
    }

    #[test]
    fn call_decodes_through_the_transport() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let client = DooTaskClient::with_transport("http://h", move |req: HttpRequest| {
            log.borrow_mut().push(req);
            Ok::<_, TransportError>(HttpResponse::from_bytes(200, r#"{"ret":1,"msg":"","data":[1,2]}"#))
        });
        let ids: Vec<i64> = client
            .call(HttpMethod::Get, "/api/ids", &[], None::<&()>)
            .unwrap();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn extra_headers_apply_to_one_call() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let client = DooTaskClient::with_transport("http://h", move |req: HttpRequest| {
            log.borrow_mut().push(req);
            Ok::<_, TransportError>(HttpResponse::from_bytes(200, r#"{"ret":1,"data":{}}"#))
        })
        .with_token("abc");

        client
            .call_with_headers::<serde::de::IgnoredAny, ()>(
                HttpMethod::Get,
                "/api/system/setting",
                &[],
                &[("Language", "en"), ("token", "override")],
                None,
            )
            .unwrap();
        client
            .call_unit(HttpMethod::Get, "/api/system/setting", &[], None::<&()>)
            .unwrap();

        let requests = seen.borrow();
        assert_eq!(requests[0].header("Language"), Some("en"));
        assert_eq!(requests[0].header("Token"), Some("override"));
        assert_eq!(requests[0].header("Content-Type"), Some("application/json"));
        assert_eq!(requests[1].header("Language"), None);
        assert_eq!(requests[1].header("Token"), Some("abc"));
    }

    #[test]
    fn connection_failures_are_retried_up_to_the_limit() {
        let attempts = Rc::new(Cell::new(0));
        let counter = Rc::clone(&attempts);
        let config = ClientConfig::default().with_retry_count(2);
        let client = DooTaskClient::from_parts(
            "http://h",
            move |_req: HttpRequest| {
                counter.set(counter.get() + 1);
                Err::<HttpResponse, _>(TransportError::Connection("refused".to_string()))
            },
            config,
        );
        let err = client
            .call::<serde_json::Value, ()>(HttpMethod::Get, "/api/x", &[], None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn retry_recovers_after_transient_failure() {
        let attempts = Rc::new(Cell::new(0));
        let counter = Rc::clone(&attempts);
        let client = DooTaskClient::with_transport("http://h", move |_req: HttpRequest| {
            counter.set(counter.get() + 1);
            if counter.get() == 1 {
                Err(TransportError::Connection("reset".to_string()))
            } else {
                Ok(HttpResponse::from_bytes(200, r#"{"ret":1,"data":"ok"}"#))
            }
        });
        let value: String = client.call(HttpMethod::Get, "/api/x", &[], None::<&()>).unwrap();
        assert_eq!(value, "ok");
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn timeouts_are_not_retried() {
        let attempts = Rc::new(Cell::new(0));
        let counter = Rc::clone(&attempts);
        let client = DooTaskClient::with_transport("http://h", move |_req: HttpRequest| {
            counter.set(counter.get() + 1);
            Err::<HttpResponse, _>(TransportError::Timeout)
        });
        let err = client
            .call::<serde_json::Value, ()>(HttpMethod::Post, "/api/x", &[], None)
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(TransportError::Timeout)));
        assert_eq!(attempts.get(), 1);
    }

    /// Answers with a status line, then drops the connection mid-body.
    struct ResetBody;

    impl std::io::Read for ResetBody {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset mid-body",
            ))
        }
    }

    #[test]
    fn messages_are_not_resent_after_a_broken_response() {
        let sent = Rc::new(Cell::new(0));
        let counter = Rc::clone(&sent);
        let client = DooTaskClient::with_transport("http://h", move |_req: HttpRequest| {
            counter.set(counter.get() + 1);
            Ok::<_, TransportError>(HttpResponse::new(200, ResetBody))
        });
        assert_eq!(client.config().retry_count, 3);

        let err = client
            .dialog()
            .send_text(&crate::types::SendTextRequest {
                dialog_id: 3,
                text: "deploy done".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(TransportError::Io(_))), "{err}");
        assert!(!err.is_retryable());
        assert_eq!(sent.get(), 1);
    }

    #[test]
    fn envelope_failures_are_not_retried() {
        let attempts = Rc::new(Cell::new(0));
        let counter = Rc::clone(&attempts);
        let client = DooTaskClient::with_transport("http://h", move |_req: HttpRequest| {
            counter.set(counter.get() + 1);
            Ok::<_, TransportError>(HttpResponse::from_bytes(200, r#"{"ret":0,"msg":"no"}"#))
        });
        let err = client
            .call_unit(HttpMethod::Get, "/api/x", &[], None::<&()>)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Envelope);
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn http_failures_are_not_retried() {
        let attempts = Rc::new(Cell::new(0));
        let counter = Rc::clone(&attempts);
        let client = DooTaskClient::with_transport("http://h", move |_req: HttpRequest| {
            counter.set(counter.get() + 1);
            Ok::<_, TransportError>(HttpResponse::from_bytes(503, "maintenance"))
        });
        let err = client
            .call_raw(HttpMethod::Get, "/api/x", &[], None::<&()>)
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn required_argument_checks() {
        assert!(require("name", "x").is_ok());
        let err = require("name", "  ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Request);
        assert!(require_any::<i64>("userids", &[]).is_err());
        assert!(require_id("project_id", 0).is_err());
        assert!(require_id("project_id", 3).is_ok());
    }

    #[test]
    fn debug_output_redacts_token() {
        let client = DooTaskClient::with_transport("http://h", ok("{}")).with_token("secret");
        let text = format!("{client:?}");
        assert!(!text.contains("secret"), "{text}");
    }
}
