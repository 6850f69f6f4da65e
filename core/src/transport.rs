//! Blocking transport backed by `ureq`.
//!
//! # Design
//! `UreqTransport` is the default [`Transport`]. It performs exactly one
//! round-trip per call and hands the body back unread; the decoder owns
//! reading and closing it. 4xx/5xx responses come back as ordinary
//! responses so the envelope decoder can classify them.
//!
//! The upstream reads request input from a JSON body on every verb, so GET
//! and DELETE requests with a body are sent with `force_send_body`.

use std::io;
use std::time::Duration;

use ureq::typestate::WithoutBody;
use ureq::{Agent, RequestBuilder};

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// A [`Transport`] implementation backed by a shared `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let mut builder = Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false);
        if config.insecure {
            builder = builder.tls_config(
                ureq::tls::TlsConfig::builder()
                    .disable_verification(true)
                    .build(),
            );
        }
        Self {
            agent: builder.build().new_agent(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(&ClientConfig::default().with_timeout(timeout))
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl Transport for UreqTransport {
    fn perform(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let url = url.as_str();

        let result = match (method, body) {
            (HttpMethod::Get, None) => apply_headers(self.agent.get(url), &headers).call(),
            (HttpMethod::Get, Some(body)) => with_body(self.agent.get(url), &headers, body),
            (HttpMethod::Delete, None) => apply_headers(self.agent.delete(url), &headers).call(),
            (HttpMethod::Delete, Some(body)) => with_body(self.agent.delete(url), &headers, body),
            (HttpMethod::Post, body) => {
                apply_headers(self.agent.post(url), &headers).send(body.unwrap_or_default())
            }
            (HttpMethod::Put, body) => {
                apply_headers(self.agent.put(url), &headers).send(body.unwrap_or_default())
            }
        };

        match result {
            Ok(response) => Ok(convert_response(response)),
            Err(ureq::Error::Timeout(_)) => Err(TransportError::Timeout),
            Err(ureq::Error::HostNotFound) => {
                Err(TransportError::Connection("host not found".to_owned()))
            }
            Err(ureq::Error::ConnectionFailed) => {
                Err(TransportError::Connection("connection failed".to_owned()))
            }
            Err(ureq::Error::Io(e)) if refused_before_sending(&e) => {
                Err(TransportError::Connection(e.to_string()))
            }
            Err(ureq::Error::Io(e)) => Err(TransportError::Io(e)),
            Err(e) => Err(TransportError::Other(Box::new(e))),
        }
    }
}

/// Connect-level failures, reported before any request bytes are written.
fn refused_before_sending(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::AddrNotAvailable
    )
}

fn apply_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn with_body(
    builder: RequestBuilder<WithoutBody>,
    headers: &[(String, String)],
    body: String,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    apply_headers(builder, headers).force_send_body().send(body)
}

/// Keep the body as a stream; reading it is the decoder's job.
fn convert_response(response: ureq::http::Response<ureq::Body>) -> HttpResponse {
    let (parts, body) = response.into_parts();
    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_owned(), value.to_owned()))
        })
        .collect();
    HttpResponse::new(parts.status.as_u16(), body.into_reader()).with_headers(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connect_failures_count_as_unsent() {
        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        assert!(refused_before_sending(&refused));
        let reset = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        assert!(!refused_before_sending(&reset));
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert!(!refused_before_sending(&eof));
    }
}
