//! Error types for the DooTask client.
//!
//! # Design
//! Failures are classified in the order they can occur during one call:
//! the transport could not complete (`Transport`), the server answered with
//! HTTP status >= 400 (`Http`), the envelope reported `ret != 1`
//! (`Envelope`), or a successful envelope carried data that does not fit the
//! requested type (`PayloadShape`, with `MalformedEnvelope` for bodies that
//! are not envelopes at all). Errors raised before anything is sent belong to
//! the `Request` kind.
//!
//! Every variant renders as `[kind] ...` followed by the HTTP status or `ret`
//! value and the server message, so a logged error is actionable on its own.

use std::fmt;

use thiserror::Error;

/// Failures raised by a `Transport` implementation or while reading a
/// response body.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server may have received and processed the request.
    #[error("request timed out")]
    Timeout,

    /// No connection was established, so the request never reached the
    /// server.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The exchange broke after the request went out.
    #[error("failed to read response body: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Http,
    Envelope,
    PayloadShape,
    Request,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Http => "http",
            ErrorKind::Envelope => "envelope",
            ErrorKind::PayloadShape => "payload",
            ErrorKind::Request => "request",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by every client call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a complete response.
    #[error("[transport] {0}")]
    Transport(#[from] TransportError),

    /// The server answered with HTTP status >= 400. `ret` is set when the
    /// body was an envelope carrying a non-zero indicator.
    #[error("[http] HTTP {status}: {message}")]
    Http {
        status: u16,
        ret: Option<i64>,
        message: String,
    },

    /// The envelope parsed but `ret` was not the success value.
    #[error("[envelope] API error [{ret}]: {msg}")]
    Envelope { ret: i64, msg: String },

    /// A non-error HTTP response whose body is not a `{ret, msg, data}`
    /// envelope.
    #[error("[payload] HTTP {status}: response is not a valid envelope: {source}")]
    MalformedEnvelope {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// `ret` was 1 but `data` could not be coerced into the requested type.
    #[error("[payload] ret 1: data does not fit `{target}`: {source}")]
    PayloadShape {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("[request] failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("[request] invalid argument: {0}")]
    InvalidArgument(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Http { .. } => ErrorKind::Http,
            ApiError::Envelope { .. } => ErrorKind::Envelope,
            ApiError::MalformedEnvelope { .. } | ApiError::PayloadShape { .. } => {
                ErrorKind::PayloadShape
            }
            ApiError::Serialization(_) | ApiError::InvalidArgument(_) => ErrorKind::Request,
        }
    }

    /// True when the request never reached the server. Timeouts and broken
    /// exchanges are not retryable: the server may already have applied the
    /// call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transport(TransportError::Connection(_)))
    }

    /// HTTP status carried by the error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } | ApiError::MalformedEnvelope { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// The envelope `ret` value carried by the error, if any.
    pub fn ret(&self) -> Option<i64> {
        match self {
            ApiError::Envelope { ret, .. } => Some(*ret),
            ApiError::Http { ret, .. } => *ret,
            ApiError::PayloadShape { .. } => Some(crate::envelope::RET_SUCCESS),
            _ => None,
        }
    }

    /// The server-provided message, if the server provided one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Envelope { msg, .. } => Some(msg),
            ApiError::Http { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_error_renders_ret_and_message() {
        let err = ApiError::Envelope {
            ret: -1,
            msg: "permission denied".to_string(),
        };
        assert_eq!(err.to_string(), "[envelope] API error [-1]: permission denied");
        assert_eq!(err.kind(), ErrorKind::Envelope);
        assert_eq!(err.ret(), Some(-1));
        assert_eq!(err.server_message(), Some("permission denied"));
    }

    #[test]
    fn http_error_renders_status_and_message() {
        let err = ApiError::Http {
            status: 502,
            ret: None,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "[http] HTTP 502: bad gateway");
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.ret(), None);
    }

    #[test]
    fn payload_errors_render_target_type() {
        let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = ApiError::PayloadShape {
            target: "u32",
            source,
        };
        let text = err.to_string();
        assert!(text.starts_with("[payload] ret 1: data does not fit `u32`"), "{text}");
        assert_eq!(err.kind(), ErrorKind::PayloadShape);
    }

    #[test]
    fn malformed_envelope_is_a_payload_failure() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = ApiError::MalformedEnvelope { status: 200, source };
        assert_eq!(err.kind(), ErrorKind::PayloadShape);
        assert_eq!(err.status(), Some(200));
        assert!(err.to_string().contains("HTTP 200"));
    }

    #[test]
    fn only_connection_failures_are_retryable() {
        assert!(ApiError::from(TransportError::Connection("refused".to_string())).is_retryable());
        assert!(!ApiError::from(TransportError::Timeout).is_retryable());
        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(!ApiError::from(TransportError::Io(reset)).is_retryable());
        assert!(!ApiError::Envelope { ret: 0, msg: String::new() }.is_retryable());
        assert!(!ApiError::InvalidArgument("name".to_string()).is_retryable());
    }

    #[test]
    fn transport_error_renders_cause() {
        let err = ApiError::from(TransportError::Connection("refused".to_string()));
        assert_eq!(err.to_string(), "[transport] connection failed: refused");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
