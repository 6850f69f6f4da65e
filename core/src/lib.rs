//! Synchronous client for the DooTask HTTP API.
//!
//! # Overview
//! Every call goes through the same pipeline: the client builds a plain
//! [`HttpRequest`], a [`Transport`] performs it, and [`envelope::decode`]
//! turns the [`HttpResponse`] into a typed value. The upstream wraps every
//! payload in `{ret, msg, data}` and is loose about payload shapes, so the
//! decoder also reconciles a lone object where a list was expected, a
//! one-element array where a record was expected, and similar drift.
//!
//! # Design
//! - The core never touches the network itself. `UreqTransport` is the
//!   default transport behind the `ureq-transport` feature; tests and hosts
//!   plug in anything implementing [`Transport`], closures included.
//! - `decode` takes the response by value, so a body cannot be read twice
//!   and is always released once decoding finishes.
//! - Services (`client.projects()`, `client.files()`, ...) are borrowed
//!   handles with one method per endpoint.
//! - Errors carry enough to branch on: transport, HTTP status, envelope
//!   `ret`/`msg`, or payload shape with the target type name.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod services;
#[cfg(feature = "ureq-transport")]
pub mod transport;
pub mod types;

pub use client::DooTaskClient;
pub use config::ClientConfig;
pub use error::{ApiError, ErrorKind, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use services::{DialogService, FileService, ProjectService, ReportService, UsersService};
#[cfg(feature = "ureq-transport")]
pub use transport::UreqTransport;
pub use types::{DateTime, IntArray, IntBool, Page, PageQuery, User};
