//! Blocking REST client for a single base service URL.
//!
//! # Overview
//! A `Client` holds connection settings (base URL, header lines, Basic
//! credentials, timeout, user agent, compatibility mode) and issues GET,
//! POST, PUT, DELETE and PATCH requests against resource paths. The raw
//! header block, body, status and a normalized error message of the most
//! recent call stay readable on the client.
//!
//! # Design
//! - Request building is pure (`Client::build_request` → `HttpRequest`);
//!   only the `Transport` does I/O, so dispatch is testable offline.
//! - Compatibility mode sends PUT, DELETE and PATCH as POST with an
//!   `X-HTTP-Method-Override` header naming the original verb.
//! - Invalid verbs are the only `Err` from `Client::request`. Transport
//!   failures and non-2xx statuses come back as `Ok(false)` with the detail
//!   in `Client::last_error`.
//! - `Client::send` returns the `Response` directly for callers that would
//!   rather not keep state on the client.

pub mod client;
pub mod config;
pub mod encoding;
pub mod error;
pub mod http;
pub mod response;
pub mod status;
pub mod transport;

pub use client::{resolve_verbs, Client, METHOD_OVERRIDE_HEADER};
pub use config::ClientConfig;
pub use encoding::{flatten, Payload};
pub use error::{ClientError, TransportError};
pub use http::{HttpRequest, RawResponse, Verb};
pub use response::{Response, ResponseInfo, NO_ERRORS};
pub use status::status_code_message;
pub use transport::{Transport, UreqTransport};
