//! The outcome of one request.
//!
//! # Design
//! A `Response` is either a transport failure (only `error` is set) or a
//! completed transfer (`header`, `body` and `info` are all set, whatever the
//! status). An HTTP status outside [200, 300) overrides the error message
//! even though the transfer itself succeeded.

use std::borrow::Cow;

use crate::error::{ClientError, TransportError};
use crate::http::RawResponse;
use crate::status::status_code_message;

/// Message recorded when a transfer completes with a 2xx status.
pub const NO_ERRORS: &str = "No errors";

/// Metadata about a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseInfo {
    pub status: u16,
    /// Final URL after any redirects the transport followed.
    pub effective_url: String,
    pub header_size: usize,
}

/// Outcome of one request: either a completed transfer or a transport
/// failure, with the normalized error message in both cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    header: Option<String>,
    body: Option<Vec<u8>>,
    info: Option<ResponseInfo>,
    error: String,
}

impl Response {
    /// Split a raw transfer into header block and body and normalize the
    /// error message.
    pub fn from_raw(raw: RawResponse) -> Self {
        let RawResponse {
            status,
            effective_url,
            header_size,
            mut raw,
        } = raw;
        let split = header_size.min(raw.len());
        let body = raw.split_off(split);
        let header = String::from_utf8_lossy(&raw).into_owned();

        let error = if (200..300).contains(&status) {
            NO_ERRORS.to_string()
        } else {
            format!(
                "Error {status} ({}) for {effective_url}",
                status_code_message(status)
            )
        };

        Self {
            header: Some(header),
            body: Some(body),
            info: Some(ResponseInfo {
                status,
                effective_url,
                header_size,
            }),
            error,
        }
    }

    pub fn transport_failure(err: &TransportError) -> Self {
        Self {
            header: None,
            body: None,
            info: None,
            error: format!("Transport error: {err}"),
        }
    }

    /// Raw header block, including the status line and the blank line.
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        self.body.as_deref().map(String::from_utf8_lossy)
    }

    pub fn info(&self) -> Option<&ResponseInfo> {
        self.info.as_ref()
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn status(&self) -> Option<u16> {
        self.info.as_ref().map(|info| info.status)
    }

    /// A body arrived and the status is in [200, 300).
    pub fn is_success(&self) -> bool {
        self.body.is_some() && matches!(self.status(), Some(status) if (200..300).contains(&status))
    }

    /// Turn operational failures into `ClientError` for `?` propagation.
    pub fn into_result(self) -> Result<Response, ClientError> {
        if self.is_success() {
            return Ok(self);
        }
        match &self.info {
            Some(info) => Err(ClientError::HttpStatus {
                status: info.status,
                reason: status_code_message(info.status),
                url: info.effective_url.clone(),
            }),
            None => Err(ClientError::Transport(self.error)),
        }
    }
}
