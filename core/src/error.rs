//! Error types for the REST client.
//!
//! # Design
//! Only malformed call arguments are returned as `Err` from
//! `Client::request`. Network and HTTP outcomes are recorded in the
//! `Response` and reported through the boolean result, so ordinary failures
//! are handled with plain branching. `Transport` and `HttpStatus` exist for
//! callers who opt into `Response::into_result` and want `?` propagation.

use thiserror::Error;

/// Errors produced by the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// A verb or override verb outside GET, POST, PUT, DELETE and PATCH.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No response was received at all.
    #[error("{0}")]
    Transport(String),

    /// A response arrived with a status outside [200, 300).
    #[error("Error {status} ({reason}) for {url}")]
    HttpStatus {
        status: u16,
        reason: &'static str,
        url: String,
    },
}

/// Low-level diagnostic from a `Transport` that could not complete a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        TransportError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_renders_reason_and_url() {
        let err = ClientError::HttpStatus {
            status: 404,
            reason: "Not Found",
            url: "https://api.example.com/items/1".to_string(),
        };
        assert_eq!(err.to_string(), "Error 404 (Not Found) for https://api.example.com/items/1");
    }

    #[test]
    fn invalid_argument_names_the_problem() {
        let err = ClientError::InvalidArgument("unsupported verb `TRACE`".to_string());
        assert_eq!(err.to_string(), "invalid argument: unsupported verb `TRACE`");
    }
}
