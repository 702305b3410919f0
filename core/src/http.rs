//! HTTP wire types.
//!
//! # Design
//! These types describe requests and raw responses as plain data. The client
//! builds an `HttpRequest` without touching the network and hands it to a
//! `Transport`, which returns a `RawResponse`. Keeping the two halves apart
//! lets verb dispatch be tested deterministically.

use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

/// The five verbs the client accepts.
///
/// The discriminants are the public numeric codes of the verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Patch = 4,
}

impl Verb {
    pub const ALL: [Verb; 5] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete, Verb::Patch];

    /// Canonical upper-case method name, as sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
            Verb::Patch => "PATCH",
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ClientError::InvalidArgument(format!("unsupported verb `{s}`")))
    }
}

impl TryFrom<u8> for Verb {
    type Error = ClientError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.code() == code)
            .ok_or_else(|| ClientError::InvalidArgument(format!("unsupported verb code {code}")))
    }
}

/// An HTTP request described as plain data.
///
/// Built by `Client::build_request`. A `Transport` executes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Verb,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A completed transfer as returned by a `Transport`.
///
/// `raw` holds the header block followed by the body; the first
/// `header_size` bytes are the header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub effective_url: String,
    pub header_size: usize,
    pub raw: Vec<u8>,
}
