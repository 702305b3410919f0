//! Connection-level settings of a `Client`.
//!
//! # Design
//! `ClientConfig` is a plain value object. It derives serde so a host
//! application can embed it in its own configuration file; every field has a
//! default, so partial documents deserialize.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_SECS: u64 = 900;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL prepended verbatim to every resource path.
    pub service_url: String,
    /// Header lines such as `Accept: application/json`, sent on every request.
    pub request_headers: Vec<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Whole-request limit in seconds; `0` disables the limit.
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
    /// Send PUT, DELETE and PATCH as POST with `X-HTTP-Method-Override`.
    pub compatibility_mode: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: String::new(),
            request_headers: Vec::new(),
            user: None,
            password: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            compatibility_mode: false,
        }
    }
}

impl ClientConfig {
    pub fn new(
        service_url: &str,
        request_headers: Vec<String>,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Self {
        Self {
            service_url: service_url.to_string(),
            request_headers,
            user: user.map(str::to_string),
            password: password.map(str::to_string),
            ..Self::default()
        }
    }

    /// Request time limit, `None` when `timeout_secs` is `0`.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Basic auth credentials, only when both halves are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.user, &self.password) {
            (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
            _ => None,
        }
    }

    /// Configured header lines split into name/value pairs.
    ///
    /// The value keeps its text as written, minus the single space that
    /// conventionally follows the colon. Lines without a colon or with an
    /// empty name are skipped.
    pub fn parsed_headers(&self) -> Vec<(String, String)> {
        self.request_headers
            .iter()
            .filter_map(|line| match line.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => {
                    let value = value.strip_prefix(' ').unwrap_or(value);
                    Some((name.trim().to_string(), value.to_string()))
                }
                _ => {
                    tracing::warn!(header = %line, "skipping malformed request header");
                    None
                }
            })
            .collect()
    }
}
