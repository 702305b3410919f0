//! Executing an `HttpRequest` over the network.
//!
//! # Design
//! `Transport` is the only I/O seam of the crate. `UreqTransport` creates a
//! fresh `ureq::Agent` for every call, so each request owns exactly one
//! transport handle and drops it on every exit path. Non-2xx statuses come
//! back as data; only failures to get a response at all are errors.

use std::time::Duration;

use ureq::{Agent, RequestBuilder, ResponseExt};

use crate::error::TransportError;
use crate::http::{HttpRequest, RawResponse, Verb};

/// Something that can carry out an `HttpRequest`.
///
/// `timeout` bounds the whole call; `None` means no limit.
pub trait Transport {
    fn send(&self, request: &HttpRequest, timeout: Option<Duration>) -> Result<RawResponse, TransportError>;
}

/// Blocking transport backed by ureq.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest, timeout: Option<Duration>) -> Result<RawResponse, TransportError> {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();

        let url = request.url.as_str();
        let headers = request.headers.as_slice();
        let body = request.body.as_deref();

        let mut response = match (request.method, body) {
            (Verb::Get, _) => with_headers(agent.get(url), headers).call(),
            (Verb::Delete, None) => with_headers(agent.delete(url), headers).call(),
            (Verb::Delete, Some(body)) => with_headers(agent.delete(url), headers)
                .force_send_body()
                .send(body),
            (Verb::Post, Some(body)) => with_headers(agent.post(url), headers).send(body),
            (Verb::Post, None) => with_headers(agent.post(url), headers).send_empty(),
            (Verb::Put, Some(body)) => with_headers(agent.put(url), headers).send(body),
            (Verb::Put, None) => with_headers(agent.put(url), headers).send_empty(),
            (Verb::Patch, Some(body)) => with_headers(agent.patch(url), headers).send(body),
            (Verb::Patch, None) => with_headers(agent.patch(url), headers).send_empty(),
        }?;

        let status = response.status();
        let mut head = format!(
            "{:?} {} {}\r\n",
            response.version(),
            status.as_str(),
            status.canonical_reason().unwrap_or("")
        );
        for (name, value) in response.headers() {
            head.push_str(name.as_str());
            head.push_str(": ");
            head.push_str(&String::from_utf8_lossy(value.as_bytes()));
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let effective_url = response.get_uri().to_string();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        let header_size = head.len();
        let mut raw = head.into_bytes();
        raw.extend_from_slice(&body);

        Ok(RawResponse {
            status: status.as_u16(),
            effective_url,
            header_size,
            raw,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
