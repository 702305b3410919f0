//! Verb dispatch and the stateful request API.
//!
//! # Design
//! `Client::build_request` turns a path, payload and verbs into an
//! `HttpRequest` without I/O. `Client::send` executes it through the
//! configured `Transport` and returns the `Response`. `Client::request` wraps
//! `send` and keeps the outcome as the last-response state, which is cleared
//! at the start of every call.
//!
//! A `Client` is not meant for overlapping calls. `request` takes
//! `&mut self`; share a client between threads only behind a `Mutex`, or use
//! `send`, which leaves the client untouched.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::config::ClientConfig;
use crate::encoding::{encode_post, format_data, Payload};
use crate::error::ClientError;
use crate::http::{HttpRequest, Verb};
use crate::response::{Response, ResponseInfo};
use crate::status::status_code_message;
use crate::transport::{Transport, UreqTransport};

pub const METHOD_OVERRIDE_HEADER: &str = "X-HTTP-Method-Override";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Normalize the requested verb and override into `(wire verb, override)`.
///
/// In compatibility mode any verb other than GET or POST becomes the
/// override, replacing whatever override the caller passed. Whenever an
/// override is present the wire verb is POST.
pub fn resolve_verbs(
    verb: &str,
    overriding: Option<&str>,
    compatibility_mode: bool,
) -> Result<(Verb, Option<Verb>), ClientError> {
    let name = verb.trim();
    let plain = name.eq_ignore_ascii_case("GET") || name.eq_ignore_ascii_case("POST");
    let overriding = if compatibility_mode && !plain {
        Some(name)
    } else {
        overriding
    };

    match overriding {
        Some(name) => {
            let parsed = name.parse::<Verb>().map_err(|_| {
                ClientError::InvalidArgument(format!("unsupported override verb `{name}`"))
            })?;
            Ok((Verb::Post, Some(parsed)))
        }
        None => Ok((name.parse::<Verb>()?, None)),
    }
}

/// Blocking client for one base service URL.
///
/// Holds the connection settings and the outcome of the most recent
/// `request`. Not safe for overlapping calls: each `request` overwrites the
/// last-response state, so concurrent callers need one client each or a
/// `Mutex` around a shared one.
pub struct Client {
    config: ClientConfig,
    transport: Box<dyn Transport + Send + Sync>,
    last: Option<Response>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(
        service_url: &str,
        request_headers: Vec<String>,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Self {
        Self::from_config(ClientConfig::new(service_url, request_headers, user, password))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport)
    }

    pub fn with_transport<T>(config: ClientConfig, transport: T) -> Self
    where
        T: Transport + Send + Sync + 'static,
    {
        Self {
            config,
            transport: Box::new(transport),
            last: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn service_url(&self) -> &str {
        &self.config.service_url
    }

    pub fn set_service_url(&mut self, service_url: &str) {
        self.config.service_url = service_url.to_string();
    }

    pub fn request_headers(&self) -> &[String] {
        &self.config.request_headers
    }

    pub fn set_request_headers(&mut self, request_headers: Vec<String>) {
        self.config.request_headers = request_headers;
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.config.user_agent.as_deref()
    }

    pub fn set_user_agent(&mut self, user_agent: Option<&str>) {
        self.config.user_agent = user_agent.map(str::to_string);
    }

    pub fn timeout(&self) -> u64 {
        self.config.timeout_secs
    }

    pub fn set_timeout(&mut self, seconds: u64) {
        self.config.timeout_secs = seconds;
    }

    pub fn user(&self) -> Option<&str> {
        self.config.user.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.config.password.as_deref()
    }

    pub fn set_credentials(&mut self, user: Option<&str>, password: Option<&str>) {
        self.config.user = user.map(str::to_string);
        self.config.password = password.map(str::to_string);
    }

    pub fn compatibility_mode(&self) -> bool {
        self.config.compatibility_mode
    }

    pub fn set_compatibility_mode(&mut self, enabled: bool) {
        self.config.compatibility_mode = enabled;
    }

    pub fn status_code_message(code: u16) -> &'static str {
        status_code_message(code)
    }

    /// Describe the wire request for `verb` on `resource_path`.
    ///
    /// Fails with `InvalidArgument` when either verb name is not one of the
    /// five supported verbs.
    pub fn build_request(
        &self,
        resource_path: &str,
        params: Option<&Payload>,
        verb: &str,
        overriding: Option<&str>,
    ) -> Result<HttpRequest, ClientError> {
        let (method, override_verb) =
            resolve_verbs(verb, overriding, self.config.compatibility_mode)?;

        let mut headers = Vec::new();
        if let Some((user, password)) = self.config.credentials() {
            let token = BASE64.encode(format!("{user}:{password}"));
            headers.push(("Authorization".to_string(), format!("Basic {token}")));
        }
        headers.extend(self.config.parsed_headers());
        if let Some(override_verb) = override_verb {
            headers.push((METHOD_OVERRIDE_HEADER.to_string(), override_verb.to_string()));
        }
        if let Some(user_agent) = &self.config.user_agent {
            headers.push(("User-Agent".to_string(), user_agent.clone()));
        }

        let body = match method {
            Verb::Get => None,
            Verb::Post => params.map(encode_post),
            Verb::Put | Verb::Delete | Verb::Patch => params.map(format_data),
        };

        let has_content_type = headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("Content-Type"));
        if body.is_some() && params.is_some_and(Payload::is_fields) && !has_content_type {
            headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
        }

        Ok(HttpRequest {
            method,
            url: format!("{}{}", self.config.service_url, resource_path),
            headers,
            body,
        })
    }

    /// Execute a request and return its outcome without touching the
    /// last-response state.
    pub fn send(
        &self,
        resource_path: &str,
        params: Option<&Payload>,
        verb: Verb,
        overriding: Option<Verb>,
    ) -> Result<Response, ClientError> {
        self.send_named(resource_path, params, verb.as_str(), overriding.map(Verb::as_str))
    }

    /// Like `send`, with verbs given by name.
    pub fn send_named(
        &self,
        resource_path: &str,
        params: Option<&Payload>,
        verb: &str,
        overriding: Option<&str>,
    ) -> Result<Response, ClientError> {
        let request = self.build_request(resource_path, params, verb, overriding)?;
        Ok(self.execute(&request))
    }

    fn execute(&self, request: &HttpRequest) -> Response {
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            override_verb = request.header(METHOD_OVERRIDE_HEADER),
            "dispatching request"
        );
        match self.transport.send(request, self.config.timeout()) {
            Ok(raw) => {
                let response = Response::from_raw(raw);
                tracing::debug!(
                    status = response.status(),
                    error = response.error(),
                    "request completed"
                );
                response
            }
            Err(err) => {
                tracing::warn!(url = %request.url, error = %err, "transport failure");
                Response::transport_failure(&err)
            }
        }
    }

    /// Issue a request and keep its outcome as the last response.
    ///
    /// Returns `Ok(true)` when a body arrived with a 2xx status and
    /// `Ok(false)` for transport failures and other statuses; inspect
    /// `last_error` for the reason. `Err` is reserved for invalid verbs, in
    /// which case nothing is sent.
    pub fn request(
        &mut self,
        resource_path: &str,
        params: Option<&Payload>,
        verb: Verb,
        overriding: Option<Verb>,
    ) -> Result<bool, ClientError> {
        self.request_named(resource_path, params, verb.as_str(), overriding.map(Verb::as_str))
    }

    /// Like `request`, with verbs given by name.
    pub fn request_named(
        &mut self,
        resource_path: &str,
        params: Option<&Payload>,
        verb: &str,
        overriding: Option<&str>,
    ) -> Result<bool, ClientError> {
        self.flush_last_response();
        let response = self.send_named(resource_path, params, verb, overriding)?;
        let success = response.is_success();
        self.last = Some(response);
        Ok(success)
    }

    pub fn flush_last_response(&mut self) {
        self.last = None;
    }

    pub fn last_response(&self) -> Option<&Response> {
        self.last.as_ref()
    }

    pub fn response_header(&self) -> Option<&str> {
        self.last.as_ref().and_then(Response::header)
    }

    pub fn response_body(&self) -> Option<&[u8]> {
        self.last.as_ref().and_then(Response::body)
    }

    pub fn response_text(&self) -> Option<Cow<'_, str>> {
        self.last.as_ref().and_then(Response::text)
    }

    pub fn response_info(&self) -> Option<&ResponseInfo> {
        self.last.as_ref().and_then(Response::info)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last.as_ref().map(Response::error)
    }

    pub fn last_status_code(&self) -> Option<u16> {
        self.last.as_ref().and_then(Response::status)
    }

    /// Time limit handed to the transport, `None` when the timeout is `0`.
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.config.timeout()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::error::TransportError;
    use crate::http::RawResponse;

    /// Records every request and replies with a canned outcome.
    #[derive(Clone, Default)]
    struct Recorder {
        sent: Arc<Mutex<Vec<HttpRequest>>>,
        reply: Arc<Mutex<Option<Result<RawResponse, TransportError>>>>,
        timeouts: Arc<Mutex<Vec<Option<Duration>>>>,
    }

    impl Recorder {
        fn replying(status: u16, body: &str) -> Self {
            let recorder = Recorder::default();
            recorder.set_reply(status, body);
            recorder
        }

        fn set_reply(&self, status: u16, body: &str) {
            let head = format!("HTTP/1.1 {status} {}\r\n\r\n", status_code_message(status));
            let mut raw = head.clone().into_bytes();
            raw.extend_from_slice(body.as_bytes());
            *self.reply.lock().unwrap() = Some(Ok(RawResponse {
                status,
                effective_url: "https://api.example.com/items/1".to_string(),
                header_size: head.len(),
                raw,
            }));
        }

        fn fail_with(&self, message: &str) {
            *self.reply.lock().unwrap() = Some(Err(TransportError(message.to_string())));
        }

        fn sent(&self) -> Vec<HttpRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for Recorder {
        fn send(&self, request: &HttpRequest, timeout: Option<Duration>) -> Result<RawResponse, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            self.timeouts.lock().unwrap().push(timeout);
            self.reply
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(TransportError("no reply configured".to_string())))
        }
    }

    fn client_with(recorder: &Recorder) -> Client {
        Client::with_transport(
            ClientConfig::new("https://api.example.com/", Vec::new(), None, None),
            recorder.clone(),
        )
    }

    #[test]
    fn compatibility_mode_turns_verbs_into_post_override() {
        for verb in [Verb::Put, Verb::Delete, Verb::Patch] {
            let recorder = Recorder::replying(200, "{}");
            let mut client = client_with(&recorder);
            client.set_compatibility_mode(true);

            assert!(client.request("items/1", None, verb, None).unwrap());

            let sent = recorder.sent();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].method, Verb::Post);
            assert_eq!(sent[0].header(METHOD_OVERRIDE_HEADER), Some(verb.as_str()));
        }
    }

    #[test]
    fn compatibility_mode_leaves_get_and_post_alone() {
        let recorder = Recorder::replying(200, "{}");
        let mut client = client_with(&recorder);
        client.set_compatibility_mode(true);

        client.request("items/1", None, Verb::Get, None).unwrap();
        client.request("items", None, Verb::Post, None).unwrap();

        let sent = recorder.sent();
        assert_eq!(sent[0].method, Verb::Get);
        assert_eq!(sent[1].method, Verb::Post);
        assert!(sent.iter().all(|r| r.header(METHOD_OVERRIDE_HEADER).is_none()));
    }

    #[test]
    fn compatibility_mode_replaces_caller_override() {
        let (method, overriding) = resolve_verbs("DELETE", Some("PATCH"), true).unwrap();
        assert_eq!(method, Verb::Post);
        assert_eq!(overriding, Some(Verb::Delete));
    }

    #[test]
    fn explicit_override_forces_post() {
        let recorder = Recorder::replying(200, "{}");
        let mut client = client_with(&recorder);

        client
            .request("items/1", None, Verb::Get, Some(Verb::Put))
            .unwrap();

        let sent = recorder.sent();
        assert_eq!(sent[0].method, Verb::Post);
        assert_eq!(sent[0].header(METHOD_OVERRIDE_HEADER), Some("PUT"));
    }

    #[test]
    fn invalid_verbs_fail_without_network() {
        let recorder = Recorder::replying(200, "{}");
        let mut client = client_with(&recorder);

        let err = client.request_named("items/1", None, "TRACE", None).unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));

        let err = client
            .request_named("items/1", None, "GET", Some("OPTIONS"))
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(ref m) if m.contains("OPTIONS")));

        client.set_compatibility_mode(true);
        let err = client.request_named("items/1", None, "HEAD", None).unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(ref m) if m.contains("override")));

        assert!(recorder.sent().is_empty());
        assert!(client.last_response().is_none());
    }

    #[test]
    fn invalid_call_flushes_previous_state() {
        let recorder = Recorder::replying(200, "{}");
        let mut client = client_with(&recorder);
        client.request("items/1", None, Verb::Get, None).unwrap();
        assert!(client.last_error().is_some());

        client.request_named("items/1", None, "BREW", None).unwrap_err();
        assert!(client.last_error().is_none());
        assert!(client.response_body().is_none());
    }

    #[test]
    fn get_success_exposes_body_and_status() {
        let recorder = Recorder::replying(200, r#"{"id":1}"#);
        let mut client = client_with(&recorder);

        assert!(client.request("items/1", None, Verb::Get, None).unwrap());
        assert_eq!(client.response_body(), Some(br#"{"id":1}"#.as_slice()));
        assert_eq!(client.last_status_code(), Some(200));
        assert_eq!(client.last_error(), Some("No errors"));

        let sent = recorder.sent();
        assert_eq!(sent[0].url, "https://api.example.com/items/1");
        assert!(sent[0].body.is_none());
    }

    #[test]
    fn http_error_returns_false_with_message() {
        let recorder = Recorder::replying(404, "nope");
        let mut client = client_with(&recorder);

        assert!(!client.request("items/1", None, Verb::Get, None).unwrap());
        assert_eq!(
            client.last_error(),
            Some("Error 404 (Not Found) for https://api.example.com/items/1")
        );
        assert!(client.response_header().is_some());
        assert_eq!(client.response_text().as_deref(), Some("nope"));
    }

    #[test]
    fn created_with_body_is_success() {
        let recorder = Recorder::replying(201, r#"{"id":2}"#);
        let mut client = client_with(&recorder);
        let params = Payload::from(json!({"name": "widget"}));
        assert!(client.request("items", Some(&params), Verb::Post, None).unwrap());
    }

    #[test]
    fn transport_failure_records_only_error() {
        let recorder = Recorder::default();
        recorder.fail_with("connection refused");
        let mut client = client_with(&recorder);

        assert!(!client.request("items/1", None, Verb::Get, None).unwrap());
        assert_eq!(client.last_error(), Some("Transport error: connection refused"));
        assert!(client.response_body().is_none());
        assert!(client.response_header().is_none());
        assert!(client.response_info().is_none());
        assert_eq!(client.last_status_code(), None);
    }

    #[test]
    fn failing_then_succeeding_call_reports_only_second() {
        let recorder = Recorder::replying(500, "boom");
        let mut client = client_with(&recorder);

        assert!(!client.request("items/1", None, Verb::Get, None).unwrap());
        assert!(client.last_error().unwrap().starts_with("Error 500"));

        recorder.set_reply(200, r#"{"id":1}"#);
        assert!(client.request("items/1", None, Verb::Get, None).unwrap());
        assert_eq!(client.last_error(), Some("No errors"));
        assert_eq!(client.last_status_code(), Some(200));
    }

    #[test]
    fn basic_auth_needs_both_credentials() {
        let recorder = Recorder::replying(200, "{}");
        let mut client = client_with(&recorder);

        client.set_credentials(Some("alice"), None);
        let req = client.build_request("x", None, "GET", None).unwrap();
        assert!(req.header("Authorization").is_none());

        client.set_credentials(Some("alice"), Some("s3cret"));
        let req = client.build_request("x", None, "GET", None).unwrap();
        assert_eq!(req.header("Authorization"), Some("Basic YWxpY2U6czNjcmV0"));
    }

    #[test]
    fn configured_headers_and_user_agent_are_sent() {
        let recorder = Recorder::replying(200, "{}");
        let mut client = client_with(&recorder);
        client.set_request_headers(vec!["Accept: application/json".to_string()]);
        client.set_user_agent(Some("rest-core-test/1.0"));

        let req = client.build_request("x", None, "GET", None).unwrap();
        assert_eq!(req.header("Accept"), Some("application/json"));
        assert_eq!(req.header("User-Agent"), Some("rest-core-test/1.0"));
    }

    #[test]
    fn post_fields_are_bracket_flattened() {
        let client = client_with(&Recorder::default());
        let params = Payload::from(json!({"message": {"body": "Hello"}}));
        let req = client.build_request("messages", Some(&params), "POST", None).unwrap();
        assert_eq!(req.body.as_deref(), Some(b"message%5Bbody%5D=Hello".as_slice()));
        assert_eq!(req.header("Content-Type"), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn put_and_patch_use_flat_encoding() {
        let client = client_with(&Recorder::default());
        let params = Payload::from(json!({"name": "a b", "qty": 3}));
        for verb in ["PUT", "PATCH"] {
            let req = client.build_request("items/1", Some(&params), verb, None).unwrap();
            assert_eq!(req.body.as_deref(), Some(b"name=a+b&qty=3".as_slice()));
        }
    }

    #[test]
    fn raw_payload_keeps_configured_content_type() {
        let mut client = client_with(&Recorder::default());
        client.set_request_headers(vec!["Content-Type: application/json".to_string()]);
        let params = Payload::from(r#"{"id":1}"#);
        let req = client.build_request("items/1", Some(&params), "PUT", None).unwrap();
        assert_eq!(req.body.as_deref(), Some(br#"{"id":1}"#.as_slice()));
        let content_types: Vec<_> = req
            .headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
    }

    #[test]
    fn delete_body_only_with_params() {
        let client = client_with(&Recorder::default());
        let bare = client.build_request("items/1", None, "DELETE", None).unwrap();
        assert_eq!(bare.method, Verb::Delete);
        assert!(bare.body.is_none());

        let params = Payload::from(json!({"reason": "dup"}));
        let with_body = client.build_request("items/1", Some(&params), "DELETE", None).unwrap();
        assert_eq!(with_body.method, Verb::Delete);
        assert_eq!(with_body.body.as_deref(), Some(b"reason=dup".as_slice()));
    }

    #[test]
    fn get_ignores_params() {
        let client = client_with(&Recorder::default());
        let params = Payload::from(json!({"q": "x"}));
        let req = client.build_request("items", Some(&params), "GET", None).unwrap();
        assert!(req.body.is_none());
        assert!(req.header("Content-Type").is_none());
    }

    #[test]
    fn timeout_reaches_transport_and_zero_disables_it() {
        let recorder = Recorder::replying(200, "{}");
        let mut client = client_with(&recorder);

        client.set_timeout(30);
        client.request("items/1", None, Verb::Get, None).unwrap();
        client.set_timeout(0);
        client.request("items/1", None, Verb::Get, None).unwrap();

        assert_eq!(
            *recorder.timeouts.lock().unwrap(),
            vec![Some(Duration::from_secs(30)), None]
        );
    }

    #[test]
    fn accessors_round_trip() {
        let mut client = Client::new("https://a/", vec!["A: b".to_string()], Some("u"), Some("p"));
        assert_eq!(client.service_url(), "https://a/");
        assert_eq!(client.request_headers(), ["A: b".to_string()]);
        assert_eq!(client.user(), Some("u"));
        assert_eq!(client.password(), Some("p"));
        assert_eq!(client.timeout(), 900);

        client.set_service_url("https://b/");
        client.set_timeout(5);
        assert_eq!(client.service_url(), "https://b/");
        assert_eq!(client.timeout_duration(), Some(Duration::from_secs(5)));
        assert!(!client.compatibility_mode());
        assert_eq!(Client::status_code_message(404), "Not Found");
    }
}
