use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Size of the `/big` body, larger than ureq's default read limit.
pub const BIG_BODY_LEN: usize = 11 * 1024 * 1024;

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(3);

/// What the fallback route saw of a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    #[serde(rename = "override")]
    pub override_verb: Option<String>,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/items/{id}", get(get_item))
        .route("/status/{code}", any(status))
        .route("/redirect/{id}", get(redirect))
        .route("/big", get(big))
        .route("/slow", get(slow))
        .fallback(echo)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn get_item(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    let id: u64 = id.parse().map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(Json(json!({ "id": id })))
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) if status.as_u16() >= 200 => (status, format!("status {code}")).into_response(),
        _ => (StatusCode::BAD_REQUEST, "unsupported status").into_response(),
    }
}

async fn redirect(Path(id): Path<String>) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, format!("/items/{id}"))]).into_response()
}

async fn big() -> Vec<u8> {
    vec![b'x'; BIG_BODY_LEN]
}

async fn slow() -> &'static str {
    tokio::time::sleep(SLOW_DELAY).await;
    "finally"
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let lookup = |name: &str| {
        headers
            .get(name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
    };
    let echo = Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        override_verb: lookup("x-http-method-override"),
        content_type: lookup("content-type"),
        authorization: lookup("authorization"),
        user_agent: lookup("user-agent"),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    tracing::debug!(method = %echo.method, path = %echo.path, "echoing request");
    Json(echo)
}
