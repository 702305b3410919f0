//! Request payloads and their body encodings.
//!
//! # Design
//! A payload is either a mapping of fields or bytes the caller already
//! serialized. POST bodies expand nested mappings into bracket notation
//! (`message[body]=hi`); PUT, DELETE and PATCH bodies only encode the top
//! level and write nested values as compact JSON.

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Deepest nesting `flatten` expands. Containers found at this depth are
/// emitted as a single JSON-valued pair.
pub const MAX_FLATTEN_DEPTH: usize = 32;

/// Request parameters handed to `Client::request`.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A mapping of fields, possibly nested.
    Fields(Map<String, Value>),
    /// A pre-serialized body (JSON text, XML, bytes) sent verbatim.
    Raw(Vec<u8>),
}

impl From<Map<String, Value>> for Payload {
    fn from(fields: Map<String, Value>) -> Self {
        Payload::Fields(fields)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Payload::Fields(fields),
            Value::String(text) => Payload::Raw(text.into_bytes()),
            other => Payload::Raw(other.to_string().into_bytes()),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Raw(text.as_bytes().to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Raw(text.into_bytes())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Raw(bytes)
    }
}

impl Payload {
    pub fn is_fields(&self) -> bool {
        matches!(self, Payload::Fields(_))
    }
}

/// Flatten nested mappings into bracket-notation keys.
///
/// `{"message": {"body": "hi"}}` becomes `[("message[body]", "hi")]`.
/// Arrays nest like mappings keyed by index. Field order is preserved.
pub fn flatten(fields: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        flatten_into(key.clone(), value, 1, &mut out);
    }
    out
}

fn flatten_into(key: String, value: &Value, depth: usize, out: &mut Vec<(String, Value)>) {
    if depth >= MAX_FLATTEN_DEPTH {
        out.push((key, value.clone()));
        return;
    }
    match value {
        Value::Object(map) => {
            for (child, nested) in map {
                flatten_into(format!("{key}[{child}]"), nested, depth + 1, out);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten_into(format!("{key}[{index}]"), nested, depth + 1, out);
            }
        }
        _ => out.push((key, value.clone())),
    }
}

/// Form text for a single value.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Null => String::new(),
        Value::Number(number) => number.to_string(),
        container => container.to_string(),
    }
}

/// `application/x-www-form-urlencoded` serialization of key/value pairs.
pub fn form_encode<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key.as_ref(), value.as_ref());
    }
    serializer.finish()
}

/// Body for PUT, PATCH and DELETE: top-level fields are form encoded,
/// raw payloads pass through unchanged.
pub fn format_data(payload: &Payload) -> Vec<u8> {
    match payload {
        Payload::Fields(fields) => {
            form_encode(fields.iter().map(|(key, value)| (key, scalar_text(value)))).into_bytes()
        }
        Payload::Raw(bytes) => bytes.clone(),
    }
}

/// Body for POST: nested fields are bracket flattened before form encoding.
pub fn encode_post(payload: &Payload) -> Vec<u8> {
    match payload {
        Payload::Fields(fields) => form_encode(
            flatten(fields)
                .iter()
                .map(|(key, value)| (key.as_str(), scalar_text(value))),
        )
        .into_bytes(),
        Payload::Raw(bytes) => bytes.clone(),
    }
}
