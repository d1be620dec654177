//! Upstream error-body normalization
//!
//! The upstream API reports failures in several shapes: `{detail: "..."}`,
//! FastAPI validation arrays `{detail: [{loc, msg}, ...]}`, `{message}`, or
//! plain text. Both the proxy routes and the request client reduce them to
//! one human readable message with the rules in this module.

use serde_json::{Map, Value};

/// Parse a failure body.
///
/// JSON bodies are returned as-is. Anything else is wrapped as
/// `{"message": <raw text>}`; an empty body becomes `{}`.
pub fn parse_error_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Object(Map::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => value,
        Err(_) => {
            let text = String::from_utf8_lossy(bytes).trim().to_string();
            serde_json::json!({ "message": text })
        }
    }
}

/// Join FastAPI-style validation items into one sentence.
///
/// `[{loc: ["body", "name"], msg: "field required"}]` becomes
/// `"body.name: field required"`; several items are separated by `"; "`.
/// Returns `None` when no item carries a `msg`.
pub fn flatten_validation_detail(items: &[Value]) -> Option<String> {
    let parts: Vec<String> = items
        .iter()
        .filter_map(|item| {
            let msg = item.get("msg").and_then(Value::as_str)?;
            let loc = item
                .get("loc")
                .and_then(Value::as_array)
                .map(|loc| {
                    loc.iter()
                        .map(|part| match part {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(".")
                })
                .filter(|loc| !loc.is_empty());

            Some(match loc {
                Some(loc) => format!("{loc}: {msg}"),
                None => msg.to_string(),
            })
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Message carried by an upstream failure body, if any.
///
/// Precedence: `detail` (string, validation array, or object with
/// `msg`/`message`) then `message`.
pub fn upstream_message(body: &Value) -> Option<String> {
    detail_message(body.get("detail")).or_else(|| non_empty_str(body.get("message")))
}

fn detail_message(detail: Option<&Value>) -> Option<String> {
    match detail? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => flatten_validation_detail(items),
        Value::Object(obj) => non_empty_str(obj.get("msg")).or_else(|| non_empty_str(obj.get("message"))),
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
