use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::Error;

const ENVELOPE_KEYS: &[&str] = &["success", "data"];

/// Response envelope used by every backend endpoint:
/// `{ "success": bool, "data": ..., "message": "...", "errors": ... }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    data: JsonValue,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<JsonValue>,
}

fn default_success() -> bool {
    true
}

/// Extracts `data` from a response body.
///
/// Bodies that are not envelopes (no `success`/`data` key at the top level)
/// are taken as the payload itself. An empty body reads as `null`.
///
/// # Errors
///
/// Returns [`Error::Business`] when `success` is `false`, or
/// [`Error::Decode`] when the payload does not match `T`.
pub fn unwrap_data<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(JsonValue::Null)?);
    }

    let value: JsonValue = serde_json::from_slice(body)?;
    let is_envelope = value
        .as_object()
        .is_some_and(|obj| ENVELOPE_KEYS.iter().any(|k| obj.contains_key(*k)));
    if !is_envelope {
        return Ok(serde_json::from_value(value)?);
    }

    let envelope: Envelope = serde_json::from_value(value)?;
    if !envelope.success {
        return Err(Error::Business {
            message: business_message(envelope.message, envelope.errors.as_ref()),
        });
    }
    Ok(serde_json::from_value(envelope.data)?)
}

fn business_message(message: Option<String>, errors: Option<&JsonValue>) -> String {
    if let Some(message) = message.filter(|m| !m.is_empty()) {
        return message;
    }
    let mut details = Vec::new();
    collect_strings(errors.unwrap_or(&JsonValue::Null), &mut details);
    if details.is_empty() {
        "Request failed".into()
    } else {
        details.join("; ")
    }
}

// `errors` is a string list or a field -> list map depending on the endpoint.
fn collect_strings(value: &JsonValue, out: &mut Vec<String>) {
    match value {
        JsonValue::String(s) => out.push(s.clone()),
        JsonValue::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        JsonValue::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}
