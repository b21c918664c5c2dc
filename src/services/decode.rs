//! Tolerant decoding of webhook response bodies
//!
//! The backend does not use one response shape. List endpoints have been seen
//! returning any of:
//!
//! - an object whose values are JSON-encoded strings (`{"inst:1": "{\"id\":...}"}`)
//! - an object with a named array field (`{"groups": [...], "total": 3}`)
//! - an object whose keys carry a kind prefix (`{"template:1": {...}}`)
//! - a bare array
//!
//! None of these is treated as authoritative; every decoder accepts all of them
//! and skips individual records that fail to parse.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::Group;
use crate::utils::errors::{WebhookError, WebhookResult};
use crate::utils::helpers::truncate_text;

/// Mutation acknowledgement returned by group endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub invite_link: Option<String>,
}

/// Decode a list of records from any of the known list shapes
///
/// `field` names the array property used by the wrapped shape; `key_prefix`,
/// when given, restricts the keyed-object shape to keys carrying that prefix
/// if any key does.
pub fn decode_records<T: DeserializeOwned>(body: &Value, field: &str, key_prefix: Option<&str>) -> Vec<T> {
    match body {
        Value::Array(items) => decode_items(items.iter(), field),
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get(field) {
                return decode_items(items.iter(), field);
            }

            if let Some(prefix) = key_prefix {
                if map.keys().any(|key| key.starts_with(prefix)) {
                    let prefixed = map
                        .iter()
                        .filter(|(key, _)| key.starts_with(prefix))
                        .map(|(_, value)| value);
                    return decode_items(prefixed, field);
                }
            }

            decode_items(map.values(), field)
        }
        Value::Null => Vec::new(),
        other => {
            warn!(kind = field, body = %truncate_text(&other.to_string(), 200), "Unexpected list response shape");
            Vec::new()
        }
    }
}

fn decode_items<'a, T, I>(items: I, kind: &str) -> Vec<T>
where
    T: DeserializeOwned,
    I: Iterator<Item = &'a Value>,
{
    items
        .filter_map(|item| match decode_item(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(kind = kind, error = %e, "Skipping undecodable record");
                None
            }
        })
        .collect()
}

fn decode_item<T: DeserializeOwned>(item: &Value) -> serde_json::Result<T> {
    match item {
        Value::String(encoded) => serde_json::from_str(encoded),
        other => T::deserialize(other),
    }
}

/// Decode a group listing, which must be a `groups` array or a bare array
pub fn decode_groups(body: &Value) -> WebhookResult<Vec<Group>> {
    let items = match body {
        Value::Object(map) => match map.get("groups") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(WebhookError::InvalidResponse(
                    "group listing without a 'groups' array".to_string(),
                ))
            }
        },
        Value::Array(items) => items,
        _ => {
            return Err(WebhookError::InvalidResponse(
                "group listing is neither an object nor an array".to_string(),
            ))
        }
    };

    let groups: Vec<Group> = decode_items(items.iter(), "groups");
    debug!(received = items.len(), decoded = groups.len(), "Decoded group listing");
    Ok(groups)
}

/// Require `success: true` in a mutation acknowledgement
pub fn require_success(body: &Value, fallback: &str) -> WebhookResult<Ack> {
    let ack = Ack::deserialize(body).unwrap_or_default();
    if ack.success {
        Ok(ack)
    } else {
        Err(WebhookError::Rejected {
            status: 200,
            message: ack.message.unwrap_or_else(|| fallback.to_string()),
        })
    }
}

/// Best-effort error message from a failed response body
///
/// Prefers a JSON `message` field, then the raw text, then the status line.
pub fn extract_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    match from_json {
        Some(message) if !message.is_empty() => message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status.to_string(),
    }
}
