//! Source A: the Salad GPU demand monitor.
//!
//! The feed is a JSON array of device objects. Anything else (an object, an
//! error page, a bare string) is an unexpected shape.

use serde_json::Value;

use super::{FeedClient, SourceBatch, SourceInput, SourceKind, decode_rows};
use crate::domain::RawDeviceRecord;
use crate::error::FetchError;

pub const DEFAULT_URL: &str = "https://app-api.salad.com/api/v2/demand-monitor/gpu";

/// Fetch and decode the device list.
pub fn fetch_devices(client: &FeedClient, input: &SourceInput) -> Result<SourceBatch<RawDeviceRecord>, FetchError> {
    let body = client.read_body(SourceKind::Salad, input)?;
    parse_devices(&body)
}

/// Fetch the feed and return it as received (after shape validation).
pub fn fetch_raw(client: &FeedClient, input: &SourceInput) -> Result<Value, FetchError> {
    let body = client.read_body(SourceKind::Salad, input)?;
    Ok(Value::Array(device_array(&body)?))
}

pub fn parse_devices(body: &str) -> Result<SourceBatch<RawDeviceRecord>, FetchError> {
    Ok(decode_rows(device_array(body)?))
}

fn device_array(body: &str) -> Result<Vec<Value>, FetchError> {
    let value: Value = serde_json::from_str(body).map_err(|e| FetchError::Malformed {
        source_kind: SourceKind::Salad,
        message: e.to_string(),
    })?;

    match value {
        Value::Array(items) => Ok(items),
        other => Err(FetchError::UnexpectedShape {
            source_kind: SourceKind::Salad,
            message: format!("expected a JSON array, got {}", json_type(&other)),
        }),
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
