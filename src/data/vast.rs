//! Source B: the vast.ai GPU stats exporter.
//!
//! The feed is a JSON object whose `models` field holds an array of model
//! entries with rented price bands.

use serde_json::Value;

use super::salad::json_type;
use super::{FeedClient, SourceBatch, SourceInput, SourceKind, decode_rows};
use crate::domain::RawMarketRecord;
use crate::error::FetchError;

pub const DEFAULT_URL: &str = "https://500.farm/vastai-exporter/gpu-stats";

/// Fetch and decode the model list.
pub fn fetch_markets(client: &FeedClient, input: &SourceInput) -> Result<SourceBatch<RawMarketRecord>, FetchError> {
    let body = client.read_body(SourceKind::Vast, input)?;
    parse_markets(&body)
}

pub fn parse_markets(body: &str) -> Result<SourceBatch<RawMarketRecord>, FetchError> {
    let value: Value = serde_json::from_str(body).map_err(|e| FetchError::Malformed {
        source_kind: SourceKind::Vast,
        message: e.to_string(),
    })?;

    let mut root = match value {
        Value::Object(root) => root,
        other => {
            return Err(FetchError::UnexpectedShape {
                source_kind: SourceKind::Vast,
                message: format!("expected a JSON object, got {}", json_type(&other)),
            });
        }
    };

    match root.remove("models") {
        Some(Value::Array(models)) => Ok(decode_rows(models)),
        Some(other) => Err(FetchError::UnexpectedShape {
            source_kind: SourceKind::Vast,
            message: format!("`models` should be an array, got {}", json_type(&other)),
        }),
        None => Err(FetchError::UnexpectedShape {
            source_kind: SourceKind::Vast,
            message: "missing `models` field".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_models_field() {
        let body = r#"{"models": [
            {"name": "RTX 3070", "stats": {"rented": {
                "verified": [{"price_10th_percentile": 0.1, "price_90th_percentile": 0.2, "count": 5}],
                "unverified": []
            }}}
        ]}"#;
        let batch = parse_markets(body).unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].stats.rented.verified[0].count, Some(5));
    }

    #[test]
    fn array_body_is_unexpected_shape() {
        let err = parse_markets("[]").unwrap_err();
        assert_eq!(err.class(), "shape");
    }

    #[test]
    fn missing_or_wrong_models_field_is_unexpected_shape() {
        assert!(parse_markets("{}").unwrap_err().to_string().contains("missing `models`"));
        assert!(parse_markets(r#"{"models": {}}"#).unwrap_err().to_string().contains("an object"));
    }

    #[test]
    fn truncated_body_is_malformed() {
        let err = parse_markets(r#"{"models": [{"name": "RTX"#).unwrap_err();
        assert_eq!(err.class(), "malformed");
    }
}
