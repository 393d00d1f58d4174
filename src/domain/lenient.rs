//! Tolerant field decoders for untrusted feed JSON.
//!
//! Every numeric field from either provider may be missing, `null`, a string,
//! or some other unexpected JSON type. These helpers collapse all of those to
//! `None` (or `Default`) so that one odd field never discards a whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a finite JSON number; anything else becomes `None`.
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number))
}

/// Decode a non-negative integral JSON number; anything else becomes `None`.
pub fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| {
        v.as_u64().or_else(|| {
            let f = v.as_f64()?;
            (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
        })
    }))
}

/// Decode a JSON string; anything else becomes `None`.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Decode an array of strings, dropping non-string entries.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Decode a nested structure, falling back to `T::default()` when it is
/// missing or does not have the expected shape.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

fn number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::opt_f64")]
        rate: Option<f64>,
        #[serde(default, deserialize_with = "super::opt_u64")]
        count: Option<u64>,
        #[serde(default, deserialize_with = "super::opt_string")]
        name: Option<String>,
        #[serde(default, deserialize_with = "super::string_list")]
        tags: Vec<String>,
    }

    fn probe(json: &str) -> Probe {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn numbers_pass_through() {
        let p = probe(r#"{"rate": 0.25, "count": 7, "name": "x", "tags": ["a", "b"]}"#);
        assert_eq!(p.rate, Some(0.25));
        assert_eq!(p.count, Some(7));
        assert_eq!(p.name.as_deref(), Some("x"));
        assert_eq!(p.tags, vec!["a", "b"]);
    }

    #[test]
    fn zero_is_a_value_not_missing() {
        let p = probe(r#"{"rate": 0, "count": 0}"#);
        assert_eq!(p.rate, Some(0.0));
        assert_eq!(p.count, Some(0));
    }

    #[test]
    fn wrong_types_become_none() {
        let p = probe(r#"{"rate": "0.25", "count": -3, "name": 12, "tags": "nope"}"#);
        assert_eq!(p.rate, None);
        assert_eq!(p.count, None);
        assert_eq!(p.name, None);
        assert!(p.tags.is_empty());
    }

    #[test]
    fn missing_and_null_become_none() {
        let p = probe(r#"{"rate": null}"#);
        assert_eq!(p.rate, None);
        assert_eq!(p.count, None);
        assert_eq!(p.name, None);
    }

    #[test]
    fn integral_float_counts_are_accepted() {
        let p = probe(r#"{"count": 12.0}"#);
        assert_eq!(p.count, Some(12));
        let p = probe(r#"{"count": 12.5}"#);
        assert_eq!(p.count, None);
    }

    #[test]
    fn non_string_list_entries_are_dropped() {
        let p = probe(r#"{"tags": ["RTX 3070", 5, null, "RTX 3070 LHR"]}"#);
        assert_eq!(p.tags, vec!["RTX 3070", "RTX 3070 LHR"]);
    }
}
