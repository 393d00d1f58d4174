//! Attach canonical keys to record lists.

use crate::domain::Named;

use super::canonical_key;

/// A borrowed record paired with its canonical key.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<'a, T> {
    pub key: String,
    pub record: &'a T,
}

/// Compute the canonical key of every record, preserving input order.
pub fn attach_keys<T: Named>(records: &[T]) -> Vec<Keyed<'_, T>> {
    records
        .iter()
        .map(|record| Keyed {
            key: canonical_key(record.name_or_unknown()),
            record,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RawDeviceRecord, RawMarketRecord};

    #[test]
    fn keys_follow_input_order() {
        let records = vec![
            RawMarketRecord {
                name: Some("RTX 4090".to_string()),
                ..Default::default()
            },
            RawMarketRecord {
                name: Some("NVIDIA GeForce RTX 3070".to_string()),
                ..Default::default()
            },
        ];
        let keyed = attach_keys(&records);
        let keys: Vec<&str> = keyed.iter().map(|k| k.key.as_str()).collect();
        assert_eq!(keys, vec!["RTX 4090", "RTX 3070"]);
        assert!(std::ptr::eq(keyed[1].record, &records[1]));
    }

    #[test]
    fn missing_names_use_the_unknown_sentinel() {
        let records = vec![RawDeviceRecord::default()];
        let keyed = attach_keys(&records);
        assert_eq!(keyed[0].key, "Unknown");
    }
}
