//! Match diagnostics for a pair of feeds.
//!
//! The merger silently applies first-match-wins and never reports misses.
//! This module computes the same key lookups separately so a debug bundle or
//! run summary can show what did not line up. It never changes merge output.

use std::collections::{HashMap, HashSet};

use crate::domain::{Named, RawDeviceRecord, RawMarketRecord};
use crate::normalize::attach_keys;

/// Several source-B records sharing one canonical key (only the first is used).
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCollision {
    pub key: String,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchDiagnostics {
    pub primary_total: usize,
    pub matched: usize,
    /// Source-A keys with no source-B counterpart (first-seen order, deduplicated).
    pub unmatched_primary: Vec<String>,
    /// Source-B keys no source-A record asked for (first-seen order, deduplicated).
    pub unused_secondary: Vec<String>,
    pub collisions: Vec<KeyCollision>,
}

impl MatchDiagnostics {
    /// Fraction of source-A rows whose key exists in source B, in `[0, 1]`.
    ///
    /// A keyed match with empty bands still counts, even though it carries no
    /// secondary prices.
    pub fn match_rate(&self) -> f64 {
        if self.primary_total == 0 {
            return 0.0;
        }
        self.matched as f64 / self.primary_total as f64
    }
}

pub fn diagnose(source_a: &[RawDeviceRecord], source_b: &[RawMarketRecord]) -> MatchDiagnostics {
    let keyed_a = attach_keys(source_a);
    let keyed_b = attach_keys(source_b);

    let mut by_key: HashMap<&str, Vec<String>> = HashMap::new();
    let mut b_order: Vec<&str> = Vec::new();
    for entry in &keyed_b {
        let names = by_key.entry(entry.key.as_str()).or_insert_with(|| {
            b_order.push(entry.key.as_str());
            Vec::new()
        });
        names.push(entry.record.name_or_unknown().to_string());
    }

    let mut matched = 0usize;
    let mut requested: HashSet<&str> = HashSet::new();
    let mut unmatched_primary = Vec::new();
    let mut unmatched_seen: HashSet<&str> = HashSet::new();
    for entry in &keyed_a {
        let key = entry.key.as_str();
        requested.insert(key);
        if by_key.contains_key(key) {
            matched += 1;
        } else if unmatched_seen.insert(key) {
            unmatched_primary.push(key.to_string());
        }
    }

    let unused_secondary = b_order
        .iter()
        .filter(|key| !requested.contains(*key))
        .map(|key| key.to_string())
        .collect();

    let collisions = b_order
        .iter()
        .filter_map(|key| {
            let names = &by_key[key];
            (names.len() > 1).then(|| KeyCollision {
                key: key.to_string(),
                names: names.clone(),
            })
        })
        .collect();

    MatchDiagnostics {
        primary_total: keyed_a.len(),
        matched,
        unmatched_primary,
        unused_secondary,
        collisions,
    }
}
