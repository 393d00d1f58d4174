//! Upstream feed access.
//!
//! - `salad`: source A, the GPU demand monitor (JSON array of devices)
//! - `vast`: source B, GPU rental stats (JSON object with a `models` array)
//! - `http`: the blocking HTTP client shared by both feeds
//! - `fetch`: concurrent snapshot of both feeds with a failure policy

use std::fmt;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod fetch;
pub mod http;
pub mod salad;
pub mod vast;

pub use fetch::{FeedSnapshot, SourceReport, SourceStatus, fetch_snapshot};
pub use http::FeedClient;

/// Which upstream provider a record or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Source A: device earnings and utilization.
    Salad,
    /// Source B: rental price bands.
    Vast,
}

impl SourceKind {
    pub fn display_name(self) -> &'static str {
        match self {
            SourceKind::Salad => "Salad",
            SourceKind::Vast => "Vast.ai",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Salad => f.write_str("salad"),
            SourceKind::Vast => f.write_str("vast"),
        }
    }
}

/// Where a feed body comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceInput {
    Url(String),
    /// A saved response body, for offline and reproducible runs.
    File(PathBuf),
}

impl fmt::Display for SourceInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceInput::Url(url) => f.write_str(url),
            SourceInput::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

/// A feed entry that could not be decoded into a record.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub index: usize,
    pub message: String,
}

/// Decoded records of one feed plus the entries that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBatch<T> {
    pub records: Vec<T>,
    pub row_errors: Vec<RowError>,
}

impl<T> Default for SourceBatch<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            row_errors: Vec::new(),
        }
    }
}

/// Decode each array entry independently; bad entries are skipped, not fatal.
pub(crate) fn decode_rows<T: DeserializeOwned>(items: Vec<Value>) -> SourceBatch<T> {
    let mut batch = SourceBatch::default();
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(record) => batch.records.push(record),
            Err(e) => batch.row_errors.push(RowError {
                index,
                message: e.to_string(),
            }),
        }
    }
    batch
}
