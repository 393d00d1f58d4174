//! Shared "compare pipeline" logic used by the CLI, the TUI, and the server.
//!
//! fetch both feeds -> merge -> match diagnostics
//!
//! The front-ends then only deal with presentation.

use crate::config::Config;
use crate::data::{FeedSnapshot, fetch_snapshot};
use crate::domain::MergedDevice;
use crate::error::AppError;
use crate::merge::{MatchDiagnostics, diagnose, merge};

/// All computed outputs of a single comparison run.
#[derive(Debug, Clone)]
pub struct CompareOutput {
    pub snapshot: FeedSnapshot,
    pub merged: Vec<MergedDevice>,
    pub diagnostics: MatchDiagnostics,
}

/// Fetch both feeds and merge them.
pub fn run_compare(config: &Config) -> Result<CompareOutput, AppError> {
    let snapshot = fetch_snapshot(config)?;
    Ok(compare_snapshot(snapshot))
}

/// Merge a pre-fetched snapshot.
pub fn compare_snapshot(snapshot: FeedSnapshot) -> CompareOutput {
    let merged = merge(&snapshot.devices, &snapshot.markets);
    let diagnostics = diagnose(&snapshot.devices, &snapshot.markets);
    tracing::info!(
        rows = merged.len(),
        matched = diagnostics.matched,
        unused = diagnostics.unused_secondary.len(),
        collisions = diagnostics.collisions.len(),
        "merged feeds"
    );
    CompareOutput {
        snapshot,
        merged,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    use crate::config::FailurePolicy;
    use crate::data::SourceInput;

    fn feed_file(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{body}").unwrap();
        file
    }

    #[test]
    fn compares_saved_feeds() {
        let salad = feed_file(
            r#"[
                {"name": "NVIDIA GeForce RTX 3070", "utilizationPct": 85,
                 "earningRates": {"avgEarningRate": 0.1}},
                {"name": "NVIDIA GeForce GTX 1660"}
            ]"#,
        );
        let vast = feed_file(
            r#"{"models": [{"name": "RTX 3070", "stats": {"rented": {
                "verified": [{"price_10th_percentile": 0.1, "price_90th_percentile": 0.2, "count": 5}],
                "unverified": []
            }}}]}"#,
        );
        let config = Config {
            salad: SourceInput::File(salad.path().to_path_buf()),
            vast: SourceInput::File(vast.path().to_path_buf()),
            timeout: Duration::from_secs(5),
            policy: FailurePolicy::Strict,
            bind: "127.0.0.1:0".parse().unwrap(),
        };

        let out = run_compare(&config).unwrap();
        assert_eq!(out.merged.len(), 2);
        assert_eq!(out.merged[0].display_name, "RTX 3070");
        let verified = out.merged[0].earning_rates_secondary.verified.as_ref().unwrap();
        assert_eq!(verified.count, Some(5));
        assert!(!out.merged[1].has_secondary());
        assert_eq!(out.diagnostics.matched, 1);
        assert_eq!(out.diagnostics.unmatched_primary, vec!["GTX 1660".to_string()]);
    }
}
