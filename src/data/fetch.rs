//! Concurrent snapshot of both feeds.
//!
//! Both requests run at the same time (`rayon::join`), each bounded by the
//! configured timeout. The failure policy is applied here, uniformly to both
//! sources: `degrade` swaps a failed feed for an empty list, `strict` aborts.

use std::time::Instant;

use chrono::{DateTime, Utc};

use super::{FeedClient, SourceBatch, SourceInput, SourceKind, salad, vast};
use crate::config::{Config, FailurePolicy};
use crate::domain::{RawDeviceRecord, RawMarketRecord};
use crate::error::{AppError, FetchError};

#[derive(Debug, Clone, PartialEq)]
pub enum SourceStatus {
    Ok,
    /// The feed failed and was replaced by an empty list.
    Degraded(FetchError),
}

/// Outcome of loading one feed.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceReport {
    pub kind: SourceKind,
    pub origin: String,
    pub status: SourceStatus,
    pub records: usize,
    pub skipped_rows: usize,
    pub elapsed_ms: u64,
}

impl SourceReport {
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, SourceStatus::Degraded(_))
    }

    pub fn status_label(&self) -> String {
        match &self.status {
            SourceStatus::Ok => "ok".to_string(),
            SourceStatus::Degraded(err) => format!("degraded ({})", err.class()),
        }
    }
}

/// Raw inputs of one comparison run.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub devices: Vec<RawDeviceRecord>,
    pub markets: Vec<RawMarketRecord>,
    pub salad: SourceReport,
    pub vast: SourceReport,
}

/// Fetch both feeds concurrently and apply the failure policy.
pub fn fetch_snapshot(config: &Config) -> Result<FeedSnapshot, AppError> {
    let client = FeedClient::new(config.timeout)?;
    let fetched_at = Utc::now();

    let (salad_result, vast_result) = rayon::join(
        || timed(|| salad::fetch_devices(&client, &config.salad)),
        || timed(|| vast::fetch_markets(&client, &config.vast)),
    );

    let (devices, salad) = settle(SourceKind::Salad, &config.salad, salad_result, config.policy)?;
    let (markets, vast) = settle(SourceKind::Vast, &config.vast, vast_result, config.policy)?;

    Ok(FeedSnapshot {
        fetched_at,
        devices,
        markets,
        salad,
        vast,
    })
}

type Timed<T> = (Result<SourceBatch<T>, FetchError>, u64);

fn timed<T>(f: impl FnOnce() -> Result<SourceBatch<T>, FetchError>) -> Timed<T> {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed().as_millis() as u64)
}

/// Turn one feed result into records + report, honoring the policy.
pub(crate) fn settle<T>(
    kind: SourceKind,
    input: &SourceInput,
    (result, elapsed_ms): Timed<T>,
    policy: FailurePolicy,
) -> Result<(Vec<T>, SourceReport), AppError> {
    match result {
        Ok(batch) => {
            for row in &batch.row_errors {
                tracing::debug!(source = %kind, index = row.index, error = %row.message, "skipped feed entry");
            }
            if !batch.row_errors.is_empty() {
                tracing::warn!(source = %kind, skipped = batch.row_errors.len(), "feed contained undecodable entries");
            }
            tracing::info!(source = %kind, records = batch.records.len(), elapsed_ms, "feed loaded");

            let report = SourceReport {
                kind,
                origin: input.to_string(),
                status: SourceStatus::Ok,
                records: batch.records.len(),
                skipped_rows: batch.row_errors.len(),
                elapsed_ms,
            };
            Ok((batch.records, report))
        }
        Err(err) => match policy {
            FailurePolicy::Strict => {
                tracing::error!(source = %kind, class = err.class(), error = %err, "feed failed");
                Err(err.into())
            }
            FailurePolicy::Degrade => {
                tracing::warn!(source = %kind, class = err.class(), error = %err, "feed failed; using empty list");
                let report = SourceReport {
                    kind,
                    origin: input.to_string(),
                    status: SourceStatus::Degraded(err),
                    records: 0,
                    skipped_rows: 0,
                    elapsed_ms,
                };
                Ok((Vec::new(), report))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn feed_file(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{body}").unwrap();
        file
    }

    fn config(salad: &tempfile::NamedTempFile, vast: &tempfile::NamedTempFile, policy: FailurePolicy) -> Config {
        Config {
            salad: SourceInput::File(salad.path().to_path_buf()),
            vast: SourceInput::File(vast.path().to_path_buf()),
            timeout: Duration::from_secs(5),
            policy,
            bind: "127.0.0.1:0".parse().unwrap(),
        }
    }

    fn timeout_error() -> FetchError {
        FetchError::Timeout {
            source_kind: SourceKind::Vast,
            timeout_secs: 5,
        }
    }

    #[test]
    fn snapshot_from_files() {
        let salad = feed_file(r#"[{"name": "NVIDIA GeForce RTX 3070"}, 7]"#);
        let vast = feed_file(r#"{"models": [{"name": "RTX 3070"}]}"#);

        let snapshot = fetch_snapshot(&config(&salad, &vast, FailurePolicy::Strict)).unwrap();
        assert_eq!(snapshot.devices.len(), 1);
        assert_eq!(snapshot.markets.len(), 1);
        assert_eq!(snapshot.salad.status, SourceStatus::Ok);
        assert_eq!(snapshot.salad.skipped_rows, 1);
        assert!(snapshot.salad.origin.starts_with("file:"));
    }

    #[test]
    fn degrade_policy_replaces_failed_feed_with_empty_list() {
        let salad = feed_file(r#"[{"name": "RTX 3070"}]"#);
        let vast = feed_file("[]");

        let snapshot = fetch_snapshot(&config(&salad, &vast, FailurePolicy::Degrade)).unwrap();
        assert_eq!(snapshot.devices.len(), 1);
        assert!(snapshot.markets.is_empty());
        assert!(snapshot.vast.is_degraded());
        assert_eq!(snapshot.vast.status_label(), "degraded (shape)");
    }

    #[test]
    fn strict_policy_aborts_on_any_failure() {
        let salad = feed_file("not json");
        let vast = feed_file(r#"{"models": []}"#);

        let err = fetch_snapshot(&config(&salad, &vast, FailurePolicy::Strict)).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_UPSTREAM);
        assert!(err.to_string().starts_with("salad: malformed JSON"));
    }

    #[test]
    fn settle_keeps_elapsed_time_for_degraded_sources() {
        let input = SourceInput::Url("http://example.invalid".to_string());
        let (records, report) =
            settle::<RawMarketRecord>(SourceKind::Vast, &input, (Err(timeout_error()), 5001), FailurePolicy::Degrade)
                .unwrap();
        assert!(records.is_empty());
        assert_eq!(report.elapsed_ms, 5001);
        assert_eq!(report.status, SourceStatus::Degraded(timeout_error()));
    }
}
