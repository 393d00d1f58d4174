//! Plain-text terminal output for the line-oriented commands.

use crate::data::{FeedSnapshot, SourceReport, SourceStatus};
use crate::domain::MergedDevice;
use crate::merge::MatchDiagnostics;
use crate::view::{
    HOURS_PER_DAY, SortColumn as C, SortState, estimate_earnings, format_band_counted, format_price, format_range,
    format_rate, format_rate_range,
};

/// Format the run summary (feed status, record counts, match rate).
pub fn format_run_summary(snapshot: &FeedSnapshot, diagnostics: &MatchDiagnostics) -> String {
    let mut out = String::new();

    out.push_str("=== gpuc - GPU earnings vs rental prices ===\n");
    out.push_str(&format!(
        "Fetched: {}\n",
        snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out.push_str("\nSources:\n");
    for report in [&snapshot.salad, &snapshot.vast] {
        out.push_str(&format_source_line(report));
        out.push('\n');
    }

    out.push_str(&format!(
        "\nMatched: {}/{} ({:.1}%) | unused rental models: {} | key collisions: {}\n",
        diagnostics.matched,
        diagnostics.primary_total,
        diagnostics.match_rate() * 100.0,
        diagnostics.unused_secondary.len(),
        diagnostics.collisions.len(),
    ));

    out
}

fn format_source_line(report: &SourceReport) -> String {
    let mut line = format!(
        "- {:<8} {:<18} records={:<4} skipped={:<3} {}ms",
        report.kind.display_name(),
        report.status_label(),
        report.records,
        report.skipped_rows,
        report.elapsed_ms,
    );
    if let SourceStatus::Degraded(err) = &report.status {
        line.push_str(&format!("\n    {err}"));
    }
    line
}

/// Format the comparison table. The active sort column is marked in the header.
pub fn format_table(rows: &[MergedDevice], sort: SortState) -> String {
    let mut out = String::new();

    let header = |label: &str, column: C| {
        if sort.column == column {
            format!("{label} {}", sort.direction.arrow())
        } else {
            label.to_string()
        }
    };
    out.push_str(
        format!(
            "{:<24} {:>7} {:<13} {:>9} {:>8} {:>9} {:<21} {:<21}",
            header("GPU", C::Name),
            header("RAM", C::Ram),
            header("Demand", C::Demand),
            header("Hourly", C::HourlyRate),
            "Top 25%",
            header("Daily", C::DailyRate),
            header("Vast Unverified", C::VastUnverified),
            header("Vast Verified", C::VastVerified),
        )
        .trim_end(),
    );
    out.push('\n');

    out.push_str(
        format!(
            "{:-<24} {:-<7} {:-<13} {:-<9} {:-<8} {:-<9} {:-<21} {:-<21}",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for d in rows {
        let rates = &d.earning_rates_primary;
        let avg = rates.avg_earning_rate;
        let secondary = &d.earning_rates_secondary;
        out.push_str(
            format!(
                "{:<24} {:>7} {:<13} {:>9} {:>8} {:>9} {:<21} {:<21}",
                truncate(&d.display_name, 24),
                fmt_ram(d.recommended_specs.ram_gb),
                fmt_demand(d),
                format_rate(avg),
                format_rate(rates.top25_pct_earning_rate),
                format_price(avg.map(|v| v * HOURS_PER_DAY)),
                format_band_counted(secondary.unverified.as_ref()),
                format_band_counted(secondary.verified.as_ref()),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if rows.is_empty() {
        out.push_str("(no GPUs)\n");
    }

    out
}

/// Format earnings projections for quick-search hits.
pub fn format_estimates(hits: &[&MergedDevice]) -> String {
    let mut out = String::new();
    for d in hits {
        let est = estimate_earnings(d);
        let secondary = &d.earning_rates_secondary;
        out.push_str(&format!("{}\n", d.display_name));
        out.push_str(&format!(
            "  hourly: {} avg, {}\n",
            format_rate(est.average_hourly),
            format_rate_range(est.hourly)
        ));
        out.push_str(&format!("  daily : {}\n", format_range(est.daily)));
        out.push_str(&format!("  weekly: {}\n", format_range(est.weekly)));
        out.push_str(&format!(
            "  top 25%: {}/hr, {}/day\n",
            format_rate(est.top25_hourly),
            format_price(est.top25_daily)
        ));
        out.push_str(&format!(
            "  vast unverified: {}\n",
            format_band_counted(secondary.unverified.as_ref())
        ));
        out.push_str(&format!(
            "  vast verified  : {}\n",
            format_band_counted(secondary.verified.as_ref())
        ));
    }
    if hits.is_empty() {
        out.push_str("No matching GPUs (search terms need at least 3 characters).\n");
    }
    out
}

fn fmt_ram(ram_gb: Option<f64>) -> String {
    match ram_gb {
        Some(v) => format!("{v:.0}GB"),
        None => "-".to_string(),
    }
}

fn fmt_demand(d: &MergedDevice) -> String {
    match d.utilization_pct {
        Some(pct) => format!("{pct:.0}% {}", d.demand().display_name()),
        None => d.demand().display_name().to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::data::SourceKind;
    use crate::domain::{PriceQuote, PrimaryRates, RecommendedSpecs, SecondaryRates};
    use crate::error::FetchError;

    fn device() -> MergedDevice {
        MergedDevice {
            name: "NVIDIA GeForce RTX 3070".to_string(),
            display_name: "RTX 3070".to_string(),
            variant_names: Vec::new(),
            recommended_specs: RecommendedSpecs { ram_gb: Some(16.0) },
            earning_rates_primary: PrimaryRates {
                avg_earning_rate: Some(0.1),
                min_earning_rate: Some(0.05),
                max_earning_rate: Some(0.15),
                top25_pct_earning_rate: Some(0.062),
                ..PrimaryRates::default()
            },
            utilization_pct: Some(85.0),
            earning_rates_secondary: SecondaryRates {
                verified: Some(PriceQuote {
                    price_10th: Some(0.1),
                    price_90th: Some(0.2),
                    count: Some(5),
                }),
                unverified: None,
            },
        }
    }

    fn report(kind: SourceKind, status: SourceStatus, records: usize) -> SourceReport {
        SourceReport {
            kind,
            origin: "file:feed.json".to_string(),
            status,
            records,
            skipped_rows: 0,
            elapsed_ms: 12,
        }
    }

    #[test]
    fn table_renders_values_and_placeholders() {
        let table = format_table(&[device()], SortState::default());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("GPU ▼"));
        assert!(lines[2].contains("RTX 3070"));
        assert!(lines[2].contains("16GB"));
        assert!(lines[2].contains("85% High"));
        assert!(lines[2].contains("$0.100"));
        assert!(lines[2].contains("$0.062"));
        assert!(lines[2].contains("$2.40"));
        assert!(lines[2].contains("N/A (0)"));
        assert!(lines[2].ends_with("$0.10 - $0.20 (5)"));
    }

    #[test]
    fn empty_table_says_so() {
        assert!(format_table(&[], SortState::default()).ends_with("(no GPUs)\n"));
    }

    #[test]
    fn summary_lists_sources_and_match_rate() {
        let snapshot = FeedSnapshot {
            fetched_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            devices: Vec::new(),
            markets: Vec::new(),
            salad: report(SourceKind::Salad, SourceStatus::Ok, 4),
            vast: report(
                SourceKind::Vast,
                SourceStatus::Degraded(FetchError::Timeout {
                    source_kind: SourceKind::Vast,
                    timeout_secs: 5,
                }),
                0,
            ),
        };
        let diagnostics = MatchDiagnostics {
            primary_total: 4,
            matched: 1,
            ..MatchDiagnostics::default()
        };

        let summary = format_run_summary(&snapshot, &diagnostics);
        assert!(summary.contains("Fetched: 2025-03-01 12:00:00 UTC"));
        assert!(summary.contains("degraded (timeout)"));
        assert!(summary.contains("vast: request timed out after 5s"));
        assert!(summary.contains("Matched: 1/4 (25.0%)"));
    }

    #[test]
    fn estimates_for_hits() {
        let d = device();
        let out = format_estimates(&[&d]);
        assert!(out.contains("daily : $1.20 - $3.60"));
        assert!(out.contains("weekly: $8.40 - $25.20"));
        assert!(out.contains("hourly: $0.100 avg, $0.050 - $0.150"));
        assert!(out.contains("top 25%: $0.062/hr, $1.49/day"));
        assert!(out.contains("vast unverified: N/A (0)"));
        assert!(out.contains("vast verified  : $0.10 - $0.20 (5)"));
        assert!(format_estimates(&[]).starts_with("No matching GPUs"));
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("RTX 3070", 24), "RTX 3070");
        assert_eq!(truncate("abcdefgh", 5), "abcd.");
    }
}
