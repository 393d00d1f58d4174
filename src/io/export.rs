//! Export the merged comparison to JSON or CSV.
//!
//! The JSON export is byte-for-byte the `/api/gpu-data` body (pretty-printed);
//! the CSV export flattens it for spreadsheets. Missing values are empty cells.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{MergedDevice, PriceQuote};
use crate::error::AppError;

/// Write the merged records as a pretty-printed JSON array.
pub fn write_merged_json(path: &Path, records: &[MergedDevice]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create export JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .map_err(|e| AppError::usage(format!("Failed to write export JSON: {e}")))?;
    writeln!(writer).map_err(|e| AppError::usage(format!("Failed to write export JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::usage(format!("Failed to write export JSON: {e}")))?;
    tracing::info!(path = %path.display(), rows = records.len(), "wrote JSON export");
    Ok(())
}

/// Write the merged records as CSV, one row per GPU.
pub fn write_merged_csv(path: &Path, records: &[MergedDevice]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut file = BufWriter::new(file);

    writeln!(
        file,
        "name,display_name,ram_gb,utilization_pct,avg_earning_rate,min_earning_rate,max_earning_rate,\
top25_pct_earning_rate,avg_earning_time_minutes,verified_p10,verified_p90,verified_count,\
unverified_p10,unverified_p90,unverified_count"
    )
    .map_err(|e| AppError::usage(format!("Failed to write export CSV header: {e}")))?;

    for d in records {
        let primary = &d.earning_rates_primary;
        let secondary = &d.earning_rates_secondary;
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{}",
            csv_field(&d.name),
            csv_field(&d.display_name),
            fmt_opt(d.recommended_specs.ram_gb),
            fmt_opt(d.utilization_pct),
            fmt_opt(primary.avg_earning_rate),
            fmt_opt(primary.min_earning_rate),
            fmt_opt(primary.max_earning_rate),
            fmt_opt(primary.top25_pct_earning_rate),
            fmt_opt(primary.avg_earning_time_minutes),
            fmt_quote(secondary.verified.as_ref()),
            fmt_quote(secondary.unverified.as_ref()),
        )
        .map_err(|e| AppError::usage(format!("Failed to write export CSV row: {e}")))?;
    }

    file.flush()
        .map_err(|e| AppError::usage(format!("Failed to write export CSV: {e}")))?;
    tracing::info!(path = %path.display(), rows = records.len(), "wrote CSV export");
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn fmt_quote(quote: Option<&PriceQuote>) -> String {
    match quote {
        Some(q) => format!(
            "{},{},{}",
            fmt_opt(q.price_10th),
            fmt_opt(q.price_90th),
            q.count.map(|c| c.to_string()).unwrap_or_default()
        ),
        None => ",,".to_string(),
    }
}

/// Quote a field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
