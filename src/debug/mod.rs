//! Debug bundle writer for inspecting how the two feeds lined up.

use std::fs::{File, OpenOptions, create_dir_all};
use std::io::ErrorKind;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::data::{FeedSnapshot, SourceReport, SourceStatus};
use crate::error::AppError;
use crate::merge::MatchDiagnostics;

/// Write a markdown bundle under `debug/` and return its path.
pub fn write_match_bundle(snapshot: &FeedSnapshot, diagnostics: &MatchDiagnostics) -> Result<PathBuf, AppError> {
    write_match_bundle_in(Path::new("debug"), snapshot, diagnostics)
}

pub fn write_match_bundle_in(
    dir: &Path,
    snapshot: &FeedSnapshot,
    diagnostics: &MatchDiagnostics,
) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::usage(format!("Failed to create debug dir: {e}")))?;

    let (path, file) = create_bundle_file(dir)?;
    let mut file = BufWriter::new(file);
    write_bundle(&mut file, snapshot, diagnostics)
        .and_then(|()| file.flush())
        .map_err(|e| AppError::usage(format!("Failed to write debug bundle: {e}")))?;

    tracing::info!(path = %path.display(), "wrote debug bundle");
    Ok(path)
}

/// Create a fresh `gpu_debug_<ts>.md`; never overwrites an earlier bundle.
fn create_bundle_file(dir: &Path) -> Result<(PathBuf, File), AppError> {
    let ts = Local::now().format("%Y%m%d_%H%M%S_%3f").to_string();
    for attempt in 0u32.. {
        let name = match attempt {
            0 => format!("gpu_debug_{ts}.md"),
            n => format!("gpu_debug_{ts}_{n}.md"),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(AppError::usage(format!("Failed to create debug file: {e}"))),
        }
    }
    Err(AppError::usage("Failed to create debug file: no free name"))
}

fn write_bundle(out: &mut impl Write, snapshot: &FeedSnapshot, diagnostics: &MatchDiagnostics) -> std::io::Result<()> {
    writeln!(out, "# gpuc debug bundle")?;
    writeln!(out, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(out, "- fetched_at: {}", snapshot.fetched_at.to_rfc3339())?;
    writeln!(
        out,
        "- matched: {}/{} ({:.1}%)",
        diagnostics.matched,
        diagnostics.primary_total,
        diagnostics.match_rate() * 100.0
    )?;

    writeln!(out, "\n## Sources")?;
    writeln!(out, "| source | origin | status | records | skipped | elapsed_ms |")?;
    writeln!(out, "| - | - | - | - | - | - |")?;
    for report in [&snapshot.salad, &snapshot.vast] {
        write_source_row(out, report)?;
    }
    for report in [&snapshot.salad, &snapshot.vast] {
        if let SourceStatus::Degraded(err) = &report.status {
            writeln!(out, "- {}", err)?;
        }
    }

    writeln!(out, "\n## Unmatched source-A keys ({})", diagnostics.unmatched_primary.len())?;
    write_key_list(out, &diagnostics.unmatched_primary)?;

    writeln!(out, "\n## Unused source-B keys ({})", diagnostics.unused_secondary.len())?;
    write_key_list(out, &diagnostics.unused_secondary)?;

    writeln!(out, "\n## Source-B key collisions ({})", diagnostics.collisions.len())?;
    if diagnostics.collisions.is_empty() {
        writeln!(out, "(none)")?;
    } else {
        writeln!(out, "| key | names (first one wins) |")?;
        writeln!(out, "| - | - |")?;
        for collision in &diagnostics.collisions {
            writeln!(out, "| {} | {} |", collision.key, collision.names.join("; "))?;
        }
    }

    Ok(())
}

fn write_source_row(out: &mut impl Write, report: &SourceReport) -> std::io::Result<()> {
    writeln!(
        out,
        "| {} | {} | {} | {} | {} | {} |",
        report.kind.display_name(),
        report.origin,
        report.status_label(),
        report.records,
        report.skipped_rows,
        report.elapsed_ms
    )
}

fn write_key_list(out: &mut impl Write, keys: &[String]) -> std::io::Result<()> {
    if keys.is_empty() {
        return writeln!(out, "(none)");
    }
    for key in keys {
        writeln!(out, "- `{key}`")?;
    }
    Ok(())
}
