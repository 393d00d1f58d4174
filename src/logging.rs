//! Tracing setup.
//!
//! Line-oriented commands log to stderr so stdout stays clean for tables and
//! JSON. The TUI owns the terminal, so it logs to a daily-rolled file instead.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const DEFAULT_DIRECTIVE: &str = "gpu_compare=info";
pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "gpu-compare.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    pub fn default_file() -> Self {
        LogTarget::File(PathBuf::from(LOG_DIR))
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole run. A second call leaves the first subscriber in place. When the
/// log directory cannot be created, file logging is skipped with a warning on
/// stderr and `None` is returned.
pub fn init_logging(target: LogTarget) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    match target {
        LogTarget::Stderr => {
            let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
            let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
            None
        }
        LogTarget::File(dir) => {
            let appender = match RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE)
                .build(&dir)
            {
                Ok(appender) => appender,
                Err(e) => {
                    eprintln!("Warning: logging disabled, cannot open {}: {e}", dir.display());
                    return None;
                }
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
            Some(guard)
        }
    }
}
