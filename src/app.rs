//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and builds the runtime config
//! - sets up logging for the chosen front-end
//! - runs the compare pipeline and prints, exports, serves, or shows it

use clap::Parser;

use crate::cli::{Command, SearchArgs, ServeArgs, SourceArgs, TableArgs};
use crate::config::{Config, parse_timeout_secs};
use crate::data::SourceInput;
use crate::error::AppError;
use crate::logging::{LogTarget, init_logging};
use crate::view::{RecordFilter, SortState, filter_records, search_records};

pub mod pipeline;

/// Entry point for the `gpuc` binary.
pub fn run() -> Result<(), AppError> {
    // `gpuc` and `gpuc --vast-file x.json` behave like `gpuc tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let target = match cli.command {
        Command::Tui(_) => LogTarget::default_file(),
        _ => LogTarget::Stderr,
    };
    let _log_guard = init_logging(target);

    match cli.command {
        Command::Table(args) => handle_table(args),
        Command::Json(args) => handle_json(args),
        Command::Search(args) => handle_search(args),
        Command::Serve(args) => handle_serve(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_table(args: TableArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.source)?;
    let run = pipeline::run_compare(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.snapshot, &run.diagnostics)
    );

    let filter = RecordFilter::new(args.filter.clone().unwrap_or_default(), args.demand);
    let sort = SortState {
        column: args.sort,
        direction: args.direction,
    };
    let rows = sort.apply(&filter_records(&run.merged, |d| filter.matches(d)));
    print!("{}", crate::report::format_table(&rows, sort));

    // Exports always carry the full merged array, not the filtered view.
    if let Some(path) = &args.export_json {
        crate::io::write_merged_json(path, &run.merged)?;
    }
    if let Some(path) = &args.export_csv {
        crate::io::write_merged_csv(path, &run.merged)?;
    }
    if args.source.debug {
        let path = crate::debug::write_match_bundle(&run.snapshot, &run.diagnostics)?;
        eprintln!("Debug bundle: {}", path.display());
    }

    Ok(())
}

fn handle_json(args: SourceArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    let run = pipeline::run_compare(&config)?;

    let body = serde_json::to_string_pretty(&run.merged)
        .map_err(|e| AppError::upstream(format!("Failed to serialize merged data: {e}")))?;
    println!("{body}");

    if args.debug {
        let path = crate::debug::write_match_bundle(&run.snapshot, &run.diagnostics)?;
        eprintln!("Debug bundle: {}", path.display());
    }
    Ok(())
}

fn handle_search(args: SearchArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.source)?;
    let run = pipeline::run_compare(&config)?;

    let hits = search_records(&run.merged, &args.term);
    print!("{}", crate::report::format_estimates(&hits));

    if args.source.debug {
        let path = crate::debug::write_match_bundle(&run.snapshot, &run.diagnostics)?;
        eprintln!("Debug bundle: {}", path.display());
    }
    Ok(())
}

fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    let mut config = config_from_args(&args.source)?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    crate::server::run(config)
}

fn handle_tui(args: SourceArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    crate::tui::run(config, args.debug)
}

/// Environment config with CLI flags applied on top.
pub fn config_from_args(args: &SourceArgs) -> Result<Config, AppError> {
    let config = Config::from_env()?;
    apply_overrides(config, args)
}

fn apply_overrides(mut config: Config, args: &SourceArgs) -> Result<Config, AppError> {
    if let Some(url) = &args.salad_url {
        config.salad = SourceInput::Url(url.clone());
    }
    if let Some(path) = &args.salad_file {
        config.salad = SourceInput::File(path.clone());
    }
    if let Some(url) = &args.vast_url {
        config.vast = SourceInput::Url(url.clone());
    }
    if let Some(path) = &args.vast_file {
        config.vast = SourceInput::File(path.clone());
    }
    if let Some(secs) = args.timeout {
        config.timeout = std::time::Duration::from_secs(parse_timeout_secs(&secs.to_string())?);
    }
    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    Ok(config)
}

/// Rewrite argv so `gpuc` defaults to `gpuc tui`.
///
/// Rules:
/// - `gpuc`                        -> `gpuc tui`
/// - `gpuc --vast-file x.json ...` -> `gpuc tui --vast-file x.json ...`
/// - `gpuc --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "table" | "json" | "search" | "serve" | "tui");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::config::FailurePolicy;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_tui() {
        assert_eq!(rewrite_args(args(&["gpuc"])), args(&["gpuc", "tui"]));
        assert_eq!(
            rewrite_args(args(&["gpuc", "--policy", "strict"])),
            args(&["gpuc", "tui", "--policy", "strict"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(args(&["gpuc", "json"])), args(&["gpuc", "json"]));
        assert_eq!(rewrite_args(args(&["gpuc", "--help"])), args(&["gpuc", "--help"]));
    }

    #[test]
    fn flags_override_environment() {
        let base = Config::from_lookup(|_| None).unwrap();
        let flags = SourceArgs {
            salad_file: Some(PathBuf::from("salad.json")),
            vast_url: Some("http://localhost:8000/vast".to_string()),
            timeout: Some(9),
            policy: Some(FailurePolicy::Strict),
            ..SourceArgs::default()
        };
        let config = apply_overrides(base, &flags).unwrap();
        assert_eq!(config.salad, SourceInput::File(PathBuf::from("salad.json")));
        assert_eq!(config.vast, SourceInput::Url("http://localhost:8000/vast".to_string()));
        assert_eq!(config.timeout, Duration::from_secs(9));
        assert_eq!(config.policy, FailurePolicy::Strict);
    }

    #[test]
    fn zero_timeout_flag_is_rejected() {
        let base = Config::from_lookup(|_| None).unwrap();
        let flags = SourceArgs {
            timeout: Some(0),
            ..SourceArgs::default()
        };
        assert!(apply_overrides(base, &flags).is_err());
    }
}
