//! `gpu-compare` library crate.
//!
//! The binary (`gpuc`) is a thin wrapper around this library so that:
//!
//! - the name normalizer and merger are testable without spawning processes
//! - the CLI, the TUI, and the HTTP server share one fetch + merge pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod merge;
pub mod normalize;
pub mod report;
pub mod server;
pub mod tui;
pub mod view;
