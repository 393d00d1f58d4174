//! Input/output helpers.
//!
//! - merged table exports (JSON and CSV) (`export`)

pub mod export;

pub use export::*;
