//! Reporting utilities: run summary, comparison table, and earnings estimates.
//!
//! Formatting lives here so the fetch and merge code stays free of
//! presentation concerns and output changes stay localized.

pub mod format;

pub use format::*;
