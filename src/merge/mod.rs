//! Cross-source record merge.
//!
//! - `join`: the left join of source-A devices against source-B market stats
//! - `diagnostics`: read-only match reporting (unmatched keys, collisions)

pub mod diagnostics;
pub mod join;

pub use diagnostics::*;
pub use join::*;
