//! GPU model name normalization.
//!
//! Two independent transforms live here:
//!
//! - `canonical_key`: the join key used to match records across providers
//! - `display_name`: a human-facing label (vendor prefixes stripped only)
//!
//! `keyed` attaches canonical keys to whole record lists before a merge.

pub mod keyed;
pub mod name;

pub use keyed::*;
pub use name::*;
