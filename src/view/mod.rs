//! Presentation-side transforms over merged records.
//!
//! Everything here is a pure function of its inputs so the same behavior backs
//! the text table, the TUI, and any other front-end:
//!
//! - sorting by column and direction (`sort`)
//! - text + demand-tab filtering and quick search (`filter`)
//! - earnings projections and price formatting (`estimate`)

pub mod estimate;
pub mod filter;
pub mod sort;

pub use estimate::*;
pub use filter::*;
pub use sort::*;
