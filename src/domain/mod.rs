//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw feed records as they arrive from each provider (`RawDeviceRecord`, `RawMarketRecord`)
//! - the merged, presentation-ready record (`MergedDevice`)
//! - small derived classifications (`DemandTier`)

pub mod lenient;
pub mod types;

pub use types::*;
