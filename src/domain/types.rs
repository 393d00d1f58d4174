//! Shared domain types.
//!
//! Raw records mirror the provider JSON and are decoded leniently (see
//! [`super::lenient`]). The merged record is the single output shape handed to
//! every front-end: tables, the TUI, exports, and the HTTP endpoint.

use serde::{Deserialize, Serialize};

use super::lenient;

/// Name substituted for records whose upstream name is missing or not a string.
pub const UNKNOWN_NAME: &str = "Unknown";

/// A record with a GPU model name that can be normalized into a join key.
pub trait Named {
    /// The raw upstream name, or [`UNKNOWN_NAME`] when absent.
    fn name_or_unknown(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Source A: Salad demand monitor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDeviceRecord {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub recommended_specs: RawRecommendedSpecs,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub earning_rates: RawEarningRates,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub utilization_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub variant_names: Vec<String>,
}

impl Named for RawDeviceRecord {
    fn name_or_unknown(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_NAME)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecommendedSpecs {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub ram_gb: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEarningRates {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub avg_earning_rate: Option<f64>,
    /// Older feed revisions publish the average hourly rate as `avgEarning`.
    #[serde(default, rename = "avgEarning", deserialize_with = "lenient::opt_f64")]
    pub legacy_avg_earning: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub min_earning_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub max_earning_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub top25_pct_earning_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub avg_earning_time_minutes: Option<f64>,
}

impl RawEarningRates {
    /// Average hourly rate, preferring the current field over the legacy one.
    pub fn average(&self) -> Option<f64> {
        self.avg_earning_rate.or(self.legacy_avg_earning)
    }
}

// ---------------------------------------------------------------------------
// Source B: vast.ai GPU stats exporter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMarketRecord {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub stats: RawMarketStats,
}

impl Named for RawMarketRecord {
    fn name_or_unknown(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_NAME)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMarketStats {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub rented: RawRentedStats,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRentedStats {
    #[serde(default, deserialize_with = "band_list")]
    pub verified: Vec<RawPriceBand>,
    #[serde(default, deserialize_with = "band_list")]
    pub unverified: Vec<RawPriceBand>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPriceBand {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price_10th_percentile: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price_90th_percentile: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub count: Option<u64>,
}

/// Band arrays keep their position even when an entry is not an object, so
/// "first element" always means the first element upstream sent.
fn band_list<'de, D>(deserializer: D) -> Result<Vec<RawPriceBand>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// Merged output
// ---------------------------------------------------------------------------

/// One row of the comparison: a source-A device plus whatever source B knows
/// about the same canonical model.
///
/// Every field is always present. Numbers that upstream omitted or sent as a
/// non-number are `None` and serialize as `null`; a secondary band with no
/// data is `None` as well (the "unavailable" marker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedDevice {
    pub name: String,
    pub display_name: String,
    pub variant_names: Vec<String>,
    pub recommended_specs: RecommendedSpecs,
    pub earning_rates_primary: PrimaryRates,
    pub utilization_pct: Option<f64>,
    pub earning_rates_secondary: SecondaryRates,
}

impl MergedDevice {
    pub fn demand(&self) -> DemandTier {
        DemandTier::from_utilization(self.utilization_pct)
    }

    /// Whether any secondary data was joined onto this row.
    pub fn has_secondary(&self) -> bool {
        self.earning_rates_secondary.verified.is_some()
            || self.earning_rates_secondary.unverified.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedSpecs {
    pub ram_gb: Option<f64>,
}

/// Hourly earning rates reported by source A (USD/hour).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryRates {
    pub avg_earning_rate: Option<f64>,
    pub min_earning_rate: Option<f64>,
    pub max_earning_rate: Option<f64>,
    pub top25_pct_earning_rate: Option<f64>,
    pub avg_earning_time_minutes: Option<f64>,
}

/// Rental price bands reported by source B.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryRates {
    pub verified: Option<PriceQuote>,
    pub unverified: Option<PriceQuote>,
}

impl SecondaryRates {
    pub const UNAVAILABLE: SecondaryRates = SecondaryRates {
        verified: None,
        unverified: None,
    };
}

/// First price band of one verification tier (USD/hour, sample count).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub price_10th: Option<f64>,
    pub price_90th: Option<f64>,
    pub count: Option<u64>,
}

impl From<&RawPriceBand> for PriceQuote {
    fn from(band: &RawPriceBand) -> Self {
        Self {
            price_10th: band.price_10th_percentile,
            price_90th: band.price_90th_percentile,
            count: band.count,
        }
    }
}

/// Demand classification derived from source-A utilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandTier {
    Unknown,
    Low,
    Moderate,
    High,
}

impl DemandTier {
    pub const HIGH_THRESHOLD: f64 = 80.0;
    pub const MODERATE_THRESHOLD: f64 = 50.0;

    pub fn from_utilization(pct: Option<f64>) -> Self {
        match pct {
            None => DemandTier::Unknown,
            Some(p) if p >= Self::HIGH_THRESHOLD => DemandTier::High,
            Some(p) if p >= Self::MODERATE_THRESHOLD => DemandTier::Moderate,
            Some(_) => DemandTier::Low,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DemandTier::Unknown => "Unknown",
            DemandTier::Low => "Low",
            DemandTier::Moderate => "Moderate",
            DemandTier::High => "High",
        }
    }
}
