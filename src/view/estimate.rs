//! Earnings projections and price formatting.

use crate::domain::{MergedDevice, PriceQuote};

use super::sort::HOURS_PER_DAY;

pub const DAYS_PER_WEEK: f64 = 7.0;

/// A min/max pair in USD; either end may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RateRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RateRange {
    fn scaled(self, factor: f64) -> Self {
        Self {
            min: self.min.map(|v| v * factor),
            max: self.max.map(|v| v * factor),
        }
    }
}

/// Projected source-A earnings for running a GPU around the clock.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EarningsEstimate {
    pub average_hourly: Option<f64>,
    pub hourly: RateRange,
    pub daily: RateRange,
    pub weekly: RateRange,
    /// Top-quartile rate, hourly and per day.
    pub top25_hourly: Option<f64>,
    pub top25_daily: Option<f64>,
}

pub fn estimate_earnings(device: &MergedDevice) -> EarningsEstimate {
    let hourly = RateRange {
        min: device.earning_rates_primary.min_earning_rate,
        max: device.earning_rates_primary.max_earning_rate,
    };
    let daily = hourly.scaled(HOURS_PER_DAY);
    let top25 = device.earning_rates_primary.top25_pct_earning_rate;
    EarningsEstimate {
        average_hourly: device.earning_rates_primary.avg_earning_rate,
        hourly,
        daily,
        weekly: daily.scaled(DAYS_PER_WEEK),
        top25_hourly: top25,
        top25_daily: top25.map(|v| v * HOURS_PER_DAY),
    }
}

/// Hourly rates are quoted to the tenth of a cent: `$0.062`, or `N/A`.
pub fn format_rate(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${v:.3}"),
        None => "N/A".to_string(),
    }
}

pub fn format_rate_range(range: RateRange) -> String {
    format!("{} - {}", format_rate(range.min), format_rate(range.max))
}

/// `$1.23`, or `N/A` when unknown.
pub fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${v:.2}"),
        None => "N/A".to_string(),
    }
}

/// `$0.10 - $0.20` for a band, `N/A` when the band is unavailable.
pub fn format_band(quote: Option<&PriceQuote>) -> String {
    match quote {
        Some(q) => format!("{} - {}", format_price(q.price_10th), format_price(q.price_90th)),
        None => "N/A".to_string(),
    }
}

pub fn format_range(range: RateRange) -> String {
    format!("{} - {}", format_price(range.min), format_price(range.max))
}

/// Rentals behind a band; an unavailable band or missing count reads as 0.
pub fn band_count(quote: Option<&PriceQuote>) -> u64 {
    quote.and_then(|q| q.count).unwrap_or(0)
}

/// [`format_band`] followed by the rental count, e.g. `$0.10 - $0.20 (5)`.
pub fn format_band_counted(quote: Option<&PriceQuote>) -> String {
    format!("{} ({})", format_band(quote), band_count(quote))
}
