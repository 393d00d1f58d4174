//! Text and demand-tab filtering, plus the quick-search box.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::{DemandTier, MergedDevice};

/// Search terms this short return no quick-search results.
pub const QUICK_SEARCH_MIN_CHARS: usize = 3;
pub const QUICK_SEARCH_LIMIT: usize = 3;

/// Demand tab of the comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DemandFilter {
    #[default]
    All,
    /// Utilization ≥ 80%.
    High,
    /// Utilization in [50%, 80%).
    Moderate,
    /// Utilization < 50%.
    Low,
}

impl DemandFilter {
    pub const ALL: [DemandFilter; 4] = [
        DemandFilter::All,
        DemandFilter::High,
        DemandFilter::Moderate,
        DemandFilter::Low,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            DemandFilter::All => "All",
            DemandFilter::High => "High Demand",
            DemandFilter::Moderate => "Moderate",
            DemandFilter::Low => "Low Demand",
        }
    }

    /// Devices with unknown utilization only appear under `All`.
    pub fn matches(self, tier: DemandTier) -> bool {
        match self {
            DemandFilter::All => true,
            DemandFilter::High => tier == DemandTier::High,
            DemandFilter::Moderate => tier == DemandTier::Moderate,
            DemandFilter::Low => tier == DemandTier::Low,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Table filter: free text (case-insensitive, display or raw name) and a demand tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub text: String,
    pub demand: DemandFilter,
}

impl RecordFilter {
    pub fn new(text: impl Into<String>, demand: DemandFilter) -> Self {
        Self {
            text: text.into(),
            demand,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.demand == DemandFilter::All
    }

    pub fn matches(&self, device: &MergedDevice) -> bool {
        matches_text(device, &self.text) && self.demand.matches(device.demand())
    }
}

/// Keep the records for which `predicate` holds, in order.
pub fn filter_records<P>(records: &[MergedDevice], predicate: P) -> Vec<MergedDevice>
where
    P: Fn(&MergedDevice) -> bool,
{
    records.iter().filter(|d| predicate(d)).cloned().collect()
}

/// Quick search: the first few matches for terms longer than two characters.
pub fn search_records<'a>(records: &'a [MergedDevice], term: &str) -> Vec<&'a MergedDevice> {
    let term = term.trim();
    if term.chars().count() < QUICK_SEARCH_MIN_CHARS {
        return Vec::new();
    }
    records
        .iter()
        .filter(|d| matches_text(d, term))
        .take(QUICK_SEARCH_LIMIT)
        .collect()
}

fn matches_text(device: &MergedDevice, text: &str) -> bool {
    let needle = text.trim().to_lowercase();
    needle.is_empty()
        || device.display_name.to_lowercase().contains(&needle)
        || device.name.to_lowercase().contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PrimaryRates, RecommendedSpecs, SecondaryRates};

    fn device(name: &str, display: &str, util: Option<f64>) -> MergedDevice {
        MergedDevice {
            name: name.to_string(),
            display_name: display.to_string(),
            variant_names: Vec::new(),
            recommended_specs: RecommendedSpecs::default(),
            earning_rates_primary: PrimaryRates::default(),
            utilization_pct: util,
            earning_rates_secondary: SecondaryRates::UNAVAILABLE,
        }
    }

    fn sample() -> Vec<MergedDevice> {
        vec![
            device("NVIDIA GeForce RTX 4090", "RTX 4090", Some(92.0)),
            device("NVIDIA GeForce RTX 3070", "RTX 3070", Some(65.0)),
            device("NVIDIA GeForce GTX 1660", "GTX 1660", Some(12.0)),
            device("NVIDIA GeForce RTX 3060", "RTX 3060", None),
        ]
    }

    fn names(records: &[MergedDevice]) -> Vec<&str> {
        records.iter().map(|d| d.display_name.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let filter = RecordFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter_records(&sample(), |d| filter.matches(d)).len(), 4);
    }

    #[test]
    fn text_matches_display_or_raw_name() {
        let records = sample();
        let filter = RecordFilter::new("rtx 30", DemandFilter::All);
        assert_eq!(names(&filter_records(&records, |d| filter.matches(d))), vec!["RTX 3070", "RTX 3060"]);

        let filter = RecordFilter::new("GEFORCE", DemandFilter::All);
        assert_eq!(filter_records(&records, |d| filter.matches(d)).len(), 4);
    }

    #[test]
    fn demand_tabs_partition_known_utilization() {
        let records = sample();
        let pick = |demand| {
            let filter = RecordFilter::new("", demand);
            names(&filter_records(&records, |d| filter.matches(d)))
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(pick(DemandFilter::High), vec!["RTX 4090"]);
        assert_eq!(pick(DemandFilter::Moderate), vec!["RTX 3070"]);
        assert_eq!(pick(DemandFilter::Low), vec!["GTX 1660"]);
        assert_eq!(pick(DemandFilter::All).len(), 4);
    }

    #[test]
    fn text_and_demand_combine() {
        let filter = RecordFilter::new("rtx", DemandFilter::High);
        assert!(!filter.is_empty());
        assert_eq!(names(&filter_records(&sample(), |d| filter.matches(d))), vec!["RTX 4090"]);
    }

    #[test]
    fn quick_search_needs_three_chars_and_caps_results() {
        let records = sample();
        assert!(search_records(&records, "rt").is_empty());
        assert_eq!(search_records(&records, "  nvidia ").len(), QUICK_SEARCH_LIMIT);
        let hits = search_records(&records, "1660");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].display_name, "GTX 1660");
    }

    #[test]
    fn demand_tab_cycle_wraps() {
        assert_eq!(DemandFilter::Low.next(), DemandFilter::All);
        assert_eq!(DemandFilter::All.next(), DemandFilter::High);
    }
}
