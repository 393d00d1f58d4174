//! Column sorting.

use std::cmp::Ordering;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::MergedDevice;

pub const HOURS_PER_DAY: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortColumn {
    Name,
    /// Recommended system RAM.
    Ram,
    /// Utilization percentage.
    Demand,
    /// Average hourly earning rate (source A).
    HourlyRate,
    /// Average hourly earning rate × 24.
    DailyRate,
    /// 10th-percentile price, unverified hosts (source B).
    VastUnverified,
    /// 10th-percentile price, verified hosts (source B).
    VastVerified,
}

impl SortColumn {
    pub const ALL: [SortColumn; 7] = [
        SortColumn::Name,
        SortColumn::Ram,
        SortColumn::Demand,
        SortColumn::HourlyRate,
        SortColumn::DailyRate,
        SortColumn::VastUnverified,
        SortColumn::VastVerified,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            SortColumn::Name => "GPU",
            SortColumn::Ram => "Specs",
            SortColumn::Demand => "Demand",
            SortColumn::HourlyRate => "Hourly Rate",
            SortColumn::DailyRate => "Daily Rate",
            SortColumn::VastUnverified => "Vast Unverified",
            SortColumn::VastVerified => "Vast Verified",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Numeric sort value; `None` for the name column or missing data.
    fn value(self, device: &MergedDevice) -> Option<f64> {
        let secondary = &device.earning_rates_secondary;
        match self {
            SortColumn::Name => None,
            SortColumn::Ram => device.recommended_specs.ram_gb,
            SortColumn::Demand => device.utilization_pct,
            SortColumn::HourlyRate => device.earning_rates_primary.avg_earning_rate,
            SortColumn::DailyRate => device.earning_rates_primary.avg_earning_rate.map(|r| r * HOURS_PER_DAY),
            SortColumn::VastUnverified => secondary.unverified.as_ref().and_then(|q| q.price_10th),
            SortColumn::VastVerified => secondary.verified.as_ref().and_then(|q| q.price_10th),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

/// Current sort of a table view. Starts at name, descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::Name,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Header-click rule: the active column flips from descending to
    /// ascending; anything else (a new column, or ascending) goes descending.
    pub fn toggle(self, column: SortColumn) -> Self {
        let direction = if column == self.column && self.direction == SortDirection::Desc {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        };
        Self { column, direction }
    }

    pub fn apply(&self, records: &[MergedDevice]) -> Vec<MergedDevice> {
        sort_records(records, self.column, self.direction)
    }
}

/// Return `records` sorted by `column`.
///
/// The sort is stable, so equal keys keep their input order in both
/// directions. Missing values rank below every number.
pub fn sort_records(records: &[MergedDevice], column: SortColumn, direction: SortDirection) -> Vec<MergedDevice> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let ord = compare(a, b, column);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    sorted
}

fn compare(a: &MergedDevice, b: &MergedDevice, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Name => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
        _ => match (column.value(a), column.value(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PrimaryRates, PriceQuote, RecommendedSpecs, SecondaryRates};

    fn device(name: &str, avg: Option<f64>, util: Option<f64>, verified_p10: Option<f64>) -> MergedDevice {
        MergedDevice {
            name: name.to_string(),
            display_name: name.to_string(),
            variant_names: Vec::new(),
            recommended_specs: RecommendedSpecs::default(),
            earning_rates_primary: PrimaryRates {
                avg_earning_rate: avg,
                ..PrimaryRates::default()
            },
            utilization_pct: util,
            earning_rates_secondary: SecondaryRates {
                verified: verified_p10.map(|p| PriceQuote {
                    price_10th: Some(p),
                    ..PriceQuote::default()
                }),
                unverified: None,
            },
        }
    }

    fn names(records: &[MergedDevice]) -> Vec<&str> {
        records.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn sorts_names_case_insensitively() {
        let records = vec![
            device("rtx 4090", None, None, None),
            device("GTX 1660", None, None, None),
            device("RTX 3070", None, None, None),
        ];
        let asc = sort_records(&records, SortColumn::Name, SortDirection::Asc);
        assert_eq!(names(&asc), vec!["GTX 1660", "RTX 3070", "rtx 4090"]);
        let desc = sort_records(&records, SortColumn::Name, SortDirection::Desc);
        assert_eq!(names(&desc), vec!["rtx 4090", "RTX 3070", "GTX 1660"]);
    }

    #[test]
    fn missing_values_rank_lowest() {
        let records = vec![
            device("a", Some(0.2), None, None),
            device("b", None, None, None),
            device("c", Some(0.1), None, None),
        ];
        let asc = sort_records(&records, SortColumn::HourlyRate, SortDirection::Asc);
        assert_eq!(names(&asc), vec!["b", "c", "a"]);
        let desc = sort_records(&records, SortColumn::DailyRate, SortDirection::Desc);
        assert_eq!(names(&desc), vec!["a", "c", "b"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let records = vec![
            device("first", None, Some(90.0), None),
            device("second", None, Some(90.0), None),
            device("low", None, Some(10.0), None),
        ];
        let desc = sort_records(&records, SortColumn::Demand, SortDirection::Desc);
        assert_eq!(names(&desc), vec!["first", "second", "low"]);
    }

    #[test]
    fn secondary_columns_sort_on_tenth_percentile() {
        let records = vec![
            device("x", None, None, Some(0.4)),
            device("y", None, None, None),
            device("z", None, None, Some(0.2)),
        ];
        let desc = sort_records(&records, SortColumn::VastVerified, SortDirection::Desc);
        assert_eq!(names(&desc), vec!["x", "z", "y"]);
    }

    #[test]
    fn sorting_does_not_touch_input() {
        let records = vec![device("b", None, None, None), device("a", None, None, None)];
        let _ = sort_records(&records, SortColumn::Name, SortDirection::Asc);
        assert_eq!(names(&records), vec!["b", "a"]);
    }

    #[test]
    fn toggle_follows_header_click_rule() {
        let state = SortState::default();
        assert_eq!(state.column, SortColumn::Name);
        assert_eq!(state.direction, SortDirection::Desc);

        let state = state.toggle(SortColumn::Name);
        assert_eq!(state.direction, SortDirection::Asc);

        let state = state.toggle(SortColumn::Name);
        assert_eq!(state.direction, SortDirection::Desc);

        let state = state.toggle(SortColumn::Name).toggle(SortColumn::Demand);
        assert_eq!(state.column, SortColumn::Demand);
        assert_eq!(state.direction, SortDirection::Desc);
    }

    #[test]
    fn column_cycle_wraps() {
        assert_eq!(SortColumn::VastVerified.next(), SortColumn::Name);
        assert_eq!(SortColumn::Name.prev(), SortColumn::VastVerified);
    }
}
