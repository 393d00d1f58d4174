//! Left join of source-A devices against source-B market stats.
//!
//! Rules:
//! - one output row per source-A record, in source-A order
//! - the *first* source-B record with an equal canonical key wins
//! - no match, or an empty band array, yields the unavailable marker (`None`)
//! - numeric fields that upstream omitted stay `None`; `0` is kept as a value

use std::collections::HashMap;

use crate::domain::{
    MergedDevice, Named, PrimaryRates, PriceQuote, RawDeviceRecord, RawMarketRecord, RecommendedSpecs,
    SecondaryRates,
};
use crate::normalize::{Keyed, attach_keys, display_name};

/// Normalize both lists and join them.
pub fn merge(source_a: &[RawDeviceRecord], source_b: &[RawMarketRecord]) -> Vec<MergedDevice> {
    merge_keyed(&attach_keys(source_a), &attach_keys(source_b))
}

/// Join lists whose canonical keys were already attached.
pub fn merge_keyed(
    source_a: &[Keyed<'_, RawDeviceRecord>],
    source_b: &[Keyed<'_, RawMarketRecord>],
) -> Vec<MergedDevice> {
    let index = first_match_index(source_b);
    source_a
        .iter()
        .map(|device| merge_one(device.record, index.get(device.key.as_str()).copied()))
        .collect()
}

fn first_match_index<'k, 'r>(
    source_b: &'k [Keyed<'r, RawMarketRecord>],
) -> HashMap<&'k str, &'r RawMarketRecord> {
    let mut index = HashMap::with_capacity(source_b.len());
    for entry in source_b {
        index.entry(entry.key.as_str()).or_insert(entry.record);
    }
    index
}

fn merge_one(device: &RawDeviceRecord, market: Option<&RawMarketRecord>) -> MergedDevice {
    let name = device.name_or_unknown().to_string();
    let display = device
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| display_name(&name));

    let rates = &device.earning_rates;
    MergedDevice {
        display_name: display,
        variant_names: device.variant_names.clone(),
        recommended_specs: RecommendedSpecs {
            ram_gb: device.recommended_specs.ram_gb,
        },
        earning_rates_primary: PrimaryRates {
            avg_earning_rate: rates.average(),
            min_earning_rate: rates.min_earning_rate,
            max_earning_rate: rates.max_earning_rate,
            top25_pct_earning_rate: rates.top25_pct_earning_rate,
            avg_earning_time_minutes: rates.avg_earning_time_minutes,
        },
        utilization_pct: device.utilization_pct,
        earning_rates_secondary: secondary_rates(market),
        name,
    }
}

fn secondary_rates(market: Option<&RawMarketRecord>) -> SecondaryRates {
    let Some(market) = market else {
        return SecondaryRates::UNAVAILABLE;
    };
    let rented = &market.stats.rented;
    SecondaryRates {
        verified: rented.verified.first().map(PriceQuote::from),
        unverified: rented.unverified.first().map(PriceQuote::from),
    }
}
