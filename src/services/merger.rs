//! Price merger
//!
//! Combines the four upstream window snapshots into one record per item.
//!
//! | Output field              | Source                                              |
//! |---------------------------|-----------------------------------------------------|
//! | high, highTime, low, lowTime | `latest`, 0 when absent                          |
//! | highPriceVolume           | 5m highPriceVolume + lowPriceVolume                 |
//! | avgHigh5m, avgLow5m       | 5m avgHighPrice / avgLowPrice, left absent          |
//! | volume1h / volume24h      | window highPriceVolume + lowPriceVolume             |
//! | price1h / price24h        | avgHighPrice if nonzero, else avgLowPrice, else 0   |
//!
//! The key set is `keys(latest) ∪ keys(5m)`. Items that only appear in the
//! 1h or 24h windows are not merged in.

use crate::models::{MergedPriceRecord, MergedSnapshot, WindowRecord, WindowSnapshot};
use std::collections::BTreeSet;

/// The four window snapshots of a single refresh
#[derive(Debug, Clone, Default)]
pub struct WindowSet {
    pub latest: WindowSnapshot,
    pub five_minute: WindowSnapshot,
    pub one_hour: WindowSnapshot,
    pub twenty_four_hour: WindowSnapshot,
}

impl WindowSet {
    pub fn merge(&self) -> MergedSnapshot {
        merge(
            &self.latest,
            &self.five_minute,
            &self.one_hour,
            &self.twenty_four_hour,
        )
    }
}

/// Merge four window snapshots into one snapshot keyed by item id.
///
/// Pure: no clock, no randomness. Missing fields never fail; they fall back
/// per field as documented at module level.
pub fn merge(
    latest: &WindowSnapshot,
    window5m: &WindowSnapshot,
    window1h: &WindowSnapshot,
    window24h: &WindowSnapshot,
) -> MergedSnapshot {
    let empty = WindowRecord::default();

    let keys: BTreeSet<&String> = latest.keys().chain(window5m.keys()).collect();

    keys.into_iter()
        .map(|item_id| {
            let l = latest.get(item_id).unwrap_or(&empty);
            let m5 = window5m.get(item_id).unwrap_or(&empty);
            let h1 = window1h.get(item_id).unwrap_or(&empty);
            let h24 = window24h.get(item_id).unwrap_or(&empty);

            (item_id.clone(), merge_record(l, m5, h1, h24))
        })
        .collect()
}

fn merge_record(
    latest: &WindowRecord,
    m5: &WindowRecord,
    h1: &WindowRecord,
    h24: &WindowRecord,
) -> MergedPriceRecord {
    MergedPriceRecord {
        high: latest.high.unwrap_or(0),
        high_time: latest.high_time.unwrap_or(0),
        low: latest.low.unwrap_or(0),
        low_time: latest.low_time.unwrap_or(0),
        high_price_volume: m5.total_volume(),
        avg_high5m: m5.avg_high_price,
        avg_low5m: m5.avg_low_price,
        volume1h: h1.total_volume(),
        price1h: h1.representative_price(),
        volume24h: h24.total_volume(),
        price24h: h24.representative_price(),
    }
}
