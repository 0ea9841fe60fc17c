use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// One item's merged view across the latest, 5m, 1h and 24h windows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedPriceRecord {
    pub high: i64,
    pub high_time: i64,
    pub low: i64,
    pub low_time: i64,
    /// Total 5-minute volume (high side + low side), not only the high side.
    /// The name is kept for client compatibility.
    pub high_price_volume: i64,
    /// Serialized as `null` when the 5m window has no average
    pub avg_high5m: Option<i64>,
    pub avg_low5m: Option<i64>,
    pub volume1h: i64,
    pub price1h: i64,
    pub volume24h: i64,
    pub price24h: i64,
}

/// ItemId (as string) -> merged record
pub type MergedSnapshot = BTreeMap<String, MergedPriceRecord>;

/// `{"data": {itemId: record}}`: body of `GET /prices/latest` and of the
/// mirrored `prices/latest` document.
///
/// Borrows the installed snapshot when serializing; deserializes owned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricesResponse<'a> {
    pub data: Cow<'a, MergedSnapshot>,
}

impl<'a> PricesResponse<'a> {
    pub fn borrowed(data: &'a MergedSnapshot) -> Self {
        Self { data: Cow::Borrowed(data) }
    }
}
