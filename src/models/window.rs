use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Time window over which upstream aggregates trade statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Window {
    /// Instantaneous high/low with trade timestamps
    Latest,
    /// 5-minute averages and volumes
    FiveMinute,
    /// 1-hour averages and volumes
    OneHour,
    /// 24-hour averages and volumes
    TwentyFourHour,
}

impl Window {
    /// Upstream path segment ("latest", "5m", "1h", "24h")
    pub fn to_path(&self) -> &'static str {
        match self {
            Window::Latest => "latest",
            Window::FiveMinute => "5m",
            Window::OneHour => "1h",
            Window::TwentyFourHour => "24h",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// One item's statistics within a single window.
///
/// Every field is optional: `latest` only carries high/low and their times,
/// the averaged windows only carry averages and volumes, and upstream sends
/// `null` for sides that did not trade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRecord {
    #[serde(default)]
    pub high: Option<i64>,
    #[serde(default)]
    pub high_time: Option<i64>,
    #[serde(default)]
    pub low: Option<i64>,
    #[serde(default)]
    pub low_time: Option<i64>,
    #[serde(default)]
    pub high_price_volume: Option<i64>,
    #[serde(default)]
    pub low_price_volume: Option<i64>,
    #[serde(default)]
    pub avg_high_price: Option<i64>,
    #[serde(default)]
    pub avg_low_price: Option<i64>,
}

impl WindowRecord {
    /// Combined high + low side volume, absent sides counting as zero.
    /// Saturates at `i64::MAX` instead of wrapping.
    pub fn total_volume(&self) -> i64 {
        self.high_price_volume
            .unwrap_or(0)
            .saturating_add(self.low_price_volume.unwrap_or(0))
    }

    /// avgHighPrice if truthy, else avgLowPrice if truthy, else 0
    pub fn representative_price(&self) -> i64 {
        truthy(self.avg_high_price)
            .or_else(|| truthy(self.avg_low_price))
            .unwrap_or(0)
    }
}

/// Zero counts as "no value" alongside absent
fn truthy(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v != 0)
}

/// ItemId (as string) -> record, for one window
pub type WindowSnapshot = BTreeMap<String, WindowRecord>;

/// Upstream envelope for the window documents: `{"data": {...}}`.
/// Other envelope fields (the upstream `timestamp`) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct WindowResponse {
    pub data: WindowSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_paths() {
        assert_eq!(Window::Latest.to_path(), "latest");
        assert_eq!(Window::FiveMinute.to_path(), "5m");
        assert_eq!(Window::OneHour.to_path(), "1h");
        assert_eq!(Window::TwentyFourHour.to_string(), "24h");
    }

    #[test]
    fn test_total_volume_saturates() {
        let record = WindowRecord {
            high_price_volume: Some(i64::MAX),
            low_price_volume: Some(1),
            ..WindowRecord::default()
        };
        assert_eq!(record.total_volume(), i64::MAX);

        let record = WindowRecord {
            high_price_volume: Some(40),
            low_price_volume: Some(2),
            ..WindowRecord::default()
        };
        assert_eq!(record.total_volume(), 42);
    }

    #[test]
    fn test_record_parses_nulls_and_missing_fields() {
        let record: WindowRecord = serde_json::from_str(
            r#"{"avgHighPrice": null, "avgLowPrice": 120, "highPriceVolume": 7, "extra": "ignored"}"#,
        )
        .unwrap();

        assert_eq!(record.avg_high_price, None);
        assert_eq!(record.avg_low_price, Some(120));
        assert_eq!(record.low_price_volume, None);
        assert_eq!(record.total_volume(), 7);
        assert_eq!(record.representative_price(), 120);
    }

    #[test]
    fn test_representative_price_skips_zero() {
        let record = WindowRecord {
            avg_high_price: Some(0),
            avg_low_price: Some(0),
            ..WindowRecord::default()
        };
        assert_eq!(record.representative_price(), 0);

        let record = WindowRecord {
            avg_high_price: Some(310),
            avg_low_price: Some(300),
            ..WindowRecord::default()
        };
        assert_eq!(record.representative_price(), 310);
    }

    #[test]
    fn test_response_requires_data_field() {
        let ok: Result<WindowResponse, _> =
            serde_json::from_str(r#"{"data": {"2": {"high": 5}}, "timestamp": 1700000000}"#);
        assert_eq!(ok.unwrap().data["2"].high, Some(5));

        let missing: Result<WindowResponse, _> = serde_json::from_str(r#"{"error": "nope"}"#);
        assert!(missing.is_err());
    }
}
