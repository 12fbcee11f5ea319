//! Price bar representation.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One session's OHLC aggregate. Daily bars carry a midnight timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl PriceBar {
    pub fn daily(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<u64>,
    ) -> Self {
        Self {
            timestamp: date.and_time(chrono::NaiveTime::MIN),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Unix seconds, treating the timestamp as UTC.
    pub fn unix_time(&self) -> i64 {
        self.timestamp.and_utc().timestamp()
    }

    /// Percent move of this close against `prev_close`; 0 when `prev_close` is 0.
    pub fn change_pct_from(&self, prev_close: f64) -> f64 {
        if prev_close == 0.0 {
            return 0.0;
        }
        (self.close - prev_close) / prev_close * 100.0
    }
}
