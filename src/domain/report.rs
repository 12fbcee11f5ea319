//! Output records handed to report adapters and the HTTP layer.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::classifier::{ClassificationResult, ClassifierConfig, classify};
use crate::domain::error::TrendError;
use crate::domain::series::PriceSeries;

/// A classification plus the context needed to print it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub ticker: String,
    pub as_of: NaiveDate,
    #[serde(flatten)]
    pub result: ClassificationResult,
}

impl TrendReport {
    pub fn build(
        ticker: &str,
        series: &PriceSeries,
        window: usize,
        config: &ClassifierConfig,
    ) -> Result<Self, TrendError> {
        let result = classify(series, window, config)?;
        let as_of = series
            .last()
            .map(|b| b.date())
            .ok_or_else(|| TrendError::NoData {
                ticker: ticker.to_string(),
            })?;
        Ok(Self {
            ticker: ticker.to_string(),
            as_of,
            result,
        })
    }
}

/// One candle in the `/api/daily` payload; `time` is unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCandles {
    pub ticker: String,
    pub candles: Vec<Candle>,
}

impl DailyCandles {
    pub fn from_series(ticker: &str, series: &PriceSeries) -> Self {
        Self {
            ticker: ticker.to_string(),
            candles: series
                .bars()
                .iter()
                .map(|b| Candle {
                    time: b.unix_time(),
                    open: b.open,
                    high: b.high,
                    low: b.low,
                    close: b.close,
                })
                .collect(),
        }
    }
}
