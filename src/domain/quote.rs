//! Latest close and one-day change for a ticker.

use serde::Serialize;

use crate::domain::error::TrendError;
use crate::domain::series::PriceSeries;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
    pub ticker: String,
    pub last_close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_change_pct: Option<f64>,
}

impl QuoteSnapshot {
    pub fn from_series(ticker: &str, series: &PriceSeries) -> Result<Self, TrendError> {
        let tail = series.tail(2);
        let last = tail.last().ok_or_else(|| TrendError::NoData {
            ticker: ticker.to_string(),
        })?;
        let prev_close = (tail.len() == 2).then(|| tail[0].close);

        Ok(Self {
            ticker: ticker.to_string(),
            last_close: last.close,
            prev_close,
            day_change_pct: prev_close.map(|p| last.change_pct_from(p)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::PriceBar;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        PriceSeries::new(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| {
                    PriceBar::daily(start + chrono::Duration::days(i as i64), c, c, c, c, None)
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn snapshot_uses_last_two_closes() {
        let q = QuoteSnapshot::from_series("MSFT", &series(&[90.0, 100.0, 104.0])).unwrap();
        assert_eq!(q.last_close, 104.0);
        assert_eq!(q.prev_close, Some(100.0));
        assert!((q.day_change_pct.unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn single_bar_has_no_change() {
        let q = QuoteSnapshot::from_series("MSFT", &series(&[42.0])).unwrap();
        assert_eq!(q.last_close, 42.0);
        assert!(q.prev_close.is_none());
        assert!(q.day_change_pct.is_none());
    }

    #[test]
    fn empty_series_is_no_data() {
        let err = QuoteSnapshot::from_series("MSFT", &PriceSeries::empty()).unwrap_err();
        assert!(matches!(err, TrendError::NoData { ticker } if ticker == "MSFT"));
    }
}
