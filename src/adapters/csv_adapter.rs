//! CSV file data adapter.
//!
//! Reads `<TICKER>.csv` from a base directory. Expected header:
//! `Date,Open,High,Low,Close[,Volume]`, with dates as `YYYY-MM-DD` or
//! `M/D/YYYY`.

use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::domain::bar::PriceBar;
use crate::domain::error::TrendError;
use crate::domain::series::PriceSeries;
use crate::domain::ticker::is_ticker_symbol;
use crate::ports::data_port::{BarInterval, PriceDataPort};

const SOURCE: &str = "csv";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    /// Parse CSV content into bars in file order.
    pub fn parse_bars(content: &str) -> Result<Vec<PriceBar>, TrendError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result
                .map_err(|e| TrendError::fetch(SOURCE, format!("CSV parse error: {}", e)))?;
            if record.iter().all(|f| f.is_empty()) {
                continue;
            }
            // header is line 1
            let row = line + 2;

            let date_str = record
                .get(0)
                .ok_or_else(|| TrendError::fetch(SOURCE, format!("row {row}: missing date")))?;
            let date = parse_date(date_str).ok_or_else(|| {
                TrendError::fetch(SOURCE, format!("row {row}: invalid date '{date_str}'"))
            })?;

            let open = price_field(&record, 1, "open", row)?;
            let high = price_field(&record, 2, "high", row)?;
            let low = price_field(&record, 3, "low", row)?;
            let close = price_field(&record, 4, "close", row)?;
            let volume = volume_field(&record, 5, row)?;

            bars.push(PriceBar::daily(date, open, high, low, close, volume));
        }

        Ok(bars)
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .ok()
}

fn price_field(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
    row: usize,
) -> Result<f64, TrendError> {
    let raw = record
        .get(idx)
        .ok_or_else(|| TrendError::fetch(SOURCE, format!("row {row}: missing {name} column")))?;
    let value: f64 = raw.parse().map_err(|e| {
        TrendError::fetch(SOURCE, format!("row {row}: invalid {name} value '{raw}': {e}"))
    })?;
    if !value.is_finite() {
        return Err(TrendError::fetch(
            SOURCE,
            format!("row {row}: non-finite {name} value"),
        ));
    }
    Ok(value)
}

fn volume_field(
    record: &csv::StringRecord,
    idx: usize,
    row: usize,
) -> Result<Option<u64>, TrendError> {
    match record.get(idx) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .map(|v| v as u64)
            })
            .map(Some)
            .ok_or_else(|| {
                TrendError::fetch(SOURCE, format!("row {row}: invalid volume value '{raw}'"))
            }),
    }
}

impl PriceDataPort for CsvAdapter {
    fn name(&self) -> &str {
        SOURCE
    }

    fn fetch_series(
        &self,
        ticker: &str,
        lookback_days: u32,
        interval: BarInterval,
    ) -> Result<PriceSeries, TrendError> {
        if interval != BarInterval::Daily {
            return Err(TrendError::InvalidInput {
                reason: format!("interval {interval} not supported for CSV files"),
            });
        }
        // the ticker becomes a file name under base_path
        if !is_ticker_symbol(ticker) {
            return Err(TrendError::InvalidInput {
                reason: format!("invalid ticker '{ticker}'"),
            });
        }

        let path = self.csv_path(ticker);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TrendError::NoData {
                    ticker: ticker.to_string(),
                });
            }
            Err(e) => {
                return Err(TrendError::fetch(
                    SOURCE,
                    format!("failed to read {}: {}", path.display(), e),
                ));
            }
        };

        let series = PriceSeries::from_unsorted(Self::parse_bars(&content)?)?;
        let Some(last_date) = series.last().map(|b| b.date()) else {
            return Err(TrendError::NoData {
                ticker: ticker.to_string(),
            });
        };
        let cutoff = last_date - chrono::Duration::days(i64::from(lookback_days));
        let bars: Vec<PriceBar> = series
            .into_bars()
            .into_iter()
            .filter(|b| b.date() > cutoff)
            .collect();

        tracing::debug!(
            ticker,
            path = %path.display(),
            bars = bars.len(),
            "loaded CSV series"
        );
        PriceSeries::new(bars)
    }
}
