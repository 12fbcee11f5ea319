//! Yahoo Finance data adapter.
//!
//! Fetches bars from the v8 chart API using a relative `range`, retrying
//! transient failures with exponential backoff. Rows with any missing OHLC
//! value are dropped. Four-hour bars are built from hourly bars.

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::bar::PriceBar;
use crate::domain::error::TrendError;
use crate::domain::resample::aggregate_bars;
use crate::domain::series::PriceSeries;
use crate::ports::data_port::{BarInterval, PriceDataPort};

const SOURCE: &str = "yahoo_finance";
pub const DEFAULT_CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    chart_url: reqwest::Url,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, TrendError> {
        Self::with_chart_url(DEFAULT_CHART_URL)
    }

    pub fn with_chart_url(chart_url: &str) -> Result<Self, TrendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| TrendError::fetch(SOURCE, format!("failed to build HTTP client: {e}")))?;
        let chart_url = reqwest::Url::parse(chart_url.trim_end_matches('/'))
            .map_err(|e| TrendError::fetch(SOURCE, format!("invalid chart URL '{chart_url}': {e}")))?;
        if chart_url.cannot_be_a_base() {
            return Err(TrendError::fetch(
                SOURCE,
                format!("chart URL '{chart_url}' cannot take a path"),
            ));
        }

        Ok(Self {
            client,
            chart_url,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// `{chart_url}/{ticker}?range={days}d&interval=..`, with the ticker
    /// encoded as a single path segment.
    fn request_url(&self, ticker: &str, lookback_days: u32, interval: BarInterval) -> reqwest::Url {
        let yahoo_interval = match interval {
            BarInterval::Daily => "1d",
            BarInterval::Hourly | BarInterval::FourHour => "1h",
        };
        let mut url = self.chart_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(ticker);
        }
        url.query_pairs_mut()
            .append_pair("range", &format!("{}d", lookback_days.max(1)))
            .append_pair("interval", yahoo_interval);
        url
    }

    fn parse_response(
        ticker: &str,
        resp: ChartResponse,
        interval: BarInterval,
    ) -> Result<Vec<PriceBar>, TrendError> {
        let result = match (resp.chart.result, resp.chart.error) {
            (Some(result), _) => result,
            (None, Some(err)) if err.code == "Not Found" => {
                return Err(TrendError::NoData {
                    ticker: ticker.to_string(),
                });
            }
            (None, Some(err)) => {
                return Err(TrendError::fetch(
                    SOURCE,
                    format!("{}: {}", err.code, err.description),
                ));
            }
            (None, None) => {
                return Err(TrendError::fetch(SOURCE, "empty result with no error"));
            }
        };

        let Some(data) = result.into_iter().next() else {
            return Err(TrendError::NoData {
                ticker: ticker.to_string(),
            });
        };
        // A valid symbol with no trading in range has no timestamp array.
        let timestamps = data.timestamp.unwrap_or_default();
        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let at = |v: &Vec<Option<f64>>| v.get(i).copied().flatten().filter(|x| x.is_finite());
            let (Some(open), Some(high), Some(low), Some(close)) =
                (at(&quote.open), at(&quote.high), at(&quote.low), at(&quote.close))
            else {
                continue;
            };
            let volume = quote.volume.get(i).copied().flatten();
            let timestamp = bar_timestamp(ts, interval).ok_or_else(|| {
                TrendError::fetch(SOURCE, format!("invalid timestamp: {ts}"))
            })?;
            bars.push(PriceBar {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        if bars.is_empty() {
            return Err(TrendError::NoData {
                ticker: ticker.to_string(),
            });
        }
        Ok(bars)
    }

    fn fetch_with_retry(
        &self,
        ticker: &str,
        lookback_days: u32,
        interval: BarInterval,
    ) -> Result<Vec<PriceBar>, TrendError> {
        let url = self.request_url(ticker, lookback_days, interval);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::warn!(ticker, attempt, ?delay, "retrying Yahoo request");
                std::thread::sleep(delay);
            }

            match self.client.get(url.clone()).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(TrendError::NoData {
                            ticker: ticker.to_string(),
                        });
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS
                        || status.is_server_error()
                    {
                        last_error = Some(TrendError::fetch(
                            SOURCE,
                            format!("HTTP {status} for {ticker}"),
                        ));
                        continue;
                    }

                    if !status.is_success() {
                        return Err(TrendError::fetch(
                            SOURCE,
                            format!("HTTP {status} for {ticker}"),
                        ));
                    }

                    let chart: ChartResponse = resp.json().map_err(|e| {
                        TrendError::fetch(
                            SOURCE,
                            format!("failed to parse response for {ticker}: {e}"),
                        )
                    })?;
                    return Self::parse_response(ticker, chart, interval);
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(TrendError::fetch(SOURCE, e.to_string()));
                }
                Err(e) => return Err(TrendError::fetch(SOURCE, e.to_string())),
            }
        }

        Err(last_error.unwrap_or_else(|| TrendError::fetch(SOURCE, "max retries exceeded")))
    }
}

/// Daily bars are keyed by session date at midnight; intraday bars keep
/// their UTC timestamp.
fn bar_timestamp(ts: i64, interval: BarInterval) -> Option<NaiveDateTime> {
    let dt = DateTime::from_timestamp(ts, 0)?.naive_utc();
    match interval {
        BarInterval::Daily => dt.date().and_hms_opt(0, 0, 0),
        BarInterval::Hourly | BarInterval::FourHour => Some(dt),
    }
}

impl PriceDataPort for YahooAdapter {
    fn name(&self) -> &str {
        SOURCE
    }

    fn fetch_series(
        &self,
        ticker: &str,
        lookback_days: u32,
        interval: BarInterval,
    ) -> Result<PriceSeries, TrendError> {
        let bars = self.fetch_with_retry(ticker, lookback_days, interval)?;
        let bars = match interval {
            BarInterval::FourHour => aggregate_bars(&bars, 4),
            BarInterval::Daily | BarInterval::Hourly => bars,
        };
        tracing::info!(ticker, %interval, bars = bars.len(), "fetched Yahoo series");
        PriceSeries::from_unsorted(bars)
    }
}
