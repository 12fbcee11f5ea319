#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use trendlens::domain::bar::PriceBar;
use trendlens::domain::error::TrendError;
use trendlens::domain::series::PriceSeries;
use trendlens::ports::data_port::{BarInterval, PriceDataPort};

/// In-memory data port. Returns every stored bar regardless of lookback and
/// interval, and records what it was asked for.
pub struct MockPriceDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub requests: Mutex<Vec<(String, u32, BarInterval)>>,
}

impl MockPriceDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_closes(self, ticker: &str, closes: &[f64]) -> Self {
        let bars = bars_from_closes("2024-01-01", closes);
        self.with_bars(ticker, bars)
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn last_lookback(&self) -> Option<u32> {
        self.requests.lock().unwrap().last().map(|(_, days, _)| *days)
    }

    pub fn last_interval(&self) -> Option<BarInterval> {
        self.requests.lock().unwrap().last().map(|(_, _, interval)| *interval)
    }
}

impl PriceDataPort for MockPriceDataPort {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch_series(
        &self,
        ticker: &str,
        lookback_days: u32,
        interval: BarInterval,
    ) -> Result<PriceSeries, TrendError> {
        self.requests
            .lock()
            .unwrap()
            .push((ticker.to_string(), lookback_days, interval));
        if let Some(reason) = self.errors.get(ticker) {
            return Err(TrendError::fetch("mock", reason.clone()));
        }
        match self.data.get(ticker) {
            Some(bars) => PriceSeries::new(bars.clone()),
            None => Err(TrendError::NoData {
                ticker: ticker.to_string(),
            }),
        }
    }
}

/// Daily bars on consecutive calendar days. Each bar opens at the previous
/// close (the first at its own close) and spans +/-0.5 around the close.
pub fn bars_from_closes(start: &str, closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    let mut prev = closes.first().copied().unwrap_or(0.0);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let open = prev;
            prev = c;
            PriceBar::daily(
                start + chrono::Duration::days(i as i64),
                open,
                open.max(c) + 0.5,
                open.min(c) - 0.5,
                c,
                Some(1_000_000),
            )
        })
        .collect()
}

/// A gently oscillating series of `count` closes around `base`.
pub fn generate_closes(count: usize, base: f64, drift: f64) -> Vec<f64> {
    (0..count)
        .map(|i| base + drift * i as f64 + (i as f64 * 0.7).sin())
        .collect()
}
