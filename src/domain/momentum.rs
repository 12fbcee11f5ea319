//! Moving-average bias summary: SMA(20) vs SMA(50), RSI(14), annualized volatility.
//!
//! RSI uses Wilder's smoothing:
//! - first average: simple mean of gains/losses over the first `period` changes
//! - subsequent: avg = (prev_avg * (period - 1) + current) / period
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), or 100 when there are no losses.

use serde::Serialize;
use std::fmt;

use crate::domain::bar::PriceBar;
use crate::domain::error::TrendError;
use crate::domain::series::PriceSeries;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

pub const MIN_MOMENTUM_BARS: usize = 60;
const FAST_PERIOD: usize = 20;
const SLOW_PERIOD: usize = 50;
const RSI_PERIOD: usize = 14;
const BIAS_BAND: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bias {
    Bullish,
    Bearish,
    Sideways,
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Bias::Bullish => "BULLISH",
            Bias::Bearish => "BEARISH",
            Bias::Sideways => "SIDEWAYS",
        };
        f.write_str(s)
    }
}

/// Fractional close-to-close returns.
pub fn simple_returns(bars: &[PriceBar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| (w[1].close - w[0].close) / w[0].close)
        .collect()
}

/// Mean of the last `period` closes.
pub fn sma(bars: &[PriceBar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    let window = &bars[bars.len() - period..];
    Some(window.iter().map(|b| b.close).sum::<f64>() / period as f64)
}

/// RSI of the final bar.
pub fn rsi(bars: &[PriceBar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() <= period {
        return None;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = bars[i].close - bars[i - 1].close;
        if change >= 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    for i in (period + 1)..bars.len() {
        let change = bars[i].close - bars[i - 1].close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Population standard deviation (divisor n).
pub fn population_std(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(var.sqrt())
}

pub fn annualized_vol(daily_returns: &[f64]) -> Option<f64> {
    population_std(daily_returns).map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumSummary {
    pub ticker: String,
    pub bars: usize,
    pub sma20: f64,
    pub sma50: f64,
    pub rsi14: f64,
    /// Fraction, e.g. 0.25 for 25%.
    pub annualized_vol: f64,
    pub bias: Bias,
}

impl MomentumSummary {
    pub fn analyze(ticker: &str, series: &PriceSeries) -> Result<Self, TrendError> {
        let bars = series.bars();
        if bars.len() < MIN_MOMENTUM_BARS {
            return Err(TrendError::InsufficientData {
                bars: bars.len(),
                required: MIN_MOMENTUM_BARS,
            });
        }

        let insufficient = || TrendError::InsufficientData {
            bars: bars.len(),
            required: MIN_MOMENTUM_BARS,
        };
        let sma20 = sma(bars, FAST_PERIOD).ok_or_else(insufficient)?;
        let sma50 = sma(bars, SLOW_PERIOD).ok_or_else(insufficient)?;
        let rsi14 = rsi(bars, RSI_PERIOD).ok_or_else(insufficient)?;
        let annualized_vol = annualized_vol(&simple_returns(bars)).ok_or_else(insufficient)?;

        let bias = if sma20 > sma50 * (1.0 + BIAS_BAND) {
            Bias::Bullish
        } else if sma20 < sma50 * (1.0 - BIAS_BAND) {
            Bias::Bearish
        } else {
            Bias::Sideways
        };

        Ok(Self {
            ticker: ticker.to_string(),
            bars: bars.len(),
            sma20,
            sma50,
            rsi14,
            annualized_vol,
            bias,
        })
    }

    pub fn suggestion(&self) -> &'static str {
        match self.bias {
            Bias::Bullish if self.rsi14 < 70.0 => {
                "Momentum up. Consider bullish structures (e.g., call spreads) if IV is reasonable."
            }
            Bias::Bearish if self.rsi14 > 30.0 => {
                "Momentum down. Consider bearish structures (e.g., put spreads) if thesis holds."
            }
            _ => {
                "Mixed/sideways. Consider waiting or neutral strategies (e.g., iron condors) if IV is elevated."
            }
        }
    }
}
