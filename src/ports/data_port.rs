//! Price data access port.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::TrendError;
use crate::domain::series::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarInterval {
    Daily,
    Hourly,
    /// Built from hourly bars by the provider.
    FourHour,
}

impl BarInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarInterval::Daily => "1d",
            BarInterval::Hourly => "1h",
            BarInterval::FourHour => "4h",
        }
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarInterval {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" | "daily" => Ok(BarInterval::Daily),
            "1h" | "60m" | "hourly" => Ok(BarInterval::Hourly),
            "4h" => Ok(BarInterval::FourHour),
            other => Err(TrendError::InvalidInput {
                reason: format!("unsupported interval '{other}' (expected 1d, 1h or 4h)"),
            }),
        }
    }
}

/// Which concrete provider backs the data port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    Yahoo,
    Csv,
}

impl FromStr for DataSourceKind {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(DataSourceKind::Yahoo),
            "csv" => Ok(DataSourceKind::Csv),
            other => Err(TrendError::InvalidInput {
                reason: format!("unknown data source '{other}' (expected yahoo or csv)"),
            }),
        }
    }
}

/// Calendar days to request so that `window + 1` trading days survive
/// weekends and holidays.
pub fn lookback_for_window(window: usize) -> u32 {
    let days = window.saturating_add(window / 2).saturating_add(7);
    u32::try_from(days).unwrap_or(u32::MAX)
}

pub trait PriceDataPort {
    fn name(&self) -> &str;

    /// Bars covering roughly the last `lookback_days` calendar days, oldest first.
    fn fetch_series(
        &self,
        ticker: &str,
        lookback_days: u32,
        interval: BarInterval,
    ) -> Result<PriceSeries, TrendError>;
}
