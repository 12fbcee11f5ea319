//! Ordered price series and the trailing window view used by the classifier.
//!
//! A [`PriceSeries`] is immutable once built and is strictly increasing by
//! timestamp. Construction never re-sorts: feeding bars out of order through
//! [`PriceSeries::new`] is rejected rather than repaired. Adapters that read
//! unordered sources go through [`PriceSeries::from_unsorted`] instead.

use crate::domain::bar::PriceBar;
use crate::domain::error::TrendError;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, TrendError> {
        if let Some(i) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(TrendError::UnorderedSeries { index: i + 1 });
        }
        Ok(Self { bars })
    }

    /// Sort by timestamp and keep the last bar seen for a repeated timestamp.
    pub fn from_unsorted(mut bars: Vec<PriceBar>) -> Result<Self, TrendError> {
        bars.sort_by_key(|b| b.timestamp);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self::new(deduped)
    }

    pub fn empty() -> Self {
        Self { bars: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Last `n` bars, or the whole series when shorter.
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    pub fn into_bars(self) -> Vec<PriceBar> {
        self.bars
    }
}

/// The last `N` bars of a series plus the bar just before them, if any.
///
/// Only built through [`TrendWindow::new`], so it always holds at least two bars.
#[derive(Debug, Clone, Copy)]
pub struct TrendWindow<'a> {
    bars: &'a [PriceBar],
    prior: Option<&'a PriceBar>,
}

impl<'a> TrendWindow<'a> {
    pub fn new(series: &'a PriceSeries, n: usize) -> Result<Self, TrendError> {
        if n < 2 {
            return Err(TrendError::InvalidWindow { window: n });
        }
        let len = series.len();
        if len < n {
            return Err(TrendError::InsufficientData {
                bars: len,
                required: n,
            });
        }
        let start = len - n;
        let prior = start.checked_sub(1).map(|i| &series.bars[i]);
        Ok(Self {
            bars: &series.bars[start..],
            prior,
        })
    }

    pub fn bars(&self) -> &'a [PriceBar] {
        self.bars
    }

    /// Bar just before the window; `None` when the window covers the series.
    pub fn prior(&self) -> Option<&'a PriceBar> {
        self.prior
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> &'a PriceBar {
        &self.bars[0]
    }

    pub fn last(&self) -> &'a PriceBar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
