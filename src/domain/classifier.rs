//! Trend classification over a trailing window of daily bars.
//!
//! A single [`classify`] entry point covers both rule sets that grew up
//! around this heuristic. [`ClassifierConfig`] selects where the range width
//! comes from ([`RangeSource`]) and whether thresholds are fixed or scale
//! with the window length ([`ThresholdMode`]). The refined configuration
//! (high/low range with dynamic thresholds) is the default.
//!
//! Trend rules are evaluated in priority order and the first match wins:
//!
//! | # | condition                                   | label                     |
//! |---|---------------------------------------------|---------------------------|
//! | 1 | gap and consolidation                       | Consolidation after gap   |
//! | 2 | consolidation                               | Consolidation             |
//! | 3 | net >= min net and efficiency >= 0.45       | Uptrend                   |
//! | 4 | net <= -min net and efficiency >= 0.45      | Downtrend                 |
//! | 5 | otherwise                                   | Sideways                  |
//!
//! The structure label is an independent 2x2 over fit quality and volatility.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::TrendError;
use crate::domain::series::{PriceSeries, TrendWindow};
use crate::domain::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeSource {
    /// Max/min close within the window.
    Close,
    /// Max high / min low within the window.
    HighLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThresholdMode {
    Fixed,
    Dynamic,
}

/// Named presets accepted on the command line and in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierMode {
    Simple,
    Refined,
}

impl FromStr for ClassifierMode {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(ClassifierMode::Simple),
            "refined" => Ok(ClassifierMode::Refined),
            other => Err(TrendError::InvalidInput {
                reason: format!("unknown classifier mode '{other}' (expected simple or refined)"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    pub range_source: RangeSource,
    pub threshold_mode: ThresholdMode,
    pub gap_threshold_pct: f64,
    pub consolidation_efficiency_max: f64,
    pub trend_efficiency_min: f64,
    pub high_fit_r_squared: f64,
    pub high_vol_std_pct: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::refined()
    }
}

impl ClassifierConfig {
    pub const DEFAULT_GAP_THRESHOLD_PCT: f64 = 3.0;

    /// High/low range, dynamic thresholds.
    pub fn refined() -> Self {
        Self {
            range_source: RangeSource::HighLow,
            threshold_mode: ThresholdMode::Dynamic,
            gap_threshold_pct: Self::DEFAULT_GAP_THRESHOLD_PCT,
            consolidation_efficiency_max: 0.40,
            trend_efficiency_min: 0.45,
            high_fit_r_squared: 0.55,
            high_vol_std_pct: 1.5,
        }
    }

    /// Close-only range, fixed percentage thresholds.
    pub fn simple() -> Self {
        Self {
            range_source: RangeSource::Close,
            threshold_mode: ThresholdMode::Fixed,
            ..Self::refined()
        }
    }

    pub fn for_mode(mode: ClassifierMode) -> Self {
        match mode {
            ClassifierMode::Simple => Self::simple(),
            ClassifierMode::Refined => Self::refined(),
        }
    }
}

// Fixed-mode thresholds, percent.
const FIXED_GAP_BAND_MAX: f64 = 6.0;
const FIXED_GAP_NET_MAX: f64 = 3.0;
const FIXED_BAND_MAX: f64 = 4.0;
const FIXED_NET_MAX: f64 = 2.0;
const FIXED_TREND_NET_MIN: f64 = 2.0;

/// Widest range (percent) still treated as a consolidation band for window `n`.
pub fn band_cap(n: usize) -> f64 {
    let extra = n.saturating_sub(5) as f64;
    (4.0 + 0.25 * extra).min(18.0)
}

/// Smallest absolute net move (percent) that counts as a trend for window `n`.
pub fn min_net_for_trend(n: usize) -> f64 {
    (0.12 * n as f64).max(3.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLabel {
    #[serde(rename = "Consolidation after gap")]
    ConsolidationAfterGap,
    #[serde(rename = "Consolidation")]
    Consolidation,
    #[serde(rename = "Uptrend")]
    Uptrend,
    #[serde(rename = "Downtrend")]
    Downtrend,
    #[serde(rename = "Sideways")]
    Sideways,
}

impl TrendLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::ConsolidationAfterGap => "Consolidation after gap",
            TrendLabel::Consolidation => "Consolidation",
            TrendLabel::Uptrend => "Uptrend",
            TrendLabel::Downtrend => "Downtrend",
            TrendLabel::Sideways => "Sideways",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureLabel {
    #[serde(rename = "Strong, volatile trend")]
    StrongVolatileTrend,
    #[serde(rename = "Chaotic / whipsaw")]
    ChaoticWhipsaw,
    #[serde(rename = "Smooth, steady trend")]
    SmoothSteadyTrend,
    #[serde(rename = "Quiet consolidation / drift")]
    QuietDrift,
}

impl StructureLabel {
    pub fn from_flags(high_vol: bool, high_fit: bool) -> Self {
        match (high_vol, high_fit) {
            (true, true) => StructureLabel::StrongVolatileTrend,
            (true, false) => StructureLabel::ChaoticWhipsaw,
            (false, true) => StructureLabel::SmoothSteadyTrend,
            (false, false) => StructureLabel::QuietDrift,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StructureLabel::StrongVolatileTrend => "Strong, volatile trend",
            StructureLabel::ChaoticWhipsaw => "Chaotic / whipsaw",
            StructureLabel::SmoothSteadyTrend => "Smooth, steady trend",
            StructureLabel::QuietDrift => "Quiet consolidation / drift",
        }
    }
}

impl fmt::Display for StructureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All metrics for one window. Percentages are in percent units, not fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub window: usize,
    pub start_close: f64,
    pub end_close: f64,
    pub net_change_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_pct: Option<f64>,
    pub is_gap: bool,
    pub range_width_pct: f64,
    pub efficiency: f64,
    pub slope_pct_per_day: f64,
    pub r_squared: f64,
    pub daily_vol_std_pct: f64,
    pub trend_label: TrendLabel,
    pub structure_label: StructureLabel,
}

/// Classify the last `window` bars of `series`.
///
/// Fails with [`TrendError::InvalidWindow`] when `window < 2` and with
/// [`TrendError::InsufficientData`] when the series is shorter than the
/// window. A missing prior bar only drops the gap fields.
pub fn classify(
    series: &PriceSeries,
    window: usize,
    config: &ClassifierConfig,
) -> Result<ClassificationResult, TrendError> {
    let view = TrendWindow::new(series, window)?;
    Ok(classify_window(&view, config))
}

pub fn classify_window(view: &TrendWindow<'_>, config: &ClassifierConfig) -> ClassificationResult {
    let n = view.len();
    let closes = view.closes();
    let start_close = view.first().close;
    let end_close = view.last().close;

    let net_change_pct = stats::pct_change(start_close, end_close);

    let gap_pct = view
        .prior()
        .filter(|p| p.close != 0.0)
        .map(|p| stats::pct_change(p.close, view.first().open));
    let is_gap = gap_pct.is_some_and(|g| g.abs() >= config.gap_threshold_pct);

    let (hi, lo) = match config.range_source {
        RangeSource::HighLow => view.bars().iter().fold(
            (f64::NEG_INFINITY, f64::INFINITY),
            |(hi, lo), b| (hi.max(b.high), lo.min(b.low)),
        ),
        RangeSource::Close => closes
            .iter()
            .fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), &c| {
                (hi.max(c), lo.min(c))
            }),
    };
    let range_width_pct = stats::range_width_pct(hi, lo);
    let efficiency = stats::efficiency(net_change_pct, range_width_pct);

    let fit = stats::linear_fit(&closes);
    let mean_close = stats::mean(&closes);
    let slope_pct_per_day = if mean_close == 0.0 {
        0.0
    } else {
        fit.slope / mean_close * 100.0
    };

    let daily_vol_std_pct = stats::sample_std(&stats::daily_returns_pct(&closes));

    let trend_label = match config.threshold_mode {
        ThresholdMode::Dynamic => {
            dynamic_trend(n, net_change_pct, is_gap, range_width_pct, efficiency, config)
        }
        ThresholdMode::Fixed => fixed_trend(net_change_pct, is_gap, range_width_pct),
    };

    let structure_label = StructureLabel::from_flags(
        daily_vol_std_pct >= config.high_vol_std_pct,
        fit.r_squared >= config.high_fit_r_squared,
    );

    ClassificationResult {
        window: n,
        start_close,
        end_close,
        net_change_pct,
        gap_pct,
        is_gap,
        range_width_pct,
        efficiency,
        slope_pct_per_day,
        r_squared: fit.r_squared,
        daily_vol_std_pct,
        trend_label,
        structure_label,
    }
}

fn dynamic_trend(
    n: usize,
    net: f64,
    is_gap: bool,
    range: f64,
    efficiency: f64,
    config: &ClassifierConfig,
) -> TrendLabel {
    let min_net = min_net_for_trend(n);
    let is_consolidation = range <= band_cap(n)
        && efficiency <= config.consolidation_efficiency_max
        && net.abs() < min_net;

    if is_gap && is_consolidation {
        TrendLabel::ConsolidationAfterGap
    } else if is_consolidation {
        TrendLabel::Consolidation
    } else if net >= min_net && efficiency >= config.trend_efficiency_min {
        TrendLabel::Uptrend
    } else if net <= -min_net && efficiency >= config.trend_efficiency_min {
        TrendLabel::Downtrend
    } else {
        TrendLabel::Sideways
    }
}

fn fixed_trend(net: f64, is_gap: bool, range: f64) -> TrendLabel {
    if is_gap && range <= FIXED_GAP_BAND_MAX && net.abs() <= FIXED_GAP_NET_MAX {
        TrendLabel::ConsolidationAfterGap
    } else if range <= FIXED_BAND_MAX && net.abs() <= FIXED_NET_MAX {
        TrendLabel::Consolidation
    } else if net >= FIXED_TREND_NET_MIN {
        TrendLabel::Uptrend
    } else if net <= -FIXED_TREND_NET_MIN {
        TrendLabel::Downtrend
    } else {
        TrendLabel::Sideways
    }
}
