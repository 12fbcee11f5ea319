//! Descriptive statistics over closing-price windows.
//!
//! Every helper guards its divisor and returns 0 instead of NaN or infinity,
//! so callers can compare results directly against thresholds.

/// (to - from) / from * 100, or 0 when `from` is 0.
pub fn pct_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    (to - from) / from * 100.0
}

/// Width of `[lo, hi]` as a percentage of its midpoint.
pub fn range_width_pct(hi: f64, lo: f64) -> f64 {
    let mid = (hi + lo) / 2.0;
    if mid == 0.0 {
        return 0.0;
    }
    (hi - lo) / mid * 100.0
}

/// Net move over range traveled. 0 when the range is empty.
pub fn efficiency(net_change_pct: f64, range_width_pct: f64) -> f64 {
    if range_width_pct > 0.0 {
        net_change_pct.abs() / range_width_pct
    } else {
        0.0
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (divisor n - 1). 0 for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Day-over-day percentage returns; one fewer entry than `closes`.
pub fn daily_returns_pct(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| pct_change(w[0], w[1])).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Ordinary least squares of `ys` against x = 0, 1, ..., n-1.
pub fn linear_fit(ys: &[f64]) -> LinearFit {
    let n = ys.len();
    if n < 2 || ys.iter().all(|&y| y == ys[0]) {
        // Zero total variance; the mean of repeated values can drift by an ulp.
        return LinearFit {
            slope: 0.0,
            intercept: ys.first().copied().unwrap_or(0.0),
            r_squared: 0.0,
        };
    }
    let y_mean = mean(ys);

    let x_mean = (n - 1) as f64 / 2.0;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &y) in ys.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, &y) in ys.iter().enumerate() {
        let fitted = intercept + slope * i as f64;
        ss_res += (y - fitted).powi(2);
        ss_tot += (y - y_mean).powi(2);
    }
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    };

    LinearFit {
        slope,
        intercept,
        r_squared,
    }
}
