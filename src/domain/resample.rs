//! Intraday bar aggregation (e.g. 1-hour bars merged into 4-hour bars).

use chrono::{NaiveDateTime, Timelike};

use crate::domain::bar::PriceBar;

fn bucket_start(ts: NaiveDateTime, hours: u32) -> NaiveDateTime {
    let hour = ts.hour() / hours * hours;
    ts.date().and_hms_opt(hour, 0, 0).unwrap_or(ts)
}

/// Merge consecutive bars that share a `hours`-wide bucket of the same day.
///
/// Input must be ordered by timestamp. Each output bar is stamped with its
/// bucket start and takes the first open, highest high, lowest low, last
/// close and summed volume of its members.
pub fn aggregate_bars(bars: &[PriceBar], hours: u32) -> Vec<PriceBar> {
    if hours <= 1 {
        return bars.to_vec();
    }

    let mut out: Vec<PriceBar> = Vec::new();
    for bar in bars {
        let key = bucket_start(bar.timestamp, hours);
        match out.last_mut() {
            Some(agg) if agg.timestamp == key => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume = match (agg.volume, bar.volume) {
                    (Some(a), Some(b)) => Some(a + b),
                    (a, b) => a.or(b),
                };
            }
            _ => out.push(PriceBar {
                timestamp: key,
                ..bar.clone()
            }),
        }
    }
    out
}
