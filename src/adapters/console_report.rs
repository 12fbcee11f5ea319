//! Plain-text report adapter for terminal output.

use std::fmt::Write;

use crate::domain::error::TrendError;
use crate::domain::momentum::MomentumSummary;
use crate::domain::quote::QuoteSnapshot;
use crate::domain::report::TrendReport;
use crate::ports::report_port::ReportPort;

const LABEL_WIDTH: usize = 20;

pub struct ConsoleReportAdapter;

fn line(out: &mut String, label: &str, value: impl std::fmt::Display) -> Result<(), TrendError> {
    writeln!(out, "{:<width$}{}", format!("{label}:"), value, width = LABEL_WIDTH).map_err(|e| {
        TrendError::Report {
            reason: e.to_string(),
        }
    })
}

fn header(out: &mut String, title: &str) -> Result<(), TrendError> {
    writeln!(out, "\n=== {title} ===").map_err(|e| TrendError::Report {
        reason: e.to_string(),
    })
}

impl ReportPort for ConsoleReportAdapter {
    fn render_trend(&self, report: &TrendReport) -> Result<String, TrendError> {
        let r = &report.result;
        let mut out = String::new();
        header(
            &mut out,
            &format!("{} — Past {} Trading Days", report.ticker, r.window),
        )?;
        line(&mut out, "As Of", report.as_of)?;
        line(&mut out, "Start Close", format!("{:.2}", r.start_close))?;
        line(&mut out, "End Close", format!("{:.2}", r.end_close))?;
        line(&mut out, "Net Change %", format!("{:.2}%", r.net_change_pct))?;
        if let Some(gap) = r.gap_pct {
            line(&mut out, "Gap vs prior %", format!("{gap:.2}%"))?;
        }
        line(
            &mut out,
            &format!("{}D Range Width %", r.window),
            format!("{:.2}%", r.range_width_pct),
        )?;
        line(&mut out, "Efficiency", format!("{:.2}", r.efficiency))?;
        line(&mut out, "Slope %/day", format!("{:.2}%", r.slope_pct_per_day))?;
        line(&mut out, "R²", format!("{:.2}", r.r_squared))?;
        line(&mut out, "Daily Vol %", format!("{:.2}%", r.daily_vol_std_pct))?;
        line(&mut out, "Trend", r.trend_label)?;
        line(&mut out, "Structure", r.structure_label)?;
        Ok(out)
    }

    fn render_quote(&self, quote: &QuoteSnapshot) -> Result<String, TrendError> {
        let mut out = String::new();
        header(&mut out, &quote.ticker)?;
        line(&mut out, "Price (last close)", format!("{:.2}", quote.last_close))?;
        if let (Some(prev), Some(change)) = (quote.prev_close, quote.day_change_pct) {
            line(&mut out, "Prev Close", format!("{prev:.2}"))?;
            line(&mut out, "Day Change %", format!("{change:.2}%"))?;
        }
        Ok(out)
    }

    fn render_momentum(&self, summary: &MomentumSummary) -> Result<String, TrendError> {
        let mut out = String::new();
        header(
            &mut out,
            &format!("{} — {} candles", summary.ticker, summary.bars),
        )?;
        line(&mut out, "SMA20", format!("{:.2}", summary.sma20))?;
        line(&mut out, "SMA50", format!("{:.2}", summary.sma50))?;
        line(&mut out, "RSI14", format!("{:.2}", summary.rsi14))?;
        line(
            &mut out,
            "Annualized Vol %",
            format!("{:.2}%", summary.annualized_vol * 100.0),
        )?;
        line(&mut out, "Bias", summary.bias)?;
        writeln!(out, "{}", summary.suggestion()).map_err(|e| TrendError::Report {
            reason: e.to_string(),
        })?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classifier::{ClassificationResult, StructureLabel, TrendLabel};
    use crate::domain::momentum::Bias;
    use chrono::NaiveDate;

    fn report(gap_pct: Option<f64>) -> TrendReport {
        TrendReport {
            ticker: "AAPL".to_string(),
            as_of: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            result: ClassificationResult {
                window: 5,
                start_close: 100.0,
                end_close: 105.0,
                net_change_pct: 5.0,
                gap_pct,
                is_gap: false,
                range_width_pct: 5.0,
                efficiency: 1.0,
                slope_pct_per_day: 1.2,
                r_squared: 0.9,
                daily_vol_std_pct: 1.1,
                trend_label: TrendLabel::Uptrend,
                structure_label: StructureLabel::SmoothSteadyTrend,
            },
        }
    }

    #[test]
    fn trend_block_has_aligned_labels() {
        let text = ConsoleReportAdapter.render_trend(&report(None)).unwrap();
        assert!(text.contains("=== AAPL — Past 5 Trading Days ==="));
        assert!(text.contains("Start Close:        100.00\n"));
        assert!(text.contains("Net Change %:       5.00%\n"));
        assert!(text.contains("5D Range Width %:   5.00%\n"));
        assert!(text.contains("Trend:              Uptrend\n"));
        assert!(text.contains("Structure:          Smooth, steady trend\n"));
        assert!(!text.contains("Gap vs prior"));
    }

    #[test]
    fn gap_line_printed_when_present() {
        let text = ConsoleReportAdapter
            .render_trend(&report(Some(-3.0)))
            .unwrap();
        assert!(text.contains("Gap vs prior %:     -3.00%\n"));
    }

    #[test]
    fn quote_omits_change_without_previous_close() {
        let quote = QuoteSnapshot {
            ticker: "MSFT".to_string(),
            last_close: 410.5,
            prev_close: None,
            day_change_pct: None,
        };
        let text = ConsoleReportAdapter.render_quote(&quote).unwrap();
        assert!(text.contains("=== MSFT ==="));
        assert!(text.contains("Price (last close): 410.50\n"));
        assert!(!text.contains("Day Change"));
    }

    #[test]
    fn momentum_ends_with_suggestion() {
        let summary = MomentumSummary {
            ticker: "NVDA".to_string(),
            bars: 120,
            sma20: 110.0,
            sma50: 100.0,
            rsi14: 60.0,
            annualized_vol: 0.35,
            bias: Bias::Bullish,
        };
        let text = ConsoleReportAdapter.render_momentum(&summary).unwrap();
        assert!(text.contains("Annualized Vol %:   35.00%\n"));
        assert!(text.trim_end().ends_with(summary.suggestion()));
    }
}
