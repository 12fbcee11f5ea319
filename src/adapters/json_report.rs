//! JSON report adapter (`--json`).

use serde::Serialize;

use crate::domain::error::TrendError;
use crate::domain::momentum::MomentumSummary;
use crate::domain::quote::QuoteSnapshot;
use crate::domain::report::TrendReport;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter;

fn to_pretty<T: Serialize>(value: &T) -> Result<String, TrendError> {
    serde_json::to_string_pretty(value).map_err(|e| TrendError::Report {
        reason: format!("JSON serialization failed: {e}"),
    })
}

/// Momentum output adds the suggestion text next to the numbers.
#[derive(Serialize)]
struct MomentumJson<'a> {
    #[serde(flatten)]
    summary: &'a MomentumSummary,
    suggestion: &'static str,
}

impl ReportPort for JsonReportAdapter {
    fn render_trend(&self, report: &TrendReport) -> Result<String, TrendError> {
        to_pretty(report)
    }

    fn render_quote(&self, quote: &QuoteSnapshot) -> Result<String, TrendError> {
        to_pretty(quote)
    }

    fn render_momentum(&self, summary: &MomentumSummary) -> Result<String, TrendError> {
        to_pretty(&MomentumJson {
            summary,
            suggestion: summary.suggestion(),
        })
    }
}
