//! Report rendering port.

use crate::domain::error::TrendError;
use crate::domain::momentum::MomentumSummary;
use crate::domain::quote::QuoteSnapshot;
use crate::domain::report::TrendReport;

/// Port for turning analysis results into printable text.
pub trait ReportPort {
    fn render_trend(&self, report: &TrendReport) -> Result<String, TrendError>;

    fn render_quote(&self, quote: &QuoteSnapshot) -> Result<String, TrendError>;

    fn render_momentum(&self, summary: &MomentumSummary) -> Result<String, TrendError>;
}
