//! Options screener access port.

use crate::domain::error::TrendError;
use crate::domain::screen::{HealthStatus, ScreenRequest, ScreenResponse};

pub trait ScreenPort {
    fn screen(&self, request: &ScreenRequest) -> Result<ScreenResponse, TrendError>;

    fn health(&self) -> Result<HealthStatus, TrendError>;
}
