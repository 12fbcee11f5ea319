//! HTTP client for the external options screener service.

use std::time::Duration;

use crate::domain::error::TrendError;
use crate::domain::screen::{HealthStatus, ScreenRequest, ScreenResponse};
use crate::ports::screen_port::ScreenPort;

pub const DEFAULT_BASE_URL: &str = "http://localhost:7070";
pub const BASE_URL_ENV: &str = "STREETLENS_BASE_URL";
pub const DEFAULT_SCREEN_TIMEOUT: Duration = Duration::from_secs(20);
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Pick the screener base URL: explicit flag, then environment, then
/// config, then the local default. Trailing slashes are removed.
pub fn resolve_base_url(
    flag: Option<&str>,
    env: Option<&str>,
    config: Option<&str>,
) -> String {
    [flag, env, config]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .trim_end_matches('/')
        .to_string()
}

pub struct ScreenerClient {
    client: reqwest::blocking::Client,
    base_url: String,
    screen_timeout: Duration,
}

impl ScreenerClient {
    pub fn new(base_url: &str, screen_timeout: Duration) -> Result<Self, TrendError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| TrendError::Screener {
                status: None,
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            screen_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

fn transport_error(e: reqwest::Error) -> TrendError {
    TrendError::Screener {
        status: e.status().map(|s| s.as_u16()),
        reason: e.to_string(),
    }
}

impl ScreenPort for ScreenerClient {
    fn screen(&self, request: &ScreenRequest) -> Result<ScreenResponse, TrendError> {
        let url = self.endpoint("screen");
        tracing::debug!(%url, csv = %request.csv_path, "requesting screen");

        let resp = self
            .client
            .get(&url)
            .query(&request.query_pairs())
            .timeout(self.screen_timeout)
            .send()
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(TrendError::Screener {
                status: Some(status.as_u16()),
                reason: format!("HTTP {status}: {}", body.trim()),
            });
        }

        resp.json::<ScreenResponse>().map_err(|e| TrendError::Screener {
            status: Some(status.as_u16()),
            reason: format!("invalid screen response: {e}"),
        })
    }

    fn health(&self) -> Result<HealthStatus, TrendError> {
        let resp = self
            .client
            .get(self.endpoint("health"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .map_err(transport_error)?;

        let status_code = resp.status().as_u16();
        let body = resp.text().map_err(transport_error)?;
        Ok(HealthStatus { status_code, body })
    }
}
