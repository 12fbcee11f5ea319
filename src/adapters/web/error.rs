//! HTTP error responses for the API adapter.
//!
//! Errors are returned as `{"detail": "..."}` with the matching status code.

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::error::TrendError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    pub fn no_data() -> Self {
        Self::not_found("No data for ticker")
    }

    /// Errors raised while fetching bars from the data port.
    pub fn from_fetch(err: TrendError) -> Self {
        match err {
            TrendError::NoData { .. } => Self::no_data(),
            invalid @ TrendError::InvalidInput { .. } => Self::bad_request(invalid.to_string()),
            other => Self::internal(format!("Error fetching data: {other}")),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

pub fn status_from_error(err: &TrendError) -> StatusCode {
    match err {
        TrendError::InvalidWindow { .. } | TrendError::InvalidInput { .. } => {
            StatusCode::BAD_REQUEST
        }
        TrendError::NoData { .. } => StatusCode::NOT_FOUND,
        TrendError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TrendError::DataFetch { .. } | TrendError::Screener { .. } => StatusCode::BAD_GATEWAY,
        TrendError::UnorderedSeries { .. }
        | TrendError::ConfigParse { .. }
        | TrendError::ConfigMissing { .. }
        | TrendError::ConfigInvalid { .. }
        | TrendError::Report { .. }
        | TrendError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TrendError> for ApiError {
    fn from(err: TrendError) -> Self {
        match err {
            TrendError::NoData { .. } => Self::no_data(),
            other => Self::new(status_from_error(&other), other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, detail = %self.detail, "request failed");
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_errors_map_to_client_statuses() {
        let bad: ApiError = TrendError::InvalidWindow { window: 1 }.into();
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let short: ApiError = TrendError::InsufficientData {
            bars: 3,
            required: 5,
        }
        .into();
        assert_eq!(short.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(short.detail, "insufficient data: have 3 bars, need 5");
    }

    #[test]
    fn fetch_failures_are_internal_errors() {
        let err = ApiError::from_fetch(TrendError::fetch("yahoo_finance", "timed out"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.detail.starts_with("Error fetching data: "));
        assert!(err.detail.contains("timed out"));
    }

    #[test]
    fn unsupported_request_from_source_is_bad_request() {
        let err = ApiError::from_fetch(TrendError::InvalidInput {
            reason: "interval 1h not supported for CSV files".into(),
        });
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.detail.contains("1h"));
    }

    #[test]
    fn no_data_is_not_found() {
        let err = ApiError::from_fetch(TrendError::NoData {
            ticker: "ZZZZ".into(),
        });
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.detail, "No data for ticker");
    }
}
