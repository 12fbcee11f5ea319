//! HTTP request handlers for the API adapter.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::domain::classifier::ClassifierMode;
use crate::domain::config_validation::{
    build_classifier_config, configured_api_days, configured_window,
};
use crate::domain::momentum::{MIN_MOMENTUM_BARS, MomentumSummary};
use crate::domain::report::{DailyCandles, TrendReport};
use crate::domain::series::PriceSeries;
use crate::domain::ticker;
use crate::ports::data_port::{BarInterval, lookback_for_window};

use super::{AppState, ApiError};

/// Calendar days requested for momentum; comfortably above the bar minimum.
const MOMENTUM_LOOKBACK_DAYS: u32 = 180;

fn normalize_ticker(raw: &str) -> Result<String, ApiError> {
    if raw.trim().is_empty() {
        return Err(ApiError::bad_request("Ticker is required"));
    }
    Ok(ticker::normalize_ticker(raw)?)
}

/// Runs the blocking data port on the blocking pool.
async fn fetch(
    state: &Arc<AppState>,
    ticker: &str,
    days: u32,
    interval: BarInterval,
) -> Result<PriceSeries, ApiError> {
    let port = Arc::clone(&state.data_port);
    let owned = ticker.to_string();
    let series = tokio::task::spawn_blocking(move || port.fetch_series(&owned, days, interval))
        .await
        .map_err(|e| ApiError::internal(format!("Error fetching data: {e}")))?
        .map_err(ApiError::from_fetch)?;

    if series.is_empty() {
        return Err(ApiError::no_data());
    }
    Ok(series)
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub days: Option<u32>,
    /// `1d` (default), `1h` or `4h`
    pub interval: Option<String>,
}

pub async fn daily(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    query: Result<Query<DailyQuery>, QueryRejection>,
) -> Result<Json<DailyCandles>, ApiError> {
    let Query(query) = query?;
    let ticker = normalize_ticker(&ticker)?;
    let days = query
        .days
        .unwrap_or_else(|| configured_api_days(state.config.as_ref()));
    if days == 0 {
        return Err(ApiError::bad_request("days must be at least 1"));
    }
    let interval = match query.interval.as_deref() {
        Some(raw) => raw.parse::<BarInterval>()?,
        None => BarInterval::Daily,
    };

    let series = fetch(&state, &ticker, days, interval).await?;
    tracing::debug!(%ticker, days, %interval, bars = series.len(), "candles");
    Ok(Json(DailyCandles::from_series(&ticker, &series)))
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub window: Option<usize>,
    pub mode: Option<String>,
}

pub async fn trend(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    query: Result<Query<TrendQuery>, QueryRejection>,
) -> Result<Json<TrendReport>, ApiError> {
    let Query(query) = query?;
    let ticker = normalize_ticker(&ticker)?;
    let window = query
        .window
        .unwrap_or_else(|| configured_window(state.config.as_ref()));
    if window < 2 {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("invalid window {window}: need at least 2 bars"),
        ));
    }
    let mode = query
        .mode
        .as_deref()
        .map(str::parse::<ClassifierMode>)
        .transpose()?;
    let config = build_classifier_config(state.config.as_ref(), mode)?;

    let series = fetch(&state, &ticker, lookback_for_window(window), BarInterval::Daily).await?;
    let report = TrendReport::build(&ticker, &series, window, &config)?;
    Ok(Json(report))
}

pub async fn momentum(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ticker = normalize_ticker(&ticker)?;
    let series = fetch(&state, &ticker, MOMENTUM_LOOKBACK_DAYS, BarInterval::Daily).await?;
    let summary = MomentumSummary::analyze(&ticker, &series)?;

    let mut body = serde_json::to_value(&summary)
        .map_err(|e| ApiError::internal(format!("serialization failed: {e}")))?;
    if let Some(obj) = body.as_object_mut() {
        obj.insert("suggestion".into(), json!(summary.suggestion()));
        obj.insert("minBars".into(), json!(MIN_MOMENTUM_BARS));
    }
    Ok(Json(body))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}
