//! HTTP API adapter.
//!
//! JSON endpoints for chart candles, trend classification and momentum,
//! served by axum with permissive CORS and request tracing.

mod error;
mod handlers;

pub use error::{ApiError, status_from_error};
pub use handlers::*;

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::error::TrendError;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;

pub struct AppState {
    pub data_port: Arc<dyn PriceDataPort + Send + Sync>,
    pub config: Arc<dyn ConfigPort + Send + Sync>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/daily/{ticker}", get(handlers::daily))
        .route("/api/trend/{ticker}", get(handlers::trend))
        .route("/api/momentum/{ticker}", get(handlers::momentum))
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), TrendError> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API listening");
    axum::serve(listener, router).await?;
    Ok(())
}
