//! HTTP health endpoint.
//!
//! `GET /health` and `GET /` run the aggregator and answer 200 when healthy,
//! 503 otherwise, with the serialized report as the body.

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::{HealthAggregator, HealthReport};
use crate::types::Result;

pub fn router(aggregator: HealthAggregator) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .with_state(aggregator)
}

/// GET /health
async fn health_check(
    State(aggregator): State<HealthAggregator>,
) -> (StatusCode, Json<HealthReport>) {
    let report = aggregator.get_health().await;
    let status =
        StatusCode::from_u16(report.http_status_code()).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
    (status, Json(report))
}

/// Bind `addr` and serve until `cancel` fires.
pub async fn serve(
    addr: SocketAddr,
    aggregator: HealthAggregator,
    cancel: CancellationToken,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_listener(listener, aggregator, cancel).await
}

/// Serve on an already-bound listener until `cancel` fires.
pub async fn serve_listener(
    listener: TcpListener,
    aggregator: HealthAggregator,
    cancel: CancellationToken,
) -> Result<()> {
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "health_endpoint_listening");

    axum::serve(listener, router(aggregator))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    tracing::info!("health_endpoint_stopped");
    Ok(())
}
