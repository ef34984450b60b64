// GET handlers: metrics, healthz, version

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET / — plain pointer to the metrics endpoint.
pub(super) async fn root_handler() -> &'static str {
    "Tdarr exporter. Metrics are served at /metrics\n"
}

/// GET /healthz — liveness only; does not reflect poll results.
pub(super) async fn healthz_handler() -> StatusCode {
    StatusCode::OK
}

/// GET /metrics — current gauge values in the Prometheus text format.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(body) => (
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, operation = "encode_metrics", "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}

/// GET /version — service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}
