// HTTP routes: exposition, liveness, identity

mod http;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::metrics::ExporterMetrics;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) metrics: ExporterMetrics,
}

pub fn app(metrics: ExporterMetrics) -> Router {
    let state = AppState { metrics };
    Router::new()
        .route("/", get(http::root_handler)) // GET /
        .route("/healthz", get(http::healthz_handler)) // GET /healthz
        .route("/metrics", get(http::metrics_handler)) // GET /metrics
        .route("/version", get(http::version_handler)) // GET /version
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
