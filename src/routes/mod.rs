// HTTP routes

mod http;
mod metrics;
pub mod observer;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub use http::{NAME, VERSION};
pub use metrics::{MetricsResponse, NewSampleBody, PercentileResponse, parse_timestamp};
pub use observer::{QueryEvent, QueryObserver, TracingObserver};

use crate::query::MetricQueryEngine;
use crate::store::SampleRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) engine: Arc<MetricQueryEngine<SampleRepo>>,
    pub(crate) observer: Arc<dyn QueryObserver>,
}

pub fn app(
    engine: Arc<MetricQueryEngine<SampleRepo>>,
    observer: Arc<dyn QueryObserver>,
) -> Router {
    let state = AppState { engine, observer };
    Router::new()
        .route("/", get(http::root_handler)) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/metrics/{metric}", post(metrics::create))
        .route("/api/metrics/{metric}/all", get(metrics::get_all))
        .route("/api/metrics/{metric}/id/{id}", get(metrics::get_by_id))
        .route(
            "/api/metrics/{metric}/agent/{agent_id}/from/{from}/to/{to}",
            get(metrics::agent_range),
        )
        .route(
            "/api/metrics/{metric}/agent/{agent_id}/from/{from}/to/{to}/percentiles/{percentile}",
            get(metrics::agent_percentile),
        )
        .route(
            "/api/metrics/{metric}/cluster/from/{from}/to/{to}",
            get(metrics::cluster_range),
        )
        .route(
            "/api/metrics/{metric}/cluster/from/{from}/to/{to}/percentiles/{percentile}",
            get(metrics::cluster_percentile),
        )
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
