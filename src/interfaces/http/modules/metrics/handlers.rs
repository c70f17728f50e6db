//! `GET /metrics` Prometheus scrape endpoint
//!
//! Renders the process-wide recorder installed by the server. Besides the
//! HTTP counters it carries `parking_checkins_total`, `parking_checkouts_total`,
//! `parking_admission_rejections_total`, `parking_revenue_total` and the
//! `parking_ws_clients` gauge.

use axum::{extract::State, http::header, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], state.handle.render())
}
