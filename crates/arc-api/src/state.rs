//! Application state

use arc_core::AggregationEngine;
use std::sync::Arc;

/// Handle used to render the Prometheus exposition
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AggregationEngine>,
}

impl AppState {
    pub fn new(engine: Arc<AggregationEngine>) -> Self {
        Self { engine }
    }
}
