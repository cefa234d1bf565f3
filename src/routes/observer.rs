// Request-layer observability hook. Handlers report what they served; the engine itself
// emits nothing.

use crate::models::{MetricType, Scope};

#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    Range {
        metric_type: MetricType,
        scope: Scope,
        from: i64,
        to: i64,
        samples_count: usize,
    },
    Percentile {
        metric_type: MetricType,
        scope: Scope,
        from: i64,
        to: i64,
        percentile: i64,
        /// `None` when the window held no samples.
        value: Option<f64>,
    },
    Appended {
        metric_type: MetricType,
        id: i64,
    },
    Rejected {
        reason: String,
    },
}

pub trait QueryObserver: Send + Sync {
    fn on_event(&self, event: &QueryEvent);
}

/// Default observer: one structured `tracing` event per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl QueryObserver for TracingObserver {
    fn on_event(&self, event: &QueryEvent) {
        match event {
            QueryEvent::Range {
                metric_type,
                scope,
                from,
                to,
                samples_count,
            } => tracing::info!(
                metric = %metric_type,
                scope = ?scope,
                from,
                to,
                samples_count,
                "range query"
            ),
            QueryEvent::Percentile {
                metric_type,
                scope,
                from,
                to,
                percentile,
                value,
            } => tracing::info!(
                metric = %metric_type,
                scope = ?scope,
                from,
                to,
                percentile,
                value = ?value,
                "percentile query"
            ),
            QueryEvent::Appended { metric_type, id } => {
                tracing::debug!(metric = %metric_type, id, "sample appended")
            }
            QueryEvent::Rejected { reason } => {
                tracing::info!(reason = %reason, "request rejected")
            }
        }
    }
}
