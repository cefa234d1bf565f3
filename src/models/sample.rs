// Stored samples and the append input

use serde::{Deserialize, Serialize};

use super::MetricType;

/// One stored observation. Immutable once stored; `id` is store bookkeeping only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub id: i64,
    /// Absent for cluster-only aggregates (e.g. network totals).
    pub agent_id: Option<i64>,
    pub metric_type: MetricType,
    /// Epoch milliseconds.
    #[serde(rename = "time")]
    pub timestamp: i64,
    pub value: f64,
}

/// A sample before the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSample {
    pub agent_id: Option<i64>,
    pub metric_type: MetricType,
    pub timestamp: i64,
    pub value: f64,
}

impl NewSample {
    pub fn new(metric_type: MetricType, agent_id: Option<i64>, timestamp: i64, value: f64) -> Self {
        Self {
            agent_id,
            metric_type,
            timestamp,
            value,
        }
    }
}
