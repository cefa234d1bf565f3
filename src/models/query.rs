// Per-request query values: window, scope, percentile rank and outcome.
// None of these are persisted.

use serde::Serialize;

use super::MetricType;
use crate::error::QueryError;

/// Breadth of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Agent(i64),
    Cluster,
}

impl Scope {
    /// Agent filter to hand to the store (`None` = all agents).
    pub fn agent_filter(&self) -> Option<i64> {
        match self {
            Scope::Agent(id) => Some(*id),
            Scope::Cluster => None,
        }
    }
}

/// Time window `[from, to]` (epoch ms, inclusive) for one metric type and scope.
/// `from > to` is allowed and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub metric_type: MetricType,
    pub from: i64,
    pub to: i64,
    pub scope: Scope,
}

impl QueryWindow {
    pub fn agent(metric_type: MetricType, agent_id: i64, from: i64, to: i64) -> Self {
        Self {
            metric_type,
            from,
            to,
            scope: Scope::Agent(agent_id),
        }
    }

    pub fn cluster(metric_type: MetricType, from: i64, to: i64) -> Self {
        Self {
            metric_type,
            from,
            to,
            scope: Scope::Cluster,
        }
    }
}

/// Window plus a raw, not yet validated percentile rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PercentileRequest {
    pub window: QueryWindow,
    pub percentile: i64,
}

/// Validated percentile rank in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Percentile(u8);

impl Percentile {
    pub const MAX: u8 = 100;

    pub fn new(rank: i64) -> Result<Self, QueryError> {
        if (0..=Self::MAX as i64).contains(&rank) {
            Ok(Self(rank as u8))
        } else {
            Err(QueryError::InvalidPercentile(rank))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// Result of a percentile query. `NoData` means nothing matched and is distinct from `Value(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentileOutcome {
    Value(f64),
    NoData,
}

impl PercentileOutcome {
    pub fn value(&self) -> Option<f64> {
        match self {
            PercentileOutcome::Value(v) => Some(*v),
            PercentileOutcome::NoData => None,
        }
    }
}
