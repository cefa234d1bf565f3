// Cluster-wide queries: one unfiltered retrieval across all agents, ranked once.

use super::rank::percentile_of;
use crate::error::QueryError;
use crate::models::{MetricType, Percentile, PercentileOutcome, Sample};
use crate::store::SampleStore;

/// All-agents view over a store. Merges raw samples before ranking; never combines
/// per-agent percentiles.
pub struct ClusterAggregator<'a, S> {
    store: &'a S,
}

impl<'a, S: SampleStore> ClusterAggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Every agent's samples in `[from, to]`. Unordered.
    pub async fn range(
        &self,
        metric_type: MetricType,
        from: i64,
        to: i64,
    ) -> Result<Vec<Sample>, QueryError> {
        self.store
            .range_query(metric_type, from, to, None)
            .await
            .map_err(QueryError::StoreUnavailable)
    }

    pub async fn percentile(
        &self,
        metric_type: MetricType,
        from: i64,
        to: i64,
        percentile: i64,
    ) -> Result<PercentileOutcome, QueryError> {
        let percentile = Percentile::new(percentile)?;
        let merged = self.range(metric_type, from, to).await?;
        Ok(percentile_of(&merged, percentile))
    }
}
