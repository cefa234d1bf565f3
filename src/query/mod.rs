// Query engine: range retrieval and nearest-rank percentiles over a `SampleStore`.
// Stateless per call; every call works on its own copy of the retrieved samples.

mod cluster;
pub mod rank;

pub use cluster::ClusterAggregator;

use crate::error::QueryError;
use crate::models::{Percentile, PercentileOutcome, PercentileRequest, QueryWindow, Sample, Scope};
use crate::store::SampleStore;

/// One engine for every metric type; the metric is part of each window.
///
/// Reads are best effort: samples appended while a query runs may or may not be seen.
pub struct MetricQueryEngine<S> {
    store: S,
}

impl<S: SampleStore> MetricQueryEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cluster(&self) -> ClusterAggregator<'_, S> {
        ClusterAggregator::new(&self.store)
    }

    /// Samples in the window, unordered. An inverted window (`from > to`) yields an empty vec.
    pub async fn range(&self, window: &QueryWindow) -> Result<Vec<Sample>, QueryError> {
        match window.scope {
            Scope::Agent(agent_id) => self
                .store
                .range_query(window.metric_type, window.from, window.to, Some(agent_id))
                .await
                .map_err(QueryError::StoreUnavailable),
            Scope::Cluster => {
                self.cluster()
                    .range(window.metric_type, window.from, window.to)
                    .await
            }
        }
    }

    /// Percentile of the window's values. The rank is validated before the store is queried.
    pub async fn percentile(
        &self,
        request: &PercentileRequest,
    ) -> Result<PercentileOutcome, QueryError> {
        let window = &request.window;
        match window.scope {
            Scope::Agent(_) => {
                let percentile = Percentile::new(request.percentile)?;
                let samples = self.range(window).await?;
                Ok(rank::percentile_of(&samples, percentile))
            }
            Scope::Cluster => {
                self.cluster()
                    .percentile(window.metric_type, window.from, window.to, request.percentile)
                    .await
            }
        }
    }
}
