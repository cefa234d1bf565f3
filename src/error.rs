// Query error taxonomy. "No data" is not an error; see `PercentileOutcome::NoData`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("unknown metric type: {0}")]
    InvalidMetricType(String),

    #[error("percentile must be between 0 and 100, got {0}")]
    InvalidPercentile(i64),

    /// Percentile segment that is not an integer at all (e.g. "abc", "50.5").
    #[error("percentile must be an integer between 0 and 100, got {0}")]
    MalformedPercentile(String),

    #[error("agent id must be an integer, got {0}")]
    InvalidAgentId(String),

    #[error("sample id must be an integer, got {0}")]
    InvalidSampleId(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Store failed to answer. Propagated as-is; no retry here. The cause chain is kept
    /// for logs and left out of the message.
    #[error("sample store unavailable")]
    StoreUnavailable(anyhow::Error),
}

impl QueryError {
    /// Caller-side mistake (maps to a client error), as opposed to a store failure.
    pub fn is_invalid_request(&self) -> bool {
        !matches!(self, QueryError::StoreUnavailable(_))
    }
}
