// Domain models

mod metric;
mod query;
mod sample;

pub use metric::MetricType;
pub use query::{Percentile, PercentileOutcome, PercentileRequest, QueryWindow, Scope};
pub use sample::{NewSample, Sample};
