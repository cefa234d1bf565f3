// Metric type: which family of readings a sample belongs to

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;

/// Metric family; serializes to lowercase JSON (e.g. "cpu").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Cpu,
    Ram,
    Network,
}

impl MetricType {
    pub const ALL: [MetricType; 3] = [MetricType::Cpu, MetricType::Ram, MetricType::Network];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Cpu => "cpu",
            MetricType::Ram => "ram",
            MetricType::Network => "network",
        }
    }

    /// Backing SQLite table. One table per metric type.
    pub fn table_name(&self) -> &'static str {
        match self {
            MetricType::Cpu => "cpu_metrics",
            MetricType::Ram => "ram_metrics",
            MetricType::Network => "network_metrics",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = QueryError;

    /// Case-insensitive ("cpu", "CPU", "Ram", ...). Unknown names are rejected, never defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(MetricType::Cpu),
            "ram" => Ok(MetricType::Ram),
            "network" => Ok(MetricType::Network),
            _ => Err(QueryError::InvalidMetricType(s.to_string())),
        }
    }
}
