// Shared test helpers: in-memory stores for the query engine

#![allow(dead_code)]

use metrics_manager::models::{MetricType, Sample};
use metrics_manager::store::SampleStore;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn sample(
    id: i64,
    agent_id: Option<i64>,
    metric_type: MetricType,
    ts: i64,
    value: f64,
) -> Sample {
    Sample {
        id,
        agent_id,
        metric_type,
        timestamp: ts,
        value,
    }
}

/// In-memory store that counts range queries.
#[derive(Default)]
pub struct CountingStore {
    samples: Mutex<Vec<Sample>>,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sample for `agent_id`; ids are assigned in insertion order.
    pub fn push(&self, metric_type: MetricType, agent_id: i64, ts: i64, value: f64) {
        let mut samples = self.samples.lock().unwrap();
        let id = samples.len() as i64 + 1;
        samples.push(sample(id, Some(agent_id), metric_type, ts, value));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SampleStore for CountingStore {
    fn range_query(
        &self,
        metric_type: MetricType,
        from: i64,
        to: i64,
        agent_id: Option<i64>,
    ) -> impl Future<Output = anyhow::Result<Vec<Sample>>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let out: Vec<Sample> = self
            .samples
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.metric_type == metric_type)
            .filter(|s| s.timestamp >= from && s.timestamp <= to)
            .filter(|s| agent_id.is_none() || s.agent_id == agent_id)
            .cloned()
            .collect();
        async move { Ok(out) }
    }
}

/// Store whose every query fails.
pub struct FailingStore;

impl SampleStore for FailingStore {
    fn range_query(
        &self,
        _metric_type: MetricType,
        _from: i64,
        _to: i64,
        _agent_id: Option<i64>,
    ) -> impl Future<Output = anyhow::Result<Vec<Sample>>> + Send {
        async { Err(anyhow::anyhow!("database is locked")) }
    }
}
