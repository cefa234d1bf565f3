// Background collector: samples the local host and appends CPU/RAM/network readings
// to the sample store under a fixed agent id. Batches writes; flushes on shutdown.

mod probe;

pub use probe::{HostProbe, HostReading};

use crate::models::{MetricType, NewSample};
use crate::store::SampleRepo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::{Duration, interval};
use tracing::Instrument;

/// Probe, store, and shutdown for the collector.
pub struct CollectorDeps {
    pub probe: Arc<HostProbe>,
    pub repo: SampleRepo,
    pub samples_saved_total: Arc<AtomicU64>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

pub struct CollectorSettings {
    pub agent_id: i64,
    pub sample_interval_ms: u64,
    /// Buffered samples before an append_batch.
    pub flush_rate: u64,
    /// How often to log collector stats (seconds).
    pub stats_log_interval_secs: u64,
}

/// Unflushed samples kept while the store keeps failing, in multiples of `flush_rate`.
const MAX_BUFFERED_FLUSHES: u64 = 10;

/// Upper bound on the collector buffer for a given flush rate.
pub fn buffer_capacity(flush_rate: u64) -> usize {
    flush_rate.max(1).saturating_mul(MAX_BUFFERED_FLUSHES) as usize
}

/// Drops the oldest samples so at most `cap` remain. Returns how many were dropped.
pub fn trim_buffer(buffer: &mut Vec<NewSample>, cap: usize) -> usize {
    let excess = buffer.len().saturating_sub(cap);
    buffer.drain(..excess);
    excess
}

/// One sample per metric type, all stamped with the same time.
pub fn reading_to_samples(reading: &HostReading, agent_id: i64, timestamp: i64) -> [NewSample; 3] {
    [
        NewSample::new(MetricType::Cpu, Some(agent_id), timestamp, reading.cpu_percent),
        NewSample::new(MetricType::Ram, Some(agent_id), timestamp, reading.ram_available),
        NewSample::new(
            MetricType::Network,
            Some(agent_id),
            timestamp,
            reading.network_bytes_per_sec,
        ),
    ]
}

pub fn spawn(deps: CollectorDeps, settings: CollectorSettings) -> tokio::task::JoinHandle<()> {
    let CollectorDeps {
        probe,
        repo,
        samples_saved_total,
        mut shutdown_rx,
    } = deps;
    let CollectorSettings {
        agent_id,
        sample_interval_ms,
        flush_rate,
        stats_log_interval_secs,
    } = settings;
    let max_buffered = buffer_capacity(flush_rate);

    let collector_span =
        tracing::span!(tracing::Level::DEBUG, "collector", agent_id, sample_interval_ms);

    let task = async move {
        let mut tick = interval(Duration::from_millis(sample_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut buffer: Vec<NewSample> = Vec::new();
        let mut samples_dropped_total: u64 = 0;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let reading = match probe.read().await {
                        Ok(r) => r,
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                operation = "read_host",
                                "host probe failed"
                            );
                            continue;
                        }
                    };
                    let timestamp = chrono::Utc::now().timestamp_millis();
                    buffer.extend(reading_to_samples(&reading, agent_id, timestamp));

                    if buffer.len() as u64 >= flush_rate
                        && let Err(e) = flush_buffer(&repo, &mut buffer, &samples_saved_total).await
                    {
                        tracing::warn!(error = %e, "collector: append_batch failed");
                        let dropped = trim_buffer(&mut buffer, max_buffered);
                        if dropped > 0 {
                            samples_dropped_total += dropped as u64;
                            tracing::warn!(
                                samples_dropped = dropped,
                                max_buffered,
                                "collector: buffer full, oldest samples dropped"
                            );
                        }
                    }
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        samples_saved_total = samples_saved_total.load(Ordering::Relaxed),
                        samples_dropped_total,
                        samples_buffered = buffer.len(),
                        "collector stats"
                    );
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Collector shutting down");
                    break;
                }
            }
        }
        if let Err(e) = flush_buffer(&repo, &mut buffer, &samples_saved_total).await {
            tracing::warn!(error = %e, "collector: final flush failed");
        }
    };
    tokio::spawn(task.instrument(collector_span))
}

async fn flush_buffer(
    repo: &SampleRepo,
    buffer: &mut Vec<NewSample>,
    samples_saved_total: &AtomicU64,
) -> anyhow::Result<()> {
    if buffer.is_empty() {
        return Ok(());
    }
    let n = repo.append_batch(buffer).await?;
    samples_saved_total.fetch_add(n, Ordering::Relaxed);
    buffer.clear();
    tracing::debug!(
        operation = "append_batch",
        samples_count = n,
        "Samples saved"
    );
    Ok(())
}
