// Collector integration test: spawn, tick, shutdown, assert samples flushed

use metrics_manager::collector::{CollectorDeps, CollectorSettings, HostProbe, spawn};
use metrics_manager::models::MetricType;
use metrics_manager::store::SampleRepo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[tokio::test]
async fn collector_ticks_and_shutdown_flushes_samples() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("metrics.db");
    let repo = SampleRepo::connect(db_path.to_str().unwrap(), 2, 5)
        .await
        .unwrap();
    repo.init().await.unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let samples_saved_total = Arc::new(AtomicU64::new(0));

    let deps = CollectorDeps {
        probe: Arc::new(HostProbe::new()),
        repo: repo.clone(),
        samples_saved_total: samples_saved_total.clone(),
        shutdown_rx,
    };
    // flush_rate above what a few ticks produce, so only the shutdown flush writes
    let settings = CollectorSettings {
        agent_id: 11,
        sample_interval_ms: 25,
        flush_rate: 1_000,
        stats_log_interval_secs: 1,
    };

    let handle = spawn(deps, settings);
    tokio::time::sleep(tokio::time::Duration::from_millis(150)).await;
    let _ = shutdown_tx.send(());
    handle.await.unwrap();

    let saved = samples_saved_total.load(Ordering::Relaxed);
    assert!(saved >= 3, "collector should flush at least one reading on shutdown");

    for metric_type in MetricType::ALL {
        let samples = repo.get_all(metric_type).await.unwrap();
        assert!(!samples.is_empty(), "no {} samples saved", metric_type);
        assert!(samples.iter().all(|s| s.agent_id == Some(11)));
    }
    let cpu = repo.get_all(MetricType::Cpu).await.unwrap();
    assert!(cpu.iter().all(|s| (0.0..=100.0).contains(&s.value)));
}

#[tokio::test]
async fn collector_survives_failing_store_and_stops_cleanly() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("metrics.db");
    // No init(): every append_batch fails.
    let repo = SampleRepo::connect(db_path.to_str().unwrap(), 2, 5)
        .await
        .unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let samples_saved_total = Arc::new(AtomicU64::new(0));
    let deps = CollectorDeps {
        probe: Arc::new(HostProbe::new()),
        repo,
        samples_saved_total: samples_saved_total.clone(),
        shutdown_rx,
    };
    // Flush on every tick so the buffer cap is hit within a few ticks.
    let settings = CollectorSettings {
        agent_id: 3,
        sample_interval_ms: 10,
        flush_rate: 1,
        stats_log_interval_secs: 1,
    };

    let handle = spawn(deps, settings);
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
    let _ = shutdown_tx.send(());
    handle.await.unwrap();

    assert_eq!(samples_saved_total.load(Ordering::Relaxed), 0);
}
