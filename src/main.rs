use anyhow::Result;
use metrics_manager::*;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let repo = store::SampleRepo::connect(
        &app_config.database.path,
        app_config.database.max_pool_size,
        app_config.database.busy_timeout_secs,
    )
    .await?;
    repo.init().await?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let collector_handle = if app_config.collector.enabled {
        tracing::info!(
            agent_id = app_config.collector.agent_id,
            "Local collector enabled"
        );
        Some(collector::spawn(
            collector::CollectorDeps {
                probe: Arc::new(collector::HostProbe::new()),
                repo: repo.clone(),
                samples_saved_total: Arc::new(AtomicU64::new(0)),
                shutdown_rx,
            },
            collector::CollectorSettings {
                agent_id: app_config.collector.agent_id,
                sample_interval_ms: app_config.collector.sample_interval_ms,
                flush_rate: app_config.collector.flush_rate,
                stats_log_interval_secs: app_config.collector.stats_log_interval_secs,
            },
        ))
    } else {
        None
    };

    let engine = Arc::new(query::MetricQueryEngine::new(repo));
    let app = routes::app(engine, Arc::new(routes::TracingObserver));
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            if let Some(handle) = collector_handle {
                let _ = handle.await;
            }
        }
    }

    Ok(())
}
