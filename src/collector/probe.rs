// Local host readings via sysinfo

use std::sync::{Arc, Mutex};
use std::time::Instant;
use sysinfo::{Networks, System};
use tracing::instrument;

/// One reading of each metric family for the local host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostReading {
    /// Global CPU usage, percent.
    pub cpu_percent: f64,
    /// Available memory, bytes.
    pub ram_available: f64,
    /// Received + transmitted bytes per second across all interfaces since the previous probe.
    pub network_bytes_per_sec: f64,
}

pub struct HostProbe {
    sys: Arc<Mutex<System>>,
    networks: Arc<Mutex<Networks>>,
    /// Cumulative rx+tx byte count and when it was read.
    last_network: Arc<Mutex<Option<(u64, Instant)>>>,
}

impl Default for HostProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HostProbe {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            networks: Arc::new(Mutex::new(Networks::new_with_refreshed_list())),
            last_network: Arc::new(Mutex::new(None)),
        }
    }

    #[instrument(skip(self), fields(repo = "host_probe", operation = "read"))]
    pub async fn read(&self) -> anyhow::Result<HostReading> {
        let sys = self.sys.clone();
        let networks = self.networks.clone();
        let last_network = self.last_network.clone();
        tokio::task::spawn_blocking(move || {
            let (cpu_percent, ram_available) = {
                let mut sys = sys
                    .lock()
                    .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
                sys.refresh_cpu_all();
                sys.refresh_memory();
                (
                    (sys.global_cpu_usage() as f64).clamp(0.0, 100.0),
                    sys.available_memory() as f64,
                )
            };

            let total_bytes: u64 = {
                let mut networks = networks
                    .lock()
                    .map_err(|e| anyhow::anyhow!("sysinfo networks lock poisoned: {}", e))?;
                networks.refresh(true);
                networks
                    .list()
                    .values()
                    .map(|data| data.total_received() + data.total_transmitted())
                    .sum()
            };

            let now = Instant::now();
            let mut guard = last_network
                .lock()
                .map_err(|e| anyhow::anyhow!("network baseline lock poisoned: {}", e))?;
            // First probe only establishes the baseline.
            let network_bytes_per_sec = match *guard {
                Some((prev_bytes, prev_ts)) => {
                    bytes_per_sec(prev_bytes, total_bytes, now.duration_since(prev_ts).as_secs_f64())
                }
                None => 0.0,
            };
            *guard = Some((total_bytes, now));

            Ok(HostReading {
                cpu_percent,
                ram_available,
                network_bytes_per_sec,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}

/// Counter rate; a counter that went backwards (interface reset) counts as zero.
fn bytes_per_sec(prev: u64, current: u64, dt_secs: f64) -> f64 {
    if dt_secs <= 0.0 {
        return 0.0;
    }
    current.saturating_sub(prev) as f64 / dt_secs
}
