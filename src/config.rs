use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_busy_timeout_secs() -> u64 {
    5
}

/// Local host sampling. Off unless `[collector] enabled = true`.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Agent id the local samples are stored under.
    #[serde(default)]
    pub agent_id: i64,
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// Samples buffered before a batch append.
    #[serde(default = "default_flush_rate")]
    pub flush_rate: u64,
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

fn default_sample_interval_ms() -> u64 {
    5000
}

fn default_flush_rate() -> u64 {
    10
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            agent_id: 0,
            sample_interval_ms: default_sample_interval_ms(),
            flush_rate: default_flush_rate(),
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.database.busy_timeout_secs > 0,
            "database.busy_timeout_secs must be > 0, got {}",
            self.database.busy_timeout_secs
        );
        if self.collector.enabled {
            anyhow::ensure!(
                self.collector.agent_id >= 0,
                "collector.agent_id must be >= 0, got {}",
                self.collector.agent_id
            );
            anyhow::ensure!(
                self.collector.sample_interval_ms > 0,
                "collector.sample_interval_ms must be > 0, got {}",
                self.collector.sample_interval_ms
            );
            anyhow::ensure!(
                self.collector.flush_rate > 0,
                "collector.flush_rate must be > 0, got {}",
                self.collector.flush_rate
            );
            anyhow::ensure!(
                self.collector.stats_log_interval_secs > 0,
                "collector.stats_log_interval_secs must be > 0, got {}",
                self.collector.stats_log_interval_secs
            );
        }
        Ok(())
    }
}
