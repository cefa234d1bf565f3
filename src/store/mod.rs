// Sample storage. The query engine only needs `SampleStore::range_query`;
// `SampleRepo` is the SQLite adapter with one table per metric type.

use crate::models::{MetricType, NewSample, Sample};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Read contract the query engine depends on.
///
/// `agent_id = None` means all agents. Bounds are inclusive and not validated:
/// `from > to` must yield an empty vec. Order of the returned samples is unspecified.
pub trait SampleStore: Send + Sync {
    fn range_query(
        &self,
        metric_type: MetricType,
        from: i64,
        to: i64,
        agent_id: Option<i64>,
    ) -> impl Future<Output = anyhow::Result<Vec<Sample>>> + Send;
}

impl<S: SampleStore> SampleStore for Arc<S> {
    fn range_query(
        &self,
        metric_type: MetricType,
        from: i64,
        to: i64,
        agent_id: Option<i64>,
    ) -> impl Future<Output = anyhow::Result<Vec<Sample>>> + Send {
        (**self).range_query(metric_type, from, to, agent_id)
    }
}

#[derive(Clone)]
pub struct SampleRepo {
    pool: SqlitePool,
}

impl SampleRepo {
    pub async fn connect(
        path: &str,
        max_pool_size: u32,
        busy_timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(busy_timeout_secs))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        for metric_type in MetricType::ALL {
            let table = metric_type.table_name();
            sqlx::query(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    agent_id INTEGER,
                    created_at INTEGER NOT NULL,
                    value REAL NOT NULL
                )
                "#
            ))
            .execute(&self.pool)
            .await?;

            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_created_at ON {table}(created_at)"
            ))
            .execute(&self.pool)
            .await?;

            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_agent_created_at ON {table}(agent_id, created_at)"
            ))
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    #[instrument(skip(self, sample), fields(repo = "samples", operation = "append", metric = %sample.metric_type))]
    pub async fn append(&self, sample: &NewSample) -> anyhow::Result<i64> {
        let r = sqlx::query(&format!(
            "INSERT INTO {} (agent_id, created_at, value) VALUES ($1, $2, $3)",
            sample.metric_type.table_name()
        ))
        .bind(sample.agent_id)
        .bind(sample.timestamp)
        .bind(sample.value)
        .execute(&self.pool)
        .await?;
        Ok(r.last_insert_rowid())
    }

    /// Appends all samples in one transaction (all or nothing).
    #[instrument(skip(self, samples), fields(repo = "samples", operation = "append_batch", samples_count = samples.len()))]
    pub async fn append_batch(&self, samples: &[NewSample]) -> anyhow::Result<u64> {
        if samples.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        for s in samples {
            sqlx::query(&format!(
                "INSERT INTO {} (agent_id, created_at, value) VALUES ($1, $2, $3)",
                s.metric_type.table_name()
            ))
            .bind(s.agent_id)
            .bind(s.timestamp)
            .bind(s.value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(samples.len() as u64)
    }

    #[instrument(skip(self), fields(repo = "samples", operation = "get_all"))]
    pub async fn get_all(&self, metric_type: MetricType) -> anyhow::Result<Vec<Sample>> {
        let rows = sqlx::query(&format!(
            "SELECT id, agent_id, created_at, value FROM {} ORDER BY id ASC",
            metric_type.table_name()
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| parse_sample_row(row, metric_type))
            .collect()
    }

    pub async fn get_by_id(
        &self,
        metric_type: MetricType,
        id: i64,
    ) -> anyhow::Result<Option<Sample>> {
        let row = sqlx::query(&format!(
            "SELECT id, agent_id, created_at, value FROM {} WHERE id = $1",
            metric_type.table_name()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(parse_sample_row(&row, metric_type)?))
    }

    /// Samples with created_at in [from, to], optionally for one agent. Order: insertion (id).
    #[instrument(skip(self), fields(repo = "samples", operation = "get_range"))]
    pub async fn get_range(
        &self,
        metric_type: MetricType,
        from: i64,
        to: i64,
        agent_id: Option<i64>,
    ) -> anyhow::Result<Vec<Sample>> {
        let table = metric_type.table_name();
        let rows = match agent_id {
            Some(agent_id) => {
                sqlx::query(&format!(
                    "SELECT id, agent_id, created_at, value FROM {table}
                     WHERE agent_id = $1 AND created_at >= $2 AND created_at <= $3
                     ORDER BY id ASC"
                ))
                .bind(agent_id)
                .bind(from)
                .bind(to)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT id, agent_id, created_at, value FROM {table}
                     WHERE created_at >= $1 AND created_at <= $2
                     ORDER BY id ASC"
                ))
                .bind(from)
                .bind(to)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter()
            .map(|row| parse_sample_row(row, metric_type))
            .collect()
    }
}

impl SampleStore for SampleRepo {
    async fn range_query(
        &self,
        metric_type: MetricType,
        from: i64,
        to: i64,
        agent_id: Option<i64>,
    ) -> anyhow::Result<Vec<Sample>> {
        self.get_range(metric_type, from, to, agent_id).await
    }
}

fn parse_sample_row(
    row: &sqlx::sqlite::SqliteRow,
    metric_type: MetricType,
) -> anyhow::Result<Sample> {
    Ok(Sample {
        id: row.try_get("id")?,
        agent_id: row.try_get("agent_id")?,
        metric_type,
        timestamp: row.try_get("created_at")?,
        value: row.try_get("value")?,
    })
}
