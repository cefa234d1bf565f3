// SampleRepo tests: connect, init, append, get_all, get_by_id, range queries

use metrics_manager::models::{MetricType, NewSample};
use metrics_manager::store::{SampleRepo, SampleStore};
use tempfile::TempDir;

async fn test_repo(dir: &TempDir) -> SampleRepo {
    let path = dir.path().join("metrics.db");
    let repo = SampleRepo::connect(path.to_str().unwrap(), 2, 5).await.unwrap();
    repo.init().await.unwrap();
    repo
}

fn cpu(agent_id: i64, ts: i64, value: f64) -> NewSample {
    NewSample::new(MetricType::Cpu, Some(agent_id), ts, value)
}

#[tokio::test]
async fn sample_repo_connect_and_init() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;
    // Second init is no-op (IF NOT EXISTS)
    repo.init().await.unwrap();
    for metric_type in MetricType::ALL {
        assert!(repo.get_all(metric_type).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn sample_repo_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("metrics.db");
    let repo = SampleRepo::connect(path.to_str().unwrap(), 1, 5).await.unwrap();
    repo.init().await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn sample_repo_append_and_get_by_id() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;

    let id = repo.append(&cpu(3, 1_000, 42.5)).await.unwrap();
    let got = repo.get_by_id(MetricType::Cpu, id).await.unwrap().unwrap();
    assert_eq!(got.id, id);
    assert_eq!(got.agent_id, Some(3));
    assert_eq!(got.metric_type, MetricType::Cpu);
    assert_eq!(got.timestamp, 1_000);
    assert_eq!(got.value, 42.5);

    // Same id in another metric table does not exist
    assert!(repo.get_by_id(MetricType::Ram, id).await.unwrap().is_none());
    assert!(repo.get_by_id(MetricType::Cpu, id + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn sample_repo_keeps_metric_types_apart() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;

    repo.append_batch(&[
        cpu(1, 10, 1.0),
        NewSample::new(MetricType::Ram, Some(1), 10, 2048.0),
        NewSample::new(MetricType::Network, None, 10, 77.0),
    ])
    .await
    .unwrap();

    let cpu_all = repo.get_all(MetricType::Cpu).await.unwrap();
    let ram_all = repo.get_all(MetricType::Ram).await.unwrap();
    let net_all = repo.get_all(MetricType::Network).await.unwrap();
    assert_eq!(cpu_all.len(), 1);
    assert_eq!(ram_all.len(), 1);
    assert_eq!(ram_all[0].value, 2048.0);
    assert_eq!(net_all.len(), 1);
    assert_eq!(net_all[0].agent_id, None);
}

#[tokio::test]
async fn sample_repo_append_batch_empty_no_op() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;
    assert_eq!(repo.append_batch(&[]).await.unwrap(), 0);
    assert!(repo.get_all(MetricType::Cpu).await.unwrap().is_empty());
}

#[tokio::test]
async fn sample_repo_range_filters_by_agent_and_time() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;

    let saved = repo
        .append_batch(&[
            cpu(1, 1_000, 10.0),
            cpu(2, 1_500, 20.0),
            cpu(1, 2_000, 30.0),
            cpu(1, 3_000, 40.0),
        ])
        .await
        .unwrap();
    assert_eq!(saved, 4);

    let agent1 = repo.range_query(MetricType::Cpu, 1_000, 2_000, Some(1)).await.unwrap();
    let values: Vec<f64> = agent1.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![10.0, 30.0]);

    let cluster = repo.range_query(MetricType::Cpu, 1_000, 2_000, None).await.unwrap();
    assert_eq!(cluster.len(), 3);

    let nobody = repo.range_query(MetricType::Cpu, 0, 10_000, Some(9)).await.unwrap();
    assert!(nobody.is_empty());
}

#[tokio::test]
async fn sample_repo_inverted_range_is_empty() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;
    repo.append(&cpu(1, 1_000, 10.0)).await.unwrap();

    let got = repo.range_query(MetricType::Cpu, 2_000, 0, None).await.unwrap();
    assert!(got.is_empty());
    let got = repo.range_query(MetricType::Cpu, 2_000, 0, Some(1)).await.unwrap();
    assert!(got.is_empty());
}

#[tokio::test]
async fn sample_repo_duplicate_timestamps_are_all_kept() {
    let dir = TempDir::new().unwrap();
    let repo = test_repo(&dir).await;
    repo.append_batch(&[cpu(1, 500, 1.0), cpu(1, 500, 2.0), cpu(2, 500, 3.0)])
        .await
        .unwrap();

    let got = repo.range_query(MetricType::Cpu, 500, 500, None).await.unwrap();
    assert_eq!(got.len(), 3);
}
