// Metric endpoints: list, ingest, range and percentile by agent or cluster

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::observer::QueryEvent;
use crate::error::QueryError;
use crate::models::{
    MetricType, NewSample, PercentileOutcome, PercentileRequest, QueryWindow, Sample,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub metrics: Vec<Sample>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PercentileResponse {
    pub percentile: i64,
    pub value: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// POST body. `time` (epoch ms) defaults to now.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSampleBody {
    #[serde(default)]
    pub agent_id: Option<i64>,
    #[serde(default)]
    pub time: Option<i64>,
    pub value: f64,
}

/// Maps `QueryError` onto HTTP: invalid input is 400, store failure 503.
pub(super) struct ApiError(QueryError);

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            QueryError::StoreUnavailable(cause) => {
                // Cause chain goes to the log only.
                tracing::warn!(error = %format_args!("{cause:#}"), "sample store failed");
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// Route timestamp: integer epoch milliseconds or RFC 3339.
pub fn parse_timestamp(raw: &str) -> Result<i64, QueryError> {
    if let Ok(ms) = raw.parse::<i64>() {
        return Ok(ms);
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|t| t.timestamp_millis())
        .map_err(|_| QueryError::InvalidTimestamp(raw.to_string()))
}

fn parse_agent_id(raw: &str) -> Result<i64, QueryError> {
    raw.parse::<i64>()
        .map_err(|_| QueryError::InvalidAgentId(raw.to_string()))
}

/// Only the integer form; range is checked by the engine.
fn parse_percentile(raw: &str) -> Result<i64, QueryError> {
    raw.parse::<i64>()
        .map_err(|_| QueryError::MalformedPercentile(raw.to_string()))
}

/// Reports rejections to the observer before they become responses.
fn reject(state: &AppState, e: QueryError) -> ApiError {
    if e.is_invalid_request() {
        state.observer.on_event(&QueryEvent::Rejected {
            reason: e.to_string(),
        });
    }
    ApiError(e)
}

fn agent_window(
    metric: &str,
    agent_id: &str,
    from: &str,
    to: &str,
) -> Result<QueryWindow, QueryError> {
    Ok(QueryWindow::agent(
        metric.parse::<MetricType>()?,
        parse_agent_id(agent_id)?,
        parse_timestamp(from)?,
        parse_timestamp(to)?,
    ))
}

fn cluster_window(metric: &str, from: &str, to: &str) -> Result<QueryWindow, QueryError> {
    Ok(QueryWindow::cluster(
        metric.parse::<MetricType>()?,
        parse_timestamp(from)?,
        parse_timestamp(to)?,
    ))
}

async fn serve_range(
    state: &AppState,
    window: QueryWindow,
) -> Result<Json<MetricsResponse>, ApiError> {
    let metrics = state
        .engine
        .range(&window)
        .await
        .map_err(|e| reject(state, e))?;
    state.observer.on_event(&QueryEvent::Range {
        metric_type: window.metric_type,
        scope: window.scope,
        from: window.from,
        to: window.to,
        samples_count: metrics.len(),
    });
    Ok(Json(MetricsResponse { metrics }))
}

/// `NoData` becomes 204 No Content, never a zero value.
async fn serve_percentile(
    state: &AppState,
    request: PercentileRequest,
) -> Result<Response, ApiError> {
    let outcome = state
        .engine
        .percentile(&request)
        .await
        .map_err(|e| reject(state, e))?;
    let window = request.window;
    state.observer.on_event(&QueryEvent::Percentile {
        metric_type: window.metric_type,
        scope: window.scope,
        from: window.from,
        to: window.to,
        percentile: request.percentile,
        value: outcome.value(),
    });
    Ok(match outcome {
        PercentileOutcome::Value(value) => Json(PercentileResponse {
            percentile: request.percentile,
            value,
        })
        .into_response(),
        PercentileOutcome::NoData => StatusCode::NO_CONTENT.into_response(),
    })
}

/// GET /api/metrics/{metric}/all
pub(super) async fn get_all(
    State(state): State<AppState>,
    Path(metric): Path<String>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let metric_type = metric
        .parse::<MetricType>()
        .map_err(|e| reject(&state, e))?;
    let metrics = state
        .engine
        .store()
        .get_all(metric_type)
        .await
        .map_err(QueryError::StoreUnavailable)?;
    Ok(Json(MetricsResponse { metrics }))
}

/// GET /api/metrics/{metric}/id/{id}
pub(super) async fn get_by_id(
    State(state): State<AppState>,
    Path((metric, id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let metric_type = metric
        .parse::<MetricType>()
        .map_err(|e| reject(&state, e))?;
    let id = id
        .parse::<i64>()
        .map_err(|_| reject(&state, QueryError::InvalidSampleId(id.clone())))?;
    let sample = state
        .engine
        .store()
        .get_by_id(metric_type, id)
        .await
        .map_err(QueryError::StoreUnavailable)?;
    Ok(match sample {
        Some(s) => Json(s).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

/// POST /api/metrics/{metric}
pub(super) async fn create(
    State(state): State<AppState>,
    Path(metric): Path<String>,
    Json(body): Json<NewSampleBody>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let metric_type = metric
        .parse::<MetricType>()
        .map_err(|e| reject(&state, e))?;
    let timestamp = body
        .time
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    let sample = NewSample::new(metric_type, body.agent_id, timestamp, body.value);
    let id = state
        .engine
        .store()
        .append(&sample)
        .await
        .map_err(QueryError::StoreUnavailable)?;
    state
        .observer
        .on_event(&QueryEvent::Appended { metric_type, id });
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/metrics/{metric}/agent/{agent_id}/from/{from}/to/{to}
pub(super) async fn agent_range(
    State(state): State<AppState>,
    Path((metric, agent_id, from, to)): Path<(String, String, String, String)>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let window = agent_window(&metric, &agent_id, &from, &to).map_err(|e| reject(&state, e))?;
    serve_range(&state, window).await
}

/// GET /api/metrics/{metric}/agent/{agent_id}/from/{from}/to/{to}/percentiles/{percentile}
pub(super) async fn agent_percentile(
    State(state): State<AppState>,
    Path((metric, agent_id, from, to, percentile)): Path<(String, String, String, String, String)>,
) -> Result<Response, ApiError> {
    let request = agent_window(&metric, &agent_id, &from, &to)
        .and_then(|window| {
            Ok(PercentileRequest {
                window,
                percentile: parse_percentile(&percentile)?,
            })
        })
        .map_err(|e| reject(&state, e))?;
    serve_percentile(&state, request).await
}

/// GET /api/metrics/{metric}/cluster/from/{from}/to/{to}
pub(super) async fn cluster_range(
    State(state): State<AppState>,
    Path((metric, from, to)): Path<(String, String, String)>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let window = cluster_window(&metric, &from, &to).map_err(|e| reject(&state, e))?;
    serve_range(&state, window).await
}

/// GET /api/metrics/{metric}/cluster/from/{from}/to/{to}/percentiles/{percentile}
pub(super) async fn cluster_percentile(
    State(state): State<AppState>,
    Path((metric, from, to, percentile)): Path<(String, String, String, String)>,
) -> Result<Response, ApiError> {
    let request = cluster_window(&metric, &from, &to)
        .and_then(|window| {
            Ok(PercentileRequest {
                window,
                percentile: parse_percentile(&percentile)?,
            })
        })
        .map_err(|e| reject(&state, e))?;
    serve_percentile(&state, request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_epoch_millis() {
        assert_eq!(parse_timestamp("1700000000000").unwrap(), 1_700_000_000_000);
        assert_eq!(parse_timestamp("-5").unwrap(), -5);
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        assert_eq!(parse_timestamp("1970-01-01T00:00:01Z").unwrap(), 1_000);
        assert_eq!(parse_timestamp("1970-01-01T01:00:01+01:00").unwrap(), 1_000);
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(QueryError::InvalidTimestamp(ref s)) if s == "yesterday"
        ));
    }

    #[test]
    fn percentile_segment_must_be_an_integer() {
        assert_eq!(parse_percentile("95").unwrap(), 95);
        // Out of range still parses; the engine rejects it.
        assert_eq!(parse_percentile("150").unwrap(), 150);
        for raw in ["abc", "50.5", ""] {
            assert!(matches!(
                parse_percentile(raw),
                Err(QueryError::MalformedPercentile(ref s)) if s == raw
            ));
        }
    }

    #[test]
    fn agent_segment_must_be_an_integer() {
        assert_eq!(parse_agent_id("42").unwrap(), 42);
        let err = agent_window("cpu", "x", "0", "100").unwrap_err();
        assert!(matches!(err, QueryError::InvalidAgentId(ref s) if s == "x"));
        assert!(err.is_invalid_request());
    }

    #[test]
    fn store_failure_body_hides_cause() {
        let err = QueryError::StoreUnavailable(anyhow::anyhow!("no such table: cpu_metrics"));
        assert_eq!(err.to_string(), "sample store unavailable");
        let response = ApiError(err).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
