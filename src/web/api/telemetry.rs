use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

use crate::telemetry::{FutureFetchError, Record};
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

/// Headroom on top of the upstream timeout for the whole `/future` call.
const FUTURE_REQUEST_SLACK: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize, ToSchema)]
pub struct FutureParams {
    /// Minutes ahead.
    pub n: Option<i64>,
    /// Step between positions, in seconds.
    pub step: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub history_len: usize,
    pub history_capacity: usize,
    pub last_sample_utc: Option<String>,
}

#[utoipa::path(
    get,
    path = "/latest",
    responses(
        (status = 200, description = "Most recent record, or a heartbeat when none exists", body = Record)
    ),
    tag = "telemetry"
)]
pub async fn latest(State(state): State<AppState>) -> Json<Record> {
    Json(state.history.latest())
}

#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "Retained records, oldest first", body = Vec<Record>)
    ),
    tag = "telemetry"
)]
pub async fn history(State(state): State<AppState>) -> Json<Vec<Record>> {
    Json(state.history.snapshot())
}

#[utoipa::path(
    get,
    path = "/future",
    params(
        ("n" = Option<i64>, Query, description = "Minutes ahead (clamped)"),
        ("step" = Option<i64>, Query, description = "Step in seconds (clamped)")
    ),
    responses(
        (status = 200, description = "Predicted ground track", body = Vec<Record>),
        (status = 400, description = "Non-integer parameters"),
        (status = 500, description = "Upstream query failed", body = ErrorResponse)
    ),
    tag = "telemetry"
)]
pub async fn future(
    State(state): State<AppState>,
    Query(params): Query<FutureParams>,
) -> ApiResult<Json<Vec<Record>>> {
    let limits = state.fetcher.limits();
    let minutes = params.n.unwrap_or(limits.default_minutes);
    let step = params.step.unwrap_or(limits.default_step_seconds);
    let deadline = state.fetcher.future_timeout() + FUTURE_REQUEST_SLACK;

    let records = tokio::time::timeout(deadline, state.fetcher.fetch_future(minutes, step))
        .await
        .map_err(|_| FutureFetchError::new("future track request timed out"))??;

    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, description = "History buffer status", body = StatusResponse)
    ),
    tag = "telemetry"
)]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let last_sample_utc = if state.history.is_empty() {
        None
    } else {
        Some(state.history.latest().timestamp_utc)
    };

    Json(StatusResponse {
        history_len: state.history.len(),
        history_capacity: state.history.capacity(),
        last_sample_utc,
    })
}
