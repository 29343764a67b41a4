//! Cron job route handlers.
//!
//! - GET    /system/cron-jobs           - List jobs
//! - POST   /system/cron-jobs           - Create job
//! - GET    /system/cron-jobs/{id}      - Get job
//! - DELETE /system/cron-jobs/{id}      - Delete job
//! - POST   /system/cron-jobs/{id}/run  - Run job now

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use naspanel_cron::{JobRecord, NewJob};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Response for a successful manual run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub success: bool,
    pub last_run: DateTime<Utc>,
    pub output: String,
}

/// GET /system/cron-jobs
pub async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<Vec<JobRecord>> {
    Json(state.cron.list().await)
}

/// GET /system/cron-jobs/{id}
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JobRecord>, ApiError> {
    Ok(Json(state.cron.get(&id).await?))
}

/// POST /system/cron-jobs
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewJob>, JsonRejection>,
) -> Result<(StatusCode, Json<JobRecord>), ApiError> {
    let Json(new_job) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    info!("Creating cron job (schedule: {})", new_job.schedule);

    let record = state.cron.create(new_job).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /system/cron-jobs/{id}
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.cron.delete(&id).await?;
    Ok(Json(json!({ "success": true })))
}

/// POST /system/cron-jobs/{id}/run
pub async fn run_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RunResponse>, ApiError> {
    let outcome = state.cron.run_now(&id).await?;
    Ok(Json(RunResponse {
        success: true,
        last_run: outcome.last_run,
        output: outcome.output,
    }))
}
