use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use std::sync::Arc;
use chrono::Utc;

use crate::api::dtos::requests::{AcceptJobRequest, CancelJobRequest, DeclineJobRequest, JobListQuery, UpdateJobStatusRequest};
use crate::api::extractors::auth::ServiceAuth;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let jobs = state.job_repo.list(query.status.as_deref(), query.staff_id.as_deref()).await?;
    Ok(Json(jobs))
}

pub async fn get_job(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.job_repo.find_by_id(&job_id).await?
        .ok_or(AppError::NotFound("Job not found".into()))?;
    Ok(Json(job))
}

pub async fn accept_job(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(job_id): Path<String>,
    Json(payload): Json<AcceptJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.job_service.accept_job(&job_id, &payload.staff_id).await?;
    Ok(Json(job))
}

pub async fn decline_job(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(job_id): Path<String>,
    Json(payload): Json<DeclineJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.job_service.decline_job(&job_id, &payload.staff_id).await?;
    Ok(Json(serde_json::json!({ "status": "pending" })))
}

pub async fn update_job_status(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(job_id): Path<String>,
    Json(payload): Json<UpdateJobStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.job_service.update_job_status(&job_id, &payload.status, Utc::now()).await?;
    Ok(Json(job))
}

/// Staff cancellations re-dispatch by default: the job is cancelled, cloned
/// back into the pool and everyone is notified. `redispatch: false` is the
/// terminal close used by the back office.
pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(job_id): Path<String>,
    Json(payload): Json<CancelJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.redispatch.unwrap_or(true) {
        let result = state.notification_service
            .process_job_cancelled(
                &job_id,
                payload.staff_id.as_deref(),
                &payload.reason,
                payload.notes.as_deref(),
                Utc::now(),
            )
            .await?;
        return Ok(Json(serde_json::to_value(result).map_err(|_| AppError::Internal)?));
    }

    let staff_id = payload.staff_id
        .ok_or(AppError::Validation("staff_id is required for a terminal cancel".into()))?;
    state.job_service
        .cancel_job(&job_id, &staff_id, &payload.reason, payload.notes.as_deref(), Utc::now())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "status": "cancelled" })))
}
