use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use chrono::Utc;

use crate::api::dtos::responses::{CronRunResponse, PurgeRunResponse};
use crate::api::extractors::auth::ServiceAuth;
use crate::error::AppError;
use crate::state::AppState;

// Trigger endpoints for an external scheduler. The in-process worker runs
// the same processors; markers make the overlap harmless.

pub async fn run_job_reminders(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
) -> Result<impl IntoResponse, AppError> {
    let sent = state.reminder_service.process_job_reminders(Utc::now()).await?;
    Ok(Json(CronRunResponse { sent }))
}

pub async fn run_job_escalations(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
) -> Result<impl IntoResponse, AppError> {
    let sent = state.reminder_service.process_job_escalations(Utc::now()).await?;
    Ok(Json(CronRunResponse { sent }))
}

pub async fn run_customer_reminders(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
) -> Result<impl IntoResponse, AppError> {
    let sent = state.reminder_service.process_customer_email_reminders(Utc::now()).await?;
    Ok(Json(CronRunResponse { sent }))
}

pub async fn purge_markers(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
) -> Result<impl IntoResponse, AppError> {
    let purged = state.reminder_service.purge_expired_markers(Utc::now()).await?;
    Ok(Json(PurgeRunResponse { purged }))
}
