use axum::{extract::{Path, State}, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::extractors::auth::ServiceAuth;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_for_user(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = state.notification_repo.list_for_user(&user_id).await?;
    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(notification_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.notification_repo.mark_read(&notification_id).await?;
    if updated == 0 {
        return Err(AppError::NotFound("Notification not found".into()));
    }
    Ok(Json(serde_json::json!({ "read": true })))
}
