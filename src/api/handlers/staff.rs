use axum::{extract::{Path, State}, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{CreateStaffRequest, UpdateStaffAvailabilityRequest};
use crate::api::extractors::auth::ServiceAuth;
use crate::domain::models::staff::Staff;
use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_REMINDER_MINUTES: [i64; 2] = [120, 30];

pub async fn create_staff(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Json(payload): Json<CreateStaffRequest>,
) -> Result<impl IntoResponse, AppError> {
    match payload.gender.as_str() {
        "female" | "male" => {}
        _ => return Err(AppError::Validation("Gender must be 'female' or 'male'".into())),
    }

    let staff = Staff::new(
        payload.display_name,
        payload.gender,
        payload.phone,
        payload.chat_handle,
        payload.reminder_minutes.unwrap_or_else(|| DEFAULT_REMINDER_MINUTES.to_vec()),
    );
    let created = state.staff_repo.create(&staff).await?;
    info!("Staff created: {}", created.id);
    Ok(Json(created))
}

pub async fn list_staff(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
) -> Result<impl IntoResponse, AppError> {
    let staff = state.staff_repo.list().await?;
    Ok(Json(staff))
}

pub async fn set_availability(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(staff_id): Path<String>,
    Json(payload): Json<UpdateStaffAvailabilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.staff_repo.set_available(&staff_id, payload.available).await?;
    if updated == 0 {
        return Err(AppError::NotFound("Staff not found".into()));
    }
    Ok(Json(serde_json::json!({ "available": payload.available })))
}
