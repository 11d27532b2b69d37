use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::CreateProfileRequest;
use crate::api::extractors::auth::ServiceAuth;
use crate::domain::models::profile::Profile;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = Profile::new(payload.role, payload.display_name, payload.chat_handle);
    let created = state.profile_repo.create(&profile).await?;
    info!("Profile created: {} ({})", created.id, created.role);
    Ok(Json(created))
}
