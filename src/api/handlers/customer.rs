use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::CreateCustomerRequest;
use crate::api::extractors::auth::ServiceAuth;
use crate::domain::models::customer::Customer;
use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_REMINDER_MINUTES: [i64; 2] = [1440, 120];

pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let customer = Customer::new(
        payload.name,
        payload.email,
        payload.phone,
        payload.language.unwrap_or_else(|| "en".to_string()),
        payload.email_reminders.unwrap_or(true),
        payload.reminder_minutes.unwrap_or_else(|| DEFAULT_REMINDER_MINUTES.to_vec()),
    );
    let created = state.customer_repo.create(&customer).await?;
    info!("Customer created: {}", created.id);
    Ok(Json(created))
}
