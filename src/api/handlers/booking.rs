use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

use crate::api::dtos::requests::{BookingListQuery, CancelBookingRequest, CreateBookingRequest};
use crate::api::extractors::auth::ServiceAuth;
use crate::domain::models::booking::{Booking, BookingService, NewBookingParams, BOOKING_CONFIRMED};
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.services.is_empty() {
        return Err(AppError::Validation("At least one service is required".into()));
    }
    let preference = payload.provider_preference.unwrap_or_else(|| "any".to_string());
    match preference.as_str() {
        "any" | "female-only" | "male-only" => {}
        _ => return Err(AppError::Validation("Invalid provider preference".into())),
    }
    if payload.scheduled_at < Utc::now() {
        return Err(AppError::Validation("Cannot book in the past".into()));
    }

    state.customer_repo.find_by_id(&payload.customer_id).await?
        .ok_or(AppError::NotFound("Customer not found".into()))?;

    let total_price: i64 = payload.services.iter().map(|s| s.price).sum();
    let final_price = payload.final_price.unwrap_or(total_price);

    let booking = Booking::new(NewBookingParams {
        customer_id: payload.customer_id,
        hotel_id: payload.hotel_id,
        provider_preference: preference,
        recipient_count: payload.services.len() as i32,
        address: payload.address,
        scheduled_at: payload.scheduled_at,
        total_price,
        final_price,
    });

    let lines: Vec<BookingService> = payload.services.iter().enumerate()
        .map(|(i, s)| BookingService::new(
            booking.id.clone(),
            i as i32,
            s.service_name.clone(),
            s.price,
            s.duration_min,
        ))
        .collect();

    let created = state.booking_repo.create(&booking, &lines).await?;
    info!("Booking created: {} ({} recipient(s))", created.id, created.recipient_count);
    Ok(Json(created))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Query(query): Query<BookingListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list(query.status.as_deref()).await?;
    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    Ok(Json(booking))
}

pub async fn booking_stats(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.booking_repo.stats().await?;
    Ok(Json(stats))
}

/// Manual confirmation from the back office. Payment-driven confirmation
/// goes through the payment bridge instead.
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    state.booking_repo.update_status(&booking_id, BOOKING_CONFIRMED).await?;
    let result = state.notification_service.process_booking_confirmed(&booking_id).await?;

    info!("Booking confirmed: {} ({} job(s))", booking_id, result.job_ids.len());
    Ok(Json(result))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(booking_id): Path<String>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let cancelled = state.job_service
        .cancel_booking(&booking_id, &payload.reason, payload.refund_amount, Utc::now())
        .await?;
    info!("Booking cancelled: {}", booking_id);
    Ok(Json(cancelled))
}
