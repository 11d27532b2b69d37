use axum::{extract::{Path, State}, response::IntoResponse, Json};
use std::sync::Arc;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::api::dtos::requests::{AddPaymentMethodRequest, CreateChargeRequest, RefundRequest};
use crate::api::dtos::responses::{ChargeStatusResponse, WebhookAck};
use crate::domain::models::booking::{BOOKING_CONFIRMED, PAYMENT_PAID, PAYMENT_REFUNDED};
use crate::domain::models::transaction::PaymentTransaction;
use crate::domain::ports::ChargeRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Confirmation fan-out runs detached so the payment response never waits
/// on job creation or notification delivery.
fn spawn_booking_confirmed(state: &Arc<AppState>, booking_id: String) {
    let notification_service = state.notification_service.clone();
    tokio::spawn(async move {
        if let Err(e) = notification_service.process_booking_confirmed(&booking_id).await {
            error!("Post-payment confirmation failed for booking {}: {:?}", booking_id, e);
        }
    });
}

pub async fn create_charge(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateChargeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking_id = payload.booking_id
        .ok_or(AppError::Validation("booking_id is required".into()))?;
    let token = payload.token
        .ok_or(AppError::Validation("token is required".into()))?;

    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    if booking.payment_status == PAYMENT_PAID {
        return Err(AppError::Conflict("Booking is already paid".into()));
    }

    let charge = state.payment_gateway.create_charge(&ChargeRequest {
        amount: booking.final_price,
        currency: state.config.currency.clone(),
        token,
        description: format!("Booking {}", booking.reference),
        booking_id: booking.id.clone(),
    }).await?;

    let transaction = PaymentTransaction::new(
        &booking.id,
        &charge.id,
        charge.amount,
        &charge.currency,
        &charge.status,
        charge.raw.clone(),
    );
    state.transaction_repo.create(&transaction).await?;

    if charge.paid {
        state.booking_repo.set_payment_status(&booking.id, PAYMENT_PAID, None).await?;
        state.booking_repo.update_status(&booking.id, BOOKING_CONFIRMED).await?;
        spawn_booking_confirmed(&state, booking.id.clone());
        info!("Charge {} paid, booking {} confirmed", charge.id, booking.id);
    } else {
        warn!("Charge {} for booking {} is {}", charge.id, booking.id, charge.status);
    }

    Ok(Json(json!({
        "success": true,
        "charge_id": charge.id,
        "status": charge.status,
        "paid": charge.paid,
    })))
}

pub async fn refund(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefundRequest>,
) -> Result<impl IntoResponse, AppError> {
    let charge_id = payload.charge_id
        .ok_or(AppError::Validation("charge_id is required".into()))?;

    let transaction = state.transaction_repo.find_by_charge(&charge_id).await?
        .ok_or(AppError::NotFound("Transaction not found".into()))?;

    let charge = state.payment_gateway.refund_charge(&charge_id, payload.amount).await?;

    state.transaction_repo.set_status(&charge_id, "refunded").await?;
    let refund_amount = payload.amount.unwrap_or(transaction.amount);
    state.booking_repo
        .set_payment_status(&transaction.booking_id, PAYMENT_REFUNDED, Some(refund_amount))
        .await?;

    info!("Charge {} refunded ({})", charge_id, refund_amount);
    Ok(Json(json!({
        "success": true,
        "charge_id": charge.id,
        "status": "refunded",
        "refund_amount": refund_amount,
    })))
}

pub async fn create_source(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let source = state.payment_gateway.create_source(&payload).await?;
    Ok(Json(json!({ "success": true, "source": source })))
}

pub async fn add_payment_method(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddPaymentMethodRequest>,
) -> Result<impl IntoResponse, AppError> {
    let customer_ref = payload.customer_ref
        .ok_or(AppError::Validation("customer_ref is required".into()))?;
    let token = payload.token
        .ok_or(AppError::Validation("token is required".into()))?;

    let result = state.payment_gateway.attach_payment_method(&customer_ref, &token).await?;
    Ok(Json(json!({ "success": true, "payment_method": result })))
}

pub async fn get_charge(
    State(state): State<Arc<AppState>>,
    Path(charge_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let charge = state.payment_gateway.get_charge(&charge_id).await?;
    Ok(Json(charge.raw))
}

pub async fn charge_status(
    State(state): State<Arc<AppState>>,
    Path(charge_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let transaction = state.transaction_repo.find_by_charge(&charge_id).await?
        .ok_or(AppError::NotFound("Transaction not found".into()))?;
    Ok(Json(ChargeStatusResponse {
        charge_id: transaction.charge_id,
        status: transaction.status,
        booking_id: transaction.booking_id,
    }))
}

/// Gateway webhooks are always acknowledged with 200 so the gateway stops
/// retrying; failures are logged and reconciled on the next event.
pub async fn gateway_webhook(
    State(state): State<Arc<AppState>>,
    Json(event): Json<Value>,
) -> impl IntoResponse {
    if let Err(e) = handle_webhook_event(&state, &event).await {
        error!("Webhook processing failed: {:?}", e);
    }
    Json(WebhookAck { received: true })
}

async fn handle_webhook_event(state: &Arc<AppState>, event: &Value) -> Result<(), AppError> {
    let key = event["key"].as_str().unwrap_or_default();
    if key != "charge.complete" {
        info!("Ignoring webhook event '{}'", key);
        return Ok(());
    }

    let charge = &event["data"];
    let charge_id = charge["id"].as_str()
        .ok_or(AppError::Validation("Webhook event has no charge id".into()))?;
    let paid = charge["paid"].as_bool().unwrap_or(false);
    let status = charge["status"].as_str().unwrap_or("unknown");

    let Some(transaction) = state.transaction_repo.find_by_charge(charge_id).await? else {
        warn!("Webhook for unknown charge {}", charge_id);
        return Ok(());
    };

    state.transaction_repo.set_status(charge_id, status).await?;

    if paid {
        state.booking_repo.set_payment_status(&transaction.booking_id, PAYMENT_PAID, None).await?;
        state.booking_repo.update_status(&transaction.booking_id, BOOKING_CONFIRMED).await?;
        spawn_booking_confirmed(state, transaction.booking_id.clone());
        info!("Webhook: charge {} complete, booking {} confirmed", charge_id, transaction.booking_id);
    }

    Ok(())
}
