use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{booking, cron, customer, health, job, notification, payment, profile, staff};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Bookings
        .route("/api/v1/bookings", post(booking::create_booking).get(booking::list_bookings))
        .route("/api/v1/bookings/stats", get(booking::booking_stats))
        .route("/api/v1/bookings/{booking_id}", get(booking::get_booking))
        .route("/api/v1/bookings/{booking_id}/confirm", post(booking::confirm_booking))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking::cancel_booking))

        // Job dispatch
        .route("/api/v1/jobs", get(job::list_jobs))
        .route("/api/v1/jobs/{job_id}", get(job::get_job))
        .route("/api/v1/jobs/{job_id}/accept", post(job::accept_job))
        .route("/api/v1/jobs/{job_id}/decline", post(job::decline_job))
        .route("/api/v1/jobs/{job_id}/status", post(job::update_job_status))
        .route("/api/v1/jobs/{job_id}/cancel", post(job::cancel_job))

        // Back office directory
        .route("/api/v1/staff", post(staff::create_staff).get(staff::list_staff))
        .route("/api/v1/staff/{staff_id}/availability", put(staff::set_availability))
        .route("/api/v1/customers", post(customer::create_customer))
        .route("/api/v1/profiles", post(profile::create_profile))

        // In-app notifications
        .route("/api/v1/notifications/{user_id}", get(notification::list_for_user))
        .route("/api/v1/notifications/{notification_id}/read", post(notification::mark_read))

        // External scheduler triggers
        .route("/api/v1/cron/job-reminders", post(cron::run_job_reminders))
        .route("/api/v1/cron/job-escalations", post(cron::run_job_escalations))
        .route("/api/v1/cron/customer-reminders", post(cron::run_customer_reminders))
        .route("/api/v1/cron/purge-markers", post(cron::purge_markers))

        // Payment bridge
        .route("/api/v1/payments/create-charge", post(payment::create_charge))
        .route("/api/v1/payments/refund", post(payment::refund))
        .route("/api/v1/payments/create-source", post(payment::create_source))
        .route("/api/v1/payments/add-payment-method", post(payment::add_payment_method))
        .route("/api/v1/payments/charge/{charge_id}", get(payment::get_charge))
        .route("/api/v1/payments/status/{charge_id}", get(payment::charge_status))
        .route("/api/v1/payments/webhooks/gateway", post(payment::gateway_webhook))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
