mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, TestApp};
use serde_json::json;

async fn accepted_job_setup(app: &TestApp) -> (String, String, String) {
    let customer = app.create_customer("Joy", "joy@example.com").await;
    let staff = app.create_staff("Aom", "female").await;
    let _other = app.create_staff("Bua", "female").await;
    app.create_admin("Dispatcher").await;

    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        Utc::now() + Duration::days(1),
        json!([{ "service_name": "Hot stone massage", "price": 2500, "duration_min": 90 }]),
        None,
    ).await;
    let booking_id = booking["id"].as_str().unwrap().to_string();
    app.confirm_booking(&booking_id).await;
    let job_id = app.jobs_for_booking(&booking_id).await[0].id.clone();

    let staff_id = staff["id"].as_str().unwrap().to_string();
    let res = app.request("POST", &format!("/api/v1/jobs/{}/accept", job_id),
        Some(json!({ "staff_id": staff_id }))).await;
    assert_eq!(res.status(), StatusCode::OK);

    (booking_id, job_id, staff_id)
}

#[tokio::test]
async fn test_staff_cancellation_spawns_replacement() {
    let app = TestApp::new().await;
    let (booking_id, job_id, staff_id) = accepted_job_setup(&app).await;
    app.push_calls.lock().unwrap().clear();

    let res = app.request("POST", &format!("/api/v1/jobs/{}/cancel", job_id), Some(json!({
        "staff_id": staff_id,
        "reason": "sick",
        "notes": "came down with a fever",
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let result = body_json(res).await;
    assert_eq!(result["success"], true);
    // Both staff are still available, one admin configured.
    assert_eq!(result["staff_notified"], 2);
    assert_eq!(result["admins_notified"], 1);

    let jobs = app.jobs_for_booking(&booking_id).await;
    assert_eq!(jobs.len(), 2);

    let original = jobs.iter().find(|j| j.id == job_id).unwrap();
    assert_eq!(original.status, "cancelled");
    assert_eq!(original.cancellation_reason.as_deref(), Some("sick"));
    assert_eq!(original.cancelled_by.as_deref(), Some(staff_id.as_str()));
    assert!(original.cancelled_at.is_some());

    let replacement_id = result["new_job_id"].as_str().unwrap();
    let replacement = jobs.iter().find(|j| j.id == replacement_id).unwrap();
    assert_eq!(replacement.status, "pending");
    assert!(replacement.staff_id.is_none());
    assert!(replacement.cancellation_reason.is_none());
    assert_eq!(replacement.service_name, original.service_name);
    assert_eq!(replacement.amount, original.amount);
    assert_eq!(replacement.staff_earnings, original.staff_earnings);
    assert_eq!(replacement.scheduled_at, original.scheduled_at);
    assert_eq!(replacement.customer_name, original.customer_name);
    assert_eq!(replacement.address, original.address);

    let month = Utc::now().format("%Y-%m").to_string();
    let metrics = app.state.metrics_repo.find(&staff_id, &month).await.unwrap().unwrap();
    assert_eq!(metrics.cancelled_jobs, 1);
    assert_eq!(metrics.total_jobs, 1);
    assert!((metrics.cancel_rate - 100.0).abs() < f64::EPSILON);

    let kinds = app.push_kinds();
    assert!(kinds.contains(&"job_reavailable".to_string()));
    assert!(kinds.contains(&"job_cancelled".to_string()));
}

#[tokio::test]
async fn test_cancel_requires_owning_staff() {
    let app = TestApp::new().await;
    let (_, job_id, _) = accepted_job_setup(&app).await;
    let intruder = app.create_staff("Mint", "female").await;

    let res = app.request("POST", &format!("/api/v1/jobs/{}/cancel", job_id), Some(json!({
        "staff_id": intruder["id"].as_str().unwrap(),
        "reason": "not mine",
    }))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_terminal_cancel_skips_replacement() {
    let app = TestApp::new().await;
    let (booking_id, job_id, staff_id) = accepted_job_setup(&app).await;

    let res = app.request("POST", &format!("/api/v1/jobs/{}/cancel", job_id), Some(json!({
        "staff_id": staff_id,
        "reason": "customer no-show",
        "redispatch": false,
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);

    let jobs = app.jobs_for_booking(&booking_id).await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, "cancelled");
}

#[tokio::test]
async fn test_completed_job_cannot_be_cancelled() {
    let app = TestApp::new().await;
    let (_, job_id, staff_id) = accepted_job_setup(&app).await;

    app.request("POST", &format!("/api/v1/jobs/{}/status", job_id),
        Some(json!({ "status": "completed" }))).await;

    let res = app.request("POST", &format!("/api/v1/jobs/{}/cancel", job_id), Some(json!({
        "staff_id": staff_id,
        "reason": "too late",
    }))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_cancellation_closes_open_jobs() {
    let app = TestApp::new().await;
    let (booking_id, job_id, _) = accepted_job_setup(&app).await;

    let res = app.request("POST", &format!("/api/v1/bookings/{}/cancel", booking_id), Some(json!({
        "reason": "customer cancelled",
        "refund_amount": 2500,
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let booking = body_json(res).await;
    assert_eq!(booking["status"], "cancelled");
    assert_eq!(booking["refund_amount"], 2500);

    let job = app.state.job_repo.find_by_id(&job_id).await.unwrap().unwrap();
    assert_eq!(job.status, "cancelled");

    let again = app.request("POST", &format!("/api/v1/bookings/{}/cancel", booking_id), Some(json!({
        "reason": "twice",
    }))).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
}
