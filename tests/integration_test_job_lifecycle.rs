mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, TestApp};
use serde_json::json;

fn single_service() -> serde_json::Value {
    json!([{ "service_name": "Aromatherapy massage", "price": 1800, "duration_min": 90 }])
}

fn couple_services() -> serde_json::Value {
    json!([
        { "service_name": "Thai massage", "price": 1800, "duration_min": 60 },
        { "service_name": "Deep tissue massage", "price": 2200, "duration_min": 90 }
    ])
}

#[tokio::test]
async fn test_confirm_creates_jobs_exactly_once() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Alice", "alice@example.com").await;
    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        Utc::now() + Duration::days(2),
        single_service(),
        None,
    ).await;
    let booking_id = booking["id"].as_str().unwrap();

    let first = app.confirm_booking(booking_id).await;
    let second = app.confirm_booking(booking_id).await;

    assert_eq!(first["success"], true);
    assert_eq!(first["job_ids"], second["job_ids"]);
    assert_eq!(app.jobs_for_booking(booking_id).await.len(), 1);
}

#[tokio::test]
async fn test_couple_booking_amounts_and_earnings() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Bea", "bea@example.com").await;
    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        Utc::now() + Duration::days(2),
        couple_services(),
        None,
    ).await;
    let booking_id = booking["id"].as_str().unwrap();
    assert_eq!(booking["recipient_count"], 2);

    app.confirm_booking(booking_id).await;

    let jobs = app.jobs_for_booking(booking_id).await;
    assert_eq!(jobs.len(), 2);

    let thai = jobs.iter().find(|j| j.service_name == "Thai massage").unwrap();
    let deep = jobs.iter().find(|j| j.service_name == "Deep tissue massage").unwrap();
    assert_eq!(thai.amount, 1800);
    assert_eq!(thai.staff_earnings, 720); // round(1800 * 40 / 100)
    assert_eq!(deep.amount, 2200);
    assert_eq!(deep.staff_earnings, 880);
    assert!(jobs.iter().all(|j| j.status == "pending" && j.staff_id.is_none()));
}

#[tokio::test]
async fn test_accept_assigns_staff_and_confirms_booking() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Cara", "cara@example.com").await;
    let staff = app.create_staff("Nok", "female").await;
    let staff_id = staff["id"].as_str().unwrap();

    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        Utc::now() + Duration::days(1),
        single_service(),
        None,
    ).await;
    let booking_id = booking["id"].as_str().unwrap();
    app.confirm_booking(booking_id).await;
    let job_id = app.jobs_for_booking(booking_id).await[0].id.clone();

    let res = app.request("POST", &format!("/api/v1/jobs/{}/accept", job_id), Some(json!({ "staff_id": staff_id }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let job = body_json(res).await;
    assert_eq!(job["status"], "confirmed");
    assert_eq!(job["staff_id"], staff_id);

    let booking = app.state.booking_repo.find_by_id(booking_id).await.unwrap().unwrap();
    assert_eq!(booking.status, "confirmed");
    assert_eq!(booking.staff_id.as_deref(), Some(staff_id));
}

#[tokio::test]
async fn test_second_accept_loses_the_race() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Dee", "dee@example.com").await;
    let staff_a = app.create_staff("Ploy", "female").await;
    let staff_b = app.create_staff("Som", "female").await;

    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        Utc::now() + Duration::days(1),
        single_service(),
        None,
    ).await;
    let booking_id = booking["id"].as_str().unwrap();
    app.confirm_booking(booking_id).await;
    let job_id = app.jobs_for_booking(booking_id).await[0].id.clone();

    let first = app.request("POST", &format!("/api/v1/jobs/{}/accept", job_id),
        Some(json!({ "staff_id": staff_a["id"].as_str().unwrap() }))).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.request("POST", &format!("/api/v1/jobs/{}/accept", job_id),
        Some(json!({ "staff_id": staff_b["id"].as_str().unwrap() }))).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let job = app.state.job_repo.find_by_id(&job_id).await.unwrap().unwrap();
    assert_eq!(job.staff_id.as_deref(), staff_a["id"].as_str());
}

#[tokio::test]
async fn test_gender_restricted_booking() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Eve", "eve@example.com").await;
    let male_staff = app.create_staff("Chai", "male").await;
    let female_staff = app.create_staff("Mali", "female").await;

    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        Utc::now() + Duration::days(1),
        single_service(),
        Some("female-only"),
    ).await;
    let booking_id = booking["id"].as_str().unwrap();
    app.confirm_booking(booking_id).await;
    let job_id = app.jobs_for_booking(booking_id).await[0].id.clone();

    let rejected = app.request("POST", &format!("/api/v1/jobs/{}/accept", job_id),
        Some(json!({ "staff_id": male_staff["id"].as_str().unwrap() }))).await;
    assert_eq!(rejected.status(), StatusCode::CONFLICT);
    let err = body_json(rejected).await;
    assert!(err["error"].as_str().unwrap().contains("female"));

    let accepted = app.request("POST", &format!("/api/v1/jobs/{}/accept", job_id),
        Some(json!({ "staff_id": female_staff["id"].as_str().unwrap() }))).await;
    assert_eq!(accepted.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_one_staff_per_recipient_on_couple_booking() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Fay", "fay@example.com").await;
    let staff_a = app.create_staff("Wan", "female").await;
    let staff_b = app.create_staff("Tida", "female").await;

    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        Utc::now() + Duration::days(1),
        couple_services(),
        None,
    ).await;
    let booking_id = booking["id"].as_str().unwrap();
    app.confirm_booking(booking_id).await;
    let jobs = app.jobs_for_booking(booking_id).await;

    let first = app.request("POST", &format!("/api/v1/jobs/{}/accept", jobs[0].id),
        Some(json!({ "staff_id": staff_a["id"].as_str().unwrap() }))).await;
    assert_eq!(first.status(), StatusCode::OK);

    let double_claim = app.request("POST", &format!("/api/v1/jobs/{}/accept", jobs[1].id),
        Some(json!({ "staff_id": staff_a["id"].as_str().unwrap() }))).await;
    assert_eq!(double_claim.status(), StatusCode::CONFLICT);

    let other_staff = app.request("POST", &format!("/api/v1/jobs/{}/accept", jobs[1].id),
        Some(json!({ "staff_id": staff_b["id"].as_str().unwrap() }))).await;
    assert_eq!(other_staff.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_decline_returns_job_to_pool() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Gia", "gia@example.com").await;
    let staff_a = app.create_staff("Noi", "female").await;
    let staff_b = app.create_staff("Lek", "female").await;

    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        Utc::now() + Duration::days(1),
        single_service(),
        None,
    ).await;
    let booking_id = booking["id"].as_str().unwrap();
    app.confirm_booking(booking_id).await;
    let job_id = app.jobs_for_booking(booking_id).await[0].id.clone();

    app.request("POST", &format!("/api/v1/jobs/{}/accept", job_id),
        Some(json!({ "staff_id": staff_a["id"].as_str().unwrap() }))).await;

    // Declining someone else's job is rejected.
    let wrong = app.request("POST", &format!("/api/v1/jobs/{}/decline", job_id),
        Some(json!({ "staff_id": staff_b["id"].as_str().unwrap() }))).await;
    assert_eq!(wrong.status(), StatusCode::CONFLICT);

    let declined = app.request("POST", &format!("/api/v1/jobs/{}/decline", job_id),
        Some(json!({ "staff_id": staff_a["id"].as_str().unwrap() }))).await;
    assert_eq!(declined.status(), StatusCode::OK);

    let job = app.state.job_repo.find_by_id(&job_id).await.unwrap().unwrap();
    assert_eq!(job.status, "pending");
    assert!(job.staff_id.is_none());

    let reaccepted = app.request("POST", &format!("/api/v1/jobs/{}/accept", job_id),
        Some(json!({ "staff_id": staff_b["id"].as_str().unwrap() }))).await;
    assert_eq!(reaccepted.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_status_progression_stamps_timestamps() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Hana", "hana@example.com").await;
    let staff = app.create_staff("Fon", "female").await;
    let staff_id = staff["id"].as_str().unwrap();

    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        Utc::now() + Duration::days(1),
        single_service(),
        None,
    ).await;
    let booking_id = booking["id"].as_str().unwrap();
    app.confirm_booking(booking_id).await;
    let job_id = app.jobs_for_booking(booking_id).await[0].id.clone();

    app.request("POST", &format!("/api/v1/jobs/{}/accept", job_id),
        Some(json!({ "staff_id": staff_id }))).await;

    let res = app.request("POST", &format!("/api/v1/jobs/{}/status", job_id),
        Some(json!({ "status": "in_progress" }))).await;
    let job = body_json(res).await;
    assert!(!job["started_at"].is_null());
    assert!(job["completed_at"].is_null());

    let res = app.request("POST", &format!("/api/v1/jobs/{}/status", job_id),
        Some(json!({ "status": "completed" }))).await;
    let job = body_json(res).await;
    assert!(!job["completed_at"].is_null());

    let month = Utc::now().format("%Y-%m").to_string();
    let metrics = app.state.metrics_repo.find(staff_id, &month).await.unwrap().unwrap();
    assert_eq!(metrics.completed_jobs, 1);
    assert_eq!(metrics.cancelled_jobs, 0);

    let unknown = app.request("POST", &format!("/api/v1/jobs/{}/status", job_id),
        Some(json!({ "status": "teleported" }))).await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_confirm_notifies_available_staff_and_admins() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Ivy", "ivy@example.com").await;
    let staff_a = app.create_staff("May", "female").await;
    let _staff_b = app.create_staff("Pim", "female").await;
    app.create_admin("Boss").await;

    // Unavailable staff are excluded from the broadcast.
    app.request("PUT", &format!("/api/v1/staff/{}/availability", staff_a["id"].as_str().unwrap()),
        Some(json!({ "available": false }))).await;

    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        Utc::now() + Duration::days(1),
        single_service(),
        None,
    ).await;
    let result = app.confirm_booking(booking["id"].as_str().unwrap()).await;

    assert_eq!(result["staff_notified"], 1);
    assert_eq!(result["admins_notified"], 1);

    let kinds = app.push_kinds();
    assert!(kinds.contains(&"new_job".to_string()));
    assert!(kinds.contains(&"new_booking".to_string()));
}
