mod common;

use chrono::{Duration, Utc};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_staff_reminder_fires_once_in_window() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Kim", "kim@example.com").await;
    let staff = app.create_staff("Ying", "female").await; // default prefs [120, 30]
    let staff_id = staff["id"].as_str().unwrap();

    let now = Utc::now();
    let scheduled = now + Duration::minutes(90);
    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        scheduled,
        json!([{ "service_name": "Foot massage", "price": 900, "duration_min": 60 }]),
        None,
    ).await;
    let booking_id = booking["id"].as_str().unwrap();
    app.confirm_booking(booking_id).await;
    let job_id = app.jobs_for_booking(booking_id).await[0].id.clone();
    app.request("POST", &format!("/api/v1/jobs/{}/accept", job_id),
        Some(json!({ "staff_id": staff_id }))).await;
    app.push_calls.lock().unwrap().clear();

    // 90 minutes out: the 120 window has already passed and 30 is not due.
    let sent = app.state.reminder_service.process_job_reminders(now).await.unwrap();
    assert_eq!(sent, 0);

    let sent = app.state.reminder_service
        .process_job_reminders(scheduled - Duration::minutes(30)).await.unwrap();
    assert_eq!(sent, 1);

    // Same poll instant and a later one inside the window: marker holds.
    let sent = app.state.reminder_service
        .process_job_reminders(scheduled - Duration::minutes(30)).await.unwrap();
    assert_eq!(sent, 0);
    let sent = app.state.reminder_service
        .process_job_reminders(scheduled - Duration::minutes(20)).await.unwrap();
    assert_eq!(sent, 0);

    let kinds = app.push_kinds();
    assert_eq!(kinds.iter().filter(|k| *k == "job_reminder").count(), 1);

    assert!(app.state.dispatch_log_repo.job_reminder_sent(&job_id, 30).await.unwrap());
    assert!(!app.state.dispatch_log_repo.job_reminder_sent(&job_id, 120).await.unwrap());
}

#[tokio::test]
async fn test_customer_email_reminder_sent_once() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Lena", "lena@example.com").await; // default prefs [1440, 120]

    let now = Utc::now();
    let scheduled = now + Duration::minutes(110);
    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        scheduled,
        json!([{ "service_name": "Herbal compress", "price": 1500, "duration_min": 90 }]),
        None,
    ).await;
    let booking_id = booking["id"].as_str().unwrap();
    app.confirm_booking(booking_id).await;

    let sent = app.state.reminder_service.process_customer_email_reminders(now).await.unwrap();
    assert_eq!(sent, 1);
    let sent = app.state.reminder_service.process_customer_email_reminders(now).await.unwrap();
    assert_eq!(sent, 0);

    let emails = app.emails.lock().unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].0, "lena@example.com");
    assert!(emails[0].1.contains("appointment"));
}

#[tokio::test]
async fn test_customer_opt_out_suppresses_emails() {
    let app = TestApp::new().await;
    let res = app.request("POST", "/api/v1/customers", Some(json!({
        "name": "Mona",
        "email": "mona@example.com",
        "email_reminders": false,
    }))).await;
    let customer = common::body_json(res).await;

    let now = Utc::now();
    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        now + Duration::minutes(110),
        json!([{ "service_name": "Oil massage", "price": 1300, "duration_min": 60 }]),
        None,
    ).await;
    app.confirm_booking(booking["id"].as_str().unwrap()).await;

    let sent = app.state.reminder_service.process_customer_email_reminders(now).await.unwrap();
    assert_eq!(sent, 0);
    assert!(app.emails.lock().unwrap().is_empty());
}
