mod common;

use chrono::{DateTime, Duration, Utc};
use common::{body_json, TestApp};
use serde_json::json;

async fn unstaffed_job(app: &TestApp, scheduled: DateTime<Utc>, created: DateTime<Utc>) -> String {
    let customer = app.create_customer("Nina", "nina@example.com").await;
    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        scheduled,
        json!([{ "service_name": "Swedish massage", "price": 2000, "duration_min": 60 }]),
        None,
    ).await;
    let booking_id = booking["id"].as_str().unwrap();
    app.confirm_booking(booking_id).await;
    let job_id = app.jobs_for_booking(booking_id).await[0].id.clone();

    sqlx::query("UPDATE jobs SET created_at = ? WHERE id = ?")
        .bind(created).bind(&job_id)
        .execute(&app.pool).await.unwrap();

    job_id
}

#[tokio::test]
async fn test_levels_one_and_two_fire_independently() {
    let app = TestApp::new().await;
    app.create_staff("Dao", "female").await;
    let admin = app.create_admin("Ops").await;
    let admin_id = admin["id"].as_str().unwrap();

    let now = Utc::now();
    // Pending for 125 minutes, appointment still 30 hours away: levels 1
    // and 2 are due, level 3 is not.
    let job_id = unstaffed_job(&app, now + Duration::hours(30), now - Duration::minutes(125)).await;
    app.push_calls.lock().unwrap().clear();

    let sent = app.state.reminder_service.process_job_escalations(now).await.unwrap();
    assert_eq!(sent, 2);

    assert!(app.state.dispatch_log_repo.job_escalation_sent(&job_id, 1).await.unwrap());
    assert!(app.state.dispatch_log_repo.job_escalation_sent(&job_id, 2).await.unwrap());
    assert!(!app.state.dispatch_log_repo.job_escalation_sent(&job_id, 3).await.unwrap());

    let kinds = app.push_kinds();
    assert_eq!(kinds.iter().filter(|k| *k == "job_escalation").count(), 1);

    let res = app.request("GET", &format!("/api/v1/notifications/{}", admin_id), None).await;
    let notifications = body_json(res).await;
    let types: Vec<&str> = notifications.as_array().unwrap().iter()
        .map(|n| n["notification_type"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"job_unstaffed_warning"));
    assert!(!types.contains(&"job_unstaffed_urgent"));

    // Second poll at the same instant is a no-op.
    let sent = app.state.reminder_service.process_job_escalations(now).await.unwrap();
    assert_eq!(sent, 0);
}

#[tokio::test]
async fn test_level_three_fires_without_earlier_levels() {
    let app = TestApp::new().await;
    app.create_staff("Kanya", "female").await;
    let admin = app.create_admin("NightShift").await;

    let now = Utc::now();
    // Fresh job (10 minutes pending) but the appointment is under 24 hours
    // away: only the urgent admin alert fires.
    let job_id = unstaffed_job(&app, now + Duration::hours(20), now - Duration::minutes(10)).await;
    app.push_calls.lock().unwrap().clear();

    let sent = app.state.reminder_service.process_job_escalations(now).await.unwrap();
    assert_eq!(sent, 1);

    assert!(!app.state.dispatch_log_repo.job_escalation_sent(&job_id, 1).await.unwrap());
    assert!(!app.state.dispatch_log_repo.job_escalation_sent(&job_id, 2).await.unwrap());
    assert!(app.state.dispatch_log_repo.job_escalation_sent(&job_id, 3).await.unwrap());

    assert!(app.push_kinds().is_empty());

    let res = app.request("GET", &format!("/api/v1/notifications/{}", admin["id"].as_str().unwrap()), None).await;
    let notifications = body_json(res).await;
    assert!(notifications.as_array().unwrap().iter()
        .any(|n| n["notification_type"] == "job_unstaffed_urgent"));
}

#[tokio::test]
async fn test_past_appointments_are_skipped() {
    let app = TestApp::new().await;
    app.create_staff("Oranee", "female").await;
    app.create_admin("Ops").await;

    let now = Utc::now();
    let customer = app.create_customer("Pia", "pia@example.com").await;
    let booking = app.create_booking(
        customer["id"].as_str().unwrap(),
        now + Duration::minutes(5),
        json!([{ "service_name": "Back massage", "price": 800, "duration_min": 30 }]),
        None,
    ).await;
    let booking_id = booking["id"].as_str().unwrap();
    app.confirm_booking(booking_id).await;
    let job_id = app.jobs_for_booking(booking_id).await[0].id.clone();
    sqlx::query("UPDATE jobs SET created_at = ? WHERE id = ?")
        .bind(now - Duration::minutes(300)).bind(&job_id)
        .execute(&app.pool).await.unwrap();

    // Poll an hour after the appointment time: no retroactive alerting.
    let sent = app.state.reminder_service
        .process_job_escalations(now + Duration::minutes(65)).await.unwrap();
    assert_eq!(sent, 0);
}

#[tokio::test]
async fn test_purge_drops_markers_older_than_three_days() {
    let app = TestApp::new().await;
    let now = Utc::now();

    app.state.dispatch_log_repo
        .record_job_escalation("job-old", 1, now - Duration::days(4)).await.unwrap();
    app.state.dispatch_log_repo
        .record_job_reminder("job-recent", 30, now - Duration::hours(2)).await.unwrap();

    let purged = app.state.reminder_service.purge_expired_markers(now).await.unwrap();
    assert_eq!(purged, 1);

    assert!(!app.state.dispatch_log_repo.job_escalation_sent("job-old", 1).await.unwrap());
    assert!(app.state.dispatch_log_repo.job_reminder_sent("job-recent", 30).await.unwrap());
}
