mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, TestApp};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_booking_stats_scenario() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Quinn", "quinn@example.com").await;
    let customer_id = customer["id"].as_str().unwrap();

    let cases = [
        ("pending", 1000),
        ("confirmed", 1500),
        ("completed", 2000),
        ("completed", 2500),
        ("cancelled", 500),
        ("in_progress", 1200),
    ];

    for (status, price) in cases {
        let booking = app.create_booking(
            customer_id,
            Utc::now() + Duration::days(3),
            json!([{ "service_name": "Thai massage", "price": price, "duration_min": 60 }]),
            None,
        ).await;
        if status != "pending" {
            app.state.booking_repo
                .update_status(booking["id"].as_str().unwrap(), status)
                .await.unwrap();
        }
    }

    let res = app.request("GET", "/api/v1/bookings/stats", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let stats = body_json(res).await;

    assert_eq!(stats["total"], 6);
    assert_eq!(stats["pending"], 1);
    assert_eq!(stats["confirmed"], 1);
    assert_eq!(stats["in_progress"], 1);
    assert_eq!(stats["completed"], 2);
    assert_eq!(stats["cancelled"], 1);
    // Revenue sums final_price across every booking regardless of status.
    assert_eq!(stats["total_revenue"], 8700);
}

#[tokio::test]
async fn test_stats_requires_service_token() {
    let app = TestApp::new().await;

    let res = app.router.clone().oneshot(
        axum::http::Request::builder()
            .method("GET")
            .uri("/api/v1/bookings/stats")
            .body(axum::body::Body::empty())
            .unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
