use spa_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::ports::{ChargeRequest, EmailService, GatewayCharge, PaymentGateway, PushService},
    error::AppError,
    infra::factory::{assemble_state, load_templates, Repos},
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_job_repo::SqliteJobRepo,
        sqlite_staff_repo::SqliteStaffRepo,
        sqlite_customer_repo::SqliteCustomerRepo,
        sqlite_profile_repo::SqliteProfileRepo,
        sqlite_notification_repo::SqliteNotificationRepo,
        sqlite_dispatch_log_repo::SqliteDispatchLogRepo,
        sqlite_metrics_repo::SqliteMetricsRepo,
        sqlite_transaction_repo::SqliteTransactionRepo,
    },
    background::start_background_worker,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

pub const SERVICE_TOKEN: &str = "test-service-token";

#[derive(Debug, Clone)]
pub struct PushCall {
    pub kind: String,
    pub recipients: usize,
    pub payload: Value,
}

pub struct RecordingPushService {
    pub calls: Arc<Mutex<Vec<PushCall>>>,
}

impl RecordingPushService {
    async fn record(&self, kind: &str, handles: &[String], payload: &Value) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(PushCall {
            kind: kind.to_string(),
            recipients: handles.len(),
            payload: payload.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl PushService for RecordingPushService {
    async fn send_new_job_to_staff(&self, handles: &[String], payload: &Value) -> Result<(), AppError> {
        self.record("new_job", handles, payload).await
    }
    async fn send_new_booking_to_admin(&self, handles: &[String], payload: &Value) -> Result<(), AppError> {
        self.record("new_booking", handles, payload).await
    }
    async fn send_job_reavailable_to_staff(&self, handles: &[String], payload: &Value) -> Result<(), AppError> {
        self.record("job_reavailable", handles, payload).await
    }
    async fn send_job_cancelled_to_admin(&self, handles: &[String], payload: &Value) -> Result<(), AppError> {
        self.record("job_cancelled", handles, payload).await
    }
    async fn send_job_reminder_to_staff(&self, handles: &[String], payload: &Value) -> Result<(), AppError> {
        self.record("job_reminder", handles, payload).await
    }
    async fn send_job_escalation_to_staff(&self, handles: &[String], payload: &Value) -> Result<(), AppError> {
        self.record("job_escalation", handles, payload).await
    }
}

pub struct RecordingEmailService {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send_customer_reminder(
        &self,
        recipient: &str,
        subject: &str,
        _html_body: &str,
        _language: &str,
        _attachment_name: Option<&str>,
        _attachment_data: Option<&[u8]>,
    ) -> Result<(), AppError> {
        self.sent.lock().unwrap().push((recipient.to_string(), subject.to_string()));
        Ok(())
    }
}

/// Gateway stub: every charge succeeds unless `paid` is flipped off, in
/// which case charges come back pending (the webhook tests flip it).
pub struct MockPaymentGateway {
    pub paid: Arc<AtomicBool>,
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<GatewayCharge, AppError> {
        let paid = self.paid.load(Ordering::SeqCst);
        let id = format!("chrg_test_{}", Uuid::new_v4().simple());
        Ok(GatewayCharge {
            id: id.clone(),
            status: if paid { "successful".to_string() } else { "pending".to_string() },
            paid,
            amount: request.amount,
            currency: request.currency.clone(),
            raw: json!({ "id": id, "amount": request.amount, "paid": paid }),
        })
    }

    async fn get_charge(&self, charge_id: &str) -> Result<GatewayCharge, AppError> {
        Ok(GatewayCharge {
            id: charge_id.to_string(),
            status: "successful".to_string(),
            paid: true,
            amount: 0,
            currency: "thb".to_string(),
            raw: json!({ "id": charge_id, "paid": true }),
        })
    }

    async fn refund_charge(&self, charge_id: &str, amount: Option<i64>) -> Result<GatewayCharge, AppError> {
        Ok(GatewayCharge {
            id: charge_id.to_string(),
            status: "refunded".to_string(),
            paid: false,
            amount: amount.unwrap_or(0),
            currency: "thb".to_string(),
            raw: json!({ "id": charge_id, "refunded": true }),
        })
    }

    async fn create_source(&self, request: &Value) -> Result<Value, AppError> {
        Ok(json!({ "id": format!("src_test_{}", Uuid::new_v4().simple()), "request": request }))
    }

    async fn attach_payment_method(&self, customer_ref: &str, _token: &str) -> Result<Value, AppError> {
        Ok(json!({ "customer": customer_ref, "attached": true }))
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub push_calls: Arc<Mutex<Vec<PushCall>>>,
    pub emails: Arc<Mutex<Vec<(String, String)>>>,
    pub gateway_paid: Arc<AtomicBool>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            service_token: SERVICE_TOKEN.to_string(),
            push_service_url: "http://localhost".to_string(),
            push_service_token: "token".to_string(),
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            payment_gateway_url: "http://localhost".to_string(),
            payment_gateway_key: "skey_test".to_string(),
            commission_rate: 40,
            currency: "thb".to_string(),
            business_timezone: "UTC".to_string(),
            poll_interval_secs: 0,
            reminder_window_min: 15,
        };

        let push_calls = Arc::new(Mutex::new(Vec::new()));
        let emails = Arc::new(Mutex::new(Vec::new()));
        let gateway_paid = Arc::new(AtomicBool::new(true));

        let repos = Repos {
            booking: Arc::new(SqliteBookingRepo::new(pool.clone())),
            job: Arc::new(SqliteJobRepo::new(pool.clone())),
            staff: Arc::new(SqliteStaffRepo::new(pool.clone())),
            customer: Arc::new(SqliteCustomerRepo::new(pool.clone())),
            profile: Arc::new(SqliteProfileRepo::new(pool.clone())),
            notification: Arc::new(SqliteNotificationRepo::new(pool.clone())),
            dispatch_log: Arc::new(SqliteDispatchLogRepo::new(pool.clone())),
            metrics: Arc::new(SqliteMetricsRepo::new(pool.clone())),
            transaction: Arc::new(SqliteTransactionRepo::new(pool.clone())),
        };

        let state = Arc::new(assemble_state(
            &config,
            repos,
            Arc::new(RecordingPushService { calls: push_calls.clone() }),
            Arc::new(RecordingEmailService { sent: emails.clone() }),
            Arc::new(MockPaymentGateway { paid: gateway_paid.clone() }),
            load_templates(),
        ));

        // Disabled via poll_interval_secs = 0; the tests drive the pollers
        // with explicit timestamps instead.
        let worker_state = state.clone();
        tokio::spawn(async move {
            start_background_worker(worker_state).await;
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            push_calls,
            emails,
            gateway_paid,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> axum::response::Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", SERVICE_TOKEN));
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.router.clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn create_customer(&self, name: &str, email: &str) -> Value {
        let res = self.request("POST", "/api/v1/customers", Some(json!({
            "name": name,
            "email": email,
        }))).await;
        assert!(res.status().is_success(), "create_customer failed: {}", res.status());
        body_json(res).await
    }

    pub async fn create_staff(&self, name: &str, gender: &str) -> Value {
        let res = self.request("POST", "/api/v1/staff", Some(json!({
            "display_name": name,
            "gender": gender,
            "chat_handle": format!("chat-{}", name),
        }))).await;
        assert!(res.status().is_success(), "create_staff failed: {}", res.status());
        body_json(res).await
    }

    pub async fn create_admin(&self, name: &str) -> Value {
        let res = self.request("POST", "/api/v1/profiles", Some(json!({
            "role": "ADMIN",
            "display_name": name,
            "chat_handle": format!("admin-{}", name),
        }))).await;
        assert!(res.status().is_success(), "create_admin failed: {}", res.status());
        body_json(res).await
    }

    pub async fn create_booking(&self, customer_id: &str, scheduled_at: DateTime<Utc>, services: Value, preference: Option<&str>) -> Value {
        let mut payload = json!({
            "customer_id": customer_id,
            "scheduled_at": scheduled_at.to_rfc3339(),
            "address": "12 Sukhumvit Soi 11, Bangkok",
            "services": services,
        });
        if let Some(p) = preference {
            payload["provider_preference"] = json!(p);
        }
        let res = self.request("POST", "/api/v1/bookings", Some(payload)).await;
        assert!(res.status().is_success(), "create_booking failed: {}", res.status());
        body_json(res).await
    }

    pub async fn confirm_booking(&self, booking_id: &str) -> Value {
        let res = self.request("POST", &format!("/api/v1/bookings/{}/confirm", booking_id), None).await;
        assert!(res.status().is_success(), "confirm_booking failed: {}", res.status());
        body_json(res).await
    }

    pub async fn jobs_for_booking(&self, booking_id: &str) -> Vec<spa_backend::domain::models::job::Job> {
        self.state.job_repo.list_by_booking(booking_id).await.unwrap()
    }

    pub fn push_kinds(&self) -> Vec<String> {
        self.push_calls.lock().unwrap().iter().map(|c| c.kind.clone()).collect()
    }
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
