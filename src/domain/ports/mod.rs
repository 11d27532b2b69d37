use crate::domain::models::{
    booking::{Booking, BookingService, BookingStats},
    customer::Customer,
    job::Job,
    metrics::StaffMonthlyMetrics,
    notification::Notification,
    profile::Profile,
    staff::Staff,
    transaction::PaymentTransaction,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking, services: &[BookingService]) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list(&self, status: Option<&str>) -> Result<Vec<Booking>, AppError>;
    async fn list_services(&self, booking_id: &str) -> Result<Vec<BookingService>, AppError>;
    /// Best-effort sync performed when a staff member accepts a job.
    async fn confirm_with_staff(&self, id: &str, staff_id: &str) -> Result<u64, AppError>;
    async fn update_status(&self, id: &str, status: &str) -> Result<u64, AppError>;
    async fn set_payment_status(&self, id: &str, payment_status: &str, refund_amount: Option<i64>) -> Result<u64, AppError>;
    async fn cancel(&self, id: &str, reason: &str, refund_amount: Option<i64>) -> Result<u64, AppError>;
    async fn find_confirmed_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
    async fn stats(&self) -> Result<BookingStats, AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert_all(&self, jobs: &[Job]) -> Result<(), AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Job>, AppError>;
    async fn list(&self, status: Option<&str>, staff_id: Option<&str>) -> Result<Vec<Job>, AppError>;
    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<Job>, AppError>;
    /// Conditional claim: succeeds only while the row is still pending and
    /// unassigned. Returns the affected-row count; 0 means a lost race.
    async fn claim(&self, job_id: &str, staff_id: &str) -> Result<u64, AppError>;
    /// Give a claimed job back to the pool, filtered by the current owner.
    async fn release(&self, job_id: &str, staff_id: &str) -> Result<u64, AppError>;
    async fn set_status(&self, job_id: &str, status: &str, now: DateTime<Utc>) -> Result<u64, AppError>;
    /// Staff-owned terminal cancel without re-dispatch.
    async fn cancel_owned(&self, job_id: &str, staff_id: &str, reason: &str, notes: Option<&str>, now: DateTime<Utc>) -> Result<u64, AppError>;
    async fn cancel_all_for_booking(&self, booking_id: &str, reason: &str, now: DateTime<Utc>) -> Result<u64, AppError>;
    /// Cancel + clone + metrics bump in one transaction. Returns the
    /// cancelled original and its pending replacement. A `staff_id` filter
    /// restricts the cancel to the owning staff; `None` is the admin path.
    async fn cancel_and_replace(
        &self,
        job_id: &str,
        staff_id: Option<&str>,
        reason: &str,
        notes: Option<&str>,
        cancelled_by: &str,
        now: DateTime<Utc>,
    ) -> Result<(Job, Job), AppError>;
    async fn find_unstaffed_pending(&self, now: DateTime<Utc>) -> Result<Vec<Job>, AppError>;
    async fn find_staffed_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Job>, AppError>;
}

#[async_trait]
pub trait StaffRepository: Send + Sync {
    async fn create(&self, staff: &Staff) -> Result<Staff, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Staff>, AppError>;
    async fn list(&self) -> Result<Vec<Staff>, AppError>;
    async fn list_available(&self) -> Result<Vec<Staff>, AppError>;
    async fn set_available(&self, id: &str, available: bool) -> Result<u64, AppError>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, customer: &Customer) -> Result<Customer, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, AppError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, profile: &Profile) -> Result<Profile, AppError>;
    async fn list_by_role(&self, role: &str) -> Result<Vec<Profile>, AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert_all(&self, notifications: &[Notification]) -> Result<(), AppError>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Notification>, AppError>;
    async fn mark_read(&self, id: &str) -> Result<u64, AppError>;
}

/// Idempotency markers for the reminder/escalation poller. A marker is
/// inserted only after the corresponding send went out.
#[async_trait]
pub trait DispatchLogRepository: Send + Sync {
    async fn job_reminder_sent(&self, job_id: &str, minutes_before: i64) -> Result<bool, AppError>;
    async fn record_job_reminder(&self, job_id: &str, minutes_before: i64, now: DateTime<Utc>) -> Result<(), AppError>;
    async fn job_escalation_sent(&self, job_id: &str, level: i32) -> Result<bool, AppError>;
    async fn record_job_escalation(&self, job_id: &str, level: i32, now: DateTime<Utc>) -> Result<(), AppError>;
    async fn customer_reminder_sent(&self, booking_id: &str, minutes_before: i64) -> Result<bool, AppError>;
    async fn record_customer_reminder(&self, booking_id: &str, minutes_before: i64, now: DateTime<Utc>) -> Result<(), AppError>;
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}

#[async_trait]
pub trait MetricsRepository: Send + Sync {
    async fn find(&self, staff_id: &str, month: &str) -> Result<Option<StaffMonthlyMetrics>, AppError>;
    async fn record_completion(&self, staff_id: &str, month: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn create(&self, transaction: &PaymentTransaction) -> Result<PaymentTransaction, AppError>;
    async fn find_by_charge(&self, charge_id: &str) -> Result<Option<PaymentTransaction>, AppError>;
    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<PaymentTransaction>, AppError>;
    async fn set_status(&self, charge_id: &str, status: &str) -> Result<u64, AppError>;
}

/// External chat-push multicast. Delivery failures are reported as errors
/// but callers treat every send as best effort.
#[async_trait]
pub trait PushService: Send + Sync {
    async fn send_new_job_to_staff(&self, handles: &[String], payload: &Value) -> Result<(), AppError>;
    async fn send_new_booking_to_admin(&self, handles: &[String], payload: &Value) -> Result<(), AppError>;
    async fn send_job_reavailable_to_staff(&self, handles: &[String], payload: &Value) -> Result<(), AppError>;
    async fn send_job_cancelled_to_admin(&self, handles: &[String], payload: &Value) -> Result<(), AppError>;
    async fn send_job_reminder_to_staff(&self, handles: &[String], payload: &Value) -> Result<(), AppError>;
    async fn send_job_escalation_to_staff(&self, handles: &[String], payload: &Value) -> Result<(), AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_customer_reminder(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        language: &str,
        attachment_name: Option<&str>,
        attachment_data: Option<&[u8]>,
    ) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount: i64,
    pub currency: String,
    pub token: String,
    pub description: String,
    pub booking_id: String,
}

#[derive(Debug, Clone)]
pub struct GatewayCharge {
    pub id: String,
    pub status: String,
    pub paid: bool,
    pub amount: i64,
    pub currency: String,
    pub raw: Value,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<GatewayCharge, AppError>;
    async fn get_charge(&self, charge_id: &str) -> Result<GatewayCharge, AppError>;
    async fn refund_charge(&self, charge_id: &str, amount: Option<i64>) -> Result<GatewayCharge, AppError>;
    async fn create_source(&self, request: &Value) -> Result<Value, AppError>;
    async fn attach_payment_method(&self, customer_ref: &str, token: &str) -> Result<Value, AppError>;
}
