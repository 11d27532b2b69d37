use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct BookingServiceItem {
    pub service_name: String,
    pub price: i64,
    pub duration_min: i32,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub customer_id: String,
    pub hotel_id: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub address: String,
    pub provider_preference: Option<String>,
    pub services: Vec<BookingServiceItem>,
    pub final_price: Option<i64>,
}

#[derive(Deserialize)]
pub struct CancelBookingRequest {
    pub reason: String,
    pub refund_amount: Option<i64>,
}

#[derive(Deserialize)]
pub struct AcceptJobRequest {
    pub staff_id: String,
}

#[derive(Deserialize)]
pub struct DeclineJobRequest {
    pub staff_id: String,
}

#[derive(Deserialize)]
pub struct UpdateJobStatusRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct CancelJobRequest {
    pub staff_id: Option<String>,
    pub reason: String,
    pub notes: Option<String>,
    pub redispatch: Option<bool>,
}

#[derive(Deserialize)]
pub struct JobListQuery {
    pub status: Option<String>,
    pub staff_id: Option<String>,
}

#[derive(Deserialize)]
pub struct BookingListQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateStaffRequest {
    pub display_name: String,
    pub gender: String,
    pub phone: Option<String>,
    pub chat_handle: String,
    pub reminder_minutes: Option<Vec<i64>>,
}

#[derive(Deserialize)]
pub struct UpdateStaffAvailabilityRequest {
    pub available: bool,
}

#[derive(Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub language: Option<String>,
    pub email_reminders: Option<bool>,
    pub reminder_minutes: Option<Vec<i64>>,
}

#[derive(Deserialize)]
pub struct CreateProfileRequest {
    pub role: String,
    pub display_name: String,
    pub chat_handle: String,
}

// Payment bridge payloads keep every field optional so the handler can
// answer 400 with a field-specific message instead of a decode error.
#[derive(Deserialize)]
pub struct CreateChargeRequest {
    pub booking_id: Option<String>,
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct RefundRequest {
    pub charge_id: Option<String>,
    pub amount: Option<i64>,
}

#[derive(Deserialize)]
pub struct AddPaymentMethodRequest {
    pub customer_ref: Option<String>,
    pub token: Option<String>,
}
