use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

pub const BOOKING_PENDING: &str = "pending";
pub const BOOKING_CONFIRMED: &str = "confirmed";
pub const BOOKING_IN_PROGRESS: &str = "in_progress";
pub const BOOKING_COMPLETED: &str = "completed";
pub const BOOKING_CANCELLED: &str = "cancelled";

pub const PAYMENT_UNPAID: &str = "unpaid";
pub const PAYMENT_PAID: &str = "paid";
pub const PAYMENT_REFUNDED: &str = "refunded";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub reference: String,
    pub customer_id: String,
    pub hotel_id: Option<String>,
    pub staff_id: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub provider_preference: String,
    pub recipient_count: i32,
    pub address: String,
    pub scheduled_at: DateTime<Utc>,
    pub total_price: i64,
    pub final_price: i64,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub refund_amount: Option<i64>,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub customer_id: String,
    pub hotel_id: Option<String>,
    pub provider_preference: String,
    pub recipient_count: i32,
    pub address: String,
    pub scheduled_at: DateTime<Utc>,
    pub total_price: i64,
    pub final_price: i64,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let reference: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(|c| char::from(c).to_ascii_uppercase())
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            reference,
            customer_id: params.customer_id,
            hotel_id: params.hotel_id,
            staff_id: None,
            status: BOOKING_PENDING.to_string(),
            payment_status: PAYMENT_UNPAID.to_string(),
            provider_preference: params.provider_preference,
            recipient_count: params.recipient_count,
            address: params.address,
            scheduled_at: params.scheduled_at,
            total_price: params.total_price,
            final_price: params.final_price,
            cancelled_at: None,
            cancellation_reason: None,
            refund_amount: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BookingService {
    pub id: String,
    pub booking_id: String,
    pub recipient_index: i32,
    pub service_name: String,
    pub price: i64,
    pub duration_min: i32,
}

impl BookingService {
    pub fn new(booking_id: String, recipient_index: i32, service_name: String, price: i64, duration_min: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id,
            recipient_index,
            service_name,
            price,
            duration_min,
        }
    }
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct BookingStats {
    pub total: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub total_revenue: i64,
}
