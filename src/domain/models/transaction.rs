use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PaymentTransaction {
    pub id: String,
    pub booking_id: String,
    pub charge_id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub payload: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl PaymentTransaction {
    pub fn new(booking_id: &str, charge_id: &str, amount: i64, currency: &str, status: &str, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: booking_id.to_string(),
            charge_id: charge_id.to_string(),
            amount,
            currency: currency.to_string(),
            status: status.to_string(),
            payload: Json(payload),
            created_at: Utc::now(),
        }
    }
}
