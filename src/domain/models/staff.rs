use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Staff {
    pub id: String,
    pub display_name: String,
    pub gender: String,
    pub phone: Option<String>,
    pub chat_handle: String,
    pub available: bool,
    pub reminder_minutes: Json<Vec<i64>>,
    pub created_at: DateTime<Utc>,
}

impl Staff {
    pub fn new(display_name: String, gender: String, phone: Option<String>, chat_handle: String, reminder_minutes: Vec<i64>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            display_name,
            gender,
            phone,
            chat_handle,
            available: true,
            reminder_minutes: Json(reminder_minutes),
            created_at: Utc::now(),
        }
    }
}
