use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub language: String,
    pub email_reminders: bool,
    pub reminder_minutes: Json<Vec<i64>>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: String, email: String, phone: Option<String>, language: String, email_reminders: bool, reminder_minutes: Vec<i64>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            phone,
            language,
            email_reminders,
            reminder_minutes: Json(reminder_minutes),
            created_at: Utc::now(),
        }
    }
}
