use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const ROLE_ADMIN: &str = "ADMIN";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Profile {
    pub id: String,
    pub role: String,
    pub display_name: String,
    pub chat_handle: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(role: String, display_name: String, chat_handle: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            display_name,
            chat_handle,
            created_at: Utc::now(),
        }
    }
}
