use crate::domain::{models::profile::Profile, ports::ProfileRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteProfileRepo {
    pool: SqlitePool,
}

impl SqliteProfileRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepo {
    async fn create(&self, profile: &Profile) -> Result<Profile, AppError> {
        sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (id, role, display_name, chat_handle, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&profile.id).bind(&profile.role).bind(&profile.display_name)
            .bind(&profile.chat_handle).bind(profile.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_role(&self, role: &str) -> Result<Vec<Profile>, AppError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE role = ? ORDER BY display_name ASC")
            .bind(role).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
