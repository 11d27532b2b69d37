use crate::domain::{models::profile::Profile, ports::ProfileRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresProfileRepo {
    pool: PgPool,
}

impl PostgresProfileRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepo {
    async fn create(&self, profile: &Profile) -> Result<Profile, AppError> {
        sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (id, role, display_name, chat_handle, created_at) VALUES ($1, $2, $3, $4, $5) RETURNING *"
        )
            .bind(&profile.id).bind(&profile.role).bind(&profile.display_name)
            .bind(&profile.chat_handle).bind(profile.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_role(&self, role: &str) -> Result<Vec<Profile>, AppError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE role = $1 ORDER BY display_name ASC")
            .bind(role).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
