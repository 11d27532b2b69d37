use crate::domain::{models::staff::Staff, ports::StaffRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresStaffRepo {
    pool: PgPool,
}

impl PostgresStaffRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl StaffRepository for PostgresStaffRepo {
    async fn create(&self, staff: &Staff) -> Result<Staff, AppError> {
        sqlx::query_as::<_, Staff>(
            "INSERT INTO staff (id, display_name, gender, phone, chat_handle, available, reminder_minutes, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *"
        )
            .bind(&staff.id).bind(&staff.display_name).bind(&staff.gender).bind(&staff.phone)
            .bind(&staff.chat_handle).bind(staff.available).bind(&staff.reminder_minutes).bind(staff.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Staff>, AppError> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Staff>, AppError> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff ORDER BY display_name ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_available(&self) -> Result<Vec<Staff>, AppError> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE available = TRUE ORDER BY display_name ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn set_available(&self, id: &str, available: bool) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE staff SET available = $1 WHERE id = $2")
            .bind(available).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
