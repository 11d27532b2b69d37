use crate::domain::{models::staff::Staff, ports::StaffRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteStaffRepo {
    pool: SqlitePool,
}

impl SqliteStaffRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl StaffRepository for SqliteStaffRepo {
    async fn create(&self, staff: &Staff) -> Result<Staff, AppError> {
        sqlx::query_as::<_, Staff>(
            "INSERT INTO staff (id, display_name, gender, phone, chat_handle, available, reminder_minutes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&staff.id).bind(&staff.display_name).bind(&staff.gender).bind(&staff.phone)
            .bind(&staff.chat_handle).bind(staff.available).bind(&staff.reminder_minutes).bind(staff.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Staff>, AppError> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Staff>, AppError> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff ORDER BY display_name ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_available(&self) -> Result<Vec<Staff>, AppError> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE available = 1 ORDER BY display_name ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn set_available(&self, id: &str, available: bool) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE staff SET available = ? WHERE id = ?")
            .bind(available).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
