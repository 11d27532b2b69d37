use crate::domain::{models::notification::Notification, ports::NotificationRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepo {
    async fn insert_all(&self, notifications: &[Notification]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        for n in notifications {
            sqlx::query(
                "INSERT INTO notifications (id, user_id, notification_type, title, message, payload, is_read, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
            )
                .bind(&n.id).bind(&n.user_id).bind(&n.notification_type).bind(&n.title)
                .bind(&n.message).bind(&n.payload).bind(n.is_read).bind(n.created_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Notification>, AppError> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC LIMIT 100"
        )
            .bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn mark_read(&self, id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
