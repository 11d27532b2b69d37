use crate::domain::ports::DispatchLogRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub struct SqliteDispatchLogRepo {
    pool: SqlitePool,
}

impl SqliteDispatchLogRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl DispatchLogRepository for SqliteDispatchLogRepo {
    async fn job_reminder_sent(&self, job_id: &str, minutes_before: i64) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM sent_job_reminders WHERE job_id = ? AND minutes_before = ?")
            .bind(job_id).bind(minutes_before)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn record_job_reminder(&self, job_id: &str, minutes_before: i64, now: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("INSERT OR IGNORE INTO sent_job_reminders (id, job_id, minutes_before, sent_at) VALUES (?, ?, ?, ?)")
            .bind(Uuid::new_v4().to_string()).bind(job_id).bind(minutes_before).bind(now)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn job_escalation_sent(&self, job_id: &str, level: i32) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM sent_job_escalations WHERE job_id = ? AND level = ?")
            .bind(job_id).bind(level)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn record_job_escalation(&self, job_id: &str, level: i32, now: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("INSERT OR IGNORE INTO sent_job_escalations (id, job_id, level, sent_at) VALUES (?, ?, ?, ?)")
            .bind(Uuid::new_v4().to_string()).bind(job_id).bind(level).bind(now)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn customer_reminder_sent(&self, booking_id: &str, minutes_before: i64) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM sent_customer_reminders WHERE booking_id = ? AND minutes_before = ?")
            .bind(booking_id).bind(minutes_before)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn record_customer_reminder(&self, booking_id: &str, minutes_before: i64, now: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("INSERT OR IGNORE INTO sent_customer_reminders (id, booking_id, minutes_before, sent_at) VALUES (?, ?, ?, ?)")
            .bind(Uuid::new_v4().to_string()).bind(booking_id).bind(minutes_before).bind(now)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let mut purged = 0;
        for table in ["sent_job_reminders", "sent_job_escalations", "sent_customer_reminders"] {
            let result = sqlx::query(&format!("DELETE FROM {} WHERE sent_at < ?", table))
                .bind(cutoff)
                .execute(&self.pool).await.map_err(AppError::Database)?;
            purged += result.rows_affected();
        }
        Ok(purged)
    }
}
