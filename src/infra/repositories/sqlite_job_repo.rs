use crate::domain::{models::job::Job, models::metrics::metrics_month, ports::JobRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use chrono::{DateTime, Utc};

pub struct SqliteJobRepo {
    pool: SqlitePool,
}

impl SqliteJobRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

async fn insert_job(tx: &mut Transaction<'_, Sqlite>, job: &Job) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO jobs (id, booking_id, staff_id, customer_name, customer_phone, address, service_name, duration_min, scheduled_at, amount, staff_earnings, status, cancellation_reason, cancellation_notes, cancelled_by, started_at, completed_at, cancelled_at, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    )
        .bind(&job.id).bind(&job.booking_id).bind(&job.staff_id).bind(&job.customer_name)
        .bind(&job.customer_phone).bind(&job.address).bind(&job.service_name).bind(job.duration_min)
        .bind(job.scheduled_at).bind(job.amount).bind(job.staff_earnings).bind(&job.status)
        .bind(&job.cancellation_reason).bind(&job.cancellation_notes).bind(&job.cancelled_by)
        .bind(job.started_at).bind(job.completed_at).bind(job.cancelled_at).bind(job.created_at)
        .execute(&mut **tx).await.map_err(AppError::Database)?;
    Ok(())
}

#[async_trait]
impl JobRepository for SqliteJobRepo {
    async fn insert_all(&self, jobs: &[Job]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        for job in jobs {
            insert_job(&mut tx, job).await?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Job>, AppError> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, status: Option<&str>, staff_id: Option<&str>) -> Result<Vec<Job>, AppError> {
        let query = match (status.is_some(), staff_id.is_some()) {
            (true, true) => "SELECT * FROM jobs WHERE status = ? AND staff_id = ? ORDER BY scheduled_at ASC",
            (true, false) => "SELECT * FROM jobs WHERE status = ? ORDER BY scheduled_at ASC",
            (false, true) => "SELECT * FROM jobs WHERE staff_id = ? ORDER BY scheduled_at ASC",
            (false, false) => "SELECT * FROM jobs ORDER BY scheduled_at ASC",
        };
        let mut q = sqlx::query_as::<_, Job>(query);
        if let Some(s) = status {
            q = q.bind(s);
        }
        if let Some(s) = staff_id {
            q = q.bind(s);
        }
        q.fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<Job>, AppError> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE booking_id = ? ORDER BY created_at ASC")
            .bind(booking_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn claim(&self, job_id: &str, staff_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE jobs SET staff_id = ?, status = 'confirmed' WHERE id = ? AND status = 'pending' AND staff_id IS NULL"
        )
            .bind(staff_id).bind(job_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn release(&self, job_id: &str, staff_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE jobs SET staff_id = NULL, status = 'pending' WHERE id = ? AND staff_id = ? AND status = 'confirmed'"
        )
            .bind(job_id).bind(staff_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn set_status(&self, job_id: &str, status: &str, now: DateTime<Utc>) -> Result<u64, AppError> {
        let query = match status {
            "in_progress" => "UPDATE jobs SET status = ?, started_at = ? WHERE id = ? AND status NOT IN ('completed', 'cancelled')",
            "completed" => "UPDATE jobs SET status = ?, completed_at = ? WHERE id = ? AND status NOT IN ('completed', 'cancelled')",
            "cancelled" => "UPDATE jobs SET status = ?, cancelled_at = ? WHERE id = ? AND status NOT IN ('completed', 'cancelled')",
            _ => {
                let result = sqlx::query("UPDATE jobs SET status = ? WHERE id = ? AND status NOT IN ('completed', 'cancelled')")
                    .bind(status).bind(job_id)
                    .execute(&self.pool).await.map_err(AppError::Database)?;
                return Ok(result.rows_affected());
            }
        };
        let result = sqlx::query(query)
            .bind(status).bind(now).bind(job_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn cancel_owned(&self, job_id: &str, staff_id: &str, reason: &str, notes: Option<&str>, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE jobs SET status = 'cancelled', cancellation_reason = ?, cancellation_notes = ?, cancelled_by = ?, cancelled_at = ?
             WHERE id = ? AND staff_id = ? AND status NOT IN ('completed', 'cancelled')"
        )
            .bind(reason).bind(notes).bind(staff_id).bind(now)
            .bind(job_id).bind(staff_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn cancel_all_for_booking(&self, booking_id: &str, reason: &str, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE jobs SET status = 'cancelled', cancellation_reason = ?, cancelled_by = 'system', cancelled_at = ?
             WHERE booking_id = ? AND status NOT IN ('completed', 'cancelled')"
        )
            .bind(reason).bind(now).bind(booking_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn cancel_and_replace(
        &self,
        job_id: &str,
        staff_id: Option<&str>,
        reason: &str,
        notes: Option<&str>,
        cancelled_by: &str,
        now: DateTime<Utc>,
    ) -> Result<(Job, Job), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let query = if staff_id.is_some() {
            "UPDATE jobs SET status = 'cancelled', cancellation_reason = ?, cancellation_notes = ?, cancelled_by = ?, cancelled_at = ?
             WHERE id = ? AND staff_id = ? AND status NOT IN ('completed', 'cancelled')
             RETURNING *"
        } else {
            "UPDATE jobs SET status = 'cancelled', cancellation_reason = ?, cancellation_notes = ?, cancelled_by = ?, cancelled_at = ?
             WHERE id = ? AND status NOT IN ('completed', 'cancelled')
             RETURNING *"
        };
        let mut q = sqlx::query_as::<_, Job>(query)
            .bind(reason).bind(notes).bind(cancelled_by).bind(now).bind(job_id);
        if let Some(s) = staff_id {
            q = q.bind(s);
        }
        let cancelled = q.fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Job already finished or not held by this staff member".into()))?;

        let replacement = cancelled.replacement(now);
        insert_job(&mut tx, &replacement).await?;

        if let Some(sid) = &cancelled.staff_id {
            sqlx::query(
                "INSERT INTO staff_performance_metrics (id, staff_id, month, total_jobs, completed_jobs, cancelled_jobs, cancel_rate)
                 VALUES (?, ?, ?, 1, 0, 1, 100.0)
                 ON CONFLICT(staff_id, month) DO UPDATE SET
                     total_jobs = total_jobs + 1,
                     cancelled_jobs = cancelled_jobs + 1,
                     cancel_rate = 100.0 * (cancelled_jobs + 1) / (total_jobs + 1)"
            )
                .bind(uuid::Uuid::new_v4().to_string()).bind(sid).bind(metrics_month(now))
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok((cancelled, replacement))
    }

    async fn find_unstaffed_pending(&self, now: DateTime<Utc>) -> Result<Vec<Job>, AppError> {
        sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE status = 'pending' AND staff_id IS NULL AND scheduled_at > ? ORDER BY scheduled_at ASC"
        )
            .bind(now).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_staffed_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Job>, AppError> {
        sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE status = 'confirmed' AND staff_id IS NOT NULL AND scheduled_at > ? ORDER BY scheduled_at ASC"
        )
            .bind(now).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
