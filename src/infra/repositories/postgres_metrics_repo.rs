use crate::domain::{models::metrics::StaffMonthlyMetrics, ports::MetricsRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresMetricsRepo {
    pool: PgPool,
}

impl PostgresMetricsRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl MetricsRepository for PostgresMetricsRepo {
    async fn find(&self, staff_id: &str, month: &str) -> Result<Option<StaffMonthlyMetrics>, AppError> {
        sqlx::query_as::<_, StaffMonthlyMetrics>(
            "SELECT * FROM staff_performance_metrics WHERE staff_id = $1 AND month = $2"
        )
            .bind(staff_id).bind(month)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn record_completion(&self, staff_id: &str, month: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO staff_performance_metrics (id, staff_id, month, total_jobs, completed_jobs, cancelled_jobs, cancel_rate)
             VALUES ($1, $2, $3, 1, 1, 0, 0)
             ON CONFLICT (staff_id, month) DO UPDATE SET
                 total_jobs = staff_performance_metrics.total_jobs + 1,
                 completed_jobs = staff_performance_metrics.completed_jobs + 1,
                 cancel_rate = 100.0 * staff_performance_metrics.cancelled_jobs / (staff_performance_metrics.total_jobs + 1)"
        )
            .bind(Uuid::new_v4().to_string()).bind(staff_id).bind(month)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
}
