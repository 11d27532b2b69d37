use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Monthly per-staff aggregate, keyed by (staff_id, month). Created lazily
/// on the first completion or cancellation of the month.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct StaffMonthlyMetrics {
    pub id: String,
    pub staff_id: String,
    pub month: String,
    pub total_jobs: i32,
    pub completed_jobs: i32,
    pub cancelled_jobs: i32,
    pub cancel_rate: f64,
}

/// `YYYY-MM` key used for the metrics rows.
pub fn metrics_month(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}
