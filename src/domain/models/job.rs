use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::models::booking::{Booking, BookingService};
use crate::domain::models::customer::Customer;

pub const JOB_PENDING: &str = "pending";
pub const JOB_CONFIRMED: &str = "confirmed";
pub const JOB_IN_PROGRESS: &str = "in_progress";
pub const JOB_COMPLETED: &str = "completed";
pub const JOB_CANCELLED: &str = "cancelled";

/// One dispatchable unit of work. A booking with N recipients produces N
/// jobs; the customer/location/service fields are snapshotted at creation
/// time so the job stays displayable even if the source rows change.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Job {
    pub id: String,
    pub booking_id: String,
    pub staff_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub address: String,
    pub service_name: String,
    pub duration_min: i32,
    pub scheduled_at: DateTime<Utc>,
    pub amount: i64,
    pub staff_earnings: i64,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub cancellation_notes: Option<String>,
    pub cancelled_by: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn for_recipient(booking: &Booking, customer: &Customer, line: &BookingService, staff_earnings: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: booking.id.clone(),
            staff_id: None,
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            address: booking.address.clone(),
            service_name: line.service_name.clone(),
            duration_min: line.duration_min,
            scheduled_at: booking.scheduled_at,
            amount: line.price,
            staff_earnings,
            status: JOB_PENDING.to_string(),
            cancellation_reason: None,
            cancellation_notes: None,
            cancelled_by: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: Utc::now(),
        }
    }

    /// Fresh pending clone used when a staff member cancels: the original row
    /// keeps its cancellation metadata as audit trail, the clone re-enters
    /// the accept race.
    pub fn replacement(&self, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: self.booking_id.clone(),
            staff_id: None,
            customer_name: self.customer_name.clone(),
            customer_phone: self.customer_phone.clone(),
            address: self.address.clone(),
            service_name: self.service_name.clone(),
            duration_min: self.duration_min,
            scheduled_at: self.scheduled_at,
            amount: self.amount,
            staff_earnings: self.staff_earnings,
            status: JOB_PENDING.to_string(),
            cancellation_reason: None,
            cancellation_notes: None,
            cancelled_by: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: now,
        }
    }

}
