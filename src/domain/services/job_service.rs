use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::models::booking::{Booking, BOOKING_CANCELLED};
use crate::domain::models::job::{Job, JOB_CANCELLED, JOB_COMPLETED, JOB_CONFIRMED, JOB_IN_PROGRESS, JOB_PENDING};
use crate::domain::models::metrics::metrics_month;
use crate::domain::ports::{BookingRepository, CustomerRepository, JobRepository, MetricsRepository, StaffRepository};
use crate::error::AppError;

/// Staff share of a service price, rounded to the nearest currency unit.
pub fn commission(price: i64, rate: i64) -> i64 {
    (price * rate + 50) / 100
}

pub struct JobService {
    booking_repo: Arc<dyn BookingRepository>,
    job_repo: Arc<dyn JobRepository>,
    staff_repo: Arc<dyn StaffRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    metrics_repo: Arc<dyn MetricsRepository>,
    commission_rate: i64,
}

impl JobService {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        job_repo: Arc<dyn JobRepository>,
        staff_repo: Arc<dyn StaffRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        metrics_repo: Arc<dyn MetricsRepository>,
        commission_rate: i64,
    ) -> Self {
        Self {
            booking_repo,
            job_repo,
            staff_repo,
            customer_repo,
            metrics_repo,
            commission_rate,
        }
    }

    /// Idempotent: a booking that already has jobs gets the existing ids
    /// back, nothing is inserted twice.
    pub async fn create_jobs_from_booking(&self, booking_id: &str) -> Result<Vec<String>, AppError> {
        let existing = self.job_repo.list_by_booking(booking_id).await?;
        if !existing.is_empty() {
            info!("Jobs already exist for booking {}, returning {} ids", booking_id, existing.len());
            return Ok(existing.into_iter().map(|j| j.id).collect());
        }

        let booking = self.booking_repo.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound(format!("Booking {} not found", booking_id)))?;
        let customer = self.customer_repo.find_by_id(&booking.customer_id).await?
            .ok_or(AppError::NotFound(format!("Customer {} not found", booking.customer_id)))?;

        let lines = self.booking_repo.list_services(booking_id).await?;

        let jobs: Vec<Job> = if lines.is_empty() {
            warn!("Booking {} has no service line items, splitting {} evenly", booking_id, booking.final_price);
            let recipients = booking.recipient_count.max(1) as i64;
            let share = booking.final_price / recipients;
            (0..recipients)
                .map(|_| {
                    let line = crate::domain::models::booking::BookingService::new(
                        booking.id.clone(),
                        0,
                        "unspecified".to_string(),
                        share,
                        60,
                    );
                    Job::for_recipient(&booking, &customer, &line, commission(share, self.commission_rate))
                })
                .collect()
        } else {
            lines.iter()
                .map(|line| Job::for_recipient(&booking, &customer, line, commission(line.price, self.commission_rate)))
                .collect()
        };

        self.job_repo.insert_all(&jobs).await?;
        info!("Created {} job(s) for booking {}", jobs.len(), booking_id);

        Ok(jobs.into_iter().map(|j| j.id).collect())
    }

    /// Two-phase check-then-claim. The pre-checks produce user-facing
    /// errors; the claim itself is a conditional update, and a zero-row
    /// result is the lost-race outcome.
    pub async fn accept_job(&self, job_id: &str, staff_id: &str) -> Result<Job, AppError> {
        let job = self.job_repo.find_by_id(job_id).await?
            .ok_or(AppError::NotFound("Job not found".into()))?;

        if job.status == JOB_CANCELLED {
            return Err(AppError::Conflict("This job has been cancelled".into()));
        }
        if job.status != JOB_PENDING || job.staff_id.is_some() {
            return Err(AppError::Conflict("This job has already been taken".into()));
        }

        let booking = self.booking_repo.find_by_id(&job.booking_id).await?
            .ok_or(AppError::NotFound(format!("Booking {} not found", job.booking_id)))?;

        if let Some(required) = booking.provider_preference.strip_suffix("-only") {
            let staff = self.staff_repo.find_by_id(staff_id).await?
                .ok_or(AppError::NotFound("Staff not found".into()))?;
            if staff.gender != required {
                return Err(AppError::Conflict(format!("This booking requires a {} provider", required)));
            }
        }

        if booking.recipient_count > 1 {
            let siblings = self.job_repo.list_by_booking(&job.booking_id).await?;
            let already_holds = siblings.iter().any(|s| {
                s.id != job.id && s.status != JOB_CANCELLED && s.staff_id.as_deref() == Some(staff_id)
            });
            if already_holds {
                return Err(AppError::Conflict("You already hold another job from this booking".into()));
            }
        }

        let claimed = self.job_repo.claim(job_id, staff_id).await?;
        if claimed == 0 {
            return Err(AppError::Conflict("This job has already been taken".into()));
        }

        // First acceptance confirms the whole booking, including couple
        // bookings with an unclaimed sibling job. Product has not decided
        // whether that is correct; the sync stays non-fatal either way.
        if let Err(e) = self.booking_repo.confirm_with_staff(&job.booking_id, staff_id).await {
            warn!("Failed to sync booking {} after accept: {:?}", job.booking_id, e);
        }

        info!("Job {} accepted by staff {}", job_id, staff_id);

        self.job_repo.find_by_id(job_id).await?
            .ok_or(AppError::NotFound("Job not found".into()))
    }

    pub async fn decline_job(&self, job_id: &str, staff_id: &str) -> Result<(), AppError> {
        let released = self.job_repo.release(job_id, staff_id).await?;
        if released == 0 {
            return Err(AppError::Conflict("Job is not held by this staff member".into()));
        }
        info!("Job {} declined by staff {}, back in the pool", job_id, staff_id);
        Ok(())
    }

    pub async fn update_job_status(&self, job_id: &str, status: &str, now: DateTime<Utc>) -> Result<Job, AppError> {
        match status {
            JOB_CONFIRMED | JOB_IN_PROGRESS | JOB_COMPLETED | JOB_CANCELLED => {}
            _ => return Err(AppError::Validation(format!("Unknown job status '{}'", status))),
        }

        let updated = self.job_repo.set_status(job_id, status, now).await?;
        if updated == 0 {
            return Err(AppError::NotFound("Job not found".into()));
        }

        let job = self.job_repo.find_by_id(job_id).await?
            .ok_or(AppError::NotFound("Job not found".into()))?;

        if status == JOB_COMPLETED
            && let Some(staff_id) = &job.staff_id
            && let Err(e) = self.metrics_repo.record_completion(staff_id, &metrics_month(now)).await
        {
            warn!("Failed to record completion metrics for staff {}: {:?}", staff_id, e);
        }

        Ok(job)
    }

    /// Staff-owned terminal cancel. Re-dispatching flows go through
    /// `NotificationService::process_job_cancelled` instead.
    pub async fn cancel_job(&self, job_id: &str, staff_id: &str, reason: &str, notes: Option<&str>, now: DateTime<Utc>) -> Result<(), AppError> {
        let cancelled = self.job_repo.cancel_owned(job_id, staff_id, reason, notes, now).await?;
        if cancelled == 0 {
            return Err(AppError::Conflict("Job is not held by this staff member or already finished".into()));
        }
        info!("Job {} cancelled by staff {} ({})", job_id, staff_id, reason);
        Ok(())
    }

    /// Booking-level cancellation: the booking row keeps its refund
    /// metadata and every non-terminal job is closed without replacement.
    pub async fn cancel_booking(&self, booking_id: &str, reason: &str, refund_amount: Option<i64>, now: DateTime<Utc>) -> Result<Booking, AppError> {
        let booking = self.booking_repo.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))?;
        if booking.status == BOOKING_CANCELLED {
            return Err(AppError::Conflict("Booking is already cancelled".into()));
        }

        let rows = self.booking_repo.cancel(booking_id, reason, refund_amount).await?;
        if rows == 0 {
            return Err(AppError::Conflict("Booking is already cancelled".into()));
        }
        let closed = self.job_repo.cancel_all_for_booking(booking_id, reason, now).await?;
        info!("Booking {} cancelled, {} open job(s) closed", booking_id, closed);

        self.booking_repo.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }
}
