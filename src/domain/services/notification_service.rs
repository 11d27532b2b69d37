use std::sync::Arc;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::domain::models::booking::Booking;
use crate::domain::models::job::JOB_CANCELLED;
use crate::domain::models::notification::Notification;
use crate::domain::models::profile::ROLE_ADMIN;
use crate::domain::ports::{
    BookingRepository, CustomerRepository, JobRepository, NotificationRepository,
    ProfileRepository, PushService, StaffRepository,
};
use crate::domain::services::job_service::JobService;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct BookingConfirmedResult {
    pub success: bool,
    pub job_ids: Vec<String>,
    pub staff_notified: usize,
    pub admins_notified: usize,
}

#[derive(Debug, Serialize)]
pub struct JobCancelledResult {
    pub success: bool,
    pub new_job_id: String,
    pub staff_notified: usize,
    pub admins_notified: usize,
}

/// Translates domain events into one batched external push plus a batch of
/// in-app notification rows. Delivery is best effort: a failed push or
/// insert is logged and never fails the owning operation.
pub struct NotificationService {
    booking_repo: Arc<dyn BookingRepository>,
    job_repo: Arc<dyn JobRepository>,
    staff_repo: Arc<dyn StaffRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    push_service: Arc<dyn PushService>,
    job_service: Arc<JobService>,
    business_timezone: String,
    currency: String,
}

impl NotificationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        job_repo: Arc<dyn JobRepository>,
        staff_repo: Arc<dyn StaffRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        push_service: Arc<dyn PushService>,
        job_service: Arc<JobService>,
        business_timezone: String,
        currency: String,
    ) -> Self {
        Self {
            booking_repo,
            job_repo,
            staff_repo,
            customer_repo,
            profile_repo,
            notification_repo,
            push_service,
            job_service,
            business_timezone,
            currency,
        }
    }

    fn local_time(&self, at: DateTime<Utc>) -> String {
        let tz: Tz = self.business_timezone.parse().unwrap_or(chrono_tz::UTC);
        at.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string()
    }

    async fn insert_rows(&self, rows: &[Notification]) {
        if rows.is_empty() {
            return;
        }
        if let Err(e) = self.notification_repo.insert_all(rows).await {
            warn!("Failed to insert {} in-app notification(s): {:?}", rows.len(), e);
        }
    }

    pub async fn process_booking_confirmed(&self, booking_id: &str) -> Result<BookingConfirmedResult, AppError> {
        let job_ids = self.job_service.create_jobs_from_booking(booking_id).await?;
        if job_ids.is_empty() {
            warn!("Booking {} produced no jobs, skipping notifications", booking_id);
            return Ok(BookingConfirmedResult {
                success: false,
                job_ids,
                staff_notified: 0,
                admins_notified: 0,
            });
        }

        let (staff_notified, admins_notified) =
            match self.send_booking_confirmed_notifications(booking_id).await {
                Ok(counts) => counts,
                Err(e) => {
                    warn!("Booking {} confirmed but notifications failed: {:?}", booking_id, e);
                    (0, 0)
                }
            };

        Ok(BookingConfirmedResult {
            success: true,
            job_ids,
            staff_notified,
            admins_notified,
        })
    }

    /// Broadcast to every currently available staff member; assignment
    /// happens afterwards through the accept race, so the recipient list is
    /// deliberately untargeted.
    pub async fn send_booking_confirmed_notifications(&self, booking_id: &str) -> Result<(usize, usize), AppError> {
        let booking = self.booking_repo.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound(format!("Booking {} not found", booking_id)))?;
        let lines = self.booking_repo.list_services(booking_id).await?;
        let customer = self.customer_repo.find_by_id(&booking.customer_id).await?
            .ok_or(AppError::NotFound(format!("Customer {} not found", booking.customer_id)))?;

        let staff_payload = self.new_job_payload(&booking, &lines);

        let available = self.staff_repo.list_available().await?;
        let handles: Vec<String> = available.iter().map(|s| s.chat_handle.clone()).collect();
        if !handles.is_empty()
            && let Err(e) = self.push_service.send_new_job_to_staff(&handles, &staff_payload).await
        {
            warn!("Push to {} staff failed for booking {}: {:?}", handles.len(), booking_id, e);
        }

        let time = self.local_time(booking.scheduled_at);
        let staff_rows: Vec<Notification> = available.iter()
            .map(|s| Notification::new(
                &s.id,
                "new_job",
                "New job available",
                &format!("New booking at {}, first to accept wins", time),
                staff_payload.clone(),
            ))
            .collect();
        self.insert_rows(&staff_rows).await;

        let admins = self.profile_repo.list_by_role(ROLE_ADMIN).await?;
        let admin_handles: Vec<String> = admins.iter().map(|a| a.chat_handle.clone()).collect();
        let admin_payload = json!({
            "booking_id": booking.id,
            "reference": booking.reference,
            "customer_name": customer.name,
            "scheduled_at": time,
            "address": booking.address,
            "final_price": booking.final_price,
            "currency": self.currency,
            "recipient_count": booking.recipient_count,
        });
        if !admin_handles.is_empty()
            && let Err(e) = self.push_service.send_new_booking_to_admin(&admin_handles, &admin_payload).await
        {
            warn!("Push to {} admin(s) failed for booking {}: {:?}", admin_handles.len(), booking_id, e);
        }

        let admin_rows: Vec<Notification> = admins.iter()
            .map(|a| Notification::new(
                &a.id,
                "booking_confirmed",
                "Booking confirmed",
                &format!("Booking {} confirmed for {}", booking.reference, time),
                admin_payload.clone(),
            ))
            .collect();
        self.insert_rows(&admin_rows).await;

        info!(
            "Booking {} fan-out: {} staff, {} admin(s)",
            booking_id, available.len(), admins.len()
        );
        Ok((available.len(), admins.len()))
    }

    /// Cancel + clone + metrics run inside one repository transaction; the
    /// fan-out afterwards is best effort like everywhere else.
    pub async fn process_job_cancelled(
        &self,
        job_id: &str,
        staff_id: Option<&str>,
        reason: &str,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<JobCancelledResult, AppError> {
        let cancelled_by = staff_id.unwrap_or("admin");
        let (cancelled, replacement) = self.job_repo
            .cancel_and_replace(job_id, staff_id, reason, notes, cancelled_by, now)
            .await?;

        let siblings = self.job_repo.list_by_booking(&cancelled.booking_id).await?;
        let active = siblings.iter().filter(|j| j.status != JOB_CANCELLED).count();
        let couple_booking = active > 1;

        let time = self.local_time(replacement.scheduled_at);
        let staff_payload = json!({
            "job_id": replacement.id,
            "booking_id": replacement.booking_id,
            "service_name": replacement.service_name,
            "duration_min": replacement.duration_min,
            "scheduled_at": time,
            "address": replacement.address,
            "staff_earnings": replacement.staff_earnings,
            "currency": self.currency,
        });

        let available = self.staff_repo.list_available().await?;
        let handles: Vec<String> = available.iter().map(|s| s.chat_handle.clone()).collect();
        if !handles.is_empty()
            && let Err(e) = self.push_service.send_job_reavailable_to_staff(&handles, &staff_payload).await
        {
            warn!("Re-available push failed for job {}: {:?}", replacement.id, e);
        }
        let staff_rows: Vec<Notification> = available.iter()
            .map(|s| Notification::new(
                &s.id,
                "job_reavailable",
                "Job available again",
                &format!("{} at {} is back in the pool", replacement.service_name, time),
                staff_payload.clone(),
            ))
            .collect();
        self.insert_rows(&staff_rows).await;

        let admins = self.profile_repo.list_by_role(ROLE_ADMIN).await?;
        let admin_handles: Vec<String> = admins.iter().map(|a| a.chat_handle.clone()).collect();
        let admin_payload = json!({
            "job_id": cancelled.id,
            "new_job_id": replacement.id,
            "booking_id": cancelled.booking_id,
            "cancelled_by": cancelled_by,
            "reason": reason,
            "notes": notes,
            "couple_booking": couple_booking,
            "scheduled_at": time,
        });
        if !admin_handles.is_empty()
            && let Err(e) = self.push_service.send_job_cancelled_to_admin(&admin_handles, &admin_payload).await
        {
            warn!("Cancellation push to admins failed for job {}: {:?}", cancelled.id, e);
        }
        let admin_rows: Vec<Notification> = admins.iter()
            .map(|a| Notification::new(
                &a.id,
                "job_cancelled",
                "Staff cancelled a job",
                &format!(
                    "Job for {} at {} was cancelled ({}){}",
                    cancelled.service_name,
                    time,
                    reason,
                    if couple_booking { ", couple booking with a sibling job" } else { "" }
                ),
                admin_payload.clone(),
            ))
            .collect();
        self.insert_rows(&admin_rows).await;

        info!(
            "Job {} cancelled, replacement {} offered to {} staff, {} admin(s) alerted",
            cancelled.id, replacement.id, available.len(), admins.len()
        );

        Ok(JobCancelledResult {
            success: true,
            new_job_id: replacement.id,
            staff_notified: available.len(),
            admins_notified: admins.len(),
        })
    }

    fn new_job_payload(&self, booking: &Booking, lines: &[crate::domain::models::booking::BookingService]) -> Value {
        let services: Vec<Value> = lines.iter()
            .map(|l| json!({
                "service_name": l.service_name,
                "duration_min": l.duration_min,
                "price": l.price,
            }))
            .collect();

        json!({
            "booking_id": booking.id,
            "reference": booking.reference,
            "scheduled_at": self.local_time(booking.scheduled_at),
            "address": booking.address,
            "provider_preference": booking.provider_preference,
            "couple_booking": booking.recipient_count > 1,
            "services": services,
            "currency": self.currency,
        })
    }
}
