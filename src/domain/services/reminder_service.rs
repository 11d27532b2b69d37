use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde_json::json;
use tera::Tera;
use tracing::{info, warn};

use crate::domain::models::notification::Notification;
use crate::domain::models::profile::ROLE_ADMIN;
use crate::domain::services::calendar::generate_ics;
use crate::domain::ports::{
    BookingRepository, CustomerRepository, DispatchLogRepository, EmailService,
    JobRepository, NotificationRepository, ProfileRepository, PushService, StaffRepository,
};
use crate::error::AppError;

const STAFF_ESCALATION_AFTER_MIN: i64 = 30;
const ADMIN_ESCALATION_AFTER_MIN: i64 = 120;
const URGENT_ESCALATION_WINDOW_MIN: i64 = 24 * 60;
const MARKER_RETENTION_DAYS: i64 = 3;

/// Poll-driven reminders and escalations. Every entry point takes an
/// explicit `now`; state lives entirely in the marker tables, so repeated
/// polls at the same instant are no-ops. Markers are written after the
/// send, which leaves a crash window where the next poll re-sends.
pub struct ReminderService {
    booking_repo: Arc<dyn BookingRepository>,
    job_repo: Arc<dyn JobRepository>,
    staff_repo: Arc<dyn StaffRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    dispatch_log: Arc<dyn DispatchLogRepository>,
    push_service: Arc<dyn PushService>,
    email_service: Arc<dyn EmailService>,
    templates: Arc<Tera>,
    business_timezone: String,
    window_min: i64,
}

impl ReminderService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        job_repo: Arc<dyn JobRepository>,
        staff_repo: Arc<dyn StaffRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        dispatch_log: Arc<dyn DispatchLogRepository>,
        push_service: Arc<dyn PushService>,
        email_service: Arc<dyn EmailService>,
        templates: Arc<Tera>,
        business_timezone: String,
        window_min: i64,
    ) -> Self {
        Self {
            booking_repo,
            job_repo,
            staff_repo,
            customer_repo,
            profile_repo,
            notification_repo,
            dispatch_log,
            push_service,
            email_service,
            templates,
            business_timezone,
            window_min,
        }
    }

    fn local_time(&self, at: DateTime<Utc>) -> String {
        let tz: Tz = self.business_timezone.parse().unwrap_or(chrono_tz::UTC);
        at.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string()
    }

    /// A threshold `m` fires only while `minutes_until` sits inside
    /// `(m - window, m]`. A job created closer to its appointment than `m`
    /// never enters that window and never receives the `m` reminder.
    fn in_window(&self, minutes_until: i64, threshold: i64) -> bool {
        minutes_until <= threshold && minutes_until > threshold - self.window_min
    }

    pub async fn process_job_reminders(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let jobs = self.job_repo.find_staffed_upcoming(now).await?;
        let mut sent = 0;

        for job in &jobs {
            let Some(staff_id) = &job.staff_id else { continue };
            let Some(staff) = self.staff_repo.find_by_id(staff_id).await? else {
                warn!("Job {} references unknown staff {}", job.id, staff_id);
                continue;
            };

            let minutes_until = (job.scheduled_at - now).num_minutes();

            for &threshold in staff.reminder_minutes.0.iter() {
                if !self.in_window(minutes_until, threshold) {
                    continue;
                }
                if self.dispatch_log.job_reminder_sent(&job.id, threshold).await? {
                    continue;
                }

                let payload = json!({
                    "job_id": job.id,
                    "service_name": job.service_name,
                    "scheduled_at": self.local_time(job.scheduled_at),
                    "address": job.address,
                    "customer_name": job.customer_name,
                    "minutes_before": threshold,
                });
                if let Err(e) = self.push_service
                    .send_job_reminder_to_staff(std::slice::from_ref(&staff.chat_handle), &payload)
                    .await
                {
                    warn!("Reminder push failed for job {} ({} min): {:?}", job.id, threshold, e);
                    continue;
                }

                self.dispatch_log.record_job_reminder(&job.id, threshold, now).await?;
                sent += 1;
            }
        }

        if sent > 0 {
            info!("Sent {} staff reminder(s)", sent);
        }
        Ok(sent)
    }

    pub async fn process_customer_email_reminders(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let bookings = self.booking_repo.find_confirmed_upcoming(now).await?;
        let mut sent = 0;

        for booking in &bookings {
            let Some(customer) = self.customer_repo.find_by_id(&booking.customer_id).await? else {
                warn!("Booking {} references unknown customer {}", booking.id, booking.customer_id);
                continue;
            };
            if !customer.email_reminders {
                continue;
            }

            let minutes_until = (booking.scheduled_at - now).num_minutes();

            for &threshold in customer.reminder_minutes.0.iter() {
                if !self.in_window(minutes_until, threshold) {
                    continue;
                }
                if self.dispatch_log.customer_reminder_sent(&booking.id, threshold).await? {
                    continue;
                }

                let lines = self.booking_repo.list_services(&booking.id).await?;
                let (subject, body) = match self.render_customer_reminder(booking, &customer, &lines) {
                    Ok(rendered) => rendered,
                    Err(e) => {
                        warn!("Failed to render reminder for booking {}: {:?}", booking.id, e);
                        continue;
                    }
                };
                let ics = generate_ics(booking, &customer, &lines);

                if let Err(e) = self.email_service
                    .send_customer_reminder(
                        &customer.email,
                        &subject,
                        &body,
                        &customer.language,
                        Some("appointment.ics"),
                        Some(ics.as_bytes()),
                    )
                    .await
                {
                    warn!("Reminder email to {} failed for booking {}: {:?}", customer.email, booking.id, e);
                    continue;
                }

                self.dispatch_log.record_customer_reminder(&booking.id, threshold, now).await?;
                sent += 1;
            }
        }

        if sent > 0 {
            info!("Sent {} customer reminder email(s)", sent);
        }
        Ok(sent)
    }

    /// Three independent severity levels, each with its own marker. Jobs
    /// whose appointment already passed are skipped entirely.
    pub async fn process_job_escalations(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let jobs = self.job_repo.find_unstaffed_pending(now).await?;
        let mut sent = 0;

        for job in &jobs {
            let minutes_pending = (now - job.created_at).num_minutes();
            let minutes_until = (job.scheduled_at - now).num_minutes();

            if minutes_pending >= STAFF_ESCALATION_AFTER_MIN
                && !self.dispatch_log.job_escalation_sent(&job.id, 1).await?
            {
                let available = self.staff_repo.list_available().await?;
                let handles: Vec<String> = available.iter().map(|s| s.chat_handle.clone()).collect();
                let payload = json!({
                    "job_id": job.id,
                    "service_name": job.service_name,
                    "scheduled_at": self.local_time(job.scheduled_at),
                    "address": job.address,
                    "staff_earnings": job.staff_earnings,
                    "minutes_pending": minutes_pending,
                });
                if !handles.is_empty()
                    && let Err(e) = self.push_service.send_job_escalation_to_staff(&handles, &payload).await
                {
                    warn!("Escalation push failed for job {}: {:?}", job.id, e);
                }
                let rows: Vec<Notification> = available.iter()
                    .map(|s| Notification::new(
                        &s.id,
                        "job_unstaffed",
                        "Job still needs a provider",
                        &format!("{} at {} is still unassigned", job.service_name, self.local_time(job.scheduled_at)),
                        payload.clone(),
                    ))
                    .collect();
                if let Err(e) = self.notification_repo.insert_all(&rows).await {
                    warn!("Failed to insert escalation rows for job {}: {:?}", job.id, e);
                }
                self.dispatch_log.record_job_escalation(&job.id, 1, now).await?;
                sent += 1;
            }

            if minutes_pending >= ADMIN_ESCALATION_AFTER_MIN
                && !self.dispatch_log.job_escalation_sent(&job.id, 2).await?
            {
                self.notify_admins(
                    "job_unstaffed_warning",
                    "Unstaffed job warning",
                    &format!(
                        "Job {} has been waiting {} minutes for a provider",
                        job.id, minutes_pending
                    ),
                    json!({ "job_id": job.id, "minutes_pending": minutes_pending }),
                ).await;
                self.dispatch_log.record_job_escalation(&job.id, 2, now).await?;
                sent += 1;
            }

            if minutes_until <= URGENT_ESCALATION_WINDOW_MIN
                && !self.dispatch_log.job_escalation_sent(&job.id, 3).await?
            {
                self.notify_admins(
                    "job_unstaffed_urgent",
                    "Urgent: unstaffed appointment",
                    &format!(
                        "Job {} is unstaffed with the appointment at {}",
                        job.id, self.local_time(job.scheduled_at)
                    ),
                    json!({ "job_id": job.id, "scheduled_at": job.scheduled_at }),
                ).await;
                self.dispatch_log.record_job_escalation(&job.id, 3, now).await?;
                sent += 1;
            }
        }

        if sent > 0 {
            info!("Raised {} escalation(s)", sent);
        }
        Ok(sent)
    }

    pub async fn purge_expired_markers(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let purged = self.dispatch_log
            .purge_older_than(now - Duration::days(MARKER_RETENTION_DAYS))
            .await?;
        if purged > 0 {
            info!("Purged {} expired reminder marker(s)", purged);
        }
        Ok(purged)
    }

    async fn notify_admins(&self, notification_type: &str, title: &str, message: &str, payload: serde_json::Value) {
        let admins = match self.profile_repo.list_by_role(ROLE_ADMIN).await {
            Ok(admins) => admins,
            Err(e) => {
                warn!("Failed to resolve admins: {:?}", e);
                return;
            }
        };
        let rows: Vec<Notification> = admins.iter()
            .map(|a| Notification::new(&a.id, notification_type, title, message, payload.clone()))
            .collect();
        if let Err(e) = self.notification_repo.insert_all(&rows).await {
            warn!("Failed to insert admin notification rows: {:?}", e);
        }
    }

    fn render_customer_reminder(
        &self,
        booking: &crate::domain::models::booking::Booking,
        customer: &crate::domain::models::customer::Customer,
        lines: &[crate::domain::models::booking::BookingService],
    ) -> Result<(String, String), AppError> {
        let template = match customer.language.as_str() {
            "th" => "customer_reminder_th.html",
            _ => "customer_reminder_en.html",
        };

        let mut context = tera::Context::new();
        context.insert("customer_name", &customer.name);
        context.insert("reference", &booking.reference);
        context.insert("scheduled_at", &self.local_time(booking.scheduled_at));
        context.insert("address", &booking.address);
        let services: Vec<String> = lines.iter()
            .map(|l| format!("{} ({} min)", l.service_name, l.duration_min))
            .collect();
        context.insert("services", &services);

        let body = self.templates.render(template, &context)
            .map_err(|e| AppError::InternalWithMsg(format!("Tera render error: {:?}", e)))?;

        let subject = match customer.language.as_str() {
            "th" => format!("เตือนนัดหมายสปา {}", self.local_time(booking.scheduled_at)),
            _ => format!("Your spa appointment on {}", self.local_time(booking.scheduled_at)),
        };

        Ok((subject, body))
    }
}
