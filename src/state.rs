use std::sync::Arc;
use crate::domain::ports::{
    BookingRepository, CustomerRepository, DispatchLogRepository, EmailService,
    JobRepository, MetricsRepository, NotificationRepository, PaymentGateway,
    ProfileRepository, PushService, StaffRepository, TransactionRepository,
};
use crate::domain::services::job_service::JobService;
use crate::domain::services::notification_service::NotificationService;
use crate::domain::services::reminder_service::ReminderService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub staff_repo: Arc<dyn StaffRepository>,
    pub customer_repo: Arc<dyn CustomerRepository>,
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub dispatch_log_repo: Arc<dyn DispatchLogRepository>,
    pub metrics_repo: Arc<dyn MetricsRepository>,
    pub transaction_repo: Arc<dyn TransactionRepository>,
    pub push_service: Arc<dyn PushService>,
    pub email_service: Arc<dyn EmailService>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub job_service: Arc<JobService>,
    pub notification_service: Arc<NotificationService>,
    pub reminder_service: Arc<ReminderService>,
}
