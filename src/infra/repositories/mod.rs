pub mod sqlite_booking_repo;
pub mod sqlite_job_repo;
pub mod sqlite_staff_repo;
pub mod sqlite_customer_repo;
pub mod sqlite_profile_repo;
pub mod sqlite_notification_repo;
pub mod sqlite_dispatch_log_repo;
pub mod sqlite_metrics_repo;
pub mod sqlite_transaction_repo;

pub mod postgres_booking_repo;
pub mod postgres_job_repo;
pub mod postgres_staff_repo;
pub mod postgres_customer_repo;
pub mod postgres_profile_repo;
pub mod postgres_notification_repo;
pub mod postgres_dispatch_log_repo;
pub mod postgres_metrics_repo;
pub mod postgres_transaction_repo;
