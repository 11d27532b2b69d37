use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{
    BookingRepository, CustomerRepository, DispatchLogRepository, EmailService,
    JobRepository, MetricsRepository, NotificationRepository, PaymentGateway,
    ProfileRepository, PushService, StaffRepository, TransactionRepository,
};
use crate::domain::services::job_service::JobService;
use crate::domain::services::notification_service::NotificationService;
use crate::domain::services::reminder_service::ReminderService;
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::push::http_push_service::HttpPushService;
use crate::infra::payment::http_payment_gateway::HttpPaymentGateway;
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_job_repo::PostgresJobRepo,
    postgres_staff_repo::PostgresStaffRepo, postgres_customer_repo::PostgresCustomerRepo,
    postgres_profile_repo::PostgresProfileRepo, postgres_notification_repo::PostgresNotificationRepo,
    postgres_dispatch_log_repo::PostgresDispatchLogRepo, postgres_metrics_repo::PostgresMetricsRepo,
    postgres_transaction_repo::PostgresTransactionRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_job_repo::SqliteJobRepo,
    sqlite_staff_repo::SqliteStaffRepo, sqlite_customer_repo::SqliteCustomerRepo,
    sqlite_profile_repo::SqliteProfileRepo, sqlite_notification_repo::SqliteNotificationRepo,
    sqlite_dispatch_log_repo::SqliteDispatchLogRepo, sqlite_metrics_repo::SqliteMetricsRepo,
    sqlite_transaction_repo::SqliteTransactionRepo,
};

pub struct Repos {
    pub booking: Arc<dyn BookingRepository>,
    pub job: Arc<dyn JobRepository>,
    pub staff: Arc<dyn StaffRepository>,
    pub customer: Arc<dyn CustomerRepository>,
    pub profile: Arc<dyn ProfileRepository>,
    pub notification: Arc<dyn NotificationRepository>,
    pub dispatch_log: Arc<dyn DispatchLogRepository>,
    pub metrics: Arc<dyn MetricsRepository>,
    pub transaction: Arc<dyn TransactionRepository>,
}

pub fn load_templates() -> Arc<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template("customer_reminder_en.html", include_str!("../templates/customer_reminder_en.html"))
        .expect("Failed to load English reminder template");
    tera.add_raw_template("customer_reminder_th.html", include_str!("../templates/customer_reminder_th.html"))
        .expect("Failed to load Thai reminder template");
    Arc::new(tera)
}

/// Wires the domain services over a ready set of repositories and outbound
/// adapters. Shared by both database backends and by the test harness.
pub fn assemble_state(
    config: &Config,
    repos: Repos,
    push_service: Arc<dyn PushService>,
    email_service: Arc<dyn EmailService>,
    payment_gateway: Arc<dyn PaymentGateway>,
    templates: Arc<Tera>,
) -> AppState {
    let job_service = Arc::new(JobService::new(
        repos.booking.clone(),
        repos.job.clone(),
        repos.staff.clone(),
        repos.customer.clone(),
        repos.metrics.clone(),
        config.commission_rate,
    ));

    let notification_service = Arc::new(NotificationService::new(
        repos.booking.clone(),
        repos.job.clone(),
        repos.staff.clone(),
        repos.customer.clone(),
        repos.profile.clone(),
        repos.notification.clone(),
        push_service.clone(),
        job_service.clone(),
        config.business_timezone.clone(),
        config.currency.clone(),
    ));

    let reminder_service = Arc::new(ReminderService::new(
        repos.booking.clone(),
        repos.job.clone(),
        repos.staff.clone(),
        repos.customer.clone(),
        repos.profile.clone(),
        repos.notification.clone(),
        repos.dispatch_log.clone(),
        push_service.clone(),
        email_service.clone(),
        templates,
        config.business_timezone.clone(),
        config.reminder_window_min,
    ));

    AppState {
        config: config.clone(),
        booking_repo: repos.booking,
        job_repo: repos.job,
        staff_repo: repos.staff,
        customer_repo: repos.customer,
        profile_repo: repos.profile,
        notification_repo: repos.notification,
        dispatch_log_repo: repos.dispatch_log,
        metrics_repo: repos.metrics,
        transaction_repo: repos.transaction,
        push_service,
        email_service,
        payment_gateway,
        job_service,
        notification_service,
        reminder_service,
    }
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let push_service = Arc::new(HttpPushService::new(
        config.push_service_url.clone(),
        config.push_service_token.clone(),
    ));
    let email_service = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
    ));
    let payment_gateway = Arc::new(HttpPaymentGateway::new(
        config.payment_gateway_url.clone(),
        config.payment_gateway_key.clone(),
    ));
    let templates = load_templates();

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let repos = Repos {
            booking: Arc::new(PostgresBookingRepo::new(pool.clone())),
            job: Arc::new(PostgresJobRepo::new(pool.clone())),
            staff: Arc::new(PostgresStaffRepo::new(pool.clone())),
            customer: Arc::new(PostgresCustomerRepo::new(pool.clone())),
            profile: Arc::new(PostgresProfileRepo::new(pool.clone())),
            notification: Arc::new(PostgresNotificationRepo::new(pool.clone())),
            dispatch_log: Arc::new(PostgresDispatchLogRepo::new(pool.clone())),
            metrics: Arc::new(PostgresMetricsRepo::new(pool.clone())),
            transaction: Arc::new(PostgresTransactionRepo::new(pool.clone())),
        };

        assemble_state(config, repos, push_service, email_service, payment_gateway, templates)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let repos = Repos {
            booking: Arc::new(SqliteBookingRepo::new(pool.clone())),
            job: Arc::new(SqliteJobRepo::new(pool.clone())),
            staff: Arc::new(SqliteStaffRepo::new(pool.clone())),
            customer: Arc::new(SqliteCustomerRepo::new(pool.clone())),
            profile: Arc::new(SqliteProfileRepo::new(pool.clone())),
            notification: Arc::new(SqliteNotificationRepo::new(pool.clone())),
            dispatch_log: Arc::new(SqliteDispatchLogRepo::new(pool.clone())),
            metrics: Arc::new(SqliteMetricsRepo::new(pool.clone())),
            transaction: Arc::new(SqliteTransactionRepo::new(pool.clone())),
        };

        assemble_state(config, repos, push_service, email_service, payment_gateway, templates)
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
