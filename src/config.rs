use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub service_token: String,
    pub push_service_url: String,
    pub push_service_token: String,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub payment_gateway_url: String,
    pub payment_gateway_key: String,
    pub commission_rate: i64, // staff share of the service price, percent
    pub currency: String,
    pub business_timezone: String,
    pub poll_interval_secs: u64, // 0 disables the in-process poller
    pub reminder_window_min: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            service_token: env::var("SERVICE_TOKEN").expect("SERVICE_TOKEN must be set"),
            push_service_url: env::var("PUSH_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8100/api/v1/push".to_string()),
            push_service_token: env::var("PUSH_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            payment_gateway_url: env::var("PAYMENT_GATEWAY_URL").unwrap_or_else(|_| "https://api.gateway.test".to_string()),
            payment_gateway_key: env::var("PAYMENT_GATEWAY_KEY").unwrap_or_else(|_| "skey_test_0000000000".to_string()),
            commission_rate: env::var("COMMISSION_RATE").unwrap_or_else(|_| "40".to_string()).parse().expect("COMMISSION_RATE must be a number"),
            currency: env::var("CURRENCY").unwrap_or_else(|_| "thb".to_string()),
            business_timezone: env::var("BUSINESS_TIMEZONE").unwrap_or_else(|_| "Asia/Bangkok".to_string()),
            poll_interval_secs: env::var("POLL_INTERVAL_SECS").unwrap_or_else(|_| "60".to_string()).parse().expect("POLL_INTERVAL_SECS must be a number"),
            reminder_window_min: env::var("REMINDER_WINDOW_MIN").unwrap_or_else(|_| "15".to_string()).parse().expect("REMINDER_WINDOW_MIN must be a number"),
        }
    }
}
