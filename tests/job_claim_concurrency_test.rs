use spa_backend::{
    domain::models::booking::{Booking, BookingService, NewBookingParams},
    domain::models::customer::Customer,
    domain::models::job::Job,
    domain::ports::{BookingRepository, JobRepository},
    infra::repositories::{postgres_booking_repo::PostgresBookingRepo, postgres_job_repo::PostgresJobRepo},
};
use chrono::{Duration, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::ConnectOptions;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_job_claim_race_single_winner() {
    let db_url = match std::env::var("DATABASE_URL") {
        Ok(url) if url.starts_with("postgres") => url,
        _ => {
            println!("Skipping concurrency test (not targeting Postgres)");
            return;
        }
    };

    let opts = PgConnectOptions::from_str(&db_url)
        .unwrap()
        .log_statements(tracing::log::LevelFilter::Debug);

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect_with(opts)
        .await
        .expect("Failed to connect to DB");

    sqlx::migrate!("./migrations/postgres")
        .run(&pool)
        .await
        .expect("Failed to migrate test db");

    sqlx::query("DELETE FROM jobs").execute(&pool).await.unwrap();
    sqlx::query("DELETE FROM booking_services").execute(&pool).await.unwrap();
    sqlx::query("DELETE FROM bookings").execute(&pool).await.unwrap();

    let booking_repo = PostgresBookingRepo::new(pool.clone());
    let job_repo = Arc::new(PostgresJobRepo::new(pool.clone()));

    let customer = Customer::new(
        "Race Customer".to_string(),
        "race@example.com".to_string(),
        None,
        "en".to_string(),
        true,
        vec![],
    );

    let total_jobs = 20;
    let mut job_ids = Vec::new();

    for i in 0..total_jobs {
        let booking = Booking::new(NewBookingParams {
            customer_id: customer.id.clone(),
            hotel_id: None,
            provider_preference: "any".to_string(),
            recipient_count: 1,
            address: format!("{} Race Street", i),
            scheduled_at: Utc::now() + Duration::days(1),
            total_price: 1000,
            final_price: 1000,
        });
        booking_repo.create(&booking, &[]).await.unwrap();

        let line = BookingService::new(booking.id.clone(), 0, "Thai massage".to_string(), 1000, 60);
        let job = Job::for_recipient(&booking, &customer, &line, 400);
        job_ids.push(job.id.clone());
        job_repo.insert_all(&[job]).await.unwrap();
    }

    // Ten staff race to claim every job; the conditional update must let
    // exactly one of them win each row.
    let worker_count = 10;
    let mut set = JoinSet::new();

    for worker in 0..worker_count {
        let repo = job_repo.clone();
        let ids = job_ids.clone();
        set.spawn(async move {
            let staff_id = format!("staff-{}", worker);
            let mut won = Vec::new();
            for job_id in &ids {
                let claimed = repo.claim(job_id, &staff_id).await.expect("claim failed");
                if claimed == 1 {
                    won.push(job_id.clone());
                }
            }
            won
        });
    }

    let mut claims_per_job: HashMap<String, usize> = HashMap::new();
    let mut total_claims = 0;
    while let Some(res) = set.join_next().await {
        for job_id in res.unwrap() {
            *claims_per_job.entry(job_id).or_insert(0) += 1;
            total_claims += 1;
        }
    }

    println!("Total seeded: {}", total_jobs);
    println!("Total claims: {}", total_claims);

    assert_eq!(total_claims, total_jobs, "Every job should be claimed exactly once in total");
    assert!(
        claims_per_job.values().all(|&count| count == 1),
        "Duplicate claims detected! Race condition exists."
    );

    sqlx::query("DELETE FROM jobs").execute(&pool).await.unwrap();
    sqlx::query("DELETE FROM bookings").execute(&pool).await.unwrap();
}
