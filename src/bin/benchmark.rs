use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use reqwest::Client;
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const DURATION_SECS: u64 = 20;
const BASE_URL: &str = "http://localhost:3000";

struct Target {
    name: &'static str,
    method: &'static str,
    url: String,
    body: Option<serde_json::Value>,
    authed: bool,
}

#[tokio::main]
async fn main() {
    let service_token = std::env::var("SERVICE_TOKEN").unwrap_or_else(|_| "dev-service-token".to_string());

    println!("{}", "🚀 Starting Benchmark Suite".bold().green());
    println!("Target URL: {}", BASE_URL);

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    if client.get(format!("{}/health", BASE_URL)).send().await.is_err() {
        eprintln!("{}", "❌ Server is NOT reachable at localhost:3000. Please start it first.".red().bold());
        return;
    }

    println!("\n{}", "⚙️  Setting up benchmark data...".yellow());
    let customer_id = setup_customer(&client, &service_token).await;

    println!("{}", "✅ Data created successfully.".green());
    println!("   Customer ID: {}", customer_id);

    let booking_body = json!({
        "customer_id": customer_id,
        "scheduled_at": (Utc::now() + ChronoDuration::days(7)).to_rfc3339(),
        "address": "99 Benchmark Road",
        "services": [
            { "service_name": "Thai massage", "price": 1200, "duration_min": 60 }
        ]
    });

    let targets = vec![
        Target {
            name: "Health Check (Public)",
            method: "GET",
            url: format!("{}/health", BASE_URL),
            body: None,
            authed: false,
        },
        Target {
            name: "Booking Stats (Aggregate Read)",
            method: "GET",
            url: format!("{}/api/v1/bookings/stats", BASE_URL),
            body: None,
            authed: true,
        },
        Target {
            name: "Create Booking (Transactional Write)",
            method: "POST",
            url: format!("{}/api/v1/bookings", BASE_URL),
            body: Some(booking_body),
            authed: false,
        },
    ];

    let rps_stages = vec![10, 50, 200, 1000];

    for target in targets {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking Endpoint: {}", target.name.cyan().bold());
        println!("URL: {}", target.url);
        println!("{}", "=".repeat(60));

        println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        for &rps in &rps_stages {
            run_stage(&client, &target, rps, &service_token).await;
        }
    }
}

async fn setup_customer(client: &Client, service_token: &str) -> String {
    let res = client.post(format!("{}/api/v1/customers", BASE_URL))
        .header("Authorization", format!("Bearer {}", service_token))
        .json(&json!({
            "name": "Benchmark Customer",
            "email": "bench@example.com"
        }))
        .send()
        .await
        .expect("Failed to send customer create request");

    if !res.status().is_success() {
        panic!("Failed to create customer: status {}", res.status());
    }

    let body: Value = res.json().await.expect("Failed to parse customer response");
    body["id"].as_str().expect("No customer id").to_string()
}

async fn run_stage(client: &Client, target: &Target, rps: u32, service_token: &str) {
    let limiter = Arc::new(RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(rps).unwrap())
    ));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = target.url.clone();
            let body = target.body.clone();
            let method = target.method;
            let auth_header = if target.authed {
                Some(format!("Bearer {}", service_token))
            } else {
                None
            };
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let mut req = match method {
                    "POST" => client.post(&url),
                    _ => client.get(&url),
                };
                if let Some(auth) = auth_header {
                    req = req.header("Authorization", auth);
                }
                if let Some(b) = body {
                    req = req.json(&b);
                }
                let res = req.send().await;
                let latency = req_start.elapsed();

                let success = match res {
                    Ok(r) => r.status().is_success(),
                    Err(_) => false,
                };

                let _ = tx.send((latency, success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        histogram.record(latency.as_micros() as u64).unwrap();
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}
