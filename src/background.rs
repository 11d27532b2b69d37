use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use crate::state::AppState;

/// In-process rendition of the external cron trigger: one tick runs every
/// poller with the same wall-clock `now`. The marker tables make ticks
/// idempotent, so an external scheduler hitting the cron endpoints in
/// parallel is harmless.
pub async fn start_background_worker(state: Arc<AppState>) {
    let interval = state.config.poll_interval_secs;
    if interval == 0 {
        info!("In-process poller disabled (POLL_INTERVAL_SECS=0)");
        return;
    }

    info!("Starting dispatch poller (every {}s)...", interval);

    loop {
        let now = Utc::now();
        let span = info_span!("dispatch_poll", at = %now.to_rfc3339());

        async {
            match state.reminder_service.process_job_reminders(now).await {
                Ok(sent) if sent > 0 => info!("Poll tick: {} staff reminder(s)", sent),
                Ok(_) => {}
                Err(e) => error!("Job reminder poll failed: {:?}", e),
            }

            match state.reminder_service.process_customer_email_reminders(now).await {
                Ok(sent) if sent > 0 => info!("Poll tick: {} customer reminder(s)", sent),
                Ok(_) => {}
                Err(e) => error!("Customer reminder poll failed: {:?}", e),
            }

            match state.reminder_service.process_job_escalations(now).await {
                Ok(sent) if sent > 0 => info!("Poll tick: {} escalation(s)", sent),
                Ok(_) => {}
                Err(e) => error!("Escalation poll failed: {:?}", e),
            }

            if let Err(e) = state.reminder_service.purge_expired_markers(now).await {
                error!("Marker purge failed: {:?}", e);
            }
        }
            .instrument(span)
            .await;

        sleep(Duration::from_secs(interval)).await;
    }
}
