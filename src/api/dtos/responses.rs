use serde::Serialize;

#[derive(Serialize)]
pub struct CronRunResponse {
    pub sent: usize,
}

#[derive(Serialize)]
pub struct PurgeRunResponse {
    pub purged: u64,
}

#[derive(Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

#[derive(Serialize)]
pub struct ChargeStatusResponse {
    pub charge_id: String,
    pub status: String,
    pub booking_id: String,
}
