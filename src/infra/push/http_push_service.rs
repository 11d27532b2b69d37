use crate::domain::ports::PushService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

/// Multicast adapter for the external chat-messaging API. One POST per
/// event, addressed to a batch of chat handles.
pub struct HttpPushService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpPushService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }

    async fn send(&self, message_type: &str, handles: &[String], payload: &Value) -> Result<(), AppError> {
        let body = PushPayload {
            message_type: message_type.to_string(),
            recipients: handles.to_vec(),
            payload: payload.clone(),
        };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Push service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Push service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct PushPayload {
    message_type: String,
    recipients: Vec<String>,
    payload: Value,
}

#[async_trait]
impl PushService for HttpPushService {
    async fn send_new_job_to_staff(&self, handles: &[String], payload: &Value) -> Result<(), AppError> {
        self.send("new_job", handles, payload).await
    }

    async fn send_new_booking_to_admin(&self, handles: &[String], payload: &Value) -> Result<(), AppError> {
        self.send("new_booking", handles, payload).await
    }

    async fn send_job_reavailable_to_staff(&self, handles: &[String], payload: &Value) -> Result<(), AppError> {
        self.send("job_reavailable", handles, payload).await
    }

    async fn send_job_cancelled_to_admin(&self, handles: &[String], payload: &Value) -> Result<(), AppError> {
        self.send("job_cancelled", handles, payload).await
    }

    async fn send_job_reminder_to_staff(&self, handles: &[String], payload: &Value) -> Result<(), AppError> {
        self.send("job_reminder", handles, payload).await
    }

    async fn send_job_escalation_to_staff(&self, handles: &[String], payload: &Value) -> Result<(), AppError> {
        self.send("job_escalation", handles, payload).await
    }
}
