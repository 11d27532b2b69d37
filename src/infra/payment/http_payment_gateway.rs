use crate::domain::ports::{ChargeRequest, GatewayCharge, PaymentGateway};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::error;

pub struct HttpPaymentGateway {
    client: Client,
    api_url: String,
    secret_key: String,
}

impl HttpPaymentGateway {
    pub fn new(api_url: String, secret_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            secret_key,
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, AppError> {
        let res = self.client.post(format!("{}{}", self.api_url, path))
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Gateway connection error: {}", e);
                error!("{}", msg);
                AppError::Gateway(msg)
            })?;

        let status = res.status();
        let value: Value = res.json().await
            .map_err(|e| AppError::Gateway(format!("Gateway returned invalid JSON: {}", e)))?;
        if !status.is_success() {
            let msg = value["message"].as_str().unwrap_or("gateway request failed").to_string();
            error!("Gateway POST {} failed ({}): {}", path, status, msg);
            return Err(AppError::Gateway(msg));
        }
        Ok(value)
    }

    async fn get(&self, path: &str) -> Result<Value, AppError> {
        let res = self.client.get(format!("{}{}", self.api_url, path))
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Gateway connection error: {}", e)))?;

        let status = res.status();
        let value: Value = res.json().await
            .map_err(|e| AppError::Gateway(format!("Gateway returned invalid JSON: {}", e)))?;
        if !status.is_success() {
            let msg = value["message"].as_str().unwrap_or("gateway request failed").to_string();
            error!("Gateway GET {} failed ({}): {}", path, status, msg);
            return Err(AppError::Gateway(msg));
        }
        Ok(value)
    }

    fn charge_from_value(value: Value) -> GatewayCharge {
        GatewayCharge {
            id: value["id"].as_str().unwrap_or_default().to_string(),
            status: value["status"].as_str().unwrap_or("unknown").to_string(),
            paid: value["paid"].as_bool().unwrap_or(false),
            amount: value["amount"].as_i64().unwrap_or(0),
            currency: value["currency"].as_str().unwrap_or_default().to_string(),
            raw: value,
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<GatewayCharge, AppError> {
        let body = json!({
            "amount": request.amount,
            "currency": request.currency,
            "card": request.token,
            "description": request.description,
            "metadata": { "booking_id": request.booking_id },
        });
        let value = self.post("/charges", &body).await?;
        Ok(Self::charge_from_value(value))
    }

    async fn get_charge(&self, charge_id: &str) -> Result<GatewayCharge, AppError> {
        let value = self.get(&format!("/charges/{}", charge_id)).await?;
        Ok(Self::charge_from_value(value))
    }

    async fn refund_charge(&self, charge_id: &str, amount: Option<i64>) -> Result<GatewayCharge, AppError> {
        let body = match amount {
            Some(a) => json!({ "amount": a }),
            None => json!({}),
        };
        self.post(&format!("/charges/{}/refunds", charge_id), &body).await?;
        self.get_charge(charge_id).await
    }

    async fn create_source(&self, request: &Value) -> Result<Value, AppError> {
        self.post("/sources", request).await
    }

    async fn attach_payment_method(&self, customer_ref: &str, token: &str) -> Result<Value, AppError> {
        self.post(&format!("/customers/{}", customer_ref), &json!({ "card": token })).await
    }
}
