use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};
use std::sync::Arc;
use crate::state::AppState;

/// Bearer-token guard for admin, cron and payment routes. The production
/// deployment fronts this service with a managed auth layer; internally a
/// single shared service token is enough.
pub struct ServiceAuth;

impl FromRequestParts<Arc<AppState>> for ServiceAuth {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let header_value = parts.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token = header_value.strip_prefix("Bearer ").ok_or(StatusCode::UNAUTHORIZED)?;

        if token != state.config.service_token {
            return Err(StatusCode::UNAUTHORIZED);
        }

        Ok(ServiceAuth)
    }
}
