use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::app::errors;

/// Header carrying the shared secret (the backend's webhook sender sets it).
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Clone)]
pub struct WebhookAuthState {
    secret_digest: Arc<[u8; 32]>,
}

impl WebhookAuthState {
    pub fn new(secret: &str) -> Self {
        Self {
            secret_digest: Arc::new(Sha256::digest(secret.as_bytes()).into()),
        }
    }

    /// Compare digests so the comparison time does not depend on how much of
    /// the secret a caller guessed right.
    fn matches(&self, presented: &str) -> bool {
        let presented: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
        presented == *self.secret_digest
    }
}

/// Rejects inbound calls without the shared secret before any body parsing or
/// evaluation happens.
pub async fn webhook_auth_middleware(
    State(state): State<WebhookAuthState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let presented = extract_secret(req.headers()).ok_or_else(unauthorized)?;

    if !state.matches(presented) {
        tracing::warn!(path = %req.uri().path(), "rejected call with wrong shared secret");
        return Err(unauthorized());
    }

    Ok(next.run(req).await)
}

fn unauthorized() -> Response {
    errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "missing or invalid shared secret")
}

/// `x-webhook-secret: <secret>` or `Authorization: Bearer <secret>`.
fn extract_secret(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(WEBHOOK_SECRET_HEADER) {
        let value = value.to_str().ok()?.trim();
        return (!value.is_empty()).then_some(value);
    }

    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
