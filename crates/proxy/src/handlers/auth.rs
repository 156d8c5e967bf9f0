//! Login, admin signup and email verification

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use reqwest::Method;
use std::sync::Arc;

use super::{bearer_token, read_json, ProxyResult};
use crate::forward::Outbound;
use crate::ProxyState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<ProxyState>>,
    body: Result<Bytes, BytesRejection>,
) -> ProxyResult {
    const FAILED: &str = "Login failed";
    state.forwarder.ensure_configured()?;
    let body = read_json(body, FAILED)?;

    let data = state
        .forwarder
        .forward(Method::POST, "/api/auth/login", None, Outbound::Json(body), FAILED)
        .await?;
    Ok(Json(data))
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<Arc<ProxyState>>,
    body: Result<Bytes, BytesRejection>,
) -> ProxyResult {
    const FAILED: &str = "Signup failed";
    state.forwarder.ensure_configured()?;
    let body = read_json(body, FAILED)?;

    let data = state
        .forwarder
        .forward(Method::POST, "/api/auth/signup/admin", None, Outbound::Json(body), FAILED)
        .await?;
    Ok(Json(data))
}

/// POST /api/auth/otp
pub async fn verify_otp(
    State(state): State<Arc<ProxyState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ProxyResult {
    const FAILED: &str = "OTP verification failed";
    state.forwarder.ensure_configured()?;
    let token = bearer_token(&headers);
    let body = read_json(body, FAILED)?;

    let data = state
        .forwarder
        .forward(
            Method::POST,
            "/api/auth/verify-email",
            token.as_deref(),
            Outbound::Json(body),
            FAILED,
        )
        .await?;
    Ok(Json(data))
}
