use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use reqwest::Method;
use std::sync::Arc;

use super::{bearer_token, item_path, read_json, ProxyResult};
use crate::form::rebuild_form;
use crate::forward::Outbound;
use crate::ProxyState;

/// GET /api/learners
pub async fn list(State(state): State<Arc<ProxyState>>, headers: HeaderMap) -> ProxyResult {
    let token = bearer_token(&headers);
    let data = state
        .forwarder
        .forward(
            Method::GET,
            "/api/learners",
            token.as_deref(),
            Outbound::Empty,
            "Failed to fetch learners",
        )
        .await?;
    Ok(Json(data))
}

/// POST /api/learners (multipart, may carry a profile image)
pub async fn create(
    State(state): State<Arc<ProxyState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProxyResult {
    const FAILED: &str = "Failed to create learner";
    state.forwarder.ensure_configured()?;
    let token = bearer_token(&headers);
    let form = rebuild_form(multipart, FAILED).await?;

    let data = state
        .forwarder
        .forward(Method::POST, "/api/learners", token.as_deref(), Outbound::Form(form), FAILED)
        .await?;
    Ok(Json(data))
}

/// GET /api/learners/:id
pub async fn get(
    State(state): State<Arc<ProxyState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ProxyResult {
    let token = bearer_token(&headers);
    let data = state
        .forwarder
        .forward(
            Method::GET,
            &item_path("/api/learners", &id)?,
            token.as_deref(),
            Outbound::Empty,
            "Failed to fetch learner",
        )
        .await?;
    Ok(Json(data))
}

/// PUT /api/learners/:id
pub async fn update(
    State(state): State<Arc<ProxyState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ProxyResult {
    const FAILED: &str = "Failed to update learner";
    state.forwarder.ensure_configured()?;
    let token = bearer_token(&headers);
    let body = read_json(body, FAILED)?;

    let data = state
        .forwarder
        .forward(
            Method::PUT,
            &item_path("/api/learners", &id)?,
            token.as_deref(),
            Outbound::Json(body),
            FAILED,
        )
        .await?;
    Ok(Json(data))
}

/// DELETE /api/learners/:id
pub async fn delete(
    State(state): State<Arc<ProxyState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ProxyResult {
    let token = bearer_token(&headers);
    let data = state
        .forwarder
        .forward(
            Method::DELETE,
            &item_path("/api/learners", &id)?,
            token.as_deref(),
            Outbound::Empty,
            "Failed to delete learner",
        )
        .await?;
    Ok(Json(data))
}
