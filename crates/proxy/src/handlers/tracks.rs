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

/// GET /api/tracks
pub async fn list(State(state): State<Arc<ProxyState>>, headers: HeaderMap) -> ProxyResult {
    let token = bearer_token(&headers);
    let data = state
        .forwarder
        .forward(
            Method::GET,
            "/api/tracks",
            token.as_deref(),
            Outbound::Empty,
            "Failed to fetch tracks",
        )
        .await?;
    Ok(Json(data))
}

/// POST /api/tracks (multipart)
pub async fn create(
    State(state): State<Arc<ProxyState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProxyResult {
    const FAILED: &str = "Failed to create track";
    state.forwarder.ensure_configured()?;
    let token = bearer_token(&headers);
    let form = rebuild_form(multipart, FAILED).await?;

    let data = state
        .forwarder
        .forward(Method::POST, "/api/tracks", token.as_deref(), Outbound::Form(form), FAILED)
        .await?;
    Ok(Json(data))
}

/// GET /api/tracks/:id
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
            &item_path("/api/tracks", &id)?,
            token.as_deref(),
            Outbound::Empty,
            "Failed to fetch track",
        )
        .await?;
    Ok(Json(data))
}

/// PUT /api/tracks/:id (multipart)
pub async fn update(
    State(state): State<Arc<ProxyState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProxyResult {
    const FAILED: &str = "Failed to update track";
    state.forwarder.ensure_configured()?;
    let token = bearer_token(&headers);
    let form = rebuild_form(multipart, FAILED).await?;

    let data = state
        .forwarder
        .forward(
            Method::PUT,
            &item_path("/api/tracks", &id)?,
            token.as_deref(),
            Outbound::Form(form),
            FAILED,
        )
        .await?;
    Ok(Json(data))
}

/// DELETE /api/tracks/:id
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
            &item_path("/api/tracks", &id)?,
            token.as_deref(),
            Outbound::Empty,
            "Failed to delete track",
        )
        .await?;
    Ok(Json(data))
}

// Ratings do not relay the caller's bearer token.

/// GET /api/tracks/:id/ratings
pub async fn ratings(State(state): State<Arc<ProxyState>>, Path(id): Path<String>) -> ProxyResult {
    let data = state
        .forwarder
        .forward(
            Method::GET,
            &format!("{}/ratings", item_path("/api/tracks", &id)?),
            None,
            Outbound::Empty,
            "Failed to fetch track ratings",
        )
        .await?;
    Ok(Json(data))
}

/// POST /api/tracks/:id/ratings
pub async fn rate(
    State(state): State<Arc<ProxyState>>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> ProxyResult {
    const FAILED: &str = "Failed to rate track";
    state.forwarder.ensure_configured()?;
    let body = read_json(body, FAILED)?;

    let data = state
        .forwarder
        .forward(
            Method::POST,
            &format!("{}/ratings", item_path("/api/tracks", &id)?),
            None,
            Outbound::Json(body),
            FAILED,
        )
        .await?;
    Ok(Json(data))
}
