use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use reqwest::Method;
use std::sync::Arc;

use super::{bearer_token, item_path, ProxyResult};
use crate::form::rebuild_form;
use crate::forward::Outbound;
use crate::ProxyState;

/// GET /api/courses
pub async fn list(State(state): State<Arc<ProxyState>>, headers: HeaderMap) -> ProxyResult {
    let token = bearer_token(&headers);
    let data = state
        .forwarder
        .forward(
            Method::GET,
            "/api/courses",
            token.as_deref(),
            Outbound::Empty,
            "Failed to fetch courses",
        )
        .await?;
    Ok(Json(data))
}

/// POST /api/courses (multipart)
pub async fn create(
    State(state): State<Arc<ProxyState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProxyResult {
    const FAILED: &str = "Failed to create course";
    state.forwarder.ensure_configured()?;
    let token = bearer_token(&headers);
    let form = rebuild_form(multipart, FAILED).await?;

    let data = state
        .forwarder
        .forward(Method::POST, "/api/courses", token.as_deref(), Outbound::Form(form), FAILED)
        .await?;
    Ok(Json(data))
}

/// GET /api/courses/:id
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
            &item_path("/api/courses", &id)?,
            token.as_deref(),
            Outbound::Empty,
            "Failed to fetch course",
        )
        .await?;
    Ok(Json(data))
}

/// PUT /api/courses/:id (multipart)
pub async fn update(
    State(state): State<Arc<ProxyState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProxyResult {
    const FAILED: &str = "Failed to update course";
    state.forwarder.ensure_configured()?;
    let token = bearer_token(&headers);
    let form = rebuild_form(multipart, FAILED).await?;

    let data = state
        .forwarder
        .forward(
            Method::PUT,
            &item_path("/api/courses", &id)?,
            token.as_deref(),
            Outbound::Form(form),
            FAILED,
        )
        .await?;
    Ok(Json(data))
}

/// DELETE /api/courses/:id
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
            &item_path("/api/courses", &id)?,
            token.as_deref(),
            Outbound::Empty,
            "Failed to delete course",
        )
        .await?;
    Ok(Json(data))
}
