//! Invoice routes. These do not relay the caller's bearer token.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::Json;
use reqwest::Method;
use std::sync::Arc;

use super::{item_path, read_json, ProxyResult};
use crate::forward::Outbound;
use crate::ProxyState;

/// GET /api/invoices
pub async fn list(State(state): State<Arc<ProxyState>>) -> ProxyResult {
    let data = state
        .forwarder
        .forward(Method::GET, "/api/invoices", None, Outbound::Empty, "Failed to fetch invoices")
        .await?;
    Ok(Json(data))
}

/// POST /api/invoices
pub async fn create(
    State(state): State<Arc<ProxyState>>,
    body: Result<Bytes, BytesRejection>,
) -> ProxyResult {
    const FAILED: &str = "Failed to create invoice";
    state.forwarder.ensure_configured()?;
    let body = read_json(body, FAILED)?;

    let data = state
        .forwarder
        .forward(Method::POST, "/api/invoices", None, Outbound::Json(body), FAILED)
        .await?;
    Ok(Json(data))
}

/// GET /api/invoices/:id
pub async fn get(State(state): State<Arc<ProxyState>>, Path(id): Path<String>) -> ProxyResult {
    let data = state
        .forwarder
        .forward(
            Method::GET,
            &item_path("/api/invoices", &id)?,
            None,
            Outbound::Empty,
            "Failed to fetch invoice",
        )
        .await?;
    Ok(Json(data))
}

/// PUT /api/invoices/:id
pub async fn update(
    State(state): State<Arc<ProxyState>>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> ProxyResult {
    const FAILED: &str = "Failed to update invoice";
    state.forwarder.ensure_configured()?;
    let body = read_json(body, FAILED)?;

    let data = state
        .forwarder
        .forward(
            Method::PUT,
            &item_path("/api/invoices", &id)?,
            None,
            Outbound::Json(body),
            FAILED,
        )
        .await?;
    Ok(Json(data))
}

/// DELETE /api/invoices/:id
pub async fn delete(State(state): State<Arc<ProxyState>>, Path(id): Path<String>) -> ProxyResult {
    let data = state
        .forwarder
        .forward(
            Method::DELETE,
            &item_path("/api/invoices", &id)?,
            None,
            Outbound::Empty,
            "Failed to delete invoice",
        )
        .await?;
    Ok(Json(data))
}
