//! Proxy surface consumed by the admin console

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::handlers::{auth, courses, invoices, learners, tracks};
use crate::ProxyState;

/// Build the router with every proxy route
pub fn build_router(state: Arc<ProxyState>) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/otp", post(auth::verify_otp))
        // Courses
        .route("/api/courses", get(courses::list).post(courses::create))
        .route(
            "/api/courses/:id",
            get(courses::get).put(courses::update).delete(courses::delete),
        )
        // Invoices
        .route("/api/invoices", get(invoices::list).post(invoices::create))
        .route(
            "/api/invoices/:id",
            get(invoices::get).put(invoices::update).delete(invoices::delete),
        )
        // Learners
        .route("/api/learners", get(learners::list).post(learners::create))
        .route(
            "/api/learners/:id",
            get(learners::get).put(learners::update).delete(learners::delete),
        )
        // Tracks
        .route("/api/tracks", get(tracks::list).post(tracks::create))
        .route(
            "/api/tracks/:id",
            get(tracks::get).put(tracks::update).delete(tracks::delete),
        )
        .route("/api/tracks/:id/ratings", get(tracks::ratings).post(tracks::rate))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
