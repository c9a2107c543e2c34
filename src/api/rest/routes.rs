//! # REST Routes
//!
//! Router wiring for the quote endpoints.

use crate::api::rest::handlers::{
    AppState, approve_quote, bulk_delete_quotes, cancel_quote, convert_quote, create_quote,
    expire_quotes, get_quote, health, list_quotes, reject_quote, submit_quote, update_quote,
};
use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the API router with tracing and CORS layers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/quotes", get(list_quotes).post(create_quote))
        .route("/api/v1/quotes/bulk-delete", post(bulk_delete_quotes))
        .route("/api/v1/quotes/expire", post(expire_quotes))
        .route("/api/v1/quotes/{id}", get(get_quote).put(update_quote))
        .route("/api/v1/quotes/{id}/submit", post(submit_quote))
        .route("/api/v1/quotes/{id}/approve", post(approve_quote))
        .route("/api/v1/quotes/{id}/reject", post(reject_quote))
        .route("/api/v1/quotes/{id}/cancel", post(cancel_quote))
        .route("/api/v1/quotes/{id}/order", post(convert_quote))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors())
        .with_state(state)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
