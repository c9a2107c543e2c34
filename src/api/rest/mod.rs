//! # REST API
//!
//! REST endpoints using axum for the quote workflow.
//!
//! # Endpoints
//!
//! ## Quotes
//! - `GET /api/v1/quotes` - List quotes with filtering and pagination
//! - `POST /api/v1/quotes` - Create a quote
//! - `GET /api/v1/quotes/{id}` - Get a quote with items and notes
//! - `PUT /api/v1/quotes/{id}` - Replace items and terms
//!
//! ## Lifecycle
//! - `POST /api/v1/quotes/{id}/submit`
//! - `POST /api/v1/quotes/{id}/approve`
//! - `POST /api/v1/quotes/{id}/reject`
//! - `POST /api/v1/quotes/{id}/cancel`
//! - `POST /api/v1/quotes/{id}/order` - Convert into a platform order
//!
//! ## Maintenance
//! - `POST /api/v1/quotes/bulk-delete` - Delete draft quotes of a customer
//! - `POST /api/v1/quotes/expire` - Run an expiration scan now
//!
//! ## Health
//! - `GET /api/v1/health` - Health check endpoint
//!
//! # Usage
//!
//! ```ignore
//! use b2b_quotes::api::rest::{create_router, AppState};
//! use std::sync::Arc;
//!
//! let router = create_router(Arc::new(AppState::new(service)));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    ActionRequest, ApiError, AppState, BulkDeleteRequest, BulkDeleteResponse, ErrorResponse,
    HealthResponse, ListQuery, OrderRequest,
};
pub use routes::create_router;
