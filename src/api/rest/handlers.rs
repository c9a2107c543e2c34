//! # REST Handlers
//!
//! Request handlers for the quote endpoints.
//!
//! Handlers parse the request, call [`QuoteService`] and render the result.
//! Every failure, including malformed JSON and bad path or query values,
//! renders as [`ErrorResponse`].

use crate::application::dto::{
    ConversionOutcome, CreateQuote, ExpirationReport, Page, QuoteDetails, UpdateQuote,
};
use crate::application::error::ApplicationError;
use crate::application::services::QuoteService;
use crate::domain::entities::Quote;
use crate::domain::value_objects::{CompanyLocationId, CustomerId, QuoteId, QuoteStatus, Timestamp};
use crate::infrastructure::persistence::{PageRequest, QuoteFilter};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// State
// ============================================================================

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Quote use cases.
    pub service: Arc<QuoteService>,
}

impl AppState {
    /// Creates the state.
    #[must_use]
    pub fn new(service: Arc<QuoteService>) -> Self {
        Self { service }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Body of the submit, approve, reject and cancel endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    /// Who performs the action.
    pub action_by: String,
    /// Optional note recorded on the audit trail.
    #[serde(default)]
    pub note: Option<String>,
}

/// Body of the order endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Who converts the quote.
    pub action_by: String,
}

/// Body of the bulk delete endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    /// Customer that must own every quote.
    pub customer_id: CustomerId,
    /// Draft quotes to delete.
    pub quote_ids: Vec<QuoteId>,
}

/// Query parameters of the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Filter by buyer.
    pub customer_id: Option<String>,
    /// Filter by company location.
    pub company_location_id: Option<String>,
    /// Filter by shop domain.
    pub store_name: Option<String>,
    /// Filter by status name.
    pub status: Option<String>,
    /// One-based page.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn into_filter(self) -> Result<(QuoteFilter, PageRequest), ApiError> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<QuoteStatus>)
            .transpose()
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        let filter = QuoteFilter {
            customer_id: self.customer_id.map(CustomerId::new),
            company_location_id: self.company_location_id.map(CompanyLocationId::new),
            store_name: self.store_name,
            status,
        };
        Ok((filter, PageRequest::new(self.page, self.per_page)))
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// An error with its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    /// Creates an error.
    #[must_use]
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    /// Creates a 400 error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Returns the status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(code = err.code(), error = %err, "request failed");
        } else {
            tracing::debug!(code = err.code(), error = %err, "request rejected");
        }
        Self::new(status, err.code(), err.public_message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Health check body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok`.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Bulk delete result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteResponse {
    /// Quotes deleted.
    pub deleted: u64,
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_id(raw: &str) -> ApiResult<QuoteId> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("invalid quote id: {raw}")))
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /api/v1/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/v1/quotes`
pub async fn list_quotes(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Page<Quote>>> {
    let Query(query) = query?;
    let (filter, page) = query.into_filter()?;
    Ok(Json(state.service.list_quotes(&filter, page).await?))
}

/// `POST /api/v1/quotes`
pub async fn create_quote(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateQuote>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<QuoteDetails>)> {
    let Json(input) = body?;
    let details = state.service.create_quote(input).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

/// `GET /api/v1/quotes/{id}`
pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<QuoteDetails>> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.get_quote(&id).await?))
}

/// `PUT /api/v1/quotes/{id}`
pub async fn update_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateQuote>, JsonRejection>,
) -> ApiResult<Json<QuoteDetails>> {
    let id = parse_id(&id)?;
    let Json(input) = body?;
    Ok(Json(state.service.update_quote(&id, input).await?))
}

/// `POST /api/v1/quotes/{id}/submit`
pub async fn submit_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> ApiResult<Json<Quote>> {
    let id = parse_id(&id)?;
    let Json(req) = body?;
    Ok(Json(state.service.submit(&id, &req.action_by, req.note).await?))
}

/// `POST /api/v1/quotes/{id}/approve`
pub async fn approve_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> ApiResult<Json<Quote>> {
    let id = parse_id(&id)?;
    let Json(req) = body?;
    Ok(Json(state.service.approve(&id, &req.action_by, req.note).await?))
}

/// `POST /api/v1/quotes/{id}/reject`
pub async fn reject_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> ApiResult<Json<Quote>> {
    let id = parse_id(&id)?;
    let Json(req) = body?;
    Ok(Json(state.service.reject(&id, &req.action_by, req.note).await?))
}

/// `POST /api/v1/quotes/{id}/cancel`
pub async fn cancel_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> ApiResult<Json<Quote>> {
    let id = parse_id(&id)?;
    let Json(req) = body?;
    Ok(Json(state.service.cancel(&id, &req.action_by, req.note).await?))
}

/// `POST /api/v1/quotes/{id}/order`
pub async fn convert_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> ApiResult<Json<ConversionOutcome>> {
    let id = parse_id(&id)?;
    let Json(req) = body?;
    Ok(Json(state.service.convert_to_order(&id, &req.action_by).await?))
}

/// `POST /api/v1/quotes/bulk-delete`
pub async fn bulk_delete_quotes(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BulkDeleteRequest>, JsonRejection>,
) -> ApiResult<Json<BulkDeleteResponse>> {
    let Json(req) = body?;
    let deleted = state
        .service
        .bulk_delete_drafts(&req.customer_id, &req.quote_ids)
        .await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}

/// `POST /api/v1/quotes/expire`
pub async fn expire_quotes(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ExpirationReport>> {
    Ok(Json(state.service.expire_quotes(Timestamp::now()).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;

    #[test]
    fn application_errors_keep_status_and_code() {
        let err: ApiError = ApplicationError::from(DomainError::InvalidStatusTransition {
            from: QuoteStatus::Declined,
            to: QuoteStatus::Approved,
        })
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body.code, "INVALID_STATUS_TRANSITION");

        let err: ApiError = ApplicationError::draft_not_found("q-1").into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn list_query_rejects_unknown_status() {
        let query = ListQuery {
            status: Some("Pending".to_string()),
            ..ListQuery::default()
        };
        let err = query.into_filter().err();
        assert_eq!(err.map(|e| e.status()), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn list_query_builds_filter() {
        let query = ListQuery {
            customer_id: Some("gid://shopify/Customer/1".to_string()),
            status: Some("approved".to_string()),
            per_page: Some(500),
            ..ListQuery::default()
        };
        let (filter, page) = query.into_filter().unwrap();
        assert_eq!(filter.status, Some(QuoteStatus::Approved));
        assert_eq!(page.per_page(), 100);
    }

    #[test]
    fn bad_id_is_bad_request() {
        let err = parse_id("not-a-uuid").err();
        assert_eq!(err.map(|e| e.status()), Some(StatusCode::BAD_REQUEST));
    }
}
