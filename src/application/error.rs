//! # Application Errors
//!
//! Error types for the application layer.
//!
//! Every variant carries an HTTP status and a machine-readable code so the
//! REST layer can render `{code, message}` without inspecting messages.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Domain(DomainError)          - Business rule violations
//! ├── Repository(RepositoryError)  - Storage failures
//! ├── Platform(PlatformError)      - Commerce platform failures
//! ├── Validation(String)           - Input validation failures
//! ├── NotFound { .. }              - Resource not found
//! ├── Unauthorized / Forbidden     - Access failures
//! ├── Conflict(String)             - State conflicts
//! ├── DraftNotFound(String)        - Platform returned no draft order
//! ├── OrderConversionFailed { .. } - Conversion to order failed
//! └── Internal(String)
//! ```
//!
//! # Examples
//!
//! ```
//! use b2b_quotes::application::error::ApplicationError;
//!
//! let err = ApplicationError::not_found("Quote", "q-123");
//! assert_eq!(err.status_code(), 404);
//! assert_eq!(err.code(), "NOT_FOUND");
//! ```

use crate::domain::errors::DomainError;
use crate::infrastructure::persistence::RepositoryError;
use crate::infrastructure::platform::PlatformError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain error from business logic.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Platform error outside a conversion.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("not found: {resource_type} with id {id}")]
    NotFound {
        /// Type of resource.
        resource_type: String,
        /// Resource identifier.
        id: String,
    },

    /// Authentication failure.
    #[error("unauthorized")]
    Unauthorized,

    /// The caller may not act on the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The resource is in a state that forbids the operation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The platform accepted the draft order request but returned no draft.
    #[error("draft order not found for quote {0}")]
    DraftNotFound(String),

    /// A platform call failed while converting a quote.
    #[error("order conversion failed for quote {quote_id}: {message}")]
    OrderConversionFailed {
        /// Quote being converted.
        quote_id: String,
        /// Underlying failure.
        message: String,
    },

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a draft not found error.
    #[must_use]
    pub fn draft_not_found(quote_id: impl Into<String>) -> Self {
        Self::DraftNotFound(quote_id.into())
    }

    /// Creates an order conversion error.
    #[must_use]
    pub fn order_conversion_failed(quote_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OrderConversionFailed {
            quote_id: quote_id.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(_) | Self::Validation(_) => 400,
            Self::Unauthorized => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound { .. } | Self::DraftNotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Repository(e) => match e {
                RepositoryError::NotFound { .. } => 404,
                RepositoryError::Duplicate { .. } | RepositoryError::Conflict(_) => 409,
                _ => 500,
            },
            Self::Platform(_) | Self::OrderConversionFailed { .. } | Self::Internal(_) => 500,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::InvalidStatusTransition { .. }) => "INVALID_STATUS_TRANSITION",
            Self::Domain(DomainError::QuoteNotApproved(_)) => "QUOTE_NOT_APPROVED",
            Self::Domain(_) | Self::Validation(_) => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DraftNotFound(_) => "DRAFT_NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::OrderConversionFailed { .. } => "ORDER_CONVERSION_FAILED",
            Self::Repository(e) => match e {
                RepositoryError::NotFound { .. } => "NOT_FOUND",
                RepositoryError::Duplicate { .. } | RepositoryError::Conflict(_) => "CONFLICT",
                _ => "INTERNAL_ERROR",
            },
            Self::Platform(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to callers. Storage details are hidden.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Repository(
                RepositoryError::Connection(_)
                | RepositoryError::Query(_)
                | RepositoryError::Serialization(_)
                | RepositoryError::Internal(_),
            ) => "internal storage error".to_string(),
            Self::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Platform(e) => e.is_retryable(),
            Self::Repository(RepositoryError::Connection(_)) => true,
            _ => false,
        }
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an authorization error.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden(_))
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
