//! # Domain Errors
//!
//! Business rule violations raised by entities and value objects.

use crate::domain::value_objects::QuoteStatus;
use thiserror::Error;

/// Error raised when a domain rule is violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Requested status is not in the allow-list of the current status.
    #[error("invalid quote status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: QuoteStatus,
        /// Requested status.
        to: QuoteStatus,
    },

    /// Only approved quotes convert into orders.
    #[error("quote must be Approved to convert into an order, current status is {0}")]
    QuoteNotApproved(QuoteStatus),

    /// The quote's items or terms can no longer change.
    #[error("quote in status {0} can no longer be edited")]
    QuoteNotEditable(QuoteStatus),

    /// Invalid quantity on a quote item.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Invalid price on a quote item.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Any other field-level validation failure.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
