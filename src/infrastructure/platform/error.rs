//! # Platform Errors
//!
//! Error types for commerce platform calls.
//!
//! # Examples
//!
//! ```
//! use b2b_quotes::infrastructure::platform::error::PlatformError;
//!
//! let error = PlatformError::timeout("request timed out after 10000ms");
//! assert!(error.is_retryable());
//!
//! let error = PlatformError::authentication("invalid access token");
//! assert!(!error.is_retryable());
//! ```

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// A validation error returned by a platform mutation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserError {
    /// Path of the offending input field.
    #[serde(default)]
    pub field: Option<Vec<String>>,
    /// Human readable message.
    pub message: String,
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) if !field.is_empty() => write!(f, "{}: {}", field.join("."), self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Error type for platform client operations.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// Request timed out.
    #[error("platform timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// Network or connection error, including 5xx responses.
    #[error("platform connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Access token rejected.
    #[error("platform authentication error: {message}")]
    Authentication {
        /// Error message.
        message: String,
    },

    /// Request was throttled.
    #[error("platform rate limit exceeded: {message}")]
    RateLimited {
        /// Error message.
        message: String,
    },

    /// Top-level GraphQL `errors`.
    #[error("platform GraphQL error: {}", .messages.join("; "))]
    Graphql {
        /// Error messages in response order.
        messages: Vec<String>,
    },

    /// Mutation `userErrors`.
    #[error("platform rejected input: {}", join_user_errors(.errors))]
    UserErrors {
        /// The reported errors.
        errors: Vec<UserError>,
    },

    /// Response could not be parsed or had an unexpected shape.
    #[error("platform protocol error: {message}")]
    Protocol {
        /// Error message.
        message: String,
    },

    /// No access token is configured for the store.
    #[error("no access token configured for store {store}")]
    UnknownStore {
        /// Shop domain.
        store: String,
    },

    /// Internal client error.
    #[error("platform internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

fn join_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl PlatformError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Creates a GraphQL error.
    #[must_use]
    pub fn graphql(messages: Vec<String>) -> Self {
        Self::Graphql { messages }
    }

    /// Creates a user errors error.
    #[must_use]
    pub fn user_errors(errors: Vec<UserError>) -> Self {
        Self::UserErrors { errors }
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an unknown store error.
    #[must_use]
    pub fn unknown_store(store: impl Into<String>) -> Self {
        Self::UnknownStore {
            store: store.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if the same request could succeed later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connection { .. } | Self::RateLimited { .. }
        )
    }

    /// Returns a short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Connection { .. } => "connection",
            Self::Authentication { .. } => "authentication",
            Self::RateLimited { .. } => "rate_limited",
            Self::Graphql { .. } => "graphql",
            Self::UserErrors { .. } => "user_errors",
            Self::Protocol { .. } => "protocol",
            Self::UnknownStore { .. } => "unknown_store",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(PlatformError::timeout("t").is_retryable());
        assert!(PlatformError::connection("c").is_retryable());
        assert!(PlatformError::rate_limited("r").is_retryable());
        assert!(!PlatformError::authentication("a").is_retryable());
        assert!(!PlatformError::graphql(vec!["bad".to_string()]).is_retryable());
        assert!(!PlatformError::unknown_store("x.myshopify.com").is_retryable());
    }

    #[test]
    fn user_errors_display_field_paths() {
        let err = PlatformError::user_errors(vec![
            UserError {
                field: Some(vec!["input".to_string(), "lineItems".to_string()]),
                message: "is invalid".to_string(),
            },
            UserError {
                field: None,
                message: "customer missing".to_string(),
            },
        ]);
        let text = err.to_string();
        assert!(text.contains("input.lineItems: is invalid"));
        assert!(text.contains("customer missing"));
        assert_eq!(err.kind(), "user_errors");
    }

    #[test]
    fn graphql_errors_joined() {
        let err = PlatformError::graphql(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "platform GraphQL error: a; b");
    }
}
