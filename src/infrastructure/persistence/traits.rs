//! # Repository Traits
//!
//! Port definitions for quote persistence.
//!
//! The relational store is treated as a transactional CRUD store: each
//! method is atomic on its own, and nothing spans calls. Callers do a
//! read-check-then-write without an optimistic concurrency token.
//!
//! # Examples
//!
//! ```ignore
//! use b2b_quotes::infrastructure::persistence::traits::QuoteRepository;
//!
//! async fn drafts(repo: &impl QuoteRepository, filter: QuoteFilter) {
//!     let (quotes, total) = repo.find(&filter, PageRequest::default()).await?;
//!     println!("{} of {total}", quotes.len());
//! }
//! ```

use crate::domain::entities::{Quote, QuoteItem, QuoteNote};
use crate::domain::value_objects::{
    CompanyLocationId, CustomerId, QuoteId, QuoteStatus, Timestamp,
};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Default number of quotes per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Entity not found.
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Duplicate entity.
    #[error("Duplicate entity: {entity_type} with id {id} already exists")]
    Duplicate {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// A guarded write matched fewer rows than required; nothing was written.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query error.
    #[error("Query error: {0}")]
    Query(String),

    /// Stored data could not be mapped back into the domain.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a conflict error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Criteria for listing quotes. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteFilter {
    /// Owning buyer.
    pub customer_id: Option<CustomerId>,
    /// Company location.
    pub company_location_id: Option<CompanyLocationId>,
    /// Shop domain.
    pub store_name: Option<String>,
    /// Status.
    pub status: Option<QuoteStatus>,
}

impl QuoteFilter {
    /// Returns true if `quote` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, quote: &Quote) -> bool {
        self.customer_id
            .as_ref()
            .is_none_or(|id| quote.customer_id() == id)
            && self
                .company_location_id
                .as_ref()
                .is_none_or(|id| quote.company_location_id() == id)
            && self
                .store_name
                .as_deref()
                .is_none_or(|store| quote.store_name() == store)
            && self.status.is_none_or(|status| quote.status() == status)
    }
}

/// One-based page request, clamped to `1..=MAX_PAGE_SIZE` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Builds a page request, substituting defaults and clamping.
    #[must_use]
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// One-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of items to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Repository for quotes, their items and their notes.
#[async_trait]
pub trait QuoteRepository: Send + Sync + fmt::Debug {
    /// Inserts a new quote together with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the quote ID already exists.
    async fn insert(&self, quote: &Quote, items: &[QuoteItem]) -> RepositoryResult<()>;

    /// Gets a quote header by ID.
    async fn get(&self, id: &QuoteId) -> RepositoryResult<Option<Quote>>;

    /// Gets the quotes that exist among `ids`, in no particular order.
    async fn get_many(&self, ids: &[QuoteId]) -> RepositoryResult<Vec<Quote>>;

    /// Gets the items of a quote.
    async fn get_items(&self, id: &QuoteId) -> RepositoryResult<Vec<QuoteItem>>;

    /// Gets the notes of a quote, oldest first.
    async fn get_notes(&self, id: &QuoteId) -> RepositoryResult<Vec<QuoteNote>>;

    /// Lists quotes matching `filter`, newest first, with the total match count.
    async fn find(
        &self,
        filter: &QuoteFilter,
        page: PageRequest,
    ) -> RepositoryResult<(Vec<Quote>, u64)>;

    /// Updates the quote header and replaces its items in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the quote does not exist.
    async fn save_with_items(&self, quote: &Quote, items: &[QuoteItem]) -> RepositoryResult<()>;

    /// Updates the quote header and appends a note in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the quote does not exist.
    async fn record_transition(&self, quote: &Quote, note: &QuoteNote) -> RepositoryResult<()>;

    /// Returns IDs of quotes whose expiration date is before `now` and whose
    /// status is still expirable. Cancelled quotes are never returned.
    async fn find_expiration_candidates(&self, now: Timestamp) -> RepositoryResult<Vec<QuoteId>>;

    /// Expires one batch of quotes.
    ///
    /// Only rows still `Submitted` or `Approved` and still past their
    /// expiration date are updated; each updated row gets one system note. Returns the IDs actually updated.
    async fn expire_batch(&self, ids: &[QuoteId], now: Timestamp) -> RepositoryResult<Vec<QuoteId>>;

    /// Deletes draft quotes owned by `customer_id`, with their items and notes.
    ///
    /// Returns the number of deleted quotes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict`, deleting nothing, if any ID is
    /// missing, owned by someone else, or not `Draft`.
    async fn delete_drafts(&self, customer_id: &CustomerId, ids: &[QuoteId])
    -> RepositoryResult<u64>;
}
