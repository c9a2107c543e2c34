//! # Persistence Layer
//!
//! Quote storage.
//!
//! ## Repository Traits (Ports)
//!
//! - [`QuoteRepository`]: quotes with their items and audit notes
//!
//! ## Implementations
//!
//! - `in_memory`: in-memory implementation for tests and local runs
//! - `postgres`: PostgreSQL implementation with migrations

pub mod in_memory;
pub mod postgres;
pub mod traits;

pub use in_memory::InMemoryQuoteRepository;
pub use postgres::PostgresQuoteRepository;
pub use traits::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest, QuoteFilter, QuoteRepository,
    RepositoryError, RepositoryResult,
};
