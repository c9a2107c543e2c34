//! # In-Memory Repositories
//!
//! In-memory implementations for testing without database dependencies.
//!
//! ## Available Repositories
//!
//! - [`InMemoryQuoteRepository`]: quotes, items and notes
//!
//! ## Thread Safety
//!
//! All implementations use `Arc<RwLock<_>>` for thread-safe access.

pub mod quote_repository;

pub use quote_repository::InMemoryQuoteRepository;
