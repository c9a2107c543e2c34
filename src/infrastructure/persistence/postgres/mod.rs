//! # PostgreSQL Persistence
//!
//! sqlx-backed adapters. The schema lives in `migrations/` at the crate root
//! and is applied with [`PostgresQuoteRepository::migrate`].

pub mod quote_repository;

pub use quote_repository::PostgresQuoteRepository;
