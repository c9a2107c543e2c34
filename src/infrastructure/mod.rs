//! # Infrastructure Layer
//!
//! Adapters behind the application ports.
//!
//! - [`persistence`]: quote storage (in-memory and PostgreSQL)
//! - [`platform`]: commerce platform client (Shopify Admin GraphQL)

pub mod persistence;
pub mod platform;
