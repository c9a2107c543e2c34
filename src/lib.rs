//! # B2B Quotes
//!
//! Quote lifecycle service for a B2B commerce accelerator.
//!
//! Buyers create quotes for product variants at negotiated prices, merchants
//! approve or decline them, and approved quotes convert into platform draft
//! orders or orders. A periodic scan expires quotes past their expiration
//! date.
//!
//! # Layers
//!
//! - [`domain`]: quote entities and the status state machine
//! - [`application`]: use cases, DTOs and errors
//! - [`infrastructure`]: PostgreSQL and in-memory storage, Shopify client
//! - [`api`]: axum REST endpoints
//! - [`config`] and [`telemetry`]: settings and tracing setup

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;
