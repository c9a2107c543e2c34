//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! - [`QuoteService`]: quote CRUD, transitions, conversion and bulk delete
//! - [`ExpirationWorker`]: periodic expiration scan
//! - [`order_payload`]: quote to platform order mapping

pub mod expiration;
pub mod order_payload;
pub mod quote_service;

pub use expiration::{DEFAULT_SCAN_INTERVAL, ExpirationWorker};
pub use order_payload::{BuyerContext, QUOTE_TAG_PREFIX, build_draft_order, build_order, quote_tag};
pub use quote_service::{EXPIRATION_BATCH_SIZE, QuoteService, QuoteServiceConfig};
