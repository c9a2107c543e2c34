//! # Domain Entities
//!
//! - [`Quote`]: quote aggregate root with the lifecycle state machine
//! - [`QuoteItem`]: product variant line with list and offer price
//! - [`QuoteNote`]: append-only audit note

pub mod quote;
pub mod quote_item;
pub mod quote_note;

pub use quote::{NewQuote, Quote, QuoteParts};
pub use quote_item::{NewQuoteItem, QuoteItem, subtotal};
pub use quote_note::{QuoteNote, SYSTEM_ACTOR};
