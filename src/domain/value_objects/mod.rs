//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`QuoteId`], [`QuoteItemId`], [`QuoteNoteId`]: UUID-based identifiers
//! - [`CustomerId`], [`CompanyLocationId`], [`ProductId`], [`VariantId`]:
//!   platform global IDs
//!
//! ## Lifecycle
//!
//! - [`QuoteStatus`]: quote state machine
//! - [`NoteType`]: audit note kinds
//!
//! ## Money and Time
//!
//! - [`CurrencyCode`]: ISO 4217 code
//! - [`Timestamp`]: UTC timestamp

pub mod ids;
pub mod money;
pub mod note_type;
pub mod quote_status;
pub mod timestamp;

pub use ids::{
    CompanyLocationId, CustomerId, ProductId, QuoteId, QuoteItemId, QuoteNoteId, VariantId,
};
pub use money::{
    CurrencyCode, MONEY_SCALE, checked_line_total, checked_sum, ensure_money, max_money_amount,
    round_money,
};
pub use note_type::NoteType;
pub use quote_status::{ParseQuoteStatusError, QuoteStatus};
pub use timestamp::Timestamp;
