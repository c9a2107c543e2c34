//! # Note Type
//!
//! Kind of audit note appended for each quote lifecycle action.

use crate::domain::value_objects::QuoteStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle action recorded by a quote note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteType {
    /// Buyer submitted the quote.
    Submit,
    /// Merchant approved the quote.
    Approve,
    /// Merchant declined the quote.
    Reject,
    /// Quote was cancelled.
    Cancel,
    /// Quote passed its expiration date.
    Expire,
    /// Quote was converted into an order.
    Order,
}

impl NoteType {
    /// Returns the note type recorded when a quote enters `target`.
    ///
    /// `Draft` is never a transition target, so it has no note type.
    #[must_use]
    pub const fn for_status(target: QuoteStatus) -> Option<Self> {
        match target {
            QuoteStatus::Draft => None,
            QuoteStatus::Submitted => Some(Self::Submit),
            QuoteStatus::Approved => Some(Self::Approve),
            QuoteStatus::Declined => Some(Self::Reject),
            QuoteStatus::Cancelled => Some(Self::Cancel),
            QuoteStatus::Expired => Some(Self::Expire),
            QuoteStatus::Ordered => Some(Self::Order),
        }
    }

    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "Submit",
            Self::Approve => "Approve",
            Self::Reject => "Reject",
            Self::Cancel => "Cancel",
            Self::Expire => "Expire",
            Self::Order => "Order",
        }
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Submit,
            Self::Approve,
            Self::Reject,
            Self::Cancel,
            Self::Expire,
            Self::Order,
        ]
        .into_iter()
        .find(|t| t.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown note type: {s}"))
    }
}
