//! # Quote Status
//!
//! Quote lifecycle state machine.
//!
//! # State Machine
//!
//! ```text
//! Draft → Submitted → Approved → Ordered
//!             │           └────→ Expired
//!             ├→ Declined
//!             ├→ Cancelled
//!             ├→ Expired
//!             └→ Ordered
//! ```
//!
//! Declined, Cancelled, Expired and Ordered are terminal.
//!
//! # Examples
//!
//! ```
//! use b2b_quotes::domain::value_objects::QuoteStatus;
//!
//! assert!(QuoteStatus::Submitted.can_transition_to(QuoteStatus::Approved));
//! assert!(QuoteStatus::Declined.ensure_transition(QuoteStatus::Approved).is_err());
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum QuoteStatus {
    /// Being assembled by the buyer; not yet visible to the merchant.
    #[default]
    Draft = 0,
    /// Sent to the merchant for review.
    Submitted = 1,
    /// Accepted by the merchant; ready to convert.
    Approved = 2,
    /// Rejected by the merchant (terminal).
    Declined = 3,
    /// Withdrawn before a decision (terminal).
    Cancelled = 4,
    /// Passed its expiration date (terminal).
    Expired = 5,
    /// Converted into a platform order or draft order (terminal).
    Ordered = 6,
}

impl QuoteStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Draft,
        Self::Submitted,
        Self::Approved,
        Self::Declined,
        Self::Cancelled,
        Self::Expired,
        Self::Ordered,
    ];

    /// Statuses the expiration scan may move to `Expired`.
    pub const EXPIRABLE: [Self; 2] = [Self::Submitted, Self::Approved];

    /// Returns true if `target` is in this status's allow-list.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Submitted)
                | (Self::Submitted, Self::Approved)
                | (Self::Submitted, Self::Declined)
                | (Self::Submitted, Self::Cancelled)
                | (Self::Submitted, Self::Expired)
                | (Self::Submitted, Self::Ordered)
                | (Self::Approved, Self::Ordered)
                | (Self::Approved, Self::Expired)
        )
    }

    /// Checks a requested transition.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` naming both statuses
    /// when `target` is not reachable from `self`.
    pub fn ensure_transition(&self, target: Self) -> DomainResult<()> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Returns the allow-list for this status.
    #[must_use]
    pub fn valid_transitions(&self) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|target| self.can_transition_to(*target))
            .collect()
    }

    /// Returns true if no transition leaves this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Declined | Self::Cancelled | Self::Expired | Self::Ordered
        )
    }

    /// Returns true while the quote's items and terms may still be edited.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Submitted)
    }

    /// Returns true if the expiration scan may expire a quote in this status.
    #[must_use]
    pub const fn is_expirable(&self) -> bool {
        matches!(self, Self::Submitted | Self::Approved)
    }

    /// Returns the canonical name, as stored and displayed.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::Approved => "Approved",
            Self::Declined => "Declined",
            Self::Cancelled => "Cancelled",
            Self::Expired => "Expired",
            Self::Ordered => "Ordered",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known quote status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseQuoteStatusError(pub String);

impl fmt::Display for ParseQuoteStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown quote status: {}", self.0)
    }
}

impl std::error::Error for ParseQuoteStatusError {}

impl FromStr for QuoteStatus {
    type Err = ParseQuoteStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseQuoteStatusError(s.to_string()))
    }
}
