//! # Money
//!
//! Currency codes and decimal amounts for quote pricing.

use crate::domain::errors::{DomainError, DomainResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217 currency code, stored upper-case.
///
/// # Examples
///
/// ```
/// use b2b_quotes::domain::value_objects::CurrencyCode;
///
/// let usd = CurrencyCode::parse("usd").unwrap();
/// assert_eq!(usd.as_str(), "USD");
/// assert!(CurrencyCode::parse("dollars").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses a three-letter code.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` unless the value is exactly three
    /// ASCII letters.
    pub fn parse(value: &str) -> DomainResult<Self> {
        let trimmed = value.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::validation(format!(
                "invalid currency code: {value:?}"
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Decimal places stored for money amounts.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a money column holds (`NUMERIC(18, 2)`).
#[must_use]
pub fn max_money_amount() -> Decimal {
    Decimal::new(999_999_999_999_999_999, MONEY_SCALE)
}

/// Rounds a money amount to two decimal places (banker's rounding).
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(MONEY_SCALE)
}

/// Checks that `amount` is a storable, non-negative money value.
///
/// # Errors
///
/// Returns `DomainError::InvalidPrice` if the amount is negative, has more
/// than two decimal places or exceeds [`max_money_amount`].
pub fn ensure_money(field: &str, amount: Decimal) -> DomainResult<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::InvalidPrice(format!(
            "{field} must not be negative"
        )));
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(DomainError::InvalidPrice(format!(
            "{field} must have at most {MONEY_SCALE} decimal places, got {amount}"
        )));
    }
    if amount > max_money_amount() {
        return Err(DomainError::InvalidPrice(format!(
            "{field} must not exceed {}",
            max_money_amount()
        )));
    }
    Ok(())
}

/// Multiplies a unit price by a quantity.
///
/// # Errors
///
/// Returns `DomainError::InvalidPrice` on overflow.
pub fn checked_line_total(unit_price: Decimal, quantity: u32) -> DomainResult<Decimal> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| overflow(&format!("{unit_price} x {quantity}")))
}

/// Sums money amounts.
///
/// # Errors
///
/// Returns `DomainError::InvalidPrice` on overflow.
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> DomainResult<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount)
            .ok_or_else(|| overflow(&format!("{acc} + {amount}")))
    })
}

fn overflow(operation: &str) -> DomainError {
    DomainError::InvalidPrice(format!("amount overflow: {operation}"))
}
