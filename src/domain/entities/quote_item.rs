//! # Quote Item
//!
//! A product variant line on a quote with its list and negotiated price.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{
    ProductId, QuoteId, QuoteItemId, VariantId, checked_line_total, checked_sum, ensure_money,
    max_money_amount, round_money,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum quantity on a single quote line.
pub const MAX_ITEM_QUANTITY: u32 = 1_000_000;

/// Input for one quote line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuoteItem {
    /// Product the variant belongs to.
    pub product_id: ProductId,
    /// Variant being quoted.
    pub variant_id: VariantId,
    /// Requested quantity.
    pub quantity: u32,
    /// Catalog price per unit.
    #[serde(with = "rust_decimal::serde::str")]
    pub original_price: Decimal,
    /// Negotiated price per unit.
    #[serde(with = "rust_decimal::serde::str")]
    pub offer_price: Decimal,
    /// Free-text line description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A line on a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    id: QuoteItemId,
    quote_id: QuoteId,
    product_id: ProductId,
    variant_id: VariantId,
    quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    original_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    offer_price: Decimal,
    description: Option<String>,
}

impl QuoteItem {
    /// Creates a validated line for `quote_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidQuantity` if the quantity is zero or above
    /// [`MAX_ITEM_QUANTITY`], `DomainError::InvalidPrice` if a price is
    /// negative, finer than cents or too large to store, and
    /// `DomainError::Validation` if the variant is blank.
    pub fn new(quote_id: QuoteId, input: NewQuoteItem) -> DomainResult<Self> {
        if input.variant_id.is_blank() {
            return Err(DomainError::validation("variantId is required"));
        }
        if input.quantity == 0 || input.quantity > MAX_ITEM_QUANTITY {
            return Err(DomainError::InvalidQuantity(format!(
                "quantity must be between 1 and {MAX_ITEM_QUANTITY}, got {}",
                input.quantity
            )));
        }
        ensure_money("originalPrice", input.original_price)?;
        ensure_money("offerPrice", input.offer_price)?;

        Ok(Self {
            id: QuoteItemId::new_v4(),
            quote_id,
            product_id: input.product_id,
            variant_id: input.variant_id,
            quantity: input.quantity,
            original_price: input.original_price,
            offer_price: input.offer_price,
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        })
    }

    /// Rebuilds a line from storage without validation.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: QuoteItemId,
        quote_id: QuoteId,
        product_id: ProductId,
        variant_id: VariantId,
        quantity: u32,
        original_price: Decimal,
        offer_price: Decimal,
        description: Option<String>,
    ) -> Self {
        Self {
            id,
            quote_id,
            product_id,
            variant_id,
            quantity,
            original_price,
            offer_price,
            description,
        }
    }

    /// Returns the line ID.
    #[must_use]
    pub fn id(&self) -> QuoteItemId {
        self.id
    }

    /// Returns the owning quote.
    #[must_use]
    pub fn quote_id(&self) -> QuoteId {
        self.quote_id
    }

    /// Returns the product.
    #[must_use]
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Returns the variant.
    #[must_use]
    pub fn variant_id(&self) -> &VariantId {
        &self.variant_id
    }

    /// Returns the quantity.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the catalog unit price.
    #[must_use]
    pub fn original_price(&self) -> Decimal {
        self.original_price
    }

    /// Returns the negotiated unit price.
    #[must_use]
    pub fn offer_price(&self) -> Decimal {
        self.offer_price
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Offer price times quantity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPrice` on overflow.
    pub fn line_total(&self) -> DomainResult<Decimal> {
        checked_line_total(self.offer_price, self.quantity)
    }

    /// Discount per unit against the catalog price (never negative).
    #[must_use]
    pub fn unit_discount(&self) -> Decimal {
        (self.original_price - self.offer_price).max(Decimal::ZERO)
    }
}

/// Sum of line totals, rounded to cents.
///
/// # Errors
///
/// Returns `DomainError::InvalidPrice` if the sum overflows or does not fit
/// the subtotal column.
pub fn subtotal(items: &[QuoteItem]) -> DomainResult<Decimal> {
    let totals = items
        .iter()
        .map(QuoteItem::line_total)
        .collect::<DomainResult<Vec<_>>>()?;
    let total = round_money(checked_sum(totals)?);
    if total > max_money_amount() {
        return Err(DomainError::InvalidPrice(format!(
            "subtotal {total} exceeds {}",
            max_money_amount()
        )));
    }
    Ok(total)
}
