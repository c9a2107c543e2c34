//! # Quote Aggregate
//!
//! A negotiable price offer from a B2B buyer, convertible to an order.
//!
//! The quote header owns the lifecycle status; every status change goes
//! through [`Quote::transition_to`], which applies the
//! [`QuoteStatus`] allow-list and stamps the audit fields.
//!
//! # Examples
//!
//! ```
//! use b2b_quotes::domain::entities::quote::{NewQuote, Quote};
//! use b2b_quotes::domain::value_objects::{
//!     CompanyLocationId, CurrencyCode, CustomerId, QuoteStatus, Timestamp,
//! };
//!
//! let now = Timestamp::now();
//! let mut quote = Quote::new(
//!     NewQuote {
//!         store_name: "acme.myshopify.com".to_string(),
//!         customer_id: CustomerId::new("gid://shopify/Customer/1"),
//!         company_location_id: CompanyLocationId::new("gid://shopify/CompanyLocation/7"),
//!         currency_code: CurrencyCode::parse("USD").unwrap(),
//!         po_number: None,
//!         expiration_date: now.add_days(30),
//!         created_by: Some("buyer@acme.test".to_string()),
//!     },
//!     now,
//! )
//! .unwrap();
//!
//! quote.transition_to(QuoteStatus::Submitted, Some("buyer@acme.test"), now).unwrap();
//! assert_eq!(quote.status(), QuoteStatus::Submitted);
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{
    CompanyLocationId, CurrencyCode, CustomerId, QuoteId, QuoteStatus, Timestamp,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a purchase-order number.
pub const MAX_PO_NUMBER_LEN: usize = 64;

/// Input for creating a new quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuote {
    /// Shop domain the quote belongs to.
    pub store_name: String,
    /// Buyer that owns the quote.
    pub customer_id: CustomerId,
    /// Company location the quote is purchased for.
    pub company_location_id: CompanyLocationId,
    /// Presentment currency.
    pub currency_code: CurrencyCode,
    /// Buyer purchase-order number.
    pub po_number: Option<String>,
    /// When the offer lapses.
    pub expiration_date: Timestamp,
    /// Who created the quote.
    pub created_by: Option<String>,
}

/// Every stored field of a quote, used to rebuild one from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteParts {
    /// Quote ID.
    pub id: QuoteId,
    /// Shop domain.
    pub store_name: String,
    /// Current status.
    pub status: QuoteStatus,
    /// Owning buyer.
    pub customer_id: CustomerId,
    /// Company location.
    pub company_location_id: CompanyLocationId,
    /// Presentment currency.
    pub currency_code: CurrencyCode,
    /// Purchase-order number.
    pub po_number: Option<String>,
    /// Sum of item line totals.
    pub subtotal: Decimal,
    /// Expiration date.
    pub expiration_date: Timestamp,
    /// Draft order or order created on conversion.
    pub platform_order_id: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Timestamp,
    /// Creator.
    pub created_by: Option<String>,
    /// Last editor.
    pub updated_by: Option<String>,
    /// Actor of the last lifecycle action.
    pub action_by: Option<String>,
}

/// Quote aggregate root.
///
/// # Invariants
///
/// - Status only changes along the [`QuoteStatus`] allow-list
/// - `subtotal` equals the sum of the item line totals it was last given
/// - `platform_order_id` is only set once the quote is `Ordered`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    id: QuoteId,
    store_name: String,
    status: QuoteStatus,
    customer_id: CustomerId,
    company_location_id: CompanyLocationId,
    currency_code: CurrencyCode,
    po_number: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    subtotal: Decimal,
    expiration_date: Timestamp,
    platform_order_id: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
    created_by: Option<String>,
    updated_by: Option<String>,
    action_by: Option<String>,
}

impl Quote {
    /// Creates a new `Draft` quote with a zero subtotal.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the store name, customer or
    /// company location is blank, the PO number is too long, or the
    /// expiration date is not after `now`.
    pub fn new(input: NewQuote, now: Timestamp) -> DomainResult<Self> {
        if input.store_name.trim().is_empty() {
            return Err(DomainError::validation("storeName is required"));
        }
        if input.customer_id.is_blank() {
            return Err(DomainError::validation("customerId is required"));
        }
        if input.company_location_id.is_blank() {
            return Err(DomainError::validation("companyLocationId is required"));
        }
        let po_number = normalize_po_number(input.po_number)?;
        validate_expiration(&input.expiration_date, &now)?;

        Ok(Self {
            id: QuoteId::new_v4(),
            store_name: input.store_name.trim().to_string(),
            status: QuoteStatus::Draft,
            customer_id: input.customer_id,
            company_location_id: input.company_location_id,
            currency_code: input.currency_code,
            po_number,
            subtotal: Decimal::ZERO,
            expiration_date: input.expiration_date,
            platform_order_id: None,
            created_at: now,
            updated_at: now,
            updated_by: input.created_by.clone(),
            created_by: input.created_by,
            action_by: None,
        })
    }

    /// Rebuilds a quote from stored fields without validation.
    #[must_use]
    pub fn from_parts(parts: QuoteParts) -> Self {
        Self {
            id: parts.id,
            store_name: parts.store_name,
            status: parts.status,
            customer_id: parts.customer_id,
            company_location_id: parts.company_location_id,
            currency_code: parts.currency_code,
            po_number: parts.po_number,
            subtotal: parts.subtotal,
            expiration_date: parts.expiration_date,
            platform_order_id: parts.platform_order_id,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
            created_by: parts.created_by,
            updated_by: parts.updated_by,
            action_by: parts.action_by,
        }
    }

    /// Moves the quote to `target`, stamping the audit fields.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if `target` is not in
    /// the allow-list of the current status.
    pub fn transition_to(
        &mut self,
        target: QuoteStatus,
        actor: Option<&str>,
        now: Timestamp,
    ) -> DomainResult<()> {
        self.status.ensure_transition(target)?;
        self.status = target;
        self.action_by = actor.map(str::to_string);
        self.touch(actor, now);
        Ok(())
    }

    /// Marks the quote `Ordered` and records the platform order it became.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::QuoteNotApproved` unless the quote is `Approved`.
    pub fn mark_ordered(
        &mut self,
        platform_order_id: impl Into<String>,
        actor: Option<&str>,
        now: Timestamp,
    ) -> DomainResult<()> {
        self.ensure_convertible()?;
        self.transition_to(QuoteStatus::Ordered, actor, now)?;
        self.platform_order_id = Some(platform_order_id.into());
        Ok(())
    }

    /// Checks that the quote may be converted into an order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::QuoteNotApproved` unless the quote is `Approved`.
    pub fn ensure_convertible(&self) -> DomainResult<()> {
        if self.status == QuoteStatus::Approved {
            Ok(())
        } else {
            Err(DomainError::QuoteNotApproved(self.status))
        }
    }

    /// Checks that items and terms may still change.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::QuoteNotEditable` once the quote has left
    /// `Draft`/`Submitted`.
    pub fn ensure_editable(&self) -> DomainResult<()> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(DomainError::QuoteNotEditable(self.status))
        }
    }

    /// Sets the subtotal after the item set was replaced.
    pub fn set_subtotal(&mut self, subtotal: Decimal, actor: Option<&str>, now: Timestamp) {
        self.subtotal = subtotal;
        self.touch(actor, now);
    }

    /// Replaces the purchase-order number.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the PO number is too long.
    pub fn set_po_number(
        &mut self,
        po_number: Option<String>,
        actor: Option<&str>,
        now: Timestamp,
    ) -> DomainResult<()> {
        self.po_number = normalize_po_number(po_number)?;
        self.touch(actor, now);
        Ok(())
    }

    /// Moves the expiration date.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the new date is not after `now`.
    pub fn set_expiration_date(
        &mut self,
        expiration_date: Timestamp,
        actor: Option<&str>,
        now: Timestamp,
    ) -> DomainResult<()> {
        validate_expiration(&expiration_date, &now)?;
        self.expiration_date = expiration_date;
        self.touch(actor, now);
        Ok(())
    }

    fn touch(&mut self, actor: Option<&str>, now: Timestamp) {
        self.updated_at = now;
        if let Some(actor) = actor {
            self.updated_by = Some(actor.to_string());
        }
    }

    /// Returns the quote ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> QuoteId {
        self.id
    }

    /// Returns the shop domain.
    #[inline]
    #[must_use]
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    /// Returns the current status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    /// Returns the owning buyer.
    #[inline]
    #[must_use]
    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Returns the company location.
    #[inline]
    #[must_use]
    pub fn company_location_id(&self) -> &CompanyLocationId {
        &self.company_location_id
    }

    /// Returns the currency.
    #[inline]
    #[must_use]
    pub fn currency_code(&self) -> &CurrencyCode {
        &self.currency_code
    }

    /// Returns the purchase-order number.
    #[inline]
    #[must_use]
    pub fn po_number(&self) -> Option<&str> {
        self.po_number.as_deref()
    }

    /// Returns the subtotal.
    #[inline]
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Returns the expiration date.
    #[inline]
    #[must_use]
    pub fn expiration_date(&self) -> Timestamp {
        self.expiration_date
    }

    /// Returns the platform draft order or order ID, once converted.
    #[inline]
    #[must_use]
    pub fn platform_order_id(&self) -> Option<&str> {
        self.platform_order_id.as_deref()
    }

    /// Returns the creation time.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns the last update time.
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Returns the creator.
    #[inline]
    #[must_use]
    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    /// Returns the last editor.
    #[inline]
    #[must_use]
    pub fn updated_by(&self) -> Option<&str> {
        self.updated_by.as_deref()
    }

    /// Returns the actor of the last lifecycle action.
    #[inline]
    #[must_use]
    pub fn action_by(&self) -> Option<&str> {
        self.action_by.as_deref()
    }

    /// Returns true if the expiration date is before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expiration_date.is_before(&now)
    }

    /// Returns true if `customer_id` owns this quote.
    #[must_use]
    pub fn is_owned_by(&self, customer_id: &CustomerId) -> bool {
        &self.customer_id == customer_id
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quote({} {} {} {})",
            self.id, self.status, self.subtotal, self.currency_code
        )
    }
}

fn normalize_po_number(po_number: Option<String>) -> DomainResult<Option<String>> {
    match po_number.map(|po| po.trim().to_string()) {
        Some(po) if po.is_empty() => Ok(None),
        Some(po) if po.chars().count() > MAX_PO_NUMBER_LEN => Err(DomainError::validation(
            format!("poNumber must be at most {MAX_PO_NUMBER_LEN} characters"),
        )),
        other => Ok(other),
    }
}

fn validate_expiration(expiration_date: &Timestamp, now: &Timestamp) -> DomainResult<()> {
    if expiration_date.is_after(now) {
        Ok(())
    } else {
        Err(DomainError::validation(
            "expirationDate must be in the future",
        ))
    }
}
