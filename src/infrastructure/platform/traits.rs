//! # Platform Client Trait
//!
//! Port definition for the commerce platform.
//!
//! This module defines the [`PlatformClient`] trait together with the
//! platform-neutral inputs and outputs it exchanges. Adapters translate
//! them into the platform's own API shapes.
//!
//! # Examples
//!
//! ```ignore
//! use b2b_quotes::infrastructure::platform::traits::PlatformClient;
//!
//! async fn route(client: &dyn PlatformClient, store: &str, location: &CompanyLocationId) {
//!     if client.checkout_to_draft(store, location).await? {
//!         // build a draft order
//!     }
//! }
//! ```

use crate::domain::value_objects::{CompanyLocationId, CurrencyCode, CustomerId, VariantId};
use crate::infrastructure::platform::error::PlatformResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A postal address as the platform stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailingAddress {
    /// Street line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    /// Second street line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Province or state code.
    #[serde(default, alias = "zoneCode", skip_serializing_if = "Option::is_none")]
    pub province_code: Option<String>,
    /// ISO country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    /// Company name.
    #[serde(default, alias = "companyName", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Shipping and billing address of a company location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationAddresses {
    /// Ship-to address.
    #[serde(default)]
    pub shipping_address: Option<MailingAddress>,
    /// Bill-to address.
    #[serde(default)]
    pub billing_address: Option<MailingAddress>,
}

/// Payment terms configured for a company location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTermsTemplate {
    /// Template global ID.
    pub id: String,
    /// Display name, e.g. "Net 30".
    pub name: String,
    /// Terms kind, e.g. `NET`.
    #[serde(default)]
    pub payment_terms_type: Option<String>,
    /// Days until payment is due.
    #[serde(default)]
    pub due_in_days: Option<i32>,
}

/// Reference to a draft order or order created on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformOrderRef {
    /// Platform global ID.
    pub id: String,
    /// Display name, e.g. `#D12`.
    #[serde(default)]
    pub name: Option<String>,
}

impl fmt::Display for PlatformOrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} ({})", self.id),
            None => f.write_str(&self.id),
        }
    }
}

/// One line of an order payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineItem {
    /// Variant being ordered.
    pub variant_id: VariantId,
    /// Quantity.
    pub quantity: u32,
    /// Negotiated unit price.
    pub unit_price: Decimal,
}

/// Buyer the order is placed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasingEntity {
    /// Company contact.
    pub customer_id: CustomerId,
    /// Company location.
    pub company_location_id: CompanyLocationId,
}

/// Input for creating a draft order from a quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOrderInput {
    /// Lines with price overrides.
    pub line_items: Vec<OrderLineItem>,
    /// Buyer.
    pub purchasing_entity: PurchasingEntity,
    /// Presentment currency.
    pub currency_code: CurrencyCode,
    /// Buyer email for the invoice.
    pub email: Option<String>,
    /// Ship-to address.
    pub shipping_address: Option<MailingAddress>,
    /// Bill-to address.
    pub billing_address: Option<MailingAddress>,
    /// Payment terms template to apply.
    pub payment_terms_template_id: Option<String>,
    /// Purchase-order number.
    pub po_number: Option<String>,
    /// Order note.
    pub note: String,
    /// Tags.
    pub tags: Vec<String>,
}

/// Input for creating an order directly from a quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderInput {
    /// Lines with unit prices.
    pub line_items: Vec<OrderLineItem>,
    /// Buyer.
    pub purchasing_entity: PurchasingEntity,
    /// Presentment currency.
    pub currency_code: CurrencyCode,
    /// Purchase-order number.
    pub po_number: Option<String>,
    /// Order note.
    pub note: String,
    /// Tags.
    pub tags: Vec<String>,
}

/// Commerce platform operations used by the quote workflow.
///
/// Every call targets one store, identified by its shop domain.
#[async_trait]
pub trait PlatformClient: Send + Sync + fmt::Debug {
    /// Returns the company location's "checkout to draft" flag.
    async fn checkout_to_draft(
        &self,
        store: &str,
        company_location_id: &CompanyLocationId,
    ) -> PlatformResult<bool>;

    /// Returns the customer's email, if any.
    async fn customer_email(
        &self,
        store: &str,
        customer_id: &CustomerId,
    ) -> PlatformResult<Option<String>>;

    /// Returns the company location's shipping and billing addresses.
    async fn company_location_addresses(
        &self,
        store: &str,
        company_location_id: &CompanyLocationId,
    ) -> PlatformResult<LocationAddresses>;

    /// Returns the company location's payment terms template, if any.
    async fn payment_terms(
        &self,
        store: &str,
        company_location_id: &CompanyLocationId,
    ) -> PlatformResult<Option<PaymentTermsTemplate>>;

    /// Creates a draft order. `None` when the platform returned no draft.
    async fn create_draft_order(
        &self,
        store: &str,
        input: &DraftOrderInput,
    ) -> PlatformResult<Option<PlatformOrderRef>>;

    /// Creates an order.
    async fn create_order(&self, store: &str, input: &OrderInput)
    -> PlatformResult<PlatformOrderRef>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn company_address_aliases() {
        let address: MailingAddress = serde_json::from_str(
            r#"{"address1":"1 Main St","zoneCode":"ON","countryCode":"CA","companyName":"Acme"}"#,
        )
        .unwrap();
        assert_eq!(address.province_code.as_deref(), Some("ON"));
        assert_eq!(address.company.as_deref(), Some("Acme"));

        let json = serde_json::to_value(&address).unwrap();
        assert_eq!(json["provinceCode"], "ON");
        assert!(json.get("city").is_none());
    }

    #[test]
    fn order_ref_display() {
        let named = PlatformOrderRef {
            id: "gid://shopify/DraftOrder/1".to_string(),
            name: Some("#D1".to_string()),
        };
        assert_eq!(named.to_string(), "#D1 (gid://shopify/DraftOrder/1)");
    }
}
