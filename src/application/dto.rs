//! # Application DTOs
//!
//! Inputs and outputs of the quote use cases. They double as the REST
//! request and response bodies, so they use camelCase on the wire.

use crate::domain::entities::{NewQuoteItem, Quote, QuoteItem, QuoteNote};
use crate::domain::value_objects::{CompanyLocationId, CustomerId, QuoteId, Timestamp};
use crate::infrastructure::persistence::PageRequest;
use serde::{Deserialize, Serialize};

/// Input for creating a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuote {
    /// Shop domain.
    pub store_name: String,
    /// Buyer that owns the quote.
    pub customer_id: CustomerId,
    /// Company location the quote is for.
    pub company_location_id: CompanyLocationId,
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Purchase-order number.
    #[serde(default)]
    pub po_number: Option<String>,
    /// When the offer lapses.
    pub expiration_date: Timestamp,
    /// Creator.
    #[serde(default)]
    pub created_by: Option<String>,
    /// Lines; at least one is required.
    pub items: Vec<NewQuoteItem>,
    /// Submit immediately after creation.
    #[serde(default)]
    pub submit: bool,
}

/// Input for editing a quote. Items are replaced, not merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuote {
    /// New item set; at least one is required.
    pub items: Vec<NewQuoteItem>,
    /// New purchase-order number. `None` keeps the current one.
    #[serde(default)]
    pub po_number: Option<String>,
    /// New expiration date. `None` keeps the current one.
    #[serde(default)]
    pub expiration_date: Option<Timestamp>,
    /// Editor.
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// A quote with its items and audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDetails {
    /// Header.
    #[serde(flatten)]
    pub quote: Quote,
    /// Lines.
    pub items: Vec<QuoteItem>,
    /// Notes, oldest first.
    pub notes: Vec<QuoteNote>,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Total matching items.
    pub total: u64,
    /// Total pages.
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Builds a page from a slice of results and the total count.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        let per_page = u64::from(request.per_page());
        Self {
            data,
            page: request.page(),
            per_page: request.per_page(),
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Outcome of converting a quote into a platform order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutcome {
    /// The quote, now `Ordered`.
    pub quote: Quote,
    /// Platform draft order or order ID.
    pub platform_order_id: String,
    /// Platform display name.
    pub platform_order_name: Option<String>,
    /// True when a draft order was created instead of an order.
    pub draft: bool,
}

/// Outcome of an expiration scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationReport {
    /// Quotes moved to `Expired`.
    pub expired_ids: Vec<QuoteId>,
    /// Batches issued.
    pub batches: usize,
}

impl ExpirationReport {
    /// Number of expired quotes.
    #[must_use]
    pub fn count(&self) -> usize {
        self.expired_ids.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn page_counts_pages() {
        let page: Page<u8> = Page::new(vec![1, 2], PageRequest::new(Some(1), Some(2)), 5);
        assert_eq!(page.total_pages, 3);

        let empty: Page<u8> = Page::new(vec![], PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn create_quote_deserializes_camel_case() {
        let body = r#"{
            "storeName": "acme.myshopify.com",
            "customerId": "gid://shopify/Customer/1",
            "companyLocationId": "gid://shopify/CompanyLocation/2",
            "currencyCode": "USD",
            "expirationDate": "2030-01-01T00:00:00Z",
            "items": [{
                "productId": "gid://shopify/Product/3",
                "variantId": "gid://shopify/ProductVariant/4",
                "quantity": 5,
                "originalPrice": "10.00",
                "offerPrice": "9.50"
            }]
        }"#;
        let input: CreateQuote = serde_json::from_str(body).unwrap();
        assert!(!input.submit);
        assert!(input.po_number.is_none());
        assert_eq!(input.items.len(), 1);
        assert_eq!(input.items[0].quantity, 5);
    }
}
