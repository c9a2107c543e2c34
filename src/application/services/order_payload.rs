//! # Order Payloads
//!
//! Maps a quote and its items onto the platform's draft order and order
//! inputs. Pure functions; all lookups happen before these are called.

use crate::domain::entities::{Quote, QuoteItem};
use crate::infrastructure::platform::{
    DraftOrderInput, LocationAddresses, OrderInput, OrderLineItem, PaymentTermsTemplate,
    PurchasingEntity,
};

/// Prefix of the tag linking a platform order back to its quote.
pub const QUOTE_TAG_PREFIX: &str = "quote:";

/// Buyer details fetched from the platform for a draft order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuyerContext {
    /// Customer email.
    pub email: Option<String>,
    /// Company location addresses.
    pub addresses: LocationAddresses,
    /// Company location payment terms.
    pub payment_terms: Option<PaymentTermsTemplate>,
}

/// Tag identifying the quote on the platform.
#[must_use]
pub fn quote_tag(quote: &Quote) -> String {
    format!("{QUOTE_TAG_PREFIX}{}", quote.id())
}

fn order_note(quote: &Quote) -> String {
    match quote.po_number() {
        Some(po) => format!("Created from quote {} (PO {po})", quote.id()),
        None => format!("Created from quote {}", quote.id()),
    }
}

fn line_items(items: &[QuoteItem]) -> Vec<OrderLineItem> {
    items
        .iter()
        .map(|item| OrderLineItem {
            variant_id: item.variant_id().clone(),
            quantity: item.quantity(),
            unit_price: item.offer_price(),
        })
        .collect()
}

fn purchasing_entity(quote: &Quote) -> PurchasingEntity {
    PurchasingEntity {
        customer_id: quote.customer_id().clone(),
        company_location_id: quote.company_location_id().clone(),
    }
}

/// Builds the draft order input for `quote`.
#[must_use]
pub fn build_draft_order(quote: &Quote, items: &[QuoteItem], buyer: BuyerContext) -> DraftOrderInput {
    DraftOrderInput {
        line_items: line_items(items),
        purchasing_entity: purchasing_entity(quote),
        currency_code: quote.currency_code().clone(),
        email: buyer.email,
        shipping_address: buyer.addresses.shipping_address,
        billing_address: buyer.addresses.billing_address,
        payment_terms_template_id: buyer.payment_terms.map(|terms| terms.id),
        po_number: quote.po_number().map(str::to_string),
        note: order_note(quote),
        tags: vec![quote_tag(quote)],
    }
}

/// Builds the order input for `quote`.
#[must_use]
pub fn build_order(quote: &Quote, items: &[QuoteItem]) -> OrderInput {
    OrderInput {
        line_items: line_items(items),
        purchasing_entity: purchasing_entity(quote),
        currency_code: quote.currency_code().clone(),
        po_number: quote.po_number().map(str::to_string),
        note: order_note(quote),
        tags: vec![quote_tag(quote)],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{NewQuote, NewQuoteItem};
    use crate::domain::value_objects::{
        CompanyLocationId, CurrencyCode, CustomerId, ProductId, Timestamp, VariantId,
    };
    use crate::infrastructure::platform::MailingAddress;
    use rust_decimal::Decimal;

    fn quote(po_number: Option<&str>) -> Quote {
        let now = Timestamp::now();
        Quote::new(
            NewQuote {
                store_name: "acme.myshopify.com".to_string(),
                customer_id: CustomerId::new("gid://shopify/Customer/1"),
                company_location_id: CompanyLocationId::new("gid://shopify/CompanyLocation/2"),
                currency_code: CurrencyCode::parse("EUR").unwrap(),
                po_number: po_number.map(str::to_string),
                expiration_date: now.add_days(7),
                created_by: None,
            },
            now,
        )
        .unwrap()
    }

    fn items(quote: &Quote) -> Vec<QuoteItem> {
        vec![
            QuoteItem::new(
                quote.id(),
                NewQuoteItem {
                    product_id: ProductId::new("gid://shopify/Product/1"),
                    variant_id: VariantId::new("gid://shopify/ProductVariant/10"),
                    quantity: 3,
                    original_price: Decimal::new(2000, 2),
                    offer_price: Decimal::new(1800, 2),
                    description: None,
                },
            )
            .unwrap(),
        ]
    }

    #[test]
    fn draft_order_carries_offer_prices_and_buyer_details() {
        let quote = quote(Some("PO-42"));
        let buyer = BuyerContext {
            email: Some("buyer@acme.test".to_string()),
            addresses: LocationAddresses {
                shipping_address: Some(MailingAddress {
                    city: Some("Berlin".to_string()),
                    ..MailingAddress::default()
                }),
                billing_address: None,
            },
            payment_terms: Some(PaymentTermsTemplate {
                id: "gid://shopify/PaymentTermsTemplate/4".to_string(),
                name: "Net 30".to_string(),
                payment_terms_type: Some("NET".to_string()),
                due_in_days: Some(30),
            }),
        };

        let input = build_draft_order(&quote, &items(&quote), buyer);
        assert_eq!(input.line_items.len(), 1);
        assert_eq!(input.line_items[0].unit_price, Decimal::new(1800, 2));
        assert_eq!(input.line_items[0].quantity, 3);
        assert_eq!(input.currency_code.as_str(), "EUR");
        assert_eq!(input.email.as_deref(), Some("buyer@acme.test"));
        assert_eq!(
            input.payment_terms_template_id.as_deref(),
            Some("gid://shopify/PaymentTermsTemplate/4")
        );
        assert_eq!(input.po_number.as_deref(), Some("PO-42"));
        assert!(input.note.contains("PO-42"));
        assert_eq!(input.tags, vec![format!("quote:{}", quote.id())]);
    }

    #[test]
    fn order_uses_same_lines_and_tag() {
        let quote = quote(None);
        let input = build_order(&quote, &items(&quote));
        assert_eq!(input.line_items[0].variant_id.as_str(), "gid://shopify/ProductVariant/10");
        assert!(input.po_number.is_none());
        assert_eq!(input.tags, vec![quote_tag(&quote)]);
        assert_eq!(
            input.purchasing_entity.company_location_id.as_str(),
            "gid://shopify/CompanyLocation/2"
        );
    }
}
