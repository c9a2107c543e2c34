//! Integration tests for `ShopifyAdminClient`.
//!
//! Each test starts a local `wiremock` server and points the client at it
//! through the base URL override, so no real Shopify traffic is made.

#![allow(clippy::unwrap_used)]

use b2b_quotes::domain::value_objects::{CompanyLocationId, CurrencyCode, CustomerId, VariantId};
use b2b_quotes::infrastructure::platform::{
    DraftOrderInput, GraphqlHttp, OrderInput, OrderLineItem, PlatformClient, PlatformError,
    PurchasingEntity, ShopifyAdminClient, StaticTokenProvider,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STORE: &str = "acme.myshopify.com";
const GRAPHQL_PATH: &str = "/admin/api/2025-01/graphql.json";

fn client(server: &MockServer) -> ShopifyAdminClient {
    let tokens = StaticTokenProvider::new(HashMap::from([(
        STORE.to_string(),
        "shpat_test".to_string(),
    )]));
    ShopifyAdminClient::new(GraphqlHttp::new(5_000).unwrap(), Arc::new(tokens), "2025-01")
        .with_base_url(server.uri())
}

fn location() -> CompanyLocationId {
    CompanyLocationId::new("gid://shopify/CompanyLocation/7")
}

fn entity() -> PurchasingEntity {
    PurchasingEntity {
        customer_id: CustomerId::new("gid://shopify/Customer/3"),
        company_location_id: location(),
    }
}

fn lines() -> Vec<OrderLineItem> {
    vec![OrderLineItem {
        variant_id: VariantId::new("gid://shopify/ProductVariant/11"),
        quantity: 6,
        unit_price: Decimal::new(4250, 2),
    }]
}

fn draft_input() -> DraftOrderInput {
    DraftOrderInput {
        line_items: lines(),
        purchasing_entity: entity(),
        currency_code: CurrencyCode::parse("USD").unwrap(),
        email: Some("buyer@acme.test".to_string()),
        shipping_address: None,
        billing_address: None,
        payment_terms_template_id: None,
        po_number: Some("PO-1".to_string()),
        note: "Created from quote".to_string(),
        tags: vec!["quote:1".to_string()],
    }
}

fn order_input() -> OrderInput {
    OrderInput {
        line_items: lines(),
        purchasing_entity: entity(),
        currency_code: CurrencyCode::parse("USD").unwrap(),
        po_number: None,
        note: "Created from quote".to_string(),
        tags: vec!["quote:1".to_string()],
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn checkout_to_draft_reads_buyer_experience() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("X-Shopify-Access-Token", "shpat_test"))
        .and(body_string_contains("checkoutToDraft"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "companyLocation": {
                    "buyerExperienceConfiguration": { "checkoutToDraft": true }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let flag = client(&server).checkout_to_draft(STORE, &location()).await.unwrap();
    assert!(flag);
}

#[tokio::test]
async fn missing_buyer_experience_means_direct_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "companyLocation": { "buyerExperienceConfiguration": null } }
        })))
        .mount(&server)
        .await;

    let flag = client(&server).checkout_to_draft(STORE, &location()).await.unwrap();
    assert!(!flag);
}

#[tokio::test]
async fn location_addresses_map_zone_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("shippingAddress"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "companyLocation": {
                    "shippingAddress": {
                        "address1": "1 Main St",
                        "city": "Ottawa",
                        "zoneCode": "ON",
                        "countryCode": "CA",
                        "zip": "K1A 0B1",
                        "companyName": "Acme"
                    },
                    "billingAddress": null
                }
            }
        })))
        .mount(&server)
        .await;

    let addresses = client(&server)
        .company_location_addresses(STORE, &location())
        .await
        .unwrap();
    let shipping = addresses.shipping_address.unwrap();
    assert_eq!(shipping.province_code.as_deref(), Some("ON"));
    assert_eq!(shipping.company.as_deref(), Some("Acme"));
    assert!(addresses.billing_address.is_none());
}

#[tokio::test]
async fn payment_terms_template() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "companyLocation": {
                    "buyerExperienceConfiguration": {
                        "paymentTermsTemplate": {
                            "id": "gid://shopify/PaymentTermsTemplate/4",
                            "name": "Net 30",
                            "paymentTermsType": "NET",
                            "dueInDays": 30
                        }
                    }
                }
            }
        })))
        .mount(&server)
        .await;

    let terms = client(&server).payment_terms(STORE, &location()).await.unwrap().unwrap();
    assert_eq!(terms.name, "Net 30");
    assert_eq!(terms.due_in_days, Some(30));
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn draft_order_sends_price_override_and_customer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({
            "variables": {
                "input": {
                    "purchasingEntity": { "customerId": "gid://shopify/Customer/3" },
                    "email": "buyer@acme.test",
                    "poNumber": "PO-1"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "draftOrderCreate": {
                    "draftOrder": { "id": "gid://shopify/DraftOrder/9", "name": "#D9" },
                    "userErrors": []
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let draft = client(&server)
        .create_draft_order(STORE, &draft_input())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(draft.id, "gid://shopify/DraftOrder/9");
    assert_eq!(draft.name.as_deref(), Some("#D9"));
}

#[tokio::test]
async fn draft_order_without_draft_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "draftOrderCreate": { "draftOrder": null, "userErrors": [] } }
        })))
        .mount(&server)
        .await;

    let draft = client(&server).create_draft_order(STORE, &draft_input()).await.unwrap();
    assert!(draft.is_none());
}

#[tokio::test]
async fn order_user_errors_surface() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("orderCreate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "orderCreate": {
                    "order": null,
                    "userErrors": [{ "field": ["order", "lineItems"], "message": "Variant is out of stock" }]
                }
            }
        })))
        .mount(&server)
        .await;

    let err = client(&server).create_order(STORE, &order_input()).await.unwrap_err();
    assert!(matches!(err, PlatformError::UserErrors { .. }));
    assert!(err.to_string().contains("out of stock"));
}

#[tokio::test]
async fn order_created() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({
            "variables": {
                "order": { "companyLocationId": "gid://shopify/CompanyLocation/7" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "orderCreate": {
                    "order": { "id": "gid://shopify/Order/5", "name": "#1005" },
                    "userErrors": []
                }
            }
        })))
        .mount(&server)
        .await;

    let order = client(&server).create_order(STORE, &order_input()).await.unwrap();
    assert_eq!(order.id, "gid://shopify/Order/5");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn throttled_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "Throttled", "extensions": { "code": "THROTTLED" } }]
        })))
        .mount(&server)
        .await;

    let err = client(&server).customer_email(STORE, &entity().customer_id).await.unwrap_err();
    assert!(matches!(err, PlatformError::RateLimited { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn unauthorized_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let err = client(&server).checkout_to_draft(STORE, &location()).await.unwrap_err();
    assert!(matches!(err, PlatformError::Authentication { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn unknown_store_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .checkout_to_draft("other.myshopify.com", &location())
        .await
        .unwrap_err();
    assert!(matches!(err, PlatformError::UnknownStore { .. }));
}
