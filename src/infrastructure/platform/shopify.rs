//! # Shopify Admin Client
//!
//! [`PlatformClient`] adapter for the Shopify Admin GraphQL API.
//!
//! Each store is addressed by its shop domain. Requests go to
//! `https://{store}/admin/api/{version}/graphql.json` unless a base URL
//! override is configured, in which case the store is only used to look up
//! the access token.

use crate::config::ShopifyConfig;
use crate::domain::value_objects::{CompanyLocationId, CurrencyCode, CustomerId};
use crate::infrastructure::platform::error::{PlatformError, PlatformResult, UserError};
use crate::infrastructure::platform::http_client::GraphqlHttp;
use crate::infrastructure::platform::traits::{
    DraftOrderInput, LocationAddresses, OrderInput, OrderLineItem, PaymentTermsTemplate,
    PlatformClient, PlatformOrderRef,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default Admin API version.
pub const DEFAULT_API_VERSION: &str = "2025-01";

const CHECKOUT_TO_DRAFT_QUERY: &str = r#"
query CompanyLocationCheckoutToDraft($id: ID!) {
  companyLocation(id: $id) {
    buyerExperienceConfiguration { checkoutToDraft }
  }
}"#;

const CUSTOMER_EMAIL_QUERY: &str = r#"
query CustomerEmail($id: ID!) {
  customer(id: $id) { email }
}"#;

const LOCATION_ADDRESSES_QUERY: &str = r#"
query CompanyLocationAddresses($id: ID!) {
  companyLocation(id: $id) {
    shippingAddress { address1 address2 city zoneCode countryCode zip companyName phone }
    billingAddress { address1 address2 city zoneCode countryCode zip companyName phone }
  }
}"#;

const PAYMENT_TERMS_QUERY: &str = r#"
query CompanyLocationPaymentTerms($id: ID!) {
  companyLocation(id: $id) {
    buyerExperienceConfiguration {
      paymentTermsTemplate { id name paymentTermsType dueInDays }
    }
  }
}"#;

const DRAFT_ORDER_CREATE_MUTATION: &str = r#"
mutation DraftOrderCreate($input: DraftOrderInput!) {
  draftOrderCreate(input: $input) {
    draftOrder { id name }
    userErrors { field message }
  }
}"#;

const ORDER_CREATE_MUTATION: &str = r#"
mutation OrderCreate($order: OrderCreateOrderInput!) {
  orderCreate(order: $order) {
    order { id name }
    userErrors { field message }
  }
}"#;

/// Source of Admin API access tokens.
pub trait AccessTokenProvider: Send + Sync + fmt::Debug {
    /// Returns the access token for `store`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::UnknownStore` if no token is known.
    fn access_token(&self, store: &str) -> PlatformResult<String>;
}

/// Tokens loaded from configuration, keyed by shop domain.
#[derive(Clone, Default)]
pub struct StaticTokenProvider {
    tokens: HashMap<String, String>,
}

impl StaticTokenProvider {
    /// Creates a provider from a `store -> token` map.
    #[must_use]
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    /// Returns the number of configured stores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if no store is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("stores", &self.tokens.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AccessTokenProvider for StaticTokenProvider {
    fn access_token(&self, store: &str) -> PlatformResult<String> {
        self.tokens
            .get(store)
            .cloned()
            .ok_or_else(|| PlatformError::unknown_store(store))
    }
}

/// Shopify Admin GraphQL implementation of [`PlatformClient`].
#[derive(Debug, Clone)]
pub struct ShopifyAdminClient {
    http: GraphqlHttp,
    tokens: Arc<dyn AccessTokenProvider>,
    api_version: String,
    base_url: Option<String>,
}

impl ShopifyAdminClient {
    /// Creates a client for the given API version.
    #[must_use]
    pub fn new(
        http: GraphqlHttp,
        tokens: Arc<dyn AccessTokenProvider>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            api_version: api_version.into(),
            base_url: None,
        }
    }

    /// Builds a client with static per-store tokens from configuration.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Internal` if the HTTP client cannot be built.
    pub fn from_config(config: &ShopifyConfig) -> PlatformResult<Self> {
        let http = GraphqlHttp::new(config.timeout_ms)?;
        let tokens = Arc::new(StaticTokenProvider::new(config.access_tokens.clone()));
        let client = Self::new(http, tokens, config.api_version.clone());
        Ok(match &config.base_url {
            Some(base_url) => client.with_base_url(base_url),
            None => client,
        })
    }

    /// Sends every request to `base_url` instead of the store's domain.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Returns the GraphQL endpoint for `store`.
    #[must_use]
    pub fn endpoint(&self, store: &str) -> String {
        let origin = match &self.base_url {
            Some(base) => base.clone(),
            None => format!("https://{store}"),
        };
        format!("{origin}/admin/api/{}/graphql.json", self.api_version)
    }

    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        store: &str,
        query: &str,
        variables: Value,
    ) -> PlatformResult<T> {
        let token = self.tokens.access_token(store)?;
        debug!(store, "shopify graphql request");
        self.http
            .execute(&self.endpoint(store), &token, query, variables)
            .await
            .inspect_err(|e| warn!(store, kind = e.kind(), error = %e, "shopify request failed"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyLocationData<T> {
    company_location: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuyerExperienceNode<T> {
    buyer_experience_configuration: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutToDraft {
    #[serde(default)]
    checkout_to_draft: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentTermsNode {
    payment_terms_template: Option<PaymentTermsTemplate>,
}

#[derive(Debug, Deserialize)]
struct CustomerData {
    customer: Option<CustomerNode>,
}

#[derive(Debug, Deserialize)]
struct CustomerNode {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftOrderCreateData {
    draft_order_create: Option<MutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderCreateData {
    order_create: Option<MutationPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutationPayload {
    #[serde(alias = "draftOrder")]
    order: Option<PlatformOrderRef>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

impl MutationPayload {
    fn into_order(self) -> PlatformResult<Option<PlatformOrderRef>> {
        if self.user_errors.is_empty() {
            Ok(self.order)
        } else {
            Err(PlatformError::user_errors(self.user_errors))
        }
    }
}

fn money(amount: rust_decimal::Decimal, currency: &CurrencyCode) -> Value {
    json!({ "amount": amount.to_string(), "currencyCode": currency.as_str() })
}

fn draft_line_items(items: &[OrderLineItem], currency: &CurrencyCode) -> Vec<Value> {
    items
        .iter()
        .map(|item| {
            json!({
                "variantId": item.variant_id.as_str(),
                "quantity": item.quantity,
                "priceOverride": money(item.unit_price, currency),
            })
        })
        .collect()
}

fn order_line_items(items: &[OrderLineItem], currency: &CurrencyCode) -> Vec<Value> {
    items
        .iter()
        .map(|item| {
            json!({
                "variantId": item.variant_id.as_str(),
                "quantity": item.quantity,
                "priceSet": { "shopMoney": money(item.unit_price, currency) },
            })
        })
        .collect()
}

/// Builds the `draftOrderCreate` variables.
#[must_use]
pub fn draft_order_variables(input: &DraftOrderInput) -> Value {
    let mut draft = json!({
        "lineItems": draft_line_items(&input.line_items, &input.currency_code),
        "purchasingEntity": { "customerId": input.purchasing_entity.customer_id.as_str() },
        "presentmentCurrencyCode": input.currency_code.as_str(),
        "note": input.note,
        "tags": input.tags,
        "customAttributes": [{
            "key": "companyLocationId",
            "value": input.purchasing_entity.company_location_id.as_str(),
        }],
    });
    if let Some(fields) = draft.as_object_mut() {
        if let Some(email) = &input.email {
            fields.insert("email".to_string(), json!(email));
        }
        if let Some(address) = &input.shipping_address {
            fields.insert("shippingAddress".to_string(), json!(address));
        }
        if let Some(address) = &input.billing_address {
            fields.insert("billingAddress".to_string(), json!(address));
        }
        if let Some(template_id) = &input.payment_terms_template_id {
            fields.insert(
                "paymentTerms".to_string(),
                json!({ "paymentTermsTemplateId": template_id }),
            );
        }
        if let Some(po_number) = &input.po_number {
            fields.insert("poNumber".to_string(), json!(po_number));
        }
    }
    json!({ "input": draft })
}

/// Builds the `orderCreate` variables.
#[must_use]
pub fn order_variables(input: &OrderInput) -> Value {
    let mut order = json!({
        "lineItems": order_line_items(&input.line_items, &input.currency_code),
        "currency": input.currency_code.as_str(),
        "customer": { "toAssociate": { "id": input.purchasing_entity.customer_id.as_str() } },
        "companyLocationId": input.purchasing_entity.company_location_id.as_str(),
        "note": input.note,
        "tags": input.tags,
    });
    if let (Some(fields), Some(po_number)) = (order.as_object_mut(), &input.po_number) {
        fields.insert("poNumber".to_string(), json!(po_number));
    }
    json!({ "order": order })
}

#[async_trait]
impl PlatformClient for ShopifyAdminClient {
    async fn checkout_to_draft(
        &self,
        store: &str,
        company_location_id: &CompanyLocationId,
    ) -> PlatformResult<bool> {
        let data: CompanyLocationData<BuyerExperienceNode<CheckoutToDraft>> = self
            .execute(
                store,
                CHECKOUT_TO_DRAFT_QUERY,
                json!({ "id": company_location_id.as_str() }),
            )
            .await?;

        Ok(data
            .company_location
            .and_then(|location| location.buyer_experience_configuration)
            .is_some_and(|config| config.checkout_to_draft))
    }

    async fn customer_email(
        &self,
        store: &str,
        customer_id: &CustomerId,
    ) -> PlatformResult<Option<String>> {
        let data: CustomerData = self
            .execute(
                store,
                CUSTOMER_EMAIL_QUERY,
                json!({ "id": customer_id.as_str() }),
            )
            .await?;

        Ok(data.customer.and_then(|customer| customer.email))
    }

    async fn company_location_addresses(
        &self,
        store: &str,
        company_location_id: &CompanyLocationId,
    ) -> PlatformResult<LocationAddresses> {
        let data: CompanyLocationData<LocationAddresses> = self
            .execute(
                store,
                LOCATION_ADDRESSES_QUERY,
                json!({ "id": company_location_id.as_str() }),
            )
            .await?;

        Ok(data.company_location.unwrap_or_default())
    }

    async fn payment_terms(
        &self,
        store: &str,
        company_location_id: &CompanyLocationId,
    ) -> PlatformResult<Option<PaymentTermsTemplate>> {
        let data: CompanyLocationData<BuyerExperienceNode<PaymentTermsNode>> = self
            .execute(
                store,
                PAYMENT_TERMS_QUERY,
                json!({ "id": company_location_id.as_str() }),
            )
            .await?;

        Ok(data
            .company_location
            .and_then(|location| location.buyer_experience_configuration)
            .and_then(|config| config.payment_terms_template))
    }

    async fn create_draft_order(
        &self,
        store: &str,
        input: &DraftOrderInput,
    ) -> PlatformResult<Option<PlatformOrderRef>> {
        let data: DraftOrderCreateData = self
            .execute(
                store,
                DRAFT_ORDER_CREATE_MUTATION,
                draft_order_variables(input),
            )
            .await?;

        let payload = data
            .draft_order_create
            .ok_or_else(|| PlatformError::protocol("draftOrderCreate returned no payload"))?;
        payload.into_order()
    }

    async fn create_order(
        &self,
        store: &str,
        input: &OrderInput,
    ) -> PlatformResult<PlatformOrderRef> {
        let data: OrderCreateData = self
            .execute(store, ORDER_CREATE_MUTATION, order_variables(input))
            .await?;

        data.order_create
            .ok_or_else(|| PlatformError::protocol("orderCreate returned no payload"))?
            .into_order()?
            .ok_or_else(|| PlatformError::protocol("orderCreate returned no order"))
    }
}
