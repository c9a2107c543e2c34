//! # Commerce Platform
//!
//! Port and adapters for the commerce platform that owns customers,
//! company locations, draft orders and orders.
//!
//! - [`PlatformClient`]: the port used by the quote workflow
//! - [`ShopifyAdminClient`]: Shopify Admin GraphQL adapter
//! - [`GraphqlHttp`]: shared GraphQL transport

pub mod error;
pub mod http_client;
pub mod shopify;
pub mod traits;

pub use error::{PlatformError, PlatformResult, UserError};
pub use http_client::GraphqlHttp;
pub use shopify::{AccessTokenProvider, ShopifyAdminClient, StaticTokenProvider};
pub use traits::{
    DraftOrderInput, LocationAddresses, MailingAddress, OrderInput, OrderLineItem,
    PaymentTermsTemplate, PlatformClient, PlatformOrderRef, PurchasingEntity,
};
