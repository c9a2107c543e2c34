//! # GraphQL HTTP Client
//!
//! Thin `reqwest` wrapper that posts GraphQL documents and unwraps the
//! `{data, errors}` envelope.
//!
//! # Examples
//!
//! ```ignore
//! use b2b_quotes::infrastructure::platform::http_client::GraphqlHttp;
//!
//! let http = GraphqlHttp::new(10_000)?;
//! let data: MyData = http.execute(url, token, QUERY, json!({"id": id})).await?;
//! ```

use crate::infrastructure::platform::error::{PlatformError, PlatformResult};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Header carrying the Admin API access token.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorMessage {
    message: String,
    #[serde(default)]
    extensions: Option<GraphqlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorExtensions {
    code: Option<String>,
}

/// HTTP client for GraphQL endpoints.
#[derive(Debug, Clone)]
pub struct GraphqlHttp {
    client: Client,
    timeout_ms: u64,
}

impl GraphqlHttp {
    /// Creates a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Internal` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> PlatformResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| PlatformError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout_ms })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Posts `query` with `variables` to `url` and returns the `data` object.
    ///
    /// # Errors
    ///
    /// - `Timeout`/`Connection` on transport failure or 5xx
    /// - `Authentication` on 401/403, `RateLimited` on 429 or a throttled body
    /// - `Graphql` when the body carries top-level `errors`
    /// - `Protocol` when the body cannot be parsed or has no `data`
    pub async fn execute<T: DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> PlatformResult<T> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCESS_TOKEN_HEADER,
            HeaderValue::from_str(access_token)
                .map_err(|e| PlatformError::internal(format!("Invalid access token: {e}")))?,
        );

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let envelope: GraphqlResponse<T> = handle_response(response).await?;
        unwrap_envelope(envelope)
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> PlatformResult<T> {
    let status = response.status();

    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| PlatformError::protocol(format!("Failed to parse response: {e}")))
    } else {
        let error_body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &error_body))
    }
}

fn unwrap_envelope<T>(envelope: GraphqlResponse<T>) -> PlatformResult<T> {
    if !envelope.errors.is_empty() {
        let throttled = envelope.errors.iter().any(|e| {
            e.extensions
                .as_ref()
                .and_then(|ext| ext.code.as_deref())
                .is_some_and(|code| code == "THROTTLED")
        });
        let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
        if throttled {
            return Err(PlatformError::rate_limited(messages.join("; ")));
        }
        return Err(PlatformError::graphql(messages));
    }

    envelope
        .data
        .ok_or_else(|| PlatformError::protocol("Response has neither data nor errors"))
}

fn map_reqwest_error(error: reqwest::Error) -> PlatformError {
    if error.is_timeout() {
        PlatformError::timeout("Request timed out")
    } else if error.is_connect() {
        PlatformError::connection(format!("Connection failed: {error}"))
    } else {
        PlatformError::connection(format!("HTTP request failed: {error}"))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> PlatformError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PlatformError::authentication(format!("Authentication failed: {body}"))
        }
        StatusCode::TOO_MANY_REQUESTS => PlatformError::rate_limited("Rate limit exceeded"),
        StatusCode::NOT_FOUND => PlatformError::protocol(format!("Endpoint not found: {body}")),
        s if s.is_server_error() => {
            PlatformError::connection(format!("Server error ({status}): {body}"))
        }
        _ => PlatformError::protocol(format!("HTTP error ({status}): {body}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Shop {
        name: String,
    }

    fn parse(body: &str) -> GraphqlResponse<Shop> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn new_client() {
        let client = GraphqlHttp::new(5000).unwrap();
        assert_eq!(client.timeout_ms(), 5000);
    }

    #[test]
    fn envelope_with_data() {
        let shop = unwrap_envelope(parse(r#"{"data":{"name":"acme"}}"#)).unwrap();
        assert_eq!(shop.name, "acme");
    }

    #[test]
    fn envelope_with_errors() {
        let err = unwrap_envelope(parse(
            r#"{"data":null,"errors":[{"message":"Field 'x' doesn't exist"}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, PlatformError::Graphql { .. }));
    }

    #[test]
    fn throttled_errors_are_rate_limited() {
        let err = unwrap_envelope(parse(
            r#"{"errors":[{"message":"Throttled","extensions":{"code":"THROTTLED"}}]}"#,
        ))
        .unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, PlatformError::RateLimited { .. }));
    }

    #[test]
    fn empty_envelope_is_protocol_error() {
        let err = unwrap_envelope(parse(r#"{}"#)).unwrap_err();
        assert!(matches!(err, PlatformError::Protocol { .. }));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            map_status_error(StatusCode::UNAUTHORIZED, ""),
            PlatformError::Authentication { .. }
        ));
        assert!(matches!(
            map_status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            PlatformError::RateLimited { .. }
        ));
        assert!(map_status_error(StatusCode::BAD_GATEWAY, "").is_retryable());
        assert!(!map_status_error(StatusCode::BAD_REQUEST, "").is_retryable());
    }
}
