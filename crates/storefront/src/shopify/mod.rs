//! Shopify Admin REST client for order creation.
//!
//! # Scope
//!
//! The checkout only needs two endpoints:
//!
//! - `POST /admin/api/{version}/orders.json` - create the order for a
//!   submitted checkout
//! - `GET /admin/api/{version}/shop.json` - cheap authenticated call used as a
//!   credential check
//!
//! Authentication is a private app token sent as `X-Shopify-Access-Token`.
//!
//! # Phone format
//!
//! Shopify expects customer and address phones in E.164 (`+351912345678`).
//! That requirement belongs to this collaborator; the form layer keeps the
//! national digits and [`e164_phone`] converts them here.
//!
//! # Example
//!
//! ```rust,ignore
//! use glyca_storefront::shopify::{OrderDraft, ShopifyClient};
//!
//! let client = ShopifyClient::new(&config.shopify)?;
//! let draft = OrderDraft::from_checkout(&checkout, SubmissionKey::generate());
//! let created = client.create_order(&draft.to_request()).await?;
//! ```

mod orders;
pub mod types;

pub use orders::{DraftError, OrderDraft, e164_phone};
pub use types::*;

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::instrument;

use crate::config::ShopifyConfig;
use types::{ErrorBody, OrderResponse, ShopResponse};

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an unexpected error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Shopify rejected the payload (422).
    #[error("User error: {0}")]
    UserError(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Invalid or revoked access token.
    #[error("Unauthorized: invalid access token")]
    Unauthorized,

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Shopify Admin REST client.
///
/// Cheaply cloneable; the underlying connection pool is shared.
#[derive(Clone)]
pub struct ShopifyClient {
    inner: Arc<ShopifyClientInner>,
}

struct ShopifyClientInner {
    client: reqwest::Client,
    base_url: String,
    store: String,
}

impl ShopifyClient {
    /// Create a new Shopify Admin REST client.
    ///
    /// # Errors
    ///
    /// Returns error if the access token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let base_url = format!(
            "https://{}/admin/api/{}",
            config.store, config.api_version
        );
        Self::with_base_url(config, base_url)
    }

    /// Create a client against an explicit API root (no trailing slash).
    ///
    /// # Errors
    ///
    /// Same as [`ShopifyClient::new`].
    pub fn with_base_url(
        config: &ShopifyConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, ShopifyError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Shopify-Access-Token",
            HeaderValue::from_str(config.access_token.expose_secret())
                .map_err(|e| ShopifyError::Parse(format!("Invalid access token format: {e}")))?,
        );
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(ShopifyClientInner {
                client,
                base_url: base_url.into(),
                store: config.store.clone(),
            }),
        })
    }

    /// The configured store domain.
    #[must_use]
    pub fn store(&self) -> &str {
        &self.inner.store
    }

    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Shopify rejects the order.
    #[instrument(skip(self, request), fields(store = %self.inner.store))]
    pub async fn create_order(&self, request: &OrderRequest) -> Result<CreatedOrder, ShopifyError> {
        let response: OrderResponse = self.post("/orders.json", request).await?;
        tracing::info!(
            order_id = response.order.id,
            order_name = %response.order.name,
            "Shopify order created"
        );
        Ok(response.order)
    }

    /// Fetch shop details.
    ///
    /// Doubles as a credential check: any token that can read the shop is
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Unauthorized`] for a bad token, or another
    /// error if the request fails.
    #[instrument(skip(self), fields(store = %self.inner.store))]
    pub async fn shop(&self) -> Result<Shop, ShopifyError> {
        let response: ShopResponse = self.get("/shop.json").await?;
        Ok(response.shop)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ShopifyError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ShopifyError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self.inner.client.post(&url).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ShopifyError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| ShopifyError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Parse an error response from Shopify.
    async fn parse_error(response: reqwest::Response) -> ShopifyError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split('.').next())
                .and_then(|s| s.parse().ok())
                .unwrap_or(2);
            return ShopifyError::RateLimited(retry_after);
        }

        if status == 401 || status == 403 {
            return ShopifyError::Unauthorized;
        }

        if status == 404 {
            return ShopifyError::NotFound("Resource not found".to_string());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == 422 {
            return ShopifyError::UserError(describe_errors(&body));
        }

        ShopifyError::Api {
            status,
            message: body,
        }
    }
}

impl std::fmt::Debug for ShopifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyClient")
            .field("store", &self.inner.store)
            .finish_non_exhaustive()
    }
}

/// Flatten a REST `{"errors": ...}` body into one line.
///
/// Shopify sends either a string or a map of field to messages.
fn describe_errors(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return body.to_string();
    };

    match parsed.errors {
        serde_json::Value::String(message) => message,
        serde_json::Value::Object(fields) => fields
            .iter()
            .map(|(field, messages)| match messages {
                serde_json::Value::Array(items) => {
                    let joined = items
                        .iter()
                        .filter_map(serde_json::Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{field}: {joined}")
                }
                other => format!("{field}: {other}"),
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use glyca_core::FinancialStatus;

    use super::*;

    fn config() -> ShopifyConfig {
        ShopifyConfig {
            store: "glyca-test.myshopify.com".to_string(),
            api_version: "2026-01".to_string(),
            access_token: secrecy::SecretString::from("shpat_test_token_4Kd8"),
        }
    }

    /// Serve `router` under `/admin/api/2026-01` on an ephemeral port.
    async fn client_for(router: Router) -> ShopifyClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().nest("/admin/api/2026-01", router);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        ShopifyClient::with_base_url(&config(), format!("http://{addr}/admin/api/2026-01")).unwrap()
    }

    fn address() -> Address {
        Address {
            first_name: "Joana".to_string(),
            last_name: "Costa".to_string(),
            address1: "Rua Brito Capelo 100".to_string(),
            city: "Matosinhos".to_string(),
            province: "Porto".to_string(),
            zip: "4450-000".to_string(),
            country_code: "PT".to_string(),
            phone: "+351912345678".to_string(),
        }
    }

    fn request() -> OrderRequest {
        OrderRequest {
            order: NewOrder {
                line_items: vec![LineItem {
                    variant_id: 44_100_200_300,
                    quantity: 1,
                    price: "89".to_string(),
                }],
                customer: Customer {
                    first_name: "Joana".to_string(),
                    last_name: "Costa".to_string(),
                    email: Some("joana@glyca.test".to_string()),
                    phone: "+351912345678".to_string(),
                },
                email: Some("joana@glyca.test".to_string()),
                phone: "+351912345678".to_string(),
                shipping_address: address(),
                billing_address: address(),
                shipping_lines: vec![],
                financial_status: FinancialStatus::Pending,
                currency: "EUR".to_string(),
                send_receipt: true,
                send_fulfillment_receipt: false,
                tags: "glyca".to_string(),
                note_attributes: vec![NoteAttribute::new("bundle", "compra-2")],
            },
        }
    }

    /// Router whose order endpoint always answers with `status` and `body`.
    fn failing_orders(status: StatusCode, body: &'static str) -> Router {
        Router::new().route(
            "/orders.json",
            post(move || async move {
                let mut headers = AxumHeaders::new();
                headers.insert("Retry-After", "4.0".parse().unwrap());
                (status, headers, body)
            }),
        )
    }

    #[tokio::test]
    async fn test_create_order_posts_payload_with_token() {
        let seen = Arc::new(Mutex::new(Vec::<serde_json::Value>::new()));
        let recorder = Arc::clone(&seen);
        let router = Router::new().route(
            "/orders.json",
            post(move |headers: AxumHeaders, Json(body): Json<serde_json::Value>| {
                let recorder = Arc::clone(&recorder);
                async move {
                    assert_eq!(
                        headers.get("x-shopify-access-token").unwrap(),
                        "shpat_test_token_4Kd8"
                    );
                    recorder.lock().unwrap().push(body);
                    (
                        StatusCode::CREATED,
                        Json(serde_json::json!({
                            "order": {
                                "id": 5_500_000_777_i64,
                                "name": "#1077",
                                "order_number": 1077
                            }
                        })),
                    )
                }
            }),
        );

        let client = client_for(router).await;
        let created = client.create_order(&request()).await.unwrap();

        assert_eq!(created.id, 5_500_000_777);
        assert_eq!(created.name, "#1077");
        assert_eq!(created.order_number, Some(1077));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let order = &seen.first().unwrap()["order"];
        assert_eq!(order["line_items"][0]["variant_id"], 44_100_200_300_i64);
        assert_eq!(order["line_items"][0]["price"], "89");
        assert_eq!(order["shipping_address"]["country_code"], "PT");
        assert_eq!(order["send_receipt"], true);
        assert!(order.get("shipping_lines").is_none());
    }

    #[tokio::test]
    async fn test_shop_parses_details() {
        let router = Router::new().route(
            "/shop.json",
            get(|| async {
                Json(serde_json::json!({
                    "shop": {
                        "id": 601,
                        "name": "Glyca",
                        "myshopify_domain": "glyca-test.myshopify.com",
                        "currency": "EUR"
                    }
                }))
            }),
        );

        let shop = client_for(router).await.shop().await.unwrap();
        assert_eq!(shop.name, "Glyca");
        assert_eq!(shop.currency.as_deref(), Some("EUR"));
        assert!(shop.domain.is_none());
    }

    #[tokio::test]
    async fn test_auth_failures_map_to_unauthorized() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let client = client_for(failing_orders(status, "")).await;
            assert!(matches!(
                client.create_order(&request()).await,
                Err(ShopifyError::Unauthorized)
            ));
        }
    }

    #[tokio::test]
    async fn test_unprocessable_maps_to_user_error() {
        let body = r#"{"errors":{"line_items":["variant is unavailable"]}}"#;
        let client = client_for(failing_orders(StatusCode::UNPROCESSABLE_ENTITY, body)).await;

        match client.create_order(&request()).await {
            Err(ShopifyError::UserError(message)) => {
                assert_eq!(message, "line_items: variant is unavailable");
            }
            other => panic!("expected user error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let client = client_for(failing_orders(StatusCode::TOO_MANY_REQUESTS, "")).await;
        assert!(matches!(
            client.create_order(&request()).await,
            Err(ShopifyError::RateLimited(4))
        ));
    }

    #[tokio::test]
    async fn test_other_statuses_keep_body() {
        let client = client_for(failing_orders(StatusCode::BAD_GATEWAY, "upstream down")).await;
        match client.create_order(&request()).await {
            Err(ShopifyError::Api { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected API error, got {other:?}"),
        }

        let client = client_for(failing_orders(StatusCode::NOT_FOUND, "")).await;
        assert!(matches!(
            client.create_order(&request()).await,
            Err(ShopifyError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_parse_error() {
        let router = Router::new().route("/shop.json", get(|| async { "<html>ok</html>" }));
        assert!(matches!(
            client_for(router).await.shop().await,
            Err(ShopifyError::Parse(_))
        ));
    }

    #[test]
    fn test_describe_errors_map() {
        let body = r#"{"errors":{"line_items":["is invalid"],"phone":["is invalid","has already been taken"]}}"#;
        assert_eq!(
            describe_errors(body),
            "line_items: is invalid; phone: is invalid, has already been taken"
        );
    }

    #[test]
    fn test_describe_errors_string() {
        let body = r#"{"errors":"[API] Invalid API key or access token"}"#;
        assert_eq!(
            describe_errors(body),
            "[API] Invalid API key or access token"
        );
    }

    #[test]
    fn test_describe_errors_not_json() {
        assert_eq!(describe_errors("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_client_debug_hides_token() {
        let config = ShopifyConfig {
            store: "glyca-test.myshopify.com".to_string(),
            api_version: "2026-01".to_string(),
            access_token: secrecy::SecretString::from("shpat_super_secret_value"),
        };
        let client = ShopifyClient::new(&config).expect("client builds");
        let debug = format!("{client:?}");
        assert!(debug.contains("glyca-test.myshopify.com"));
        assert!(!debug.contains("shpat_super_secret_value"));
    }
}
