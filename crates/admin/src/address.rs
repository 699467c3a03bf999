//! Address validation client.
//!
//! The endpoint takes one address and answers whether it is deliverable,
//! optionally with a corrected version and a list of human-readable issues:
//!
//! ```text
//! POST {url}
//! {"street": "...", "city": "...", "region": "...", "postalCode": "...", "country": "PT"}
//!
//! 200 {"isValid": false, "suggestedAddress": {"postalCode": "4450-208"}, "issues": ["..."]}
//! ```
//!
//! Checks are advisory. Nothing is written back to the order.

use std::sync::Arc;

use glyca_core::OrderRecord;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::AddressValidationConfig;

/// Errors from the address validation endpoint.
#[derive(Debug, Error)]
pub enum AddressValidationError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint returned an error status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the endpoint.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// API key missing or rejected.
    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Address sent for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressQuery {
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

impl From<&OrderRecord> for AddressQuery {
    fn from(record: &OrderRecord) -> Self {
        Self {
            street: record.address.clone(),
            city: record.city.clone(),
            region: record.region.clone(),
            postal_code: record.postal_code.clone(),
            country: record.country.clone(),
        }
    }
}

/// Endpoint verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressVerdict {
    pub is_valid: bool,
    #[serde(default)]
    pub suggested_address: Option<SuggestedAddress>,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Corrected fields; only the ones the endpoint changed are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Address validation client.
#[derive(Clone)]
pub struct AddressValidationClient {
    inner: Arc<AddressValidationClientInner>,
}

struct AddressValidationClientInner {
    client: reqwest::Client,
    url: Url,
}

impl AddressValidationClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &AddressValidationConfig) -> Result<Self, AddressValidationError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        if let Some(api_key) = &config.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret())).map_err(
                    |e| AddressValidationError::Parse(format!("Invalid API key format: {e}")),
                )?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            inner: Arc::new(AddressValidationClientInner {
                client,
                url: config.url.clone(),
            }),
        })
    }

    /// Validate one address.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the endpoint answers with a
    /// non-success status.
    #[instrument(skip(self, query), fields(country = %query.country))]
    pub async fn validate(
        &self,
        query: &AddressQuery,
    ) -> Result<AddressVerdict, AddressValidationError> {
        let response = self
            .inner
            .client
            .post(self.inner.url.clone())
            .json(query)
            .send()
            .await?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            let verdict: AddressVerdict = response.json().await.map_err(|e| {
                AddressValidationError::Parse(format!("Failed to parse response: {e}"))
            })?;
            tracing::debug!(
                is_valid = verdict.is_valid,
                issues = verdict.issues.len(),
                "Address validated"
            );
            return Ok(verdict);
        }

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(AddressValidationError::RateLimited(retry_after));
        }

        if status == 401 || status == 403 {
            return Err(AddressValidationError::Unauthorized);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(AddressValidationError::Api { status, message })
    }
}

impl std::fmt::Debug for AddressValidationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressValidationClient")
            .field("url", &self.inner.url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::{Json, Router, routing::post};
    use secrecy::SecretString;

    use super::*;

    fn query() -> AddressQuery {
        AddressQuery {
            street: "Rua Brito Capelo 100".to_string(),
            city: "Matosinhos".to_string(),
            region: "Porto".to_string(),
            postal_code: "4450-000".to_string(),
            country: "PT".to_string(),
        }
    }

    /// Serve `router` on an ephemeral port and return a client pointed at it.
    async fn client_for(router: Router, api_key: Option<&str>) -> AddressValidationClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        AddressValidationClient::new(&AddressValidationConfig {
            url: Url::parse(&format!("http://{addr}/validate")).unwrap(),
            api_key: api_key.map(SecretString::from),
        })
        .unwrap()
    }

    #[test]
    fn test_query_wire_names() {
        let json = serde_json::to_value(query()).unwrap();
        assert_eq!(json["postalCode"], "4450-000");
        assert_eq!(json["street"], "Rua Brito Capelo 100");
        assert!(json.get("postal_code").is_none());
    }

    #[test]
    fn test_verdict_defaults_missing_fields() {
        let verdict: AddressVerdict = serde_json::from_str(r#"{"isValid":true}"#).unwrap();
        assert!(verdict.is_valid);
        assert!(verdict.suggested_address.is_none());
        assert!(verdict.issues.is_empty());
    }

    #[tokio::test]
    async fn test_validate_posts_query_and_parses_suggestion() {
        let seen = Arc::new(Mutex::new(Vec::<serde_json::Value>::new()));
        let recorder = Arc::clone(&seen);
        let router = Router::new().route(
            "/validate",
            post(move |headers: AxumHeaders, Json(body): Json<serde_json::Value>| {
                let recorder = Arc::clone(&recorder);
                async move {
                    assert_eq!(
                        headers.get("authorization").unwrap(),
                        "Bearer av_test_9fK2"
                    );
                    recorder.lock().unwrap().push(body);
                    Json(serde_json::json!({
                        "isValid": false,
                        "suggestedAddress": {"postalCode": "4450-208"},
                        "issues": ["Postal code does not match city"]
                    }))
                }
            }),
        );

        let client = client_for(router, Some("av_test_9fK2")).await;
        let verdict = client.validate(&query()).await.unwrap();

        assert!(!verdict.is_valid);
        assert_eq!(
            verdict.suggested_address.unwrap().postal_code.as_deref(),
            Some("4450-208")
        );
        assert_eq!(verdict.issues, vec!["Postal code does not match city"]);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let body = seen.first().unwrap();
        assert_eq!(body["country"], "PT");
        assert_eq!(body["region"], "Porto");
    }

    #[tokio::test]
    async fn test_validate_maps_error_statuses() {
        let router = Router::new()
            .route("/validate", post(|| async { StatusCode::UNAUTHORIZED }));
        let client = client_for(router, None).await;
        assert!(matches!(
            client.validate(&query()).await,
            Err(AddressValidationError::Unauthorized)
        ));

        let router = Router::new().route(
            "/validate",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let client = client_for(router, None).await;
        match client.validate(&query()).await {
            Err(AddressValidationError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
