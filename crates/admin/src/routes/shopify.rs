//! Shopify connection check.

use axum::{Json, extract::State};
use glyca_storefront::shopify::Shop;
use serde::Serialize;
use tracing::instrument;

use crate::state::AppState;

/// Outcome of a credential check.
///
/// Failures are reported in the body with `success: false` rather than as an
/// HTTP error, so the dashboard can show the reason inline.
#[derive(Debug, Serialize)]
pub struct ConnectionCheck {
    pub success: bool,
    pub store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop: Option<Shop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `POST /api/shopify/test-connection`
#[instrument(skip(state))]
pub async fn test_connection(State(state): State<AppState>) -> Json<ConnectionCheck> {
    let client = state.shopify();
    let check = match client.shop().await {
        Ok(shop) => {
            tracing::info!(shop = %shop.name, "Shopify connection verified");
            ConnectionCheck {
                success: true,
                store: client.store().to_string(),
                shop: Some(shop),
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Shopify connection check failed");
            ConnectionCheck {
                success: false,
                store: client.store().to_string(),
                shop: None,
                error: Some(e.to_string()),
            }
        }
    };
    Json(check)
}
