//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                            - Liveness check
//! GET  /health/ready                      - Readiness check (database)
//!
//! # Orders (local records)
//! GET  /api/orders                        - List (?status=&sort=date|price&dir=asc|desc)
//! GET  /api/orders/{id}                   - Order detail
//! POST /api/orders/{id}/status            - Set status (last write wins)
//! POST /api/orders/{id}/validate-address  - Check the shipping address
//! POST /api/orders/{id}/export            - Create the Shopify order for an unsynced record
//!
//! # Shopify
//! POST /api/shopify/test-connection       - Credential check
//! ```

pub mod orders;
pub mod shopify;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
        .route("/{id}/validate-address", post(orders::validate_address))
        .route("/{id}/export", post(orders::export))
}

/// Create all API routes for the admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/orders", order_routes())
        .route("/api/shopify/test-connection", post(shopify::test_connection))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use glyca_storefront::config::ShopifyConfig;
    use glyca_storefront::shopify::ShopifyClient;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::AdminConfig;

    /// State with no reachable database and no address validation.
    fn offline_state() -> AppState {
        let shopify = ShopifyConfig {
            store: "glyca-test.myshopify.com".to_string(),
            api_version: "2026-01".to_string(),
            access_token: SecretString::from("shpat_3kLm9QzX2vRt"),
        };
        let config = AdminConfig {
            database_url: SecretString::from("postgres://localhost:1/glyca"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            shopify: shopify.clone(),
            address_validation: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost:1/glyca")
            .unwrap();
        let client = ShopifyClient::new(&shopify).unwrap();
        AppState::from_parts(config, pool, client, None)
    }

    #[tokio::test]
    async fn test_validate_address_unavailable_without_config() {
        let app = routes().with_state(offline_state());
        let uri = format!("/api/orders/{}/validate-address", uuid::Uuid::new_v4());

        let response = app
            .oneshot(Request::post(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_malformed_order_id_is_rejected() {
        let app = routes().with_state(offline_state());

        let response = app
            .oneshot(
                Request::get("/api/orders/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
