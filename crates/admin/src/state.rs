//! Application state shared across handlers.

use std::sync::Arc;

use glyca_storefront::shopify::ShopifyClient;
use sqlx::PgPool;

use crate::address::AddressValidationClient;
use crate::config::AdminConfig;
use crate::error::AppError;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    shopify: ShopifyClient,
    address: Option<AddressValidationClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shopify or address validation client cannot
    /// be built from the configuration.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, AppError> {
        let shopify = ShopifyClient::new(&config.shopify)?;
        let address = config
            .address_validation
            .as_ref()
            .map(AddressValidationClient::new)
            .transpose()?;

        if address.is_none() {
            tracing::warn!("ADDRESS_VALIDATION_URL not set, address checks disabled");
        }

        Ok(Self::from_parts(config, pool, shopify, address))
    }

    /// Assemble state from already-built clients.
    #[must_use]
    pub fn from_parts(
        config: AdminConfig,
        pool: PgPool,
        shopify: ShopifyClient,
        address: Option<AddressValidationClient>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                shopify,
                address,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Shopify Admin REST client.
    #[must_use]
    pub fn shopify(&self) -> &ShopifyClient {
        &self.inner.shopify
    }

    /// Get the address validation client, if configured.
    #[must_use]
    pub fn address(&self) -> Option<&AddressValidationClient> {
        self.inner.address.as_ref()
    }
}
