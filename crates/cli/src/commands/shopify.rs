//! Shopify credential check.

use glyca_storefront::config::{ConfigError, ShopifyConfig};
use glyca_storefront::shopify::{ShopifyClient, ShopifyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Shopify(#[from] ShopifyError),
}

/// Fetch the shop with the configured token.
///
/// # Errors
///
/// Returns error if the `SHOPIFY_*` variables are missing or Shopify rejects
/// the token.
pub async fn check() -> Result<(), CheckError> {
    dotenvy::dotenv().ok();

    let config = ShopifyConfig::from_env()?;
    let client = ShopifyClient::new(&config)?;

    tracing::info!("Checking Shopify credentials for {}...", client.store());
    let shop = client.shop().await?;

    tracing::info!("Connected to {} (id {})", shop.name, shop.id);
    if let Some(currency) = shop.currency {
        tracing::info!("  Currency: {currency}");
    }
    Ok(())
}
