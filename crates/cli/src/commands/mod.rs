//! CLI command implementations.

pub mod migrate;
pub mod orders;
pub mod shopify;

use glyca_storefront::config::get_database_url;
use sqlx::PgPool;

use crate::commands::migrate::MigrationError;

/// Connect to the checkout database named by `STOREFRONT_DATABASE_URL`
/// (or `DATABASE_URL`).
async fn connect() -> Result<PgPool, MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url("STOREFRONT_DATABASE_URL")
        .map_err(|_| MigrationError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(glyca_storefront::db::create_pool(&database_url).await?)
}
