//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., glyca.myshopify.com)
//! - `SHOPIFY_ADMIN_ACCESS_TOKEN` - Admin API access token
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01)
//! - `ADDRESS_VALIDATION_URL` - Address validation endpoint (enables address checks)
//! - `ADDRESS_VALIDATION_API_KEY` - Bearer token for the address validation endpoint
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};

use glyca_storefront::config::{
    ConfigError, ShopifyConfig, get_database_url, get_env_or_default, get_optional_env,
    get_validated_secret, sentry_from_env,
};
use secrecy::SecretString;
use url::Url;

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify Admin REST configuration
    pub shopify: ShopifyConfig,
    /// Address validation endpoint (optional)
    pub address_validation: Option<AddressValidationConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Address validation endpoint configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AddressValidationConfig {
    pub url: Url,
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for AddressValidationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressValidationConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;

        let shopify = ShopifyConfig::from_env()?;
        let address_validation = AddressValidationConfig::from_env()?;
        let (sentry_dsn, sentry_environment, sentry_sample_rate, sentry_traces_sample_rate) =
            sentry_from_env();

        Ok(Self {
            database_url,
            host,
            port,
            shopify,
            address_validation,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AddressValidationConfig {
    /// Load the `ADDRESS_VALIDATION_*` variables.
    ///
    /// Returns `Ok(None)` when no URL is configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL does not parse or the API key looks
    /// like a placeholder.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(raw_url) = get_optional_env("ADDRESS_VALIDATION_URL") else {
            return Ok(None);
        };
        let url = Self::parse_url(&raw_url)?;

        let api_key = if get_optional_env("ADDRESS_VALIDATION_API_KEY").is_some() {
            Some(get_validated_secret("ADDRESS_VALIDATION_API_KEY")?)
        } else {
            None
        };

        Ok(Some(Self { url, api_key }))
    }

    fn parse_url(raw: &str) -> Result<Url, ConfigError> {
        let url = Url::parse(raw).map_err(|e| {
            ConfigError::InvalidEnvVar("ADDRESS_VALIDATION_URL".to_string(), e.to_string())
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "ADDRESS_VALIDATION_URL".to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }
}
