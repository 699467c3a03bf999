//! Integration tests for Glyca.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process checkout flow (no services needed)
//! cargo test -p glyca-integration-tests
//!
//! # HTTP tests against running servers
//! cargo test -p glyca-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Full wizard walk with in-memory collaborators
//! - `storefront_api` - Storefront wizard API (running server)
//! - `admin_api` - Admin order API (running server, database)
//!
//! This library holds the shared helpers: recording collaborators for the
//! checkout gateway and base URLs for the HTTP tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use glyca_core::{NewOrderRecord, OrderRecord, OrderStatus};
use glyca_storefront::db::RepositoryError;
use glyca_storefront::services::{OrderCreator, OrderRecorder};
use glyca_storefront::shopify::{CreatedOrder, OrderRequest, ShopifyError};

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin API (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Order creator that remembers every request and hands out increasing IDs.
#[derive(Debug, Default)]
pub struct RecordingCreator {
    requests: Mutex<Vec<OrderRequest>>,
    fail: bool,
}

impl RecordingCreator {
    /// Creator that rejects every order as unauthorized.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            requests: Mutex::default(),
            fail: true,
        }
    }

    /// Requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the lock was poisoned by a panicking test.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn requests(&self) -> Vec<OrderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderCreator for RecordingCreator {
    #[allow(clippy::unwrap_used)]
    async fn create_order(&self, request: &OrderRequest) -> Result<CreatedOrder, ShopifyError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        if self.fail {
            return Err(ShopifyError::Unauthorized);
        }
        let sequence = i64::try_from(requests.len()).unwrap_or(i64::MAX);
        Ok(CreatedOrder {
            id: 7_000_000_000 + sequence,
            name: format!("#{}", 1000 + sequence),
            order_number: Some(1000 + sequence),
        })
    }
}

/// Order recorder that keeps rows in memory, upserting by Shopify order ID.
#[derive(Debug, Default)]
pub struct RecordingRecorder {
    records: Mutex<Vec<OrderRecord>>,
}

impl RecordingRecorder {
    /// Rows stored so far.
    ///
    /// # Panics
    ///
    /// Panics if the lock was poisoned by a panicking test.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn records(&self) -> Vec<OrderRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderRecorder for RecordingRecorder {
    #[allow(clippy::unwrap_used)]
    async fn record_order(&self, record: &NewOrderRecord) -> Result<OrderRecord, RepositoryError> {
        let now = Utc::now();
        let row = OrderRecord {
            id: record.id,
            shopify_order_id: record.shopify_order_id,
            submission_key: record.submission_key,
            product_id: record.product_id.clone(),
            product_title: record.product_title.clone(),
            units: record.units,
            total_price: record.total_price,
            shipping_cost: record.shipping_cost,
            currency: record.currency.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            address: record.address.clone(),
            region: record.region.clone(),
            city: record.city.clone(),
            postal_code: record.postal_code.clone(),
            country: record.country.clone(),
            status: OrderStatus::Pending,
            shopify_synced: record.shopify_synced,
            created_at: now,
            updated_at: now,
        };

        let mut records = self.records.lock().unwrap();
        records.retain(|existing| existing.shopify_order_id != row.shopify_order_id);
        records.push(row.clone());
        Ok(row)
    }
}
