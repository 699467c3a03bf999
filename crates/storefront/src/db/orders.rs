//! Order record repository.
//!
//! Queries are built at runtime with `sqlx::query_as`; the `ORDER BY` clause
//! is assembled only from the fixed fragments of [`OrderSort`] and
//! [`SortDirection`].

use glyca_core::{CommerceOrderId, NewOrderRecord, OrderRecord, OrderRecordId, OrderStatus};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use super::RepositoryError;

const COLUMNS: &str = "id, shopify_order_id, submission_key, product_id, product_title, units, \
     total_price, shipping_cost, currency, first_name, last_name, email, phone, address, \
     region, city, postal_code, country, status, shopify_synced, created_at, updated_at";

/// Sort key for order listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSort {
    #[default]
    Date,
    Price,
}

impl OrderSort {
    const fn column(self) -> &'static str {
        match self {
            Self::Date => "created_at",
            Self::Price => "total_price",
        }
    }
}

/// Sort direction for order listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Listing filter, deserializable from query parameters
/// (`?status=pending&sort=price&dir=asc`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub sort: OrderSort,
    #[serde(default, rename = "dir")]
    pub direction: SortDirection,
}

impl OrderFilter {
    /// The `ORDER BY` clause; ties broken by ID for a stable order.
    fn order_by(&self) -> String {
        format!(
            "ORDER BY {} {}, id {}",
            self.sort.column(),
            self.direction.keyword(),
            self.direction.keyword()
        )
    }
}

/// Repository for order record operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a record, or refresh the snapshot if the Shopify order is
    /// already recorded.
    ///
    /// Status and creation time of an existing row are kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, record), fields(record_id = %record.id))]
    pub async fn upsert(&self, record: &NewOrderRecord) -> Result<OrderRecord, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO orders (
                id, shopify_order_id, submission_key, product_id, product_title, units,
                total_price, shipping_cost, currency, first_name, last_name, email, phone,
                address, region, city, postal_code, country, shopify_synced
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT (shopify_order_id) DO UPDATE SET
                submission_key = EXCLUDED.submission_key,
                product_id = EXCLUDED.product_id,
                product_title = EXCLUDED.product_title,
                units = EXCLUDED.units,
                total_price = EXCLUDED.total_price,
                shipping_cost = EXCLUDED.shipping_cost,
                currency = EXCLUDED.currency,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                region = EXCLUDED.region,
                city = EXCLUDED.city,
                postal_code = EXCLUDED.postal_code,
                country = EXCLUDED.country,
                shopify_synced = EXCLUDED.shopify_synced,
                updated_at = NOW()
            RETURNING {COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, OrderRecord>(&sql)
            .bind(record.id)
            .bind(record.shopify_order_id)
            .bind(record.submission_key)
            .bind(&record.product_id)
            .bind(&record.product_title)
            .bind(record.units)
            .bind(record.total_price)
            .bind(record.shipping_cost)
            .bind(&record.currency)
            .bind(&record.first_name)
            .bind(&record.last_name)
            .bind(&record.email)
            .bind(&record.phone)
            .bind(&record.address)
            .bind(&record.region)
            .bind(&record.city)
            .bind(&record.postal_code)
            .bind(&record.country)
            .bind(record.shopify_synced)
            .fetch_one(self.pool)
            .await
            .map_err(RepositoryError::from_write)?;

        Ok(row)
    }

    /// List orders matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<OrderRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM orders WHERE ($1::order_status IS NULL OR status = $1) {}",
            filter.order_by()
        );

        let rows = sqlx::query_as::<_, OrderRecord>(&sql)
            .bind(filter.status)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderRecordId) -> Result<Option<OrderRecord>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");

        let row = sqlx::query_as::<_, OrderRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Set an order's status. Last write wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: OrderRecordId,
        status: OrderStatus,
    ) -> Result<OrderRecord, RepositoryError> {
        let sql = format!(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, OrderRecord>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Attach a Shopify order to a record and flag it as synced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID, or
    /// `RepositoryError::Conflict` if the Shopify order is already attached
    /// to another record.
    #[instrument(skip(self))]
    pub async fn mark_synced(
        &self,
        id: OrderRecordId,
        shopify_order_id: CommerceOrderId,
    ) -> Result<OrderRecord, RepositoryError> {
        let sql = format!(
            r"
            UPDATE orders
            SET shopify_order_id = $2, shopify_synced = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        );

        sqlx::query_as::<_, OrderRecord>(&sql)
            .bind(id)
            .bind(shopify_order_id)
            .fetch_optional(self.pool)
            .await
            .map_err(RepositoryError::from_write)?
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults_to_newest_first() {
        let filter = OrderFilter::default();
        assert_eq!(filter.order_by(), "ORDER BY created_at DESC, id DESC");
        assert!(filter.status.is_none());
    }

    #[test]
    fn test_filter_price_ascending() {
        let filter = OrderFilter {
            status: Some(OrderStatus::Shipped),
            sort: OrderSort::Price,
            direction: SortDirection::Asc,
        };
        assert_eq!(filter.order_by(), "ORDER BY total_price ASC, id ASC");
    }

    #[test]
    fn test_filter_from_query_json() {
        let filter: OrderFilter =
            serde_json::from_str(r#"{"status":"delivered","sort":"price","dir":"asc"}"#).unwrap();
        assert_eq!(filter.status, Some(OrderStatus::Delivered));
        assert_eq!(filter.sort, OrderSort::Price);
        assert_eq!(filter.direction, SortDirection::Asc);
    }
}
