//! Order listing command.

use glyca_core::OrderRecord;
use glyca_storefront::db::{OrderFilter, OrderRepository, RepositoryError};
use thiserror::Error;

use super::migrate::MigrationError;

#[derive(Debug, Error)]
pub enum OrdersError {
    #[error(transparent)]
    Connect(#[from] MigrationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// List orders matching `filter`, one line each.
///
/// # Errors
///
/// Returns error if the database is unreachable or the query fails.
pub async fn list(filter: &OrderFilter) -> Result<(), OrdersError> {
    let pool = super::connect().await?;
    let orders = OrderRepository::new(&pool).list(filter).await?;

    if orders.is_empty() {
        tracing::info!("No orders found");
        return Ok(());
    }

    for order in &orders {
        tracing::info!("{}", summary_line(order));
    }
    tracing::info!("{} order(s)", orders.len());
    Ok(())
}

fn summary_line(order: &OrderRecord) -> String {
    let shopify = order
        .shopify_order_id
        .map_or_else(|| "unsynced".to_string(), |id| format!("shopify:{id}"));
    format!(
        "{id}  {created}  {status:<9}  {total} {currency}  {product}  {customer} ({country})  {shopify}",
        id = order.id,
        created = order.created_at.format("%Y-%m-%d %H:%M"),
        status = order.status.as_str(),
        total = order.total_price,
        currency = order.currency,
        product = order.product_title,
        customer = order.customer_name(),
        country = order.country,
    )
}
