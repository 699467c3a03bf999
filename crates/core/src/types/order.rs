//! Locally recorded orders.
//!
//! An [`OrderRecord`] is a denormalized snapshot of the product and shipping
//! details at submission time, kept for the admin dashboard. Later edits to
//! the catalog or the shopper's form never touch existing records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CommerceOrderId, OrderRecordId, OrderStatus, SubmissionKey};
use crate::wizard::Checkout;

/// A stored order row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct OrderRecord {
    pub id: OrderRecordId,
    /// Commerce backend order, absent until the record is mirrored.
    pub shopify_order_id: Option<CommerceOrderId>,
    pub submission_key: Option<SubmissionKey>,
    pub product_id: String,
    pub product_title: String,
    pub units: i32,
    pub total_price: Decimal,
    pub shipping_cost: Decimal,
    pub currency: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
    pub region: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub status: OrderStatus,
    pub shopify_synced: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Customer's full name.
    #[must_use]
    pub fn customer_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An order snapshot about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderRecord {
    pub id: OrderRecordId,
    pub shopify_order_id: Option<CommerceOrderId>,
    pub submission_key: Option<SubmissionKey>,
    pub product_id: String,
    pub product_title: String,
    pub units: i32,
    pub total_price: Decimal,
    pub shipping_cost: Decimal,
    pub currency: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
    pub region: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub shopify_synced: bool,
}

impl NewOrderRecord {
    /// Snapshot a checkout that the commerce backend accepted as
    /// `shopify_order_id`.
    ///
    /// `phone` is the number as sent to the commerce backend.
    #[must_use]
    pub fn from_checkout(
        checkout: &Checkout,
        shopify_order_id: CommerceOrderId,
        submission_key: SubmissionKey,
        phone: String,
    ) -> Self {
        let product = checkout.product;
        let shipping = &checkout.shipping;
        let price = product.price();
        Self {
            id: OrderRecordId::generate(),
            shopify_order_id: Some(shopify_order_id),
            submission_key: Some(submission_key),
            product_id: product.id.to_owned(),
            product_title: product.title.to_owned(),
            units: i32::try_from(product.units).unwrap_or(i32::MAX),
            total_price: price.amount,
            shipping_cost: product.shipping_cost().amount,
            currency: price.currency_code.code().to_owned(),
            first_name: shipping.first_name.clone(),
            last_name: shipping.last_name.clone(),
            email: shipping.email.clone(),
            phone,
            address: shipping.address.clone(),
            region: shipping.region.clone(),
            city: shipping.city.clone(),
            postal_code: shipping.postal_code.clone(),
            country: shipping.country.as_str().to_owned(),
            shopify_synced: true,
        }
    }
}
