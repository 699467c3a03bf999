//! Wire types for the Shopify Admin REST API.
//!
//! Only the fields the checkout sends or reads are modeled. Money amounts are
//! decimal strings, as the REST API expects.

use glyca_core::FinancialStatus;
use serde::{Deserialize, Serialize};

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /orders.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub order: NewOrder,
}

/// Order to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub line_items: Vec<LineItem>,
    pub customer: Customer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    pub shipping_address: Address,
    pub billing_address: Address,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shipping_lines: Vec<ShippingLine>,
    pub financial_status: FinancialStatus,
    pub currency: String,
    /// Email the order confirmation; only meaningful with an email.
    pub send_receipt: bool,
    pub send_fulfillment_receipt: bool,
    /// Comma-separated tags.
    pub tags: String,
    pub note_attributes: Vec<NoteAttribute>,
}

/// A variant ordered at a fixed price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub variant_id: i64,
    pub quantity: u32,
    pub price: String,
}

/// Customer attached to (or created for) the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
}

/// Postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: String,
    pub province: String,
    pub zip: String,
    pub country_code: String,
    pub phone: String,
}

/// Shipping charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingLine {
    pub title: String,
    pub code: String,
    pub price: String,
}

/// Free-form key/value shown on the order in the Shopify admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteAttribute {
    pub name: String,
    pub value: String,
}

impl NoteAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct OrderResponse {
    pub order: CreatedOrder,
}

/// The order as returned by Shopify after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOrder {
    /// Numeric order ID.
    pub id: i64,
    /// Display name, e.g. `#1001`.
    pub name: String,
    #[serde(default)]
    pub order_number: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShopResponse {
    pub shop: Shop,
}

/// Shop details from `GET /shop.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub myshopify_domain: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Error body returned with 4xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub errors: serde_json::Value,
}
