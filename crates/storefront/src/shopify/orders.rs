//! Mapping from a checkout to a Shopify order payload.

use glyca_core::{
    Checkout, CountryCode, CountryProfile, FinancialStatus, OrderRecord, ProductId, ProductOption,
    ShippingInfo, SubmissionKey, find_product,
};
use thiserror::Error;

use super::types::{
    Address, Customer, LineItem, NewOrder, NoteAttribute, OrderRequest, ShippingLine,
};

/// Tag applied to every order created by the checkout.
const ORDER_TAG: &str = "glyca-checkout";

/// Convert national phone digits to E.164.
///
/// A leading trunk prefix is dropped where the country uses one
/// (`0612345678` in France becomes `+33612345678`); Portugal and Spain have
/// none and Italy keeps its leading zero.
#[must_use]
pub fn e164_phone(profile: &CountryProfile, national: &str) -> String {
    let subscriber = profile
        .trunk_prefix
        .and_then(|trunk| national.strip_prefix(trunk))
        .unwrap_or(national);
    format!("+{}{subscriber}", profile.dial_code)
}

/// A stored record cannot be turned back into an order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("unknown product: {0}")]
    UnknownProduct(String),
    #[error("unsupported country: {0}")]
    UnknownCountry(String),
    #[error("phone number {0} is not valid for its country")]
    InvalidPhone(String),
}

/// Everything needed to build an order request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub product: &'static ProductOption,
    pub shipping: ShippingInfo,
    pub submission_key: SubmissionKey,
}

impl OrderDraft {
    /// Draft for a validated wizard checkout.
    #[must_use]
    pub fn from_checkout(checkout: &Checkout, submission_key: SubmissionKey) -> Self {
        Self {
            product: checkout.product,
            shipping: checkout.shipping.clone(),
            submission_key,
        }
    }

    /// Draft for a stored order record, used when exporting a record that
    /// never reached Shopify.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError`] if the record's product, country or phone no
    /// longer resolve.
    pub fn from_record(record: &OrderRecord) -> Result<Self, DraftError> {
        let product = find_product(&ProductId::from(record.product_id.as_str()))
            .ok_or_else(|| DraftError::UnknownProduct(record.product_id.clone()))?;
        let country: CountryCode = record
            .country
            .parse()
            .map_err(|_| DraftError::UnknownCountry(record.country.clone()))?;
        let phone_national = country
            .profile()
            .national_number(&record.phone)
            .ok_or_else(|| DraftError::InvalidPhone(record.phone.clone()))?;

        Ok(Self {
            product,
            shipping: ShippingInfo {
                first_name: record.first_name.clone(),
                last_name: record.last_name.clone(),
                email: record.email.clone(),
                phone: record.phone.clone(),
                phone_national,
                address: record.address.clone(),
                region: record.region.clone(),
                city: record.city.clone(),
                postal_code: record.postal_code.clone(),
                country,
            },
            submission_key: record.submission_key.unwrap_or_else(SubmissionKey::generate),
        })
    }

    /// Customer phone as sent to Shopify.
    #[must_use]
    pub fn phone(&self) -> String {
        e164_phone(self.shipping.country.profile(), &self.shipping.phone_national)
    }

    /// Build the `POST /orders.json` body.
    ///
    /// The bundle is always one line item of quantity 1 at the catalog
    /// price; shipping is a separate line when not free.
    #[must_use]
    pub fn to_request(&self) -> OrderRequest {
        let shipping = &self.shipping;
        let phone = self.phone();
        let price = self.product.price();
        let shipping_cost = self.product.shipping_cost();

        let address = Address {
            first_name: shipping.first_name.clone(),
            last_name: shipping.last_name.clone(),
            address1: shipping.address.clone(),
            city: shipping.city.clone(),
            province: shipping.region.clone(),
            zip: shipping.postal_code.clone(),
            country_code: shipping.country.as_str().to_string(),
            phone: phone.clone(),
        };

        let shipping_lines = if shipping_cost.is_zero() {
            Vec::new()
        } else {
            vec![ShippingLine {
                title: "Standard".to_string(),
                code: "standard".to_string(),
                price: shipping_cost.to_api_string(),
            }]
        };

        let has_email = shipping.email.is_some();

        OrderRequest {
            order: NewOrder {
                line_items: vec![LineItem {
                    variant_id: self.product.variant_id,
                    quantity: 1,
                    price: price.to_api_string(),
                }],
                customer: Customer {
                    first_name: shipping.first_name.clone(),
                    last_name: shipping.last_name.clone(),
                    email: shipping.email.clone(),
                    phone: phone.clone(),
                },
                email: shipping.email.clone(),
                phone,
                shipping_address: address.clone(),
                billing_address: address,
                shipping_lines,
                financial_status: FinancialStatus::Pending,
                currency: price.currency_code.code().to_string(),
                send_receipt: has_email,
                send_fulfillment_receipt: has_email,
                tags: format!("{ORDER_TAG}, {}", self.product.id),
                note_attributes: vec![
                    NoteAttribute::new("submission_key", self.submission_key.to_string()),
                    NoteAttribute::new("bundle_units", self.product.units.to_string()),
                ],
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use glyca_core::{CATALOG, OrderRecordId, OrderStatus};
    use rust_decimal::Decimal;

    use super::*;

    fn shipping(country: CountryCode, phone: &str) -> ShippingInfo {
        ShippingInfo {
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            email: None,
            phone: phone.to_string(),
            phone_national: country.profile().national_number(phone).unwrap(),
            address: "Rua das Flores 12".to_string(),
            region: "Lisboa".to_string(),
            city: "Sintra".to_string(),
            postal_code: "2710-000".to_string(),
            country,
        }
    }

    fn draft(product: usize) -> OrderDraft {
        let checkout = Checkout {
            product: CATALOG.get(product).unwrap(),
            shipping: shipping(CountryCode::PT, "912 345 678"),
        };
        OrderDraft::from_checkout(&checkout, SubmissionKey::generate())
    }

    #[test]
    fn test_e164_portugal() {
        assert_eq!(
            e164_phone(CountryCode::PT.profile(), "912345678"),
            "+351912345678"
        );
    }

    #[test]
    fn test_e164_france_drops_trunk_prefix() {
        let national = CountryCode::FR
            .profile()
            .national_number("06 12 34 56 78")
            .unwrap();
        assert_eq!(
            e164_phone(CountryCode::FR.profile(), &national),
            "+33612345678"
        );
    }

    #[test]
    fn test_e164_italy_keeps_leading_zero() {
        assert_eq!(
            e164_phone(CountryCode::IT.profile(), "0612345678"),
            "+390612345678"
        );
    }

    #[test]
    fn test_compra_1_request() {
        let request = draft(0).to_request();
        let order = &request.order;

        assert_eq!(order.line_items.len(), 1);
        let item = order.line_items.first().unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.price, "49");
        assert_eq!(item.variant_id, CATALOG[0].variant_id);

        assert_eq!(order.shipping_lines.len(), 1);
        assert_eq!(order.shipping_lines[0].price, "3");
        assert_eq!(order.phone, "+351912345678");
        assert_eq!(order.shipping_address.country_code, "PT");
        assert_eq!(order.shipping_address.province, "Lisboa");
        assert_eq!(order.currency, "EUR");
        assert!(!order.send_receipt);
    }

    #[test]
    fn test_free_shipping_has_no_shipping_line() {
        let request = draft(1).to_request();
        assert!(request.order.shipping_lines.is_empty());
        assert_eq!(request.order.line_items[0].price, "89");
    }

    #[test]
    fn test_request_json_shape() {
        let draft = draft(0);
        let json = serde_json::to_value(draft.to_request()).unwrap();
        let order = &json["order"];

        assert_eq!(order["financial_status"], "pending");
        assert_eq!(order["line_items"][0]["quantity"], 1);
        assert_eq!(order["line_items"][0]["price"], "49");
        assert!(order.get("email").is_none());
        assert_eq!(
            order["note_attributes"][0]["value"],
            draft.submission_key.to_string()
        );
    }

    fn record(phone: &str) -> OrderRecord {
        let now = Utc::now();
        OrderRecord {
            id: OrderRecordId::generate(),
            shopify_order_id: None,
            submission_key: None,
            product_id: "compra-3".to_string(),
            product_title: "Compra 3".to_string(),
            units: 3,
            total_price: Decimal::from(119),
            shipping_cost: Decimal::ZERO,
            currency: "EUR".to_string(),
            first_name: "Lucía".to_string(),
            last_name: "García".to_string(),
            email: Some("lucia@example.es".to_string()),
            phone: phone.to_string(),
            address: "Rúa do Príncipe 5".to_string(),
            region: "Galicia".to_string(),
            city: "Vigo".to_string(),
            postal_code: "36202".to_string(),
            country: "ES".to_string(),
            status: OrderStatus::Pending,
            shopify_synced: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_from_record() {
        let draft = OrderDraft::from_record(&record("+34 612 345 678")).unwrap();
        assert_eq!(draft.product.id, "compra-3");
        assert_eq!(draft.shipping.country, CountryCode::ES);
        assert_eq!(draft.phone(), "+34612345678");

        let request = draft.to_request();
        assert!(request.order.send_receipt);
        assert_eq!(request.order.email.as_deref(), Some("lucia@example.es"));
    }

    #[test]
    fn test_from_record_invalid_phone() {
        let err = OrderDraft::from_record(&record("12345")).unwrap_err();
        assert_eq!(err, DraftError::InvalidPhone("12345".to_string()));
    }

    #[test]
    fn test_from_record_unknown_product() {
        let mut record = record("612345678");
        record.product_id = "compra-9".to_string();
        assert!(matches!(
            OrderDraft::from_record(&record),
            Err(DraftError::UnknownProduct(_))
        ));
    }
}
