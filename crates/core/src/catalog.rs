//! Static product catalog.
//!
//! The checkout sells a single device in three bundle sizes. Each bundle is
//! one commerce variant ordered with quantity 1; `units` is how many
//! monitors ship inside it.

use serde::Serialize;

use crate::types::{Price, ProductId};

/// One purchasable bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductOption {
    pub id: &'static str,
    pub title: &'static str,
    price_eur: i64,
    original_price_eur: Option<i64>,
    /// Monitors included in the bundle.
    pub units: u32,
    pub discount_label: &'static str,
    pub installments: Option<&'static str>,
    shipping_eur: i64,
    /// Commerce backend variant the bundle is ordered as.
    pub variant_id: i64,
}

impl ProductOption {
    /// Catalog identifier.
    #[must_use]
    pub fn product_id(&self) -> ProductId {
        ProductId::new(self.id)
    }

    /// Bundle price.
    #[must_use]
    pub fn price(&self) -> Price {
        Price::eur(self.price_eur)
    }

    /// Pre-discount price, if the bundle is discounted.
    #[must_use]
    pub fn original_price(&self) -> Option<Price> {
        self.original_price_eur.map(Price::eur)
    }

    /// Flat shipping cost; zero means free shipping.
    #[must_use]
    pub fn shipping_cost(&self) -> Price {
        Price::eur(self.shipping_eur)
    }

    /// Serializable snapshot for API responses.
    #[must_use]
    pub fn view(&self) -> ProductView {
        ProductView {
            id: self.id,
            title: self.title,
            price: self.price(),
            original_price: self.original_price(),
            units: self.units,
            discount_label: self.discount_label,
            installments: self.installments,
            shipping_cost: self.shipping_cost(),
        }
    }
}

/// JSON view of a [`ProductOption`].
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: &'static str,
    pub title: &'static str,
    pub price: Price,
    pub original_price: Option<Price>,
    pub units: u32,
    pub discount_label: &'static str,
    pub installments: Option<&'static str>,
    pub shipping_cost: Price,
}

/// The full catalog, in display order.
pub static CATALOG: [ProductOption; 3] = [
    ProductOption {
        id: "compra-1",
        title: "Compra 1",
        price_eur: 49,
        original_price_eur: None,
        units: 1,
        discount_label: "Oferta de lançamento",
        installments: None,
        shipping_eur: 3,
        variant_id: 49_587_321_110_001,
    },
    ProductOption {
        id: "compra-2",
        title: "Compra 2",
        price_eur: 89,
        original_price_eur: Some(98),
        units: 2,
        discount_label: "Poupa 9 €",
        installments: Some("ou 3x de 29,67 €"),
        shipping_eur: 0,
        variant_id: 49_587_321_110_002,
    },
    ProductOption {
        id: "compra-3",
        title: "Compra 3",
        price_eur: 119,
        original_price_eur: Some(147),
        units: 3,
        discount_label: "Poupa 28 €",
        installments: Some("ou 3x de 39,67 €"),
        shipping_eur: 0,
        variant_id: 49_587_321_110_003,
    },
];

/// Look up a catalog entry by ID.
#[must_use]
pub fn find_product(id: &ProductId) -> Option<&'static ProductOption> {
    CATALOG.iter().find(|product| product.id == id.as_str())
}
