//! JSON catalog snapshots used by the CLI and integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use storefront_core::domain::order::OrderLine;
use storefront_core::domain::product::{Product, ProductId};

use crate::repositories::{InMemoryCatalogRepository, InMemoryOrderRepository};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("could not read fixture `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse fixture: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("product id {0} appears more than once")]
    DuplicateProduct(ProductId),
    #[error("order line references unknown product {0}")]
    UnknownProduct(ProductId),
    #[error("order line for product {0} has zero quantity")]
    ZeroQuantity(ProductId),
}

/// `{"products": [...], "orders": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFixture {
    pub products: Vec<Product>,
    #[serde(default)]
    pub orders: Vec<OrderLine>,
}

impl CatalogFixture {
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| FixtureError::ReadFile { path: path.to_path_buf(), source })?;
        let fixture = Self::from_json_str(&raw)?;

        debug!(
            event_name = "store.fixture.loaded",
            path = %path.display(),
            products = fixture.products.len(),
            orders = fixture.orders.len(),
            "catalog fixture loaded"
        );
        Ok(fixture)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, FixtureError> {
        let fixture: Self = serde_json::from_str(raw)?;
        fixture.validate()?;
        Ok(fixture)
    }

    pub fn validate(&self) -> Result<(), FixtureError> {
        let mut seen = std::collections::HashSet::new();
        for product in &self.products {
            if !seen.insert(product.id) {
                return Err(FixtureError::DuplicateProduct(product.id));
            }
        }

        for line in &self.orders {
            if !seen.contains(&line.product_id) {
                return Err(FixtureError::UnknownProduct(line.product_id));
            }
            if line.quantity == 0 {
                return Err(FixtureError::ZeroQuantity(line.product_id));
            }
        }

        Ok(())
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn into_repositories(self) -> (InMemoryCatalogRepository, InMemoryOrderRepository) {
        (
            InMemoryCatalogRepository::with_products(self.products),
            InMemoryOrderRepository::with_lines(self.orders),
        )
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use storefront_core::domain::product::ProductId;

    use super::{CatalogFixture, FixtureError};

    const FIXTURE: &str = r#"{
        "products": [
            {"id": 1, "name": "Red dot sight", "price": "12000", "verified": true, "items_left": 4,
             "warehouse_city": "Москва",
             "shipping": {"width_cm": "12", "length_cm": "8", "height_cm": "8", "weight_kg": "0.4"}},
            {"id": 2, "name": "Bipod", "price": "4000.50"}
        ],
        "orders": [
            {"user_id": 9, "product_id": 1, "quantity": 2, "ordered_at": "2024-05-20T10:00:00Z"}
        ]
    }"#;

    #[test]
    fn fixture_parses_products_and_orders() {
        let fixture = CatalogFixture::from_json_str(FIXTURE).expect("fixture should parse");

        assert_eq!(fixture.products.len(), 2);
        assert_eq!(fixture.orders.len(), 1);
        let sight = fixture.product(ProductId(1)).expect("sight");
        assert_eq!(sight.shipping.weight_kg, Some(Decimal::new(4, 1)));
        assert!(sight.is_recommendable());
        assert_eq!(fixture.product(ProductId(2)).map(|p| p.price), Some(Decimal::new(400_050, 2)));
    }

    #[test]
    fn orders_must_reference_known_products() {
        let raw = FIXTURE.replace("\"product_id\": 1", "\"product_id\": 3");
        assert!(matches!(
            CatalogFixture::from_json_str(&raw),
            Err(FixtureError::UnknownProduct(ProductId(3)))
        ));
    }

    #[test]
    fn duplicate_product_ids_are_rejected() {
        let raw = FIXTURE.replace("{\"id\": 2", "{\"id\": 1");
        assert!(matches!(
            CatalogFixture::from_json_str(&raw),
            Err(FixtureError::DuplicateProduct(ProductId(1)))
        ));
    }
}
