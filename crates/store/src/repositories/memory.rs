use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use storefront_core::domain::order::{OrderLine, UserId};
use storefront_core::domain::product::{Product, ProductId};

use super::{CatalogRepository, OrderRepository, RepositoryError};

/// Catalog kept in insertion order; saving an existing id replaces it in place.
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryCatalogRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products: RwLock::new(products) }
    }
}

#[async_trait::async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|product| product.id == *id).cloned())
    }

    async fn snapshot(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.clone())
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        match products.iter_mut().find(|existing| existing.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    lines: RwLock<Vec<OrderLine>>,
}

impl InMemoryOrderRepository {
    pub fn with_lines(lines: Vec<OrderLine>) -> Self {
        Self { lines: RwLock::new(lines) }
    }
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn lines_for_user_since(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<OrderLine>, RepositoryError> {
        let lines = self.lines.read().await;
        Ok(lines
            .iter()
            .filter(|line| line.user_id == user_id && line.ordered_at >= since)
            .cloned()
            .collect())
    }

    async fn all_lines(&self) -> Result<Vec<OrderLine>, RepositoryError> {
        let lines = self.lines.read().await;
        Ok(lines.clone())
    }

    async fn append(&self, line: OrderLine) -> Result<(), RepositoryError> {
        let mut lines = self.lines.write().await;
        lines.push(line);
        Ok(())
    }
}
