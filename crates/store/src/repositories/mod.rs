use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use storefront_core::domain::order::{OrderLine, UserId};
use storefront_core::domain::product::{Product, ProductId};

pub mod memory;

pub use memory::{InMemoryCatalogRepository, InMemoryOrderRepository};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read side of the product catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Every product in catalog order.
    async fn snapshot(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn save(&self, product: Product) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn lines_for_user_since(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<OrderLine>, RepositoryError>;

    async fn all_lines(&self) -> Result<Vec<OrderLine>, RepositoryError>;

    async fn append(&self, line: OrderLine) -> Result<(), RepositoryError>;
}
