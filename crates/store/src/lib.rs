pub mod cache;
pub mod fixtures;
pub mod repositories;

pub use cache::{CacheError, CacheKey, InMemoryProductCache, ProductListCache};
pub use fixtures::{CatalogFixture, FixtureError};
pub use repositories::{
    CatalogRepository, InMemoryCatalogRepository, InMemoryOrderRepository, OrderRepository,
    RepositoryError,
};
