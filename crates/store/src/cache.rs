//! Expiring product-list cache shared by request handlers and background workers.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

use storefront_core::domain::order::UserId;
use storefront_core::domain::product::Product;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Per-user ranked recommendations.
    pub fn personal(user_id: UserId) -> Self {
        Self(format!("recommended_products:user:{user_id}"))
    }

    /// Non-personalized fallback list.
    pub fn popular() -> Self {
        Self("recommended_products:popular".to_string())
    }

    /// Marker held while a computation for `user_id` is in flight.
    pub fn pending(user_id: UserId) -> Self {
        Self(format!("recommended_products:pending:{user_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("ttl for `{0}` must be greater than zero")]
    ZeroTtl(CacheKey),
}

/// Atomic per-key operations; no coordination across keys.
#[async_trait]
pub trait ProductListCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<Product>>, CacheError>;

    async fn set_with_ttl(
        &self,
        key: &CacheKey,
        products: Vec<Product>,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Takes `key` for `ttl` unless a live entry already holds it.
    async fn claim(&self, key: &CacheKey, ttl: Duration) -> Result<bool, CacheError>;

    async fn release(&self, key: &CacheKey) -> Result<(), CacheError>;
}

#[derive(Clone, Debug)]
enum Slot {
    Products(Vec<Product>),
    Claimed,
}

#[derive(Clone, Debug)]
struct Entry {
    slot: Slot,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Default)]
pub struct InMemoryProductCache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl InMemoryProductCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live entries, expired ones are dropped as a side effect.
    pub async fn len(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        entries.retain(|_, entry| entry.is_live(now));
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn expiry(key: &CacheKey, ttl: Duration) -> Result<Instant, CacheError> {
    if ttl.is_zero() {
        return Err(CacheError::ZeroTtl(key.clone()));
    }
    Ok(Instant::now() + ttl)
}

#[async_trait]
impl ProductListCache for InMemoryProductCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<Product>>, CacheError> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
            return Ok(None);
        }

        match entries.get(key).map(|entry| &entry.slot) {
            Some(Slot::Products(products)) => Ok(Some(products.clone())),
            Some(Slot::Claimed) | None => Ok(None),
        }
    }

    async fn set_with_ttl(
        &self,
        key: &CacheKey,
        products: Vec<Product>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let expires_at = expiry(key, ttl)?;
        let mut entries = self.entries.lock().await;
        entries.insert(key.clone(), Entry { slot: Slot::Products(products), expires_at });
        Ok(())
    }

    async fn claim(&self, key: &CacheKey, ttl: Duration) -> Result<bool, CacheError> {
        let expires_at = expiry(key, ttl)?;
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if entries.get(key).is_some_and(|entry| entry.is_live(now)) {
            return Ok(false);
        }
        entries.insert(key.clone(), Entry { slot: Slot::Claimed, expires_at });
        Ok(true)
    }

    async fn release(&self, key: &CacheKey) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }
}
