use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use storefront_core::config::RecommendationsConfig;
use storefront_core::domain::order::UserId;
use storefront_core::domain::product::Product;
use storefront_core::domain::session::RecentlyViewed;
use storefront_core::recommendations::{
    popular_products, Recommendation, RecommendationError, Recommender,
};
use storefront_store::{CacheKey, CatalogRepository, OrderRepository, ProductListCache};

use crate::clock::{Clock, SystemClock};
use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    User(UserId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComputeOutcome {
    /// No purchases or views; the personal slot was left untouched.
    Skipped,
    Cached { products: usize },
}

/// Cache-first recommendation serving with background recomputation.
///
/// Request handlers call [`RecommendationService::recommendations_for`], which
/// never fails: a cached personal list is served when present, otherwise the
/// popular list is served and a background run is started for the next request.
#[derive(Clone)]
pub struct RecommendationService {
    catalog: Arc<dyn CatalogRepository>,
    orders: Arc<dyn OrderRepository>,
    cache: Arc<dyn ProductListCache>,
    recommender: Recommender,
    settings: RecommendationsConfig,
    permits: Arc<Semaphore>,
    clock: Arc<dyn Clock>,
}

impl RecommendationService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        orders: Arc<dyn OrderRepository>,
        cache: Arc<dyn ProductListCache>,
        settings: RecommendationsConfig,
    ) -> Self {
        Self {
            catalog,
            orders,
            cache,
            recommender: Recommender::from_config(&settings),
            permits: Arc::new(Semaphore::new(settings.worker_concurrency.max(1))),
            settings,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn recommendations_for(&self, viewer: Viewer, viewed: &RecentlyViewed) -> Vec<Product> {
        if let Viewer::User(user_id) = viewer {
            match self.cache.get(&CacheKey::personal(user_id)).await {
                Ok(Some(products)) if !products.is_empty() => return products,
                Ok(_) => {
                    self.trigger(user_id, viewed.clone()).await;
                }
                Err(error) => {
                    warn!(
                        event_name = "recommendations.cache.read_failed",
                        user_id = user_id.0,
                        error = %error,
                        "personal recommendations unavailable, serving popular list"
                    );
                }
            }
        }

        self.popular().await
    }

    /// Popular list from cache, recomputed from the catalog on a miss.
    pub async fn popular(&self) -> Vec<Product> {
        let key = CacheKey::popular();
        match self.cache.get(&key).await {
            Ok(Some(products)) => return products,
            Ok(None) => {}
            Err(error) => {
                warn!(
                    event_name = "recommendations.popular.cache_read_failed",
                    error = %error,
                    "popular list cache read failed"
                );
            }
        }

        match self.compute_popular().await {
            Ok(products) => products,
            Err(error) => {
                error!(
                    event_name = "recommendations.popular.failed",
                    error = %error,
                    "popular list could not be computed"
                );
                Vec::new()
            }
        }
    }

    async fn compute_popular(&self) -> Result<Vec<Product>, ServiceError> {
        let catalog = self.catalog.snapshot().await?;
        let orders = self.orders.all_lines().await?;
        let products = popular_products(
            &catalog,
            &orders,
            self.settings.popular_limit,
            self.settings.popular_min_rating,
        );

        self.cache
            .set_with_ttl(&CacheKey::popular(), products.clone(), self.settings.popular_ttl())
            .await?;
        Ok(products)
    }

    /// Starts a background run for `user_id` unless one is already pending.
    /// Returns the task handle when a run was started.
    pub async fn trigger(&self, user_id: UserId, viewed: RecentlyViewed) -> Option<JoinHandle<()>> {
        let pending = CacheKey::pending(user_id);
        match self.cache.claim(&pending, self.settings.claim_ttl()).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(
                    event_name = "recommendations.trigger.suppressed",
                    user_id = user_id.0,
                    "computation already pending"
                );
                return None;
            }
            Err(error) => {
                warn!(
                    event_name = "recommendations.trigger.claim_failed",
                    user_id = user_id.0,
                    error = %error,
                    "could not claim pending slot"
                );
                return None;
            }
        }

        let service = self.clone();
        let correlation_id = Uuid::new_v4().to_string();
        Some(tokio::spawn(async move {
            match Arc::clone(&service.permits).acquire_owned().await {
                Ok(_permit) => service.run_in_background(user_id, &viewed, &correlation_id).await,
                Err(error) => warn!(
                    event_name = "recommendations.worker.closed",
                    correlation_id = %correlation_id,
                    user_id = user_id.0,
                    error = %error,
                    "worker pool closed before computation started"
                ),
            }

            if let Err(error) = service.cache.release(&pending).await {
                warn!(
                    event_name = "recommendations.trigger.release_failed",
                    correlation_id = %correlation_id,
                    user_id = user_id.0,
                    error = %error,
                    "pending slot left to expire"
                );
            }
        }))
    }

    async fn run_in_background(&self, user_id: UserId, viewed: &RecentlyViewed, correlation_id: &str) {
        match self.compute_for_user(user_id, viewed).await {
            Ok(outcome) => info!(
                event_name = "recommendations.compute.completed",
                correlation_id,
                user_id = user_id.0,
                outcome = ?outcome,
                "recommendation run finished"
            ),
            Err(ServiceError::Recommendation(error)) => warn!(
                event_name = "recommendations.compute.failed",
                correlation_id,
                user_id = user_id.0,
                error = %error,
                "recommendation run abandoned"
            ),
            Err(error) => error!(
                event_name = "recommendations.compute.failed",
                correlation_id,
                user_id = user_id.0,
                error = %error,
                "recommendation run abandoned"
            ),
        }
    }

    /// Scores the catalog for `user_id` and caches the top products.
    /// Scoring runs on the blocking pool.
    pub async fn compute_for_user(
        &self,
        user_id: UserId,
        viewed: &RecentlyViewed,
    ) -> Result<ComputeOutcome, ServiceError> {
        let now = self.clock.now();
        let catalog = self.catalog.snapshot().await?;
        let orders =
            self.orders.lines_for_user_since(user_id, now - self.settings.history_window()).await?;

        let recommender = self.recommender.clone();
        let viewed = viewed.clone();
        let recommendation = tokio::task::spawn_blocking(move || {
            recommender.recommend(&catalog, &orders, user_id, &viewed, now)
        })
        .await
        .map_err(|error| {
            RecommendationError::Internal(format!("scoring task did not complete: {error}"))
        })??;

        match recommendation {
            Recommendation::Skipped => Ok(ComputeOutcome::Skipped),
            ranked @ Recommendation::Ranked(_) => {
                let products = ranked.products();
                let count = products.len();
                self.cache
                    .set_with_ttl(&CacheKey::personal(user_id), products, self.settings.personal_ttl())
                    .await?;
                Ok(ComputeOutcome::Cached { products: count })
            }
        }
    }
}
