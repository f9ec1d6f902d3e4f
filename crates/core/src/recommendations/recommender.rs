use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use super::profile::{build_profile, candidate_pool, interaction_set};
use super::scoring::score_candidates;
use super::{RecommendationError, DEFAULT_TOP_N};
use crate::config::RecommendationsConfig;
use crate::domain::order::{OrderLine, UserId};
use crate::domain::product::Product;
use crate::domain::session::RecentlyViewed;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedProduct {
    pub product: Product,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "products", rename_all = "snake_case")]
pub enum Recommendation {
    /// The user has no purchases in the window and no views; nothing was scored.
    Skipped,
    Ranked(Vec<RankedProduct>),
}

impl Recommendation {
    pub fn products(&self) -> Vec<Product> {
        match self {
            Self::Skipped => Vec::new(),
            Self::Ranked(ranked) => ranked.iter().map(|entry| entry.product.clone()).collect(),
        }
    }
}

/// Content-based recommender over one catalog snapshot.
#[derive(Clone, Debug)]
pub struct Recommender {
    top_n: usize,
    history_window: Duration,
}

impl Default for Recommender {
    fn default() -> Self {
        Self { top_n: DEFAULT_TOP_N, history_window: Duration::days(90) }
    }
}

impl Recommender {
    pub fn new(top_n: usize, history_window: Duration) -> Self {
        Self { top_n, history_window }
    }

    pub fn from_config(config: &RecommendationsConfig) -> Self {
        Self::new(config.top_n, config.history_window())
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn recommend(
        &self,
        catalog: &[Product],
        orders: &[OrderLine],
        user: UserId,
        viewed: &RecentlyViewed,
        now: DateTime<Utc>,
    ) -> Result<Recommendation, RecommendationError> {
        let interactions = interaction_set(user, orders, viewed, now, self.history_window);
        if interactions.is_empty() {
            debug!(
                event_name = "recommendations.profile.empty",
                user_id = user.0,
                "no interactions, skipping scoring"
            );
            return Ok(Recommendation::Skipped);
        }

        let interacted: Vec<&Product> =
            catalog.iter().filter(|product| interactions.contains(&product.id)).collect();
        let candidates = candidate_pool(catalog, &interactions);

        let profile = build_profile(interacted.iter().copied());
        let pool = build_profile(candidates.iter().copied());
        let ranked = score_candidates(
            &profile.documents,
            &profile.prices,
            &pool.documents,
            &pool.prices,
            self.top_n,
        )?;

        debug!(
            event_name = "recommendations.scored",
            user_id = user.0,
            interactions = interactions.len(),
            profile_products = profile.len(),
            candidates = pool.len(),
            ranked = ranked.len(),
            "recommendations scored"
        );

        ranked
            .into_iter()
            .map(|scored| {
                candidates
                    .get(scored.index)
                    .map(|product| RankedProduct { product: (*product).clone(), score: scored.score })
                    .ok_or_else(|| {
                        RecommendationError::Internal(format!(
                            "scored index {} is outside the candidate pool",
                            scored.index
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Recommendation::Ranked)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{Recommendation, Recommender};
    use crate::domain::order::{OrderLine, UserId};
    use crate::domain::product::{Product, ProductId};
    use crate::domain::session::RecentlyViewed;
    use crate::recommendations::RecommendationError;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("valid timestamp")
    }

    fn listed(id: u64, name: &str, category: &str, price: i64) -> Product {
        Product::new(ProductId(id), name, Decimal::new(price, 0))
            .with_categories([category])
            .verified()
            .with_stock(3)
    }

    fn catalog() -> Vec<Product> {
        let mut products = vec![
            listed(1, "Red dot sight", "Optics", 12_000),
            listed(2, "Holographic sight", "Optics", 14_000),
            listed(3, "Weapon light", "Flashlights", 6_000),
            listed(4, "Bipod", "Supports", 4_000),
        ];
        for id in 5..20 {
            products.push(listed(id, &format!("Scope mount {id}"), "Optics", 2_000 + id as i64));
        }
        products
    }

    fn purchase(user: u64, product: u64, days_ago: i64) -> OrderLine {
        OrderLine {
            user_id: UserId(user),
            product_id: ProductId(product),
            quantity: 1,
            ordered_at: now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn empty_interaction_set_skips_scoring() {
        let outcome = Recommender::default()
            .recommend(&catalog(), &[purchase(2, 1, 1), purchase(1, 2, 200)], UserId(1), &RecentlyViewed::new(), now())
            .expect("skipping is not an error");

        assert_eq!(outcome, Recommendation::Skipped);
        assert!(outcome.products().is_empty());
    }

    #[test]
    fn ranked_list_is_bounded_sorted_and_excludes_interactions() {
        let viewed: RecentlyViewed = [ProductId(3)].into_iter().collect();
        let outcome = Recommender::default()
            .recommend(&catalog(), &[purchase(1, 1, 10)], UserId(1), &viewed, now())
            .expect("scoring should succeed");

        let Recommendation::Ranked(ranked) = outcome else {
            panic!("expected a ranked list");
        };
        assert!(ranked.len() <= 10);
        assert!(ranked.windows(2).all(|pair| pair[0].score >= pair[1].score));
        assert!(ranked.iter().all(|entry| ![ProductId(1), ProductId(3)].contains(&entry.product.id)));
        assert_eq!(ranked[0].product.id, ProductId(2));
    }

    #[test]
    fn self_exclusion_is_lifted_when_everything_was_interacted_with() {
        let catalog = vec![listed(1, "Red dot sight", "Optics", 100), listed(2, "Bipod", "Supports", 200)];
        let viewed: RecentlyViewed = [ProductId(1), ProductId(2)].into_iter().collect();

        let outcome = Recommender::default()
            .recommend(&catalog, &[], UserId(7), &viewed, now())
            .expect("scoring should succeed");

        let ids: Vec<ProductId> = outcome.products().iter().map(|product| product.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&ProductId(1)));
    }

    #[test]
    fn custom_top_n_limits_result() {
        let viewed: RecentlyViewed = [ProductId(1)].into_iter().collect();
        let outcome = Recommender::new(3, Duration::days(90))
            .recommend(&catalog(), &[], UserId(1), &viewed, now())
            .expect("scoring should succeed");

        assert_eq!(outcome.products().len(), 3);
    }

    #[test]
    fn interactions_missing_from_catalog_are_an_empty_profile() {
        let viewed: RecentlyViewed = [ProductId(404)].into_iter().collect();
        let error = Recommender::default()
            .recommend(&catalog(), &[], UserId(1), &viewed, now())
            .expect_err("nothing to build a profile from");

        assert_eq!(error, RecommendationError::EmptyProfile);
    }

    #[test]
    fn no_recommendable_products_is_an_empty_pool() {
        let catalog = vec![listed(1, "Red dot sight", "Optics", 100).with_stock(0)];
        let viewed: RecentlyViewed = [ProductId(1)].into_iter().collect();

        let error = Recommender::default()
            .recommend(&catalog, &[], UserId(1), &viewed, now())
            .expect_err("pool is empty");
        assert_eq!(error, RecommendationError::EmptyCandidatePool);
    }
}
