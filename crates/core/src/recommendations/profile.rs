use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::domain::order::{OrderLine, UserId};
use crate::domain::product::{Product, ProductId};
use crate::domain::session::RecentlyViewed;

/// Parallel text documents and prices of the products a user interacted with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    pub documents: Vec<String>,
    pub prices: Vec<Decimal>,
}

impl Profile {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Name, category titles, brand and populated categorical attributes, space-joined.
pub fn product_document(product: &Product) -> String {
    let mut parts: Vec<&str> = Vec::new();
    parts.push(product.name.trim());
    parts.extend(product.categories.iter().map(|title| title.trim()));
    if let Some(brand) = product.brand.as_deref() {
        parts.push(brand.trim());
    }
    parts.extend(product.attributes.descriptive_values());

    parts.retain(|part| !part.is_empty());
    parts.join(" ")
}

pub fn build_profile<'a>(products: impl IntoIterator<Item = &'a Product>) -> Profile {
    let mut profile = Profile::default();
    for product in products {
        profile.documents.push(product_document(product));
        profile.prices.push(product.price);
    }
    profile
}

/// Products bought by `user` within `window` before `now`, plus recently viewed ones.
pub fn interaction_set(
    user: UserId,
    orders: &[OrderLine],
    viewed: &RecentlyViewed,
    now: DateTime<Utc>,
    window: Duration,
) -> BTreeSet<ProductId> {
    let since = now - window;
    let mut interactions: BTreeSet<ProductId> = orders
        .iter()
        .filter(|line| line.user_id == user && line.ordered_at >= since)
        .map(|line| line.product_id)
        .collect();
    interactions.extend(viewed.ids().iter().copied());
    interactions
}

/// Recommendable products outside `interactions`, or every recommendable
/// product when the exclusion leaves nothing.
pub fn candidate_pool<'a>(
    catalog: &'a [Product],
    interactions: &BTreeSet<ProductId>,
) -> Vec<&'a Product> {
    let eligible: Vec<&Product> =
        catalog.iter().filter(|product| product.is_recommendable()).collect();

    let excluded: Vec<&Product> = eligible
        .iter()
        .copied()
        .filter(|product| !interactions.contains(&product.id))
        .collect();

    if excluded.is_empty() {
        eligible
    } else {
        excluded
    }
}

/// Listed, well-rated products ordered by how many order lines reference them.
pub fn popular_products(
    catalog: &[Product],
    orders: &[OrderLine],
    limit: usize,
    min_rating: Decimal,
) -> Vec<Product> {
    let mut order_counts: HashMap<ProductId, usize> = HashMap::new();
    for line in orders {
        *order_counts.entry(line.product_id).or_default() += 1;
    }

    let mut popular: Vec<(&Product, usize)> = catalog
        .iter()
        .filter(|product| product.is_listed())
        .filter(|product| product.avg_rating.is_some_and(|rating| rating >= min_rating))
        .map(|product| (product, order_counts.get(&product.id).copied().unwrap_or(0)))
        .collect();
    popular.sort_by(|left, right| right.1.cmp(&left.1));

    popular.into_iter().take(limit).map(|(product, _)| product.clone()).collect()
}
