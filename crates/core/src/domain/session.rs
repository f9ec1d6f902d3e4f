use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

pub const RECENTLY_VIEWED_LIMIT: usize = 10;

/// Session-scoped list of viewed products, most recent first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ProductId>", into = "Vec<ProductId>")]
pub struct RecentlyViewed {
    ids: Vec<ProductId>,
}

impl RecentlyViewed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves `product_id` to the front, dropping the oldest entry past the limit.
    pub fn record(&mut self, product_id: ProductId) {
        self.ids.retain(|id| *id != product_id);
        self.ids.insert(0, product_id);
        self.ids.truncate(RECENTLY_VIEWED_LIMIT);
    }

    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_set(&self) -> BTreeSet<ProductId> {
        self.ids.iter().copied().collect()
    }
}

impl From<Vec<ProductId>> for RecentlyViewed {
    fn from(ids: Vec<ProductId>) -> Self {
        let mut seen = BTreeSet::new();
        let mut ids: Vec<ProductId> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        ids.truncate(RECENTLY_VIEWED_LIMIT);
        Self { ids }
    }
}

impl From<RecentlyViewed> for Vec<ProductId> {
    fn from(viewed: RecentlyViewed) -> Self {
        viewed.ids
    }
}

impl FromIterator<ProductId> for RecentlyViewed {
    fn from_iter<T: IntoIterator<Item = ProductId>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
