//! Personalized product recommendations.
//!
//! A user's purchases from the trailing window and their recently viewed
//! products form a taste profile. Every recommendable product is scored by
//! cosine similarity between its TF-IDF + normalized price vector and the
//! profile centroid, and the best `top_n` are kept.

mod profile;
mod recommender;
mod scoring;
mod vectorizer;

use thiserror::Error;

pub use profile::{
    build_profile, candidate_pool, interaction_set, popular_products, product_document, Profile,
};
pub use recommender::{RankedProduct, Recommendation, Recommender};
pub use scoring::{cosine_similarity, score_candidates, PriceScaler, ScoredIndex};
pub use vectorizer::{tokenize, SparseRow, TfidfVectorizer};

/// Maximum recommendations kept per user.
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecommendationError {
    #[error("none of the interacted products are in the catalog")]
    EmptyProfile,
    #[error("no products are eligible for recommendation")]
    EmptyCandidatePool,
    #[error("candidate documents contain no usable terms")]
    EmptyVocabulary,
    #[error("{side} documents ({documents}) and prices ({prices}) differ in length")]
    LengthMismatch { side: &'static str, documents: usize, prices: usize },
    #[error("recommendation scoring failed: {0}")]
    Internal(String),
}
