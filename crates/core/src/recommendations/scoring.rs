//! Content similarity between a user's taste profile and candidate products.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::vectorizer::{SparseRow, TfidfVectorizer};
use super::RecommendationError;

/// Position of a candidate in the pool passed to [`score_candidates`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScoredIndex {
    pub index: usize,
    pub score: f64,
}

/// Ranks candidates by cosine similarity to the mean of the user's
/// TF-IDF + normalized-price vectors, best first, keeping at most `top_n`.
///
/// The vocabulary is fitted on the candidate documents only. Equal scores keep
/// pool order.
pub fn score_candidates(
    user_documents: &[String],
    user_prices: &[Decimal],
    candidate_documents: &[String],
    candidate_prices: &[Decimal],
    top_n: usize,
) -> Result<Vec<ScoredIndex>, RecommendationError> {
    if user_documents.is_empty() {
        return Err(RecommendationError::EmptyProfile);
    }
    if candidate_documents.is_empty() {
        return Err(RecommendationError::EmptyCandidatePool);
    }
    ensure_parallel("user", user_documents.len(), user_prices.len())?;
    ensure_parallel("candidate", candidate_documents.len(), candidate_prices.len())?;

    let vectorizer = TfidfVectorizer::fit(candidate_documents)?;
    let scaler = PriceScaler::fit(candidate_prices.iter().chain(user_prices))?;

    let price_column = vectorizer.vocabulary_len();

    let candidate_rows =
        combine(vectorizer.transform(candidate_documents), candidate_prices, &scaler, price_column)?;
    let user_rows =
        combine(vectorizer.transform(user_documents), user_prices, &scaler, price_column)?;
    let profile = centroid(&user_rows);

    let mut scored: Vec<ScoredIndex> = candidate_rows
        .iter()
        .enumerate()
        .map(|(index, row)| ScoredIndex { index, score: cosine_similarity(row, &profile) })
        .collect();
    scored.sort_by(|left, right| right.score.total_cmp(&left.score));
    scored.truncate(top_n);

    Ok(scored)
}

/// Cosine over the non-zero entries of both rows; `0` when either is empty.
pub fn cosine_similarity(a: &SparseRow, b: &SparseRow) -> f64 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    a.dot(b) / (norm_a * norm_b)
}

/// Min-max scaling to `[0, 1]`; a zero-width range maps every price to `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceScaler {
    min: Decimal,
    range: Decimal,
}

impl PriceScaler {
    pub fn fit<'a>(prices: impl IntoIterator<Item = &'a Decimal>) -> Result<Self, RecommendationError> {
        let mut bounds: Option<(Decimal, Decimal)> = None;
        for price in prices {
            bounds = Some(match bounds {
                None => (*price, *price),
                Some((min, max)) => (min.min(*price), max.max(*price)),
            });
        }

        let (min, max) = bounds.ok_or(RecommendationError::EmptyCandidatePool)?;
        let range = max.checked_sub(min).ok_or_else(|| {
            RecommendationError::Internal(format!("price range {min}..{max} overflowed"))
        })?;
        Ok(Self { min, range })
    }

    pub fn scale(&self, price: Decimal) -> Result<f64, RecommendationError> {
        if self.range.is_zero() {
            return Ok(0.0);
        }

        (price - self.min)
            .checked_div(self.range)
            .and_then(|scaled| scaled.to_f64())
            .ok_or_else(|| RecommendationError::Internal(format!("price {price} cannot be scaled")))
    }
}

fn ensure_parallel(side: &'static str, documents: usize, prices: usize) -> Result<(), RecommendationError> {
    if documents == prices {
        Ok(())
    } else {
        Err(RecommendationError::LengthMismatch { side, documents, prices })
    }
}

fn combine(
    rows: Vec<SparseRow>,
    prices: &[Decimal],
    scaler: &PriceScaler,
    price_column: usize,
) -> Result<Vec<SparseRow>, RecommendationError> {
    rows.into_iter()
        .zip(prices)
        .map(|(mut row, price)| {
            row.push(price_column, scaler.scale(*price)?);
            Ok(row)
        })
        .collect()
}

fn centroid(rows: &[SparseRow]) -> SparseRow {
    let count = rows.len().max(1) as f64;
    SparseRow::from_entries(
        rows.iter()
            .flat_map(|row| row.entries().iter().copied())
            .map(|(column, weight)| (column, weight / count)),
    )
}
