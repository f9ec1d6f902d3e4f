//! Serving and background computation of product recommendations.

pub mod clock;
pub mod service;

use thiserror::Error;

use storefront_core::errors::ApplicationError;
use storefront_core::recommendations::RecommendationError;
use storefront_store::{CacheError, RepositoryError};

pub use clock::{Clock, FixedClock, SystemClock};
pub use service::{ComputeOutcome, RecommendationService, Viewer};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),
}

impl From<ServiceError> for ApplicationError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Repository(error) => Self::Persistence(error.to_string()),
            ServiceError::Cache(error) => Self::Cache(error.to_string()),
            ServiceError::Recommendation(error) => Self::Domain(
                storefront_core::errors::DomainError::InvariantViolation(error.to_string()),
            ),
        }
    }
}
