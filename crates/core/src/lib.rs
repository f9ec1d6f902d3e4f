pub mod config;
pub mod domain;
pub mod errors;
pub mod recommendations;
pub mod shipping;

pub use config::{AppConfig, ConfigError, LoadOptions};
pub use domain::order::{OrderLine, UserId};
pub use domain::product::{Product, ProductId};
pub use domain::session::RecentlyViewed;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recommendations::{Recommendation, RecommendationError, Recommender};
pub use shipping::{
    CartShippingQuote, DeliveryMethod, LaneError, ShippingError, ShippingResolver, TariffBook,
};
