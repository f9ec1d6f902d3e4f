//! Shipping tariff resolution.
//!
//! A lane is quoted in three steps: each city resolves to a zone, the zone
//! pair selects a tariff class from the matrix, and the class plus delivery
//! method selects a `(base, per_kg)` rate applied to the billable weight.

mod book;
mod builtin;
mod package;
mod resolver;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use book::{
    normalize_city, MatrixEntry, TariffBook, TariffBookError, TariffClassId, TariffRate, ZoneId,
    SAME_CITY_ZONE,
};
pub use package::{billable_weight, volumetric_weight, PackageError, DEFAULT_VOLUMETRIC_DIVISOR};
pub use resolver::{
    CartLine, CartShippingQuote, CheckoutShippingRequest, ShippingResolver, WarehouseQuote,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Courier,
    Pickup,
}

impl DeliveryMethod {
    pub const ALL: [DeliveryMethod; 2] = [DeliveryMethod::Courier, DeliveryMethod::Pickup];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Courier => "courier",
            Self::Pickup => "pickup",
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMethod {
    type Err = ShippingRequestError;

    /// Accepts canonical names, order-form codes and checkout labels.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "courier" | "by_courier" | "курьером" => Ok(Self::Courier),
            "pickup" | "pick-up_point" | "пункт выдачи" => Ok(Self::Pickup),
            "" => Err(ShippingRequestError::MissingCityOrMethod),
            other => Err(ShippingRequestError::UnknownDeliveryMethod(other.to_string())),
        }
    }
}

/// Expected "cannot quote this lane" outcomes.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LaneError {
    #[error("city `{0}` is not served by any zone")]
    UnknownCity(String),
    #[error("no tariff is defined between zone {origin} and zone {destination}")]
    NoZonePair { origin: ZoneId, destination: ZoneId },
    #[error("tariff class {class} has no {method} rate")]
    NoTariff { class: TariffClassId, method: DeliveryMethod },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ShippingError {
    #[error(transparent)]
    Lane(#[from] LaneError),
    #[error("shipping cost overflowed for tariff class {class} at {billable_kg} kg")]
    Arithmetic { class: TariffClassId, billable_kg: rust_decimal::Decimal },
}

impl ShippingError {
    /// True for lane gaps the customer can fix by changing input.
    pub fn is_unquotable(&self) -> bool {
        matches!(self, Self::Lane(_))
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ShippingRequestError {
    #[error("provide city and method")]
    MissingCityOrMethod,
    #[error("unknown delivery method `{0}`")]
    UnknownDeliveryMethod(String),
}

#[cfg(test)]
mod tests {
    use super::{DeliveryMethod, LaneError, ShippingError, ShippingRequestError};
    use crate::shipping::TariffClassId;

    #[test]
    fn delivery_method_accepts_every_storefront_label() {
        for label in ["courier", "by_courier", "Курьером", "  КУРЬЕРОМ "] {
            assert_eq!(label.parse::<DeliveryMethod>(), Ok(DeliveryMethod::Courier), "{label}");
        }
        for label in ["pickup", "pick-up_point", "Пункт выдачи", "Пункт выдачи "] {
            assert_eq!(label.parse::<DeliveryMethod>(), Ok(DeliveryMethod::Pickup), "{label}");
        }
    }

    #[test]
    fn delivery_method_rejects_blank_and_unknown_labels() {
        assert_eq!("  ".parse::<DeliveryMethod>(), Err(ShippingRequestError::MissingCityOrMethod));
        assert_eq!(
            "drone".parse::<DeliveryMethod>(),
            Err(ShippingRequestError::UnknownDeliveryMethod("drone".to_string()))
        );
    }

    #[test]
    fn lane_errors_are_unquotable_but_arithmetic_is_not() {
        let lane = ShippingError::from(LaneError::UnknownCity("тмутаракань".to_string()));
        assert!(lane.is_unquotable());

        let overflow = ShippingError::Arithmetic {
            class: TariffClassId(1),
            billable_kg: rust_decimal::Decimal::MAX,
        };
        assert!(!overflow.is_unquotable());
    }
}
