use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Nullable categorical characteristics a seller may fill in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductAttributes {
    pub product_type: Option<String>,
    pub compatibility: Option<String>,
    pub thread_type: Option<String>,
    pub mounting_type: Option<String>,
    pub principle_of_operation: Option<String>,
    pub weight_grams: Option<Decimal>,
    pub laser_sight: Option<bool>,
    pub diameter: Option<Decimal>,
}

impl ProductAttributes {
    /// Populated free-text attributes, in a fixed field order.
    pub fn descriptive_values(&self) -> impl Iterator<Item = &str> {
        [
            &self.product_type,
            &self.compatibility,
            &self.thread_type,
            &self.mounting_type,
            &self.principle_of_operation,
        ]
        .into_iter()
        .filter_map(|value| value.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    }
}

/// Physical parcel measurements. Any of them may be missing for legacy listings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingDimensions {
    pub width_cm: Option<Decimal>,
    pub length_cm: Option<Decimal>,
    pub height_cm: Option<Decimal>,
    pub weight_kg: Option<Decimal>,
}

impl ShippingDimensions {
    pub fn new(width_cm: Decimal, length_cm: Decimal, height_cm: Decimal, weight_kg: Decimal) -> Self {
        Self {
            width_cm: Some(width_cm),
            length_cm: Some(length_cm),
            height_cm: Some(height_cm),
            weight_kg: Some(weight_kg),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub attributes: ProductAttributes,
    pub price: Decimal,
    #[serde(default)]
    pub items_left: i64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default = "default_show")]
    pub show: bool,
    #[serde(default)]
    pub avg_rating: Option<Decimal>,
    #[serde(default)]
    pub warehouse_city: String,
    #[serde(default)]
    pub shipping: ShippingDimensions,
}

fn default_show() -> bool {
    true
}

impl Product {
    /// Creates an unverified, out-of-stock listing; use the `with_*` helpers to fill it in.
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            brand: None,
            categories: Vec::new(),
            attributes: ProductAttributes::default(),
            price,
            items_left: 0,
            verified: false,
            show: default_show(),
            avg_rating: None,
            warehouse_city: String::new(),
            shipping: ShippingDimensions::default(),
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attributes(mut self, attributes: ProductAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_stock(mut self, items_left: i64) -> Self {
        self.items_left = items_left;
        self
    }

    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.show = false;
        self
    }

    pub fn with_rating(mut self, avg_rating: Decimal) -> Self {
        self.avg_rating = Some(avg_rating);
        self
    }

    pub fn with_warehouse(mut self, city: impl Into<String>) -> Self {
        self.warehouse_city = city.into();
        self
    }

    pub fn with_shipping(mut self, shipping: ShippingDimensions) -> Self {
        self.shipping = shipping;
        self
    }

    /// Verified and visible on the storefront.
    pub fn is_listed(&self) -> bool {
        self.verified && self.show
    }

    /// Listed and in stock, so it may be offered as a recommendation.
    pub fn is_recommendable(&self) -> bool {
        self.is_listed() && self.items_left > 0
    }
}
