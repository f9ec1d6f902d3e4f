use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::product::{Product, ProductId};

/// Carrier dimensional-weight divisor, cm³ per kg.
pub const DEFAULT_VOLUMETRIC_DIVISOR: Decimal = Decimal::from_parts(5000, 0, 0, false, 0);

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PackageError {
    #[error("product {product_id} has no shipping {field}")]
    MissingDimension { product_id: ProductId, field: &'static str },
    #[error("product {product_id} has a negative shipping {field}")]
    NegativeDimension { product_id: ProductId, field: &'static str },
    #[error("volumetric divisor must be positive")]
    InvalidDivisor,
    #[error("volumetric weight overflowed for product {product_id}")]
    Overflow { product_id: ProductId },
}

/// `width × length × height / divisor`.
pub fn volumetric_weight(product: &Product, divisor: Decimal) -> Result<Decimal, PackageError> {
    if divisor <= Decimal::ZERO {
        return Err(PackageError::InvalidDivisor);
    }

    let dims = &product.shipping;
    let width = measurement(product.id, dims.width_cm, "width")?;
    let length = measurement(product.id, dims.length_cm, "length")?;
    let height = measurement(product.id, dims.height_cm, "height")?;

    width
        .checked_mul(length)
        .and_then(|area| area.checked_mul(height))
        .and_then(|volume| volume.checked_div(divisor))
        .ok_or(PackageError::Overflow { product_id: product.id })
}

/// The larger of volumetric and declared weight for one unit.
pub fn billable_weight(product: &Product, divisor: Decimal) -> Result<Decimal, PackageError> {
    let volumetric = volumetric_weight(product, divisor)?;
    let declared = measurement(product.id, product.shipping.weight_kg, "weight")?;
    Ok(volumetric.max(declared))
}

fn measurement(
    product_id: ProductId,
    value: Option<Decimal>,
    field: &'static str,
) -> Result<Decimal, PackageError> {
    let value = value.ok_or(PackageError::MissingDimension { product_id, field })?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PackageError::NegativeDimension { product_id, field });
    }
    Ok(value)
}
