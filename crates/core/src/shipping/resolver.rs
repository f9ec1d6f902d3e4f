use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::book::{normalize_city, TariffBook, TariffBookError, ZoneId, SAME_CITY_ZONE};
use super::package::{billable_weight, DEFAULT_VOLUMETRIC_DIVISOR};
use super::{DeliveryMethod, LaneError, ShippingError, ShippingRequestError};
use crate::config::ShippingConfig;
use crate::domain::product::{Product, ProductId};

/// Validated destination and method from the checkout form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutShippingRequest {
    pub destination_city: String,
    pub method: DeliveryMethod,
}

impl CheckoutShippingRequest {
    pub fn parse(destination_city: &str, method_label: &str) -> Result<Self, ShippingRequestError> {
        let destination_city = normalize_city(destination_city);
        if destination_city.is_empty() || method_label.trim().is_empty() {
            return Err(ShippingRequestError::MissingCityOrMethod);
        }

        Ok(Self { destination_city, method: method_label.parse()? })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CartLine<'a> {
    pub product: &'a Product,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WarehouseQuote {
    pub warehouse_city: String,
    pub billable_weight_kg: Decimal,
    pub cost: Decimal,
    /// Lines left out of the weight because their dimensions are unusable.
    pub skipped_products: Vec<ProductId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartShippingQuote {
    pub destination_city: String,
    pub method: DeliveryMethod,
    pub groups: Vec<WarehouseQuote>,
    pub total: Decimal,
}

#[derive(Clone, Debug)]
pub struct ShippingResolver {
    book: TariffBook,
    volumetric_divisor: Decimal,
}

impl Default for ShippingResolver {
    fn default() -> Self {
        Self::new(TariffBook::builtin())
    }
}

impl ShippingResolver {
    pub fn new(book: TariffBook) -> Self {
        Self { book, volumetric_divisor: DEFAULT_VOLUMETRIC_DIVISOR }
    }

    pub fn with_volumetric_divisor(mut self, divisor: Decimal) -> Self {
        self.volumetric_divisor = divisor;
        self
    }

    pub fn from_config(config: &ShippingConfig) -> Result<Self, TariffBookError> {
        let book = match &config.tariff_book {
            Some(path) => TariffBook::load(path)?,
            None => TariffBook::builtin(),
        };
        Ok(Self::new(book).with_volumetric_divisor(config.volumetric_divisor))
    }

    pub fn book(&self) -> &TariffBook {
        &self.book
    }

    pub fn resolve_zone(&self, city: &str) -> Option<ZoneId> {
        self.book.resolve_zone(city)
    }

    /// Prices one lane, explaining why when it cannot.
    pub fn quote_lane(
        &self,
        origin_city: &str,
        destination_city: &str,
        billable_kg: Decimal,
        method: DeliveryMethod,
    ) -> Result<Decimal, ShippingError> {
        let origin_city = normalize_city(origin_city);
        let destination_city = normalize_city(destination_city);

        let origin_zone = self
            .book
            .resolve_zone(&origin_city)
            .ok_or_else(|| LaneError::UnknownCity(origin_city.clone()))?;
        let destination_zone = self
            .book
            .resolve_zone(&destination_city)
            .ok_or_else(|| LaneError::UnknownCity(destination_city.clone()))?;

        let (origin_zone, destination_zone) = if origin_city == destination_city {
            (SAME_CITY_ZONE, SAME_CITY_ZONE)
        } else {
            (origin_zone, destination_zone)
        };

        let class = self.book.resolve_tariff_class(
            origin_zone,
            destination_zone,
            &origin_city,
            &destination_city,
        )?;
        self.book.calculate_shipping_cost(class, method, billable_kg)
    }

    /// `None` means the lane cannot be quoted; the reason is logged.
    pub fn estimate_shipping(
        &self,
        origin_city: &str,
        destination_city: &str,
        billable_kg: Decimal,
        method: DeliveryMethod,
    ) -> Option<Decimal> {
        match self.quote_lane(origin_city, destination_city, billable_kg, method) {
            Ok(cost) => Some(cost),
            Err(error) => {
                log_unquotable(origin_city, destination_city, method, &error);
                None
            }
        }
    }

    /// Quotes every warehouse group of the cart against one destination.
    /// Fails as a whole when any group cannot be quoted.
    pub fn quote_cart(
        &self,
        request: &CheckoutShippingRequest,
        lines: &[CartLine<'_>],
    ) -> Result<CartShippingQuote, ShippingError> {
        let mut groups: Vec<(String, Vec<&CartLine<'_>>)> = Vec::new();
        for line in lines {
            let warehouse = normalize_city(&line.product.warehouse_city);
            match groups.iter_mut().find(|(city, _)| *city == warehouse) {
                Some((_, members)) => members.push(line),
                None => groups.push((warehouse, vec![line])),
            }
        }

        let mut quotes = Vec::with_capacity(groups.len());
        let mut total = Decimal::ZERO;
        for (warehouse_city, members) in groups {
            let (billable_weight_kg, skipped_products) = self.group_weight(&warehouse_city, &members);
            let cost = self.quote_lane(
                &warehouse_city,
                &request.destination_city,
                billable_weight_kg,
                request.method,
            )?;
            total += cost;
            quotes.push(WarehouseQuote { warehouse_city, billable_weight_kg, cost, skipped_products });
        }

        Ok(CartShippingQuote {
            destination_city: request.destination_city.clone(),
            method: request.method,
            groups: quotes,
            total,
        })
    }

    pub fn estimate_cart(
        &self,
        request: &CheckoutShippingRequest,
        lines: &[CartLine<'_>],
    ) -> Option<CartShippingQuote> {
        match self.quote_cart(request, lines) {
            Ok(quote) => Some(quote),
            Err(error) => {
                log_unquotable("cart", &request.destination_city, request.method, &error);
                None
            }
        }
    }

    fn group_weight(&self, warehouse_city: &str, members: &[&CartLine<'_>]) -> (Decimal, Vec<ProductId>) {
        let mut weight = Decimal::ZERO;
        let mut skipped = Vec::new();

        for line in members {
            let line_weight = billable_weight(line.product, self.volumetric_divisor)
                .ok()
                .and_then(|unit| unit.checked_mul(Decimal::from(line.quantity)))
                .and_then(|line_weight| weight.checked_add(line_weight));

            match line_weight {
                Some(sum) => weight = sum,
                None => {
                    warn!(
                        event_name = "shipping.cart.line_skipped",
                        warehouse_city,
                        product_id = line.product.id.0,
                        "cart line left out of billable weight"
                    );
                    skipped.push(line.product.id);
                }
            }
        }

        (weight, skipped)
    }
}

fn log_unquotable(origin: &str, destination: &str, method: DeliveryMethod, error: &ShippingError) {
    if error.is_unquotable() {
        debug!(
            event_name = "shipping.lane.unquotable",
            origin,
            destination,
            method = method.as_str(),
            reason = %error,
            "shipping lane cannot be quoted"
        );
    } else {
        warn!(
            event_name = "shipping.lane.fault",
            origin,
            destination,
            method = method.as_str(),
            reason = %error,
            "shipping quote failed unexpectedly"
        );
    }
}
