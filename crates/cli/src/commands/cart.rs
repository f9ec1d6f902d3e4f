use std::path::PathBuf;

use storefront_core::domain::product::ProductId;
use storefront_core::errors::DomainError;
use storefront_core::shipping::{CartLine, CartShippingQuote, CheckoutShippingRequest};

use crate::commands::quote::shipping_failure;
use crate::commands::{
    load_config, load_fixture, load_resolver, CommandResult, EXIT_INVALID_REQUEST,
};

#[derive(Debug, Clone)]
pub struct CartArgs {
    pub catalog: PathBuf,
    pub to: String,
    pub method: String,
    pub items: Vec<String>,
}

pub fn run(args: &CartArgs) -> CommandResult {
    let config = match load_config("cart") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let resolver = match load_resolver("cart", &config) {
        Ok(resolver) => resolver,
        Err(result) => return result,
    };
    let fixture = match load_fixture("cart", &args.catalog) {
        Ok(fixture) => fixture,
        Err(result) => return result,
    };

    let request = match CheckoutShippingRequest::parse(&args.to, &args.method) {
        Ok(request) => request,
        Err(error) => {
            return CommandResult::rejected(
                "cart",
                "invalid_request",
                DomainError::from(error),
                EXIT_INVALID_REQUEST,
            );
        }
    };

    let mut lines = Vec::with_capacity(args.items.len());
    for item in &args.items {
        let (product_id, quantity) = match parse_item(item) {
            Ok(parsed) => parsed,
            Err(message) => return invalid_request(message),
        };
        match fixture.product(product_id) {
            Some(product) => lines.push(CartLine { product, quantity }),
            None => return invalid_request(format!("product {product_id} is not in the catalog")),
        }
    }

    match resolver.quote_cart(&request, &lines) {
        Ok(quote) => CommandResult::success("cart", render_quote(&quote)),
        Err(error) => shipping_failure("cart", &error),
    }
}

fn invalid_request(message: String) -> CommandResult {
    CommandResult::failure("cart", "invalid_request", message, EXIT_INVALID_REQUEST)
}

/// `ID` or `ID:QUANTITY`.
fn parse_item(raw: &str) -> Result<(ProductId, u32), String> {
    let (id, quantity) = match raw.split_once(':') {
        Some((id, quantity)) => (id, quantity),
        None => (raw, "1"),
    };

    let id = id.trim().parse::<u64>().map_err(|_| format!("invalid product id in `{raw}`"))?;
    let quantity =
        quantity.trim().parse::<u32>().map_err(|_| format!("invalid quantity in `{raw}`"))?;
    if quantity == 0 {
        return Err(format!("quantity must be at least 1 in `{raw}`"));
    }

    Ok((ProductId(id), quantity))
}

fn render_quote(quote: &CartShippingQuote) -> String {
    let mut lines =
        vec![format!("shipping to {} by {}: {}", quote.destination_city, quote.method, quote.total)];

    for group in &quote.groups {
        let mut line = format!(
            "- from {}: {} kg, {}",
            group.warehouse_city, group.billable_weight_kg, group.cost
        );
        if !group.skipped_products.is_empty() {
            let skipped: Vec<String> =
                group.skipped_products.iter().map(ToString::to_string).collect();
            line.push_str(&format!(" (no weight for {})", skipped.join(", ")));
        }
        lines.push(line);
    }

    lines.join("\n")
}
