use std::str::FromStr;

use rust_decimal::Decimal;
use storefront_core::errors::DomainError;
use storefront_core::shipping::{CheckoutShippingRequest, ShippingError};

use crate::commands::{
    load_config, load_resolver, CommandResult, EXIT_COMPUTATION, EXIT_INVALID_REQUEST,
    EXIT_UNQUOTABLE,
};

#[derive(Debug, Clone)]
pub struct QuoteArgs {
    pub from: String,
    pub to: String,
    pub weight: String,
    pub method: String,
}

pub fn run(args: &QuoteArgs) -> CommandResult {
    let config = match load_config("quote") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let resolver = match load_resolver("quote", &config) {
        Ok(resolver) => resolver,
        Err(result) => return result,
    };

    let request = match CheckoutShippingRequest::parse(&args.to, &args.method) {
        Ok(request) => request,
        Err(error) => {
            return CommandResult::rejected(
                "quote",
                "invalid_request",
                DomainError::from(error),
                EXIT_INVALID_REQUEST,
            );
        }
    };
    let billable_kg = match parse_weight(&args.weight) {
        Ok(weight) => weight,
        Err(message) => {
            return CommandResult::failure(
                "quote",
                "invalid_request",
                message,
                EXIT_INVALID_REQUEST,
            );
        }
    };

    match resolver.quote_lane(&args.from, &request.destination_city, billable_kg, request.method) {
        Ok(cost) => CommandResult::success(
            "quote",
            format!(
                "{} -> {} ({}, {} kg): {}",
                args.from.trim(),
                request.destination_city,
                request.method,
                billable_kg,
                cost
            ),
        ),
        Err(error) => shipping_failure("quote", &error),
    }
}

fn parse_weight(raw: &str) -> Result<Decimal, String> {
    let weight = Decimal::from_str(raw.trim())
        .map_err(|error| format!("invalid weight `{raw}`: {error}"))?;
    if weight.is_sign_negative() {
        return Err(format!("weight must not be negative, got {weight}"));
    }
    Ok(weight)
}

pub(crate) fn shipping_failure(command: &str, error: &ShippingError) -> CommandResult {
    if error.is_unquotable() {
        CommandResult::failure(command, "unquotable", error.to_string(), EXIT_UNQUOTABLE)
    } else {
        CommandResult::failure(command, "shipping_fault", error.to_string(), EXIT_COMPUTATION)
    }
}
