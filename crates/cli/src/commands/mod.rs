pub mod cart;
pub mod config;
pub mod doctor;
pub mod popular;
pub mod quote;
pub mod recommend;

use std::path::Path;

use serde::Serialize;
use storefront_core::config::{AppConfig, LoadOptions};
use storefront_core::errors::ApplicationError;
use storefront_core::domain::product::Product;
use storefront_core::shipping::ShippingResolver;
use storefront_store::CatalogFixture;
use tokio::runtime::Runtime;
use tracing::warn;
use uuid::Uuid;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_INPUT_DATA: u8 = 3;
pub const EXIT_INVALID_REQUEST: u8 = 4;
pub const EXIT_UNQUOTABLE: u8 = 5;
pub const EXIT_COMPUTATION: u8 = 6;
pub const EXIT_RUNTIME: u8 = 7;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            hint: None,
            correlation_id: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            hint: None,
            correlation_id: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Failure mapped through the interface error layer, tagged with a fresh
    /// correlation id that is also logged.
    pub fn rejected(
        command: &str,
        error_class: &str,
        error: impl Into<ApplicationError>,
        exit_code: u8,
    ) -> Self {
        let interface = error.into().into_interface(Uuid::new_v4().to_string());
        warn!(
            event_name = "cli.command.failed",
            command,
            error_class,
            correlation_id = interface.correlation_id(),
            error = %interface,
            "command failed"
        );

        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: interface.message().to_string(),
            hint: Some(interface.user_message().to_string()),
            correlation_id: Some(interface.correlation_id().to_string()),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::rejected(command, "config_validation", error, EXIT_CONFIG)
    })
}

pub(crate) fn load_resolver(command: &str, config: &AppConfig) -> Result<ShippingResolver, CommandResult> {
    ShippingResolver::from_config(&config.shipping).map_err(|error| {
        CommandResult::rejected(command, "tariff_book", error, EXIT_INPUT_DATA)
    })
}

pub(crate) fn load_fixture(command: &str, path: &Path) -> Result<CatalogFixture, CommandResult> {
    CatalogFixture::load(path).map_err(|error| {
        CommandResult::failure(command, "catalog_fixture", error.to_string(), EXIT_INPUT_DATA)
    })
}

pub(crate) fn runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            EXIT_RUNTIME,
        )
    })
}

pub(crate) fn render_products(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .enumerate()
        .map(|(rank, product)| {
            format!("  {}. #{} {} ({})", rank + 1, product.id, product.name, product.price)
        })
        .collect()
}
