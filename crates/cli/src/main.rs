use std::process::ExitCode;

use storefront_core::config::{AppConfig, LoadOptions};

fn main() -> anyhow::Result<ExitCode> {
    // Commands report config errors themselves; logging falls back to defaults.
    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    storefront_cli::init_logging(&config)?;

    Ok(storefront_cli::run())
}
