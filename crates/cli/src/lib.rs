pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use storefront_core::config::{AppConfig, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    about = "Storefront shipping and recommendations CLI",
    long_about = "Quote shipping lanes and carts, run recommendation passes over a catalog snapshot, and inspect configuration.",
    after_help = "Examples:\n  storefront quote --from Москва --to Казань --weight 1.0 --method pickup\n  storefront cart --catalog crates/store/fixtures/catalog.json --to Тверь --method courier 1:2 3\n  storefront recommend --catalog crates/store/fixtures/catalog.json --user 1 --viewed 5\n  storefront config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Quote one shipping lane for a billable weight")]
    Quote {
        #[arg(long, help = "Warehouse city")]
        from: String,
        #[arg(long, help = "Destination city")]
        to: String,
        #[arg(long, help = "Billable weight in kilograms")]
        weight: String,
        #[arg(long, help = "Delivery method label (courier, pickup, ...)")]
        method: String,
    },
    #[command(about = "Quote a cart grouped by warehouse against one destination")]
    Cart {
        #[arg(long, help = "Catalog fixture (JSON)")]
        catalog: PathBuf,
        #[arg(long, help = "Destination city")]
        to: String,
        #[arg(long, help = "Delivery method label (courier, pickup, ...)")]
        method: String,
        #[arg(required = true, help = "Cart lines as PRODUCT_ID[:QUANTITY]")]
        items: Vec<String>,
    },
    #[command(about = "Compute and cache recommendations for one user")]
    Recommend {
        #[arg(long, help = "Catalog fixture (JSON)")]
        catalog: PathBuf,
        #[arg(long, help = "User id")]
        user: u64,
        #[arg(long, value_delimiter = ',', help = "Recently viewed product ids, most recent first")]
        viewed: Vec<u64>,
        #[arg(long, help = "Evaluate as of this RFC 3339 instant instead of now")]
        at: Option<String>,
    },
    #[command(about = "Show the popular-products fallback list")]
    Popular {
        #[arg(long, help = "Catalog fixture (JSON)")]
        catalog: PathBuf,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate configuration, the tariff book and an optional catalog fixture")]
    Doctor {
        #[arg(long, help = "Catalog fixture to validate")]
        catalog: Option<PathBuf>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Quote { from, to, weight, method } => {
            commands::quote::run(&commands::quote::QuoteArgs { from, to, weight, method })
        }
        Command::Cart { catalog, to, method, items } => {
            commands::cart::run(&commands::cart::CartArgs { catalog, to, method, items })
        }
        Command::Recommend { catalog, user, viewed, at } => {
            commands::recommend::run(&commands::recommend::RecommendArgs {
                catalog,
                user,
                viewed,
                at,
            })
        }
        Command::Popular { catalog } => commands::popular::run(&catalog),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { catalog, json } => commands::doctor::run(catalog.as_deref(), json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Installs the global subscriber. Events go to stderr so stdout stays a
/// single JSON envelope.
pub fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow::anyhow!("failed to install tracing subscriber: {error}"))
}
