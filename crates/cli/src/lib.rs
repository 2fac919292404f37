pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use pricewise_core::config::{AppConfig, LoadOptions, LogFormat};

use crate::commands::best_price::BestPriceArgs;

#[derive(Debug, Parser)]
#[command(
    name = "pricewise",
    about = "Pricewise supplier-price catalog CLI",
    long_about = "Manage the supplier-price catalog database and resolve the best supplier offer for a product.",
    after_help = "Examples:\n  pricewise migrate\n  pricewise seed\n  pricewise best-price --sku ABC123 --qty 120 --currency EUR --date 2025-06-15\n  pricewise doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a pricewise.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog (idempotent)")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, rate table, DB connectivity and catalog schema")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Resolve the best eligible supplier offer for a product")]
    BestPrice {
        #[arg(long, help = "Product SKU")]
        sku: String,
        #[arg(long = "qty", allow_negative_numbers = true, help = "Requested quantity")]
        quantity: i64,
        #[arg(long, help = "Requested currency (ISO 4217 code)")]
        currency: String,
        #[arg(long, help = "Requested date as YYYY-MM-DD (defaults to today, UTC)")]
        date: Option<NaiveDate>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        ..LoadOptions::default()
    };

    if let Ok(config) = AppConfig::load(options.clone()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(&options),
        Command::Seed => commands::seed::run(&options),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(&options, json) }
        }
        Command::BestPrice { sku, quantity, currency, date } => {
            commands::best_price::run(&options, BestPriceArgs { sku, quantity, currency, date })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout stays a single JSON document per command.
pub fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let initialized = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(error) = initialized {
        eprintln!("logging already initialized: {error}");
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn best_price_arguments_parse() {
        let cli = Cli::try_parse_from([
            "pricewise",
            "best-price",
            "--sku",
            "ABC123",
            "--qty",
            "120",
            "--currency",
            "eur",
            "--date",
            "2025-06-15",
        ])
        .expect("parse");

        match cli.command {
            Command::BestPrice { sku, quantity, currency, date } => {
                assert_eq!(sku, "ABC123");
                assert_eq!(quantity, 120);
                assert_eq!(currency, "eur");
                assert_eq!(date.map(|d| d.to_string()), Some("2025-06-15".to_string()));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_config_flag_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["pricewise", "doctor", "--json", "--config", "x.toml"])
            .expect("parse");

        let config = cli.config.as_deref().map(|path| path.to_string_lossy().into_owned());
        assert_eq!(config.as_deref(), Some("x.toml"));
        assert!(matches!(cli.command, Command::Doctor { json: true }));
    }

    #[test]
    fn malformed_date_is_rejected_by_parser() {
        let parsed = Cli::try_parse_from([
            "pricewise",
            "best-price",
            "--sku",
            "ABC123",
            "--qty",
            "1",
            "--currency",
            "EUR",
            "--date",
            "15/06/2025",
        ]);

        assert!(parsed.is_err());
    }
}
