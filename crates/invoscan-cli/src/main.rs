//! Invoscan command-line entry point.
//!
//! Results go to stdout as JSON, logs go to stderr.

mod cli;
mod commands {
    pub mod blacklist;
    pub mod config;
    pub mod scan;
}
mod response;

use anyhow::Context;
use clap::Parser;
use cli::{BlacklistCmd, Cli, Command, ConfigCmd};
use invoscan_core::AppConfig;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

/// Initialize tracing subscriber for logging
fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,invoscan=debug"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    AppConfig::load_with_env(path).context("failed to load configuration")
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config_path = cli.config.as_deref();

    match cli.cmd {
        Command::Scan {
            urls,
            max_concurrent,
        } => {
            let config = load_config(config_path)?;
            commands::scan::run_scan(&config, urls, max_concurrent).await
        }
        Command::Blacklist { cmd } => {
            let config = load_config(config_path)?;
            match cmd {
                BlacklistCmd::Add { iban, reason } => {
                    commands::blacklist::run_add(&config, &iban, &reason).await
                }
                BlacklistCmd::List => commands::blacklist::run_list(&config).await,
                BlacklistCmd::Remove { iban } => {
                    commands::blacklist::run_remove(&config, &iban).await
                }
            }
        }
        Command::Config { cmd } => match cmd {
            ConfigCmd::Init { force } => commands::config::run_init(config_path, force),
            ConfigCmd::Show => commands::config::run_show(&load_config(config_path)?),
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    info!("Starting Invoscan v{}", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
