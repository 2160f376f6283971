use anyhow::{bail, Context};
use invoscan_core::AppConfig;
use invoscan_db::{Database, DatabaseError};
use invoscan_iban::{IbanRules, IbanValidator};
use std::process::ExitCode;
use std::sync::Arc;

async fn open(config: &AppConfig) -> anyhow::Result<Database> {
    Database::open(&config.database)
        .await
        .context("failed to open blacklist database")
}

/// Validate `iban` with the configured rules and add it to the blacklist.
pub async fn run_add(config: &AppConfig, iban: &str, reason: &str) -> anyhow::Result<ExitCode> {
    let rules = IbanRules::from_config(&config.validation).context("invalid validation rules")?;
    let validator = IbanValidator::new(Arc::new(rules));

    let iban = match validator.check(iban) {
        Ok(iban) => iban,
        Err(rejection) => bail!("refusing to blacklist invalid IBAN {iban}: {rejection}"),
    };

    let db = open(config).await?;
    let result = db.blacklist_iban(&iban, reason).await;
    db.close().await;

    match result {
        Ok(entry) => {
            tracing::info!("Blacklisted {}", entry.iban);
            println!("{}", serde_json::to_string_pretty(&entry)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ DatabaseError::AlreadyBlacklisted(_)) => {
            eprintln!("{e}");
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn run_list(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let db = open(config).await?;
    let entries = db.list_blacklist().await;
    db.close().await;

    println!("{}", serde_json::to_string_pretty(&entries?)?);
    Ok(ExitCode::SUCCESS)
}

pub async fn run_remove(config: &AppConfig, iban: &str) -> anyhow::Result<ExitCode> {
    let db = open(config).await?;
    let result = db.remove_from_blacklist(iban).await;
    db.close().await;

    match result {
        Ok(()) => {
            println!("removed {iban}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ DatabaseError::NotFound(_)) => {
            eprintln!("{e}");
            Ok(ExitCode::from(4))
        }
        Err(e) => Err(e.into()),
    }
}
