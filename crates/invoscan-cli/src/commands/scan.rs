use crate::response;
use anyhow::Context;
use invoscan_core::AppConfig;
use invoscan_db::Database;
use invoscan_scanner::ScanOrchestrator;
use std::process::ExitCode;
use std::sync::Arc;

pub async fn run_scan(
    config: &AppConfig,
    urls: Vec<String>,
    max_concurrent: Option<usize>,
) -> anyhow::Result<ExitCode> {
    let db = Database::open(&config.database)
        .await
        .context("failed to open blacklist database")?;

    let mut orchestrator = ScanOrchestrator::from_config(config, Arc::new(db.clone()))?;
    if let Some(max) = max_concurrent {
        orchestrator = orchestrator.with_max_concurrent_pipelines(max);
    }

    let result = orchestrator.process_documents(urls).await;
    db.close().await;

    match result {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            let body = response::failure_body(&failure)?;
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(response::exit_code(&failure))
        }
    }
}
