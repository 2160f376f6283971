use anyhow::{bail, Context};
use invoscan_core::AppConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Write the default configuration to `path` (or the platform location).
pub fn run_init(path: Option<&Path>, force: bool) -> anyhow::Result<ExitCode> {
    let path: PathBuf = match path {
        Some(path) => path.to_path_buf(),
        None => AppConfig::config_path()?,
    };

    if path.exists() && !force {
        bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    AppConfig::default()
        .save_to(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

pub fn run_show(config: &AppConfig) -> anyhow::Result<ExitCode> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(ExitCode::SUCCESS)
}
