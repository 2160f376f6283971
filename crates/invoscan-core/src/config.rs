//! Configuration management for invoscan.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. The validation section is the single
//! rule table shared by candidate extraction and final IBAN validation.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Shortest total length accepted in `validation.valid_lengths`.
const MIN_CONFIGURABLE_LENGTH: usize = 5;

/// Longest IBAN permitted by ISO 13616.
pub const MAX_IBAN_LENGTH: usize = 34;

/// Main application configuration.
///
/// This is loaded from `~/.config/invoscan/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Document fetching and fan-out settings
    pub scanning: ScanningConfig,
    /// IBAN rule table
    pub validation: ValidationConfig,
    /// Blacklist store settings
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `INVOSCAN_MAX_CONCURRENT`: Override the pipeline pool size
    /// - `INVOSCAN_DATABASE_PATH`: Override the blacklist database path
    /// - `INVOSCAN_REQUEST_TIMEOUT_SECS`: Override the fetch timeout
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable source (normally the process environment).
    ///
    /// Unparseable values are ignored and the configured value is kept.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("INVOSCAN_MAX_CONCURRENT") {
            if let Ok(max) = val.parse() {
                self.scanning.max_concurrent_pipelines = max;
                tracing::debug!("Override max_concurrent_pipelines from env: {}", max);
            }
        }

        if let Some(val) = lookup("INVOSCAN_DATABASE_PATH") {
            if !val.is_empty() {
                tracing::debug!("Override database.path from env: {}", val);
                self.database.path = Some(PathBuf::from(val));
            }
        }

        if let Some(val) = lookup("INVOSCAN_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.scanning.request_timeout_secs = secs;
                tracing::debug!("Override request_timeout_secs from env: {}", secs);
            }
        }
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scanning.max_concurrent_pipelines == 0 {
            return Err(invalid(
                "scanning.max_concurrent_pipelines",
                "must be at least 1",
            ));
        }

        if self.scanning.max_document_bytes == 0 {
            return Err(invalid("scanning.max_document_bytes", "must be positive"));
        }

        if self.database.max_connections == 0 {
            return Err(invalid("database.max_connections", "must be at least 1"));
        }

        let lengths = &self.validation.valid_lengths;
        if lengths.is_empty() {
            return Err(invalid("validation.valid_lengths", "must not be empty"));
        }
        if let Some(bad) = lengths
            .iter()
            .find(|len| !(MIN_CONFIGURABLE_LENGTH..=MAX_IBAN_LENGTH).contains(*len))
        {
            return Err(invalid(
                "validation.valid_lengths",
                &format!("{bad} is outside {MIN_CONFIGURABLE_LENGTH}..={MAX_IBAN_LENGTH}"),
            ));
        }

        if let Err(e) = Regex::new(&self.validation.iban_pattern) {
            return Err(invalid("validation.iban_pattern", &e.to_string()));
        }

        for rule in &self.validation.countries {
            let code_ok = rule.country_code.len() == 2
                && rule.country_code.chars().all(|c| c.is_ascii_uppercase());
            if !code_ok {
                return Err(invalid(
                    "validation.countries",
                    &format!("'{}' is not a two-letter country code", rule.country_code),
                ));
            }
            if !(MIN_CONFIGURABLE_LENGTH..=MAX_IBAN_LENGTH).contains(&rule.length) {
                return Err(invalid(
                    "validation.countries",
                    &format!("length {} for {} is out of range", rule.length, rule.country_code),
                ));
            }
        }

        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/invoscan/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/invoscan`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }
}

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("com", "invoscan", "invoscan").ok_or(ConfigError::NoConfigDir)
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Document fetching and fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Number of document pipelines allowed in flight at once
    pub max_concurrent_pipelines: usize,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
    /// Largest accepted document body in bytes
    pub max_document_bytes: usize,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            max_concurrent_pipelines: 10,
            request_timeout_secs: 30,
            user_agent: format!("invoscan/{}", env!("CARGO_PKG_VERSION")),
            max_document_bytes: 20 * 1024 * 1024,
        }
    }
}

/// IBAN rule table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Generic shape every normalized IBAN must match
    pub iban_pattern: String,
    /// Total lengths accepted for countries without a table entry
    pub valid_lengths: BTreeSet<usize>,
    /// Whether the built-in per-country table tightens the structural check
    pub use_country_table: bool,
    /// Entries that override or extend the built-in country table
    pub countries: Vec<CountryRuleConfig>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            iban_pattern: "^[A-Z]{2}[0-9]{2}[A-Z0-9]+$".to_string(),
            valid_lengths: (15..=MAX_IBAN_LENGTH).collect(),
            use_country_table: true,
            countries: Vec::new(),
        }
    }
}

/// One configured country rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRuleConfig {
    /// ISO 3166 alpha-2 code, upper case
    pub country_code: String,
    /// Exact total IBAN length for the country
    pub length: usize,
    /// BBAN layout in SWIFT notation, e.g. `8!n10!n`
    #[serde(default)]
    pub bban: Option<String>,
}

/// Blacklist store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file; defaults to `invoscan.db` in the data directory
    pub path: Option<PathBuf>,
    /// Connection pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Resolve the database file path, falling back to the data directory.
    pub fn resolved_path(&self) -> ConfigResult<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(AppConfig::data_dir()?.join("invoscan.db")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scanning.max_concurrent_pipelines, 10);
        assert_eq!(config.scanning.request_timeout_secs, 30);
        assert_eq!(config.validation.valid_lengths.len(), 20);
        assert!(config.validation.valid_lengths.contains(&15));
        assert!(config.validation.valid_lengths.contains(&34));
        assert!(config.validation.use_country_table);
        assert_eq!(config.database.max_connections, 5);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[scanning]"));
        assert!(toml_str.contains("[validation]"));
        assert!(toml_str.contains("[database]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(
            parsed.validation.valid_lengths,
            config.validation.valid_lengths
        );
    }

    #[test]
    fn test_load_from_path() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.scanning.max_concurrent_pipelines = 4;
        config.validation.countries.push(CountryRuleConfig {
            country_code: "XK".to_string(),
            length: 20,
            bban: Some("4!n10!n2!n".to_string()),
        });

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.scanning.max_concurrent_pipelines, 4);
        assert_eq!(loaded.validation.countries.len(), 1);
        assert_eq!(loaded.validation.countries[0].country_code, "XK");
    }

    #[test]
    fn test_load_from_missing_path() {
        let tmp = TempDir::new().expect("create temp dir");
        let result = AppConfig::load_from(&tmp.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("INVOSCAN_MAX_CONCURRENT", "3"),
            ("INVOSCAN_DATABASE_PATH", "/tmp/blacklist.db"),
            ("INVOSCAN_REQUEST_TIMEOUT_SECS", "not-a-number"),
        ]);

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.scanning.max_concurrent_pipelines, 3);
        assert_eq!(
            config.database.path,
            Some(PathBuf::from("/tmp/blacklist.db"))
        );
        // Unparseable values keep the default
        assert_eq!(config.scanning.request_timeout_secs, 30);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[scanning]
max_concurrent_pipelines = 2

[validation]
valid_lengths = [16, 22, 27]
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.scanning.max_concurrent_pipelines, 2);
        assert_eq!(
            config.validation.valid_lengths,
            BTreeSet::from([16, 22, 27])
        );
        // These should be defaults
        assert_eq!(config.scanning.request_timeout_secs, 30);
        assert!(config.validation.use_country_table);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.scanning.max_concurrent_pipelines = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.validation.valid_lengths = BTreeSet::from([40]);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.validation.iban_pattern = "([A-Z".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.validation.countries.push(CountryRuleConfig {
            country_code: "de".to_string(),
            length: 22,
            bban: None,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path_override() {
        let config = DatabaseConfig {
            path: Some(PathBuf::from("/var/lib/invoscan/custom.db")),
            max_connections: 1,
        };
        assert_eq!(
            config.resolved_path().expect("resolve path"),
            PathBuf::from("/var/lib/invoscan/custom.db")
        );
    }
}
