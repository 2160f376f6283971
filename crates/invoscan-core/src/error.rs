//! Core error types for invoscan.
//!
//! This module defines the infrastructure error type shared by the
//! collaborators around the scanning core (configuration, storage, lookups).
//! Domain outcomes of a scan are modelled separately in `invoscan-scanner`.

use thiserror::Error;

/// Central infrastructure error for invoscan operations.
#[derive(Error, Debug)]
pub enum InvoscanError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database errors (connection, queries, migrations)
    #[error("database error: {0}")]
    Database(String),

    /// Blacklist lookup failures reported by a lookup backend
    #[error("blacklist lookup failed: {0}")]
    Lookup(String),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Config file not found at an explicitly requested path
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `InvoscanError`.
pub type Result<T> = std::result::Result<T, InvoscanError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InvoscanError::Validation("invalid location".to_string());
        assert_eq!(err.to_string(), "validation error: invalid location");

        let err = InvoscanError::Lookup("pool closed".to_string());
        assert_eq!(err.to_string(), "blacklist lookup failed: pool closed");

        let err = ConfigError::InvalidValue {
            field: "scanning.max_concurrent_pipelines".to_string(),
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value for scanning.max_concurrent_pipelines: must be at least 1"
        );
    }

    #[test]
    fn test_error_from_config() {
        let config_err = ConfigError::NoConfigDir;
        let err: InvoscanError = config_err.into();
        assert!(matches!(err, InvoscanError::Config(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: InvoscanError = io_err.into();
        assert!(matches!(err, InvoscanError::Io(_)));
    }
}
