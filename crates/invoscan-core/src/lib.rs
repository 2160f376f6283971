//! Invoscan Core - Foundation crate for the invoice IBAN scanner.
//!
//! This crate provides the shared types, configuration and infrastructure
//! error handling that the other invoscan crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared newtypes (`DocumentLocation`, `Timestamp`, `BlacklistEntry`)
//! - [`lookup`] - The batched blacklist lookup seam consumed by the scanner
//!
//! # Example
//!
//! ```rust
//! use invoscan_core::{AppConfig, DocumentLocation};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.scanning.max_concurrent_pipelines, 10);
//!
//! let location = DocumentLocation::new("https://example.com/invoice.pdf")?;
//! assert_eq!(location.scheme(), "https");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod lookup;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, CountryRuleConfig, DatabaseConfig, ScanningConfig, ValidationConfig};
pub use error::{ConfigError, ConfigResult, InvoscanError, Result};
pub use lookup::BlacklistLookup;
pub use types::{BlacklistEntry, DocumentLocation, Timestamp};
