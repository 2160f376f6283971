//! Invoscan IBAN - rule table, validation and extraction.
//!
//! Pure, synchronous building blocks for finding IBANs in document text:
//!
//! - [`rules`] - the configuration-driven rule table (generic shape plus
//!   per-country lengths and BBAN layouts)
//! - [`checksum`] - MOD-97 (ISO 7064 mod-97-10) and the [`IbanValidator`]
//! - [`extractor`] - recovers normalized candidates from noisy text
//!
//! The same [`IbanRules`] instance is shared by extraction (permissive
//! pre-filter) and validation (full check), so both stages agree on what
//! an IBAN looks like.
//!
//! # Example
//!
//! ```rust
//! use invoscan_iban::{IbanExtractor, IbanRules, IbanValidator};
//! use std::sync::Arc;
//!
//! let rules = Arc::new(IbanRules::default());
//! let extractor = IbanExtractor::new(rules.clone());
//! let validator = IbanValidator::new(rules);
//!
//! let candidates = extractor.extract("Valid IBAN: DE44 5001 0517 5407 3249 31");
//! assert!(candidates.contains("DE44500105175407324931"));
//! assert!(validator.is_valid("DE44500105175407324931"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod checksum;
pub mod error;
pub mod extractor;
pub mod rules;

// Re-export commonly used types
pub use checksum::{has_valid_checksum, mod97, normalize, IbanRejection, IbanValidator};
pub use error::{Result, RuleError};
pub use extractor::IbanExtractor;
pub use rules::{BbanFormat, CountryRule, IbanRules};
