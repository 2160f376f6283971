//! Errors raised while building the IBAN rule table.

use thiserror::Error;

/// Errors that can occur when compiling a rule table from configuration.
#[derive(Error, Debug)]
pub enum RuleError {
    /// The generic IBAN pattern does not compile
    #[error("invalid IBAN pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A BBAN layout string is not valid SWIFT notation
    #[error("invalid BBAN format '{format}': {reason}")]
    InvalidBbanFormat {
        /// The offending layout string
        format: String,
        /// What is wrong with it
        reason: String,
    },

    /// A BBAN layout disagrees with the declared IBAN length
    #[error("BBAN layout for {country_code} covers {actual} characters, expected {expected}")]
    BbanLengthMismatch {
        /// Country the rule belongs to
        country_code: String,
        /// Declared IBAN length minus the four leading characters
        expected: usize,
        /// Length the layout describes
        actual: usize,
    },
}

/// Result type alias for rule table operations.
pub type Result<T> = std::result::Result<T, RuleError>;
