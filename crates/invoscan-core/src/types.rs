//! Shared types used across invoscan.
//!
//! This module defines common newtypes that provide type safety
//! and clear domain modeling.

use crate::error::InvoscanError;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static LOCATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://[^\s/?#@]+(?:[/?#]\S*)?$").expect("valid regex")
});

/// Absolute HTTP(S) reference to a document that should be scanned.
///
/// Validation here is a shape check only; it never touches the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentLocation(String);

impl DocumentLocation {
    /// Create a new `DocumentLocation` from a string.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    /// Returns error if the value is not an absolute `http`/`https` URL with a host.
    pub fn new(location: impl Into<String>) -> Result<Self, InvoscanError> {
        let location = location.into().trim().to_string();
        Self::validate(&location)?;
        Ok(Self(location))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased scheme (`http` or `https`).
    #[must_use]
    pub fn scheme(&self) -> String {
        self.0
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .unwrap_or_default()
    }

    fn validate(location: &str) -> Result<(), InvoscanError> {
        if location.is_empty() {
            return Err(InvoscanError::Validation(
                "invalid document location: empty".to_string(),
            ));
        }

        if LOCATION_REGEX.is_match(location) {
            Ok(())
        } else {
            Err(InvoscanError::Validation(format!(
                "invalid document location: must be an absolute http(s) URL, got '{location}'"
            )))
        }
    }
}

impl fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DocumentLocation {
    type Error = InvoscanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentLocation> for String {
    fn from(location: DocumentLocation) -> Self {
        location.0
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, InvoscanError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| InvoscanError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

/// An IBAN barred from acceptance.
///
/// Entries are created by an administrative operation and are read-only
/// from the scanner's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistEntry {
    /// Store-assigned identifier
    pub id: i64,
    /// Normalized IBAN
    pub iban: String,
    /// Free-text reason recorded by the operator
    pub reason: String,
    /// When the entry was created
    pub created_at: Timestamp,
}
