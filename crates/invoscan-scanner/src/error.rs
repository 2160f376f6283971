//! Scan failures and fetch errors.
//!
//! A scan ends in exactly one [`ScanFailure`] when it does not succeed. The
//! domain outcomes (nothing found, nothing valid, blacklisted) and the
//! infrastructure faults share one enum so callers can branch on
//! [`ScanFailure::kind`] without parsing messages.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised by a [`crate::DocumentFetcher`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The location is not an absolute http(s) URL; nothing was sent.
    #[error("Invalid URL format: {0}")]
    MalformedLocation(String),

    /// The remote answered with an unsuccessful status.
    #[error("No document found at {location} (HTTP {status})")]
    NotFound {
        /// Requested location
        location: String,
        /// HTTP status code
        status: u16,
    },

    /// Transfer failed or the body exceeded the size limit.
    #[error("Failed to download document from {location}: {reason}")]
    Transport {
        /// Requested location
        location: String,
        /// What went wrong
        reason: String,
    },

    /// The body could not be turned into text (corrupt, encrypted, binary).
    #[error("Failed to read document from {location}: {reason}")]
    Processing {
        /// Requested location
        location: String,
        /// What went wrong
        reason: String,
    },
}

/// Discriminant of a [`ScanFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Extraction produced no candidates
    NoIbanFound,
    /// Candidates existed but none passed validation
    AllInvalid,
    /// Some validated IBANs are blacklisted
    Blacklisted,
    /// A location failed shape validation
    MalformedLocation,
    /// The remote had no usable document
    DocumentNotFound,
    /// The document could not be read as text
    DocumentProcessing,
    /// Anything else
    Internal,
}

impl FailureKind {
    /// Kebab-case name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoIbanFound => "no-iban-found",
            Self::AllInvalid => "all-invalid",
            Self::Blacklisted => "blacklisted",
            Self::MalformedLocation => "malformed-location",
            Self::DocumentNotFound => "document-not-found",
            Self::DocumentProcessing => "document-processing-error",
            Self::Internal => "internal-error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a scan did not succeed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanFailure {
    /// No IBAN-shaped text in the document.
    #[error("No IBANs found in the provided documents.")]
    NoIbanFound {
        /// Document that yielded nothing
        location: String,
    },

    /// Candidates were found but none is a valid IBAN.
    #[error("No valid IBANs found; rejected candidates: {}", .candidates.join(", "))]
    AllInvalid {
        /// The rejected candidates, as extracted
        candidates: Vec<String>,
    },

    /// Blacklisted IBANs were found.
    #[error("Blacklisted IBANs found: {}", .blocked.join(", "))]
    Blacklisted {
        /// Blacklisted IBANs
        blocked: Vec<String>,
        /// Valid IBANs that are not blacklisted
        clear: Vec<String>,
    },

    /// A location is not an absolute http(s) URL.
    #[error("Invalid URL format: {reason}")]
    MalformedLocation {
        /// What is wrong with it
        reason: String,
    },

    /// The remote did not serve a document.
    #[error("No document found at {location}{}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    DocumentNotFound {
        /// Requested location
        location: String,
        /// HTTP status, when one was received
        status: Option<u16>,
    },

    /// The document could not be downloaded completely or read as text.
    #[error("Failed to process document from {location}: {reason}")]
    DocumentProcessing {
        /// Requested location
        location: String,
        /// What went wrong
        reason: String,
    },

    /// Unexpected fault.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScanFailure {
    /// Discriminant for programmatic branching.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoIbanFound { .. } => FailureKind::NoIbanFound,
            Self::AllInvalid { .. } => FailureKind::AllInvalid,
            Self::Blacklisted { .. } => FailureKind::Blacklisted,
            Self::MalformedLocation { .. } => FailureKind::MalformedLocation,
            Self::DocumentNotFound { .. } => FailureKind::DocumentNotFound,
            Self::DocumentProcessing { .. } => FailureKind::DocumentProcessing,
            Self::Internal(_) => FailureKind::Internal,
        }
    }

    /// Stable upper-snake key used in error bodies.
    #[must_use]
    pub fn error_key(&self) -> &'static str {
        match self.kind() {
            FailureKind::NoIbanFound => "NO_IBAN_FOUND",
            FailureKind::AllInvalid => "INVALID_IBANS_PRESENT",
            FailureKind::Blacklisted => "BLACKLISTED_IBANS_FOUND",
            FailureKind::MalformedLocation => "INVALID_URL",
            FailureKind::DocumentNotFound => "PDF_NOT_FOUND",
            FailureKind::DocumentProcessing => "PDF_PROCESSING",
            FailureKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Whether this is a domain outcome rather than a fault.
    #[must_use]
    pub fn is_domain_outcome(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::NoIbanFound | FailureKind::AllInvalid | FailureKind::Blacklisted
        )
    }
}

impl From<FetchError> for ScanFailure {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::MalformedLocation(reason) => Self::MalformedLocation { reason },
            FetchError::NotFound { location, status } => Self::DocumentNotFound {
                location,
                status: Some(status),
            },
            FetchError::Transport { location, reason }
            | FetchError::Processing { location, reason } => {
                Self::DocumentProcessing { location, reason }
            }
        }
    }
}

impl From<invoscan_core::InvoscanError> for ScanFailure {
    fn from(err: invoscan_core::InvoscanError) -> Self {
        match err {
            invoscan_core::InvoscanError::Validation(reason) => Self::MalformedLocation { reason },
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Result type alias for scanning operations.
pub type Result<T> = std::result::Result<T, ScanFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let cases = [
            (
                ScanFailure::NoIbanFound {
                    location: "https://example.com/a.pdf".to_string(),
                },
                "no-iban-found",
                "NO_IBAN_FOUND",
            ),
            (
                ScanFailure::AllInvalid {
                    candidates: vec!["DE00500105175407324931".to_string()],
                },
                "all-invalid",
                "INVALID_IBANS_PRESENT",
            ),
            (
                ScanFailure::Blacklisted {
                    blocked: vec![],
                    clear: vec![],
                },
                "blacklisted",
                "BLACKLISTED_IBANS_FOUND",
            ),
            (
                ScanFailure::MalformedLocation {
                    reason: "empty".to_string(),
                },
                "malformed-location",
                "INVALID_URL",
            ),
            (
                ScanFailure::DocumentNotFound {
                    location: "https://example.com/a.pdf".to_string(),
                    status: Some(404),
                },
                "document-not-found",
                "PDF_NOT_FOUND",
            ),
            (
                ScanFailure::DocumentProcessing {
                    location: "https://example.com/a.pdf".to_string(),
                    reason: "encrypted".to_string(),
                },
                "document-processing-error",
                "PDF_PROCESSING",
            ),
            (
                ScanFailure::Internal("boom".to_string()),
                "internal-error",
                "INTERNAL_ERROR",
            ),
        ];

        for (failure, kind, key) in cases {
            assert_eq!(failure.kind().as_str(), kind);
            assert_eq!(failure.error_key(), key);
        }
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&FailureKind::DocumentNotFound).expect("serialize");
        assert_eq!(json, "\"document-not-found\"");
    }

    #[test]
    fn test_fetch_error_conversion() {
        let failure: ScanFailure = FetchError::NotFound {
            location: "https://example.com/a.pdf".to_string(),
            status: 404,
        }
        .into();
        assert_eq!(failure.kind(), FailureKind::DocumentNotFound);
        assert!(failure.to_string().contains("HTTP 404"));

        let failure: ScanFailure = FetchError::Transport {
            location: "https://example.com/a.pdf".to_string(),
            reason: "connection reset".to_string(),
        }
        .into();
        assert_eq!(failure.kind(), FailureKind::DocumentProcessing);

        let failure: ScanFailure = FetchError::MalformedLocation("ftp://x".to_string()).into();
        assert_eq!(failure.kind(), FailureKind::MalformedLocation);
    }

    #[test]
    fn test_core_error_conversion() {
        let failure: ScanFailure =
            invoscan_core::InvoscanError::Lookup("pool closed".to_string()).into();
        assert_eq!(failure.kind(), FailureKind::Internal);

        let failure: ScanFailure =
            invoscan_core::InvoscanError::Validation("bad url".to_string()).into();
        assert_eq!(failure.kind(), FailureKind::MalformedLocation);
    }

    #[test]
    fn test_domain_outcomes() {
        assert!(ScanFailure::NoIbanFound {
            location: String::new()
        }
        .is_domain_outcome());
        assert!(!ScanFailure::Internal("x".to_string()).is_domain_outcome());
    }
}
