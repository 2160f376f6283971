//! JSON bodies printed for scan results.

use invoscan_core::Timestamp;
use invoscan_scanner::{FailureKind, ScanFailure, ScanOutcome};
use serde::Serialize;
use std::process::ExitCode;

/// Error body for a scan that did not succeed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Stable key such as `NO_IBAN_FOUND`
    pub error_key: String,
    /// Human-readable message
    pub error_message: String,
    pub timestamp: Timestamp,
    /// Kind-specific payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_key: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_key: error_key.into(),
            error_message: error_message.into(),
            timestamp: Timestamp::now(),
            details: None,
        }
    }

    pub fn with_details(
        error_key: impl Into<String>,
        error_message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(error_key, error_message)
        }
    }
}

impl From<&ScanFailure> for ErrorResponse {
    fn from(failure: &ScanFailure) -> Self {
        let key = failure.error_key();
        let message = failure.to_string();
        let kind = failure.kind().as_str();

        match failure {
            ScanFailure::NoIbanFound { location } => Self::with_details(
                key,
                message,
                serde_json::json!({ "kind": kind, "location": location }),
            ),
            ScanFailure::AllInvalid { candidates } => Self::with_details(
                key,
                message,
                serde_json::json!({ "kind": kind, "candidates": candidates }),
            ),
            ScanFailure::Blacklisted { blocked, clear } => Self::with_details(
                key,
                message,
                serde_json::json!({ "kind": kind, "blocked": blocked, "clear": clear }),
            ),
            ScanFailure::DocumentNotFound { location, status } => Self::with_details(
                key,
                message,
                serde_json::json!({ "kind": kind, "location": location, "status": status }),
            ),
            ScanFailure::DocumentProcessing { location, .. } => Self::with_details(
                key,
                message,
                serde_json::json!({ "kind": kind, "location": location }),
            ),
            ScanFailure::MalformedLocation { .. } | ScanFailure::Internal(_) => {
                Self::with_details(key, message, serde_json::json!({ "kind": kind }))
            }
        }
    }
}

/// Body printed for a failed scan. A blacklisted result keeps the outcome
/// shape so both lists stay visible.
pub fn failure_body(failure: &ScanFailure) -> serde_json::Result<serde_json::Value> {
    match failure {
        ScanFailure::Blacklisted { blocked, clear } => {
            serde_json::to_value(ScanOutcome::blacklisted(blocked.clone(), clear.clone()))
        }
        other => serde_json::to_value(ErrorResponse::from(other)),
    }
}

/// Process exit status for a failure kind.
pub fn exit_code(failure: &ScanFailure) -> ExitCode {
    ExitCode::from(exit_status(failure.kind()))
}

fn exit_status(kind: FailureKind) -> u8 {
    match kind {
        FailureKind::NoIbanFound | FailureKind::AllInvalid => 0,
        FailureKind::MalformedLocation => 2,
        FailureKind::Blacklisted => 3,
        FailureKind::DocumentNotFound => 4,
        FailureKind::DocumentProcessing => 5,
        FailureKind::Internal => 1,
    }
}
