//! Aggregate scan result.

use invoscan_core::Timestamp;
use serde::{Deserialize, Serialize};

/// Message reported when every document produced only clear IBANs.
pub const SUCCESS_MESSAGE: &str = "IBAN extraction successful. No blacklisted IBANs found";

/// Message reported alongside blacklisted IBANs.
pub const BLACKLISTED_MESSAGE: &str = "Blacklisted IBANs found";

/// Result of one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    /// Summary message
    pub message: String,
    /// Valid IBANs that are not blacklisted, in submission order
    pub valid_ibans: Vec<String>,
    /// Blacklisted IBANs
    #[serde(rename = "blackListedIbans")]
    pub blacklisted_ibans: Vec<String>,
    /// When the outcome was built
    pub timestamp: Timestamp,
}

impl ScanOutcome {
    /// Outcome for a run in which nothing was blacklisted.
    #[must_use]
    pub fn clear(valid_ibans: Vec<String>) -> Self {
        Self {
            message: SUCCESS_MESSAGE.to_string(),
            valid_ibans,
            blacklisted_ibans: Vec::new(),
            timestamp: Timestamp::now(),
        }
    }

    /// Outcome body reported for a blacklisted failure.
    #[must_use]
    pub fn blacklisted(blocked: Vec<String>, clear: Vec<String>) -> Self {
        Self {
            message: BLACKLISTED_MESSAGE.to_string(),
            valid_ibans: clear,
            blacklisted_ibans: blocked,
            timestamp: Timestamp::now(),
        }
    }
}
