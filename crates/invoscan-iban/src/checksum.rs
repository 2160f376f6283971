//! MOD-97 checksum and full IBAN validation.

use crate::rules::IbanRules;
use invoscan_core::config::MAX_IBAN_LENGTH;
use std::sync::Arc;
use thiserror::Error;

/// Shortest string that can carry a country code, check digits and a BBAN.
const MIN_IBAN_LENGTH: usize = 5;

/// Strip all whitespace and upper-case.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// ISO 7064 MOD-97-10 remainder of an IBAN.
///
/// The first four characters are moved to the end and every letter is
/// expanded to two digits (A=10 .. Z=35). The remainder is folded one
/// character at a time, so no big-integer arithmetic is needed.
///
/// Returns `None` for inputs shorter than five characters or containing
/// anything other than ASCII letters and digits.
#[must_use]
pub fn mod97(iban: &str) -> Option<u32> {
    if iban.len() < MIN_IBAN_LENGTH || !iban.is_ascii() {
        return None;
    }

    let (head, tail) = iban.split_at(4);
    tail.chars().chain(head.chars()).try_fold(0u32, |acc, c| {
        let value = c.to_ascii_uppercase().to_digit(36)?;
        Some(if value < 10 {
            (acc * 10 + value) % 97
        } else {
            (acc * 100 + value) % 97
        })
    })
}

/// Whether the MOD-97 remainder is exactly 1.
#[must_use]
pub fn has_valid_checksum(iban: &str) -> bool {
    mod97(iban) == Some(1)
}

/// Why a candidate was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IbanRejection {
    /// Fewer characters than any IBAN can have
    #[error("too short ({len} characters)")]
    TooShort {
        /// Normalized length
        len: usize,
    },

    /// Does not match the generic IBAN shape
    #[error("does not match the IBAN pattern")]
    Malformed,

    /// Unknown country and length outside the accepted set
    #[error("length {len} is not an accepted IBAN length")]
    LengthNotAllowed {
        /// Normalized length
        len: usize,
    },

    /// Known country but wrong total length
    #[error("{country} IBANs are {expected} characters, got {actual}")]
    CountryLength {
        /// Country code
        country: String,
        /// Length the country prescribes
        expected: usize,
        /// Length of the candidate
        actual: usize,
    },

    /// Known country but BBAN does not follow its layout
    #[error("BBAN does not follow the {country} layout {layout}")]
    BbanLayout {
        /// Country code
        country: String,
        /// Expected layout in SWIFT notation
        layout: String,
    },

    /// MOD-97 remainder is not 1
    #[error("checksum mismatch")]
    Checksum,
}

/// Full IBAN validator backed by a shared rule table.
#[derive(Debug, Clone)]
pub struct IbanValidator {
    rules: Arc<IbanRules>,
}

impl Default for IbanValidator {
    fn default() -> Self {
        Self::new(Arc::new(IbanRules::default()))
    }
}

impl IbanValidator {
    /// Create a validator over `rules`.
    #[must_use]
    pub fn new(rules: Arc<IbanRules>) -> Self {
        Self { rules }
    }

    /// Validate one candidate, returning its normalized form on success.
    ///
    /// Structure is checked before the checksum: known countries must have
    /// their exact length and BBAN layout, unknown ones must match the
    /// generic length set.
    pub fn check(&self, candidate: &str) -> Result<String, IbanRejection> {
        let iban = normalize(candidate);

        if iban.len() < MIN_IBAN_LENGTH {
            return Err(IbanRejection::TooShort { len: iban.len() });
        }
        if iban.len() > MAX_IBAN_LENGTH
            || !iban.is_ascii()
            || !self.rules.matches_pattern(&iban)
        {
            return Err(IbanRejection::Malformed);
        }

        match self.rules.country(&iban[..2]) {
            Some(rule) => {
                if iban.len() != rule.length {
                    return Err(IbanRejection::CountryLength {
                        country: rule.country_code.clone(),
                        expected: rule.length,
                        actual: iban.len(),
                    });
                }
                if let Some(bban) = &rule.bban {
                    if !bban.matches(&iban[4..]) {
                        return Err(IbanRejection::BbanLayout {
                            country: rule.country_code.clone(),
                            layout: bban.as_str().to_string(),
                        });
                    }
                }
            }
            None => {
                if !self.rules.allows_length(iban.len()) {
                    return Err(IbanRejection::LengthNotAllowed { len: iban.len() });
                }
            }
        }

        if has_valid_checksum(&iban) {
            Ok(iban)
        } else {
            Err(IbanRejection::Checksum)
        }
    }

    /// Whether the candidate is a valid IBAN.
    #[must_use]
    pub fn is_valid(&self, candidate: &str) -> bool {
        self.check(candidate).is_ok()
    }

    /// Keep the valid candidates, in input order, in normalized form.
    #[must_use]
    pub fn validate_all(&self, candidates: &[String]) -> Vec<String> {
        candidates
            .iter()
            .filter_map(|candidate| match self.check(candidate) {
                Ok(iban) => Some(iban),
                Err(reason) => {
                    tracing::warn!("Rejected IBAN candidate {}: {}", candidate, reason);
                    None
                }
            })
            .collect()
    }
}
