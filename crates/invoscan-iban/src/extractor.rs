//! Candidate extraction from document text.
//!
//! Documents print IBANs in groups, wrap them across lines and put them next
//! to other upper-case tokens (reference numbers, BICs, currency codes). The
//! extractor collapses whitespace, finds runs of IBAN-shaped groups and then
//! searches each run for the windows of consecutive groups that form a
//! checksum-valid IBAN.

use crate::checksum::has_valid_checksum;
use crate::rules::IbanRules;
use invoscan_core::config::MAX_IBAN_LENGTH;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Country code and check digits, then groups of up to four alphanumerics
/// optionally separated by a single space or hyphen.
static CANDIDATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z]{2}[0-9]{2}(?:[ \-]?[A-Z0-9]{1,4})+\b").expect("valid regex")
});

/// Recovers normalized IBAN candidates from free text.
#[derive(Debug, Clone)]
pub struct IbanExtractor {
    rules: Arc<IbanRules>,
}

impl Default for IbanExtractor {
    fn default() -> Self {
        Self::new(Arc::new(IbanRules::default()))
    }
}

impl IbanExtractor {
    /// Create an extractor that pre-filters with `rules`.
    #[must_use]
    pub fn new(rules: Arc<IbanRules>) -> Self {
        Self { rules }
    }

    /// Extract the set of plausible candidates from `text`.
    ///
    /// Candidates are whitespace- and separator-free and pass the
    /// structural pre-filter; they are not guaranteed to be valid.
    #[must_use]
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let normalized = WHITESPACE_REGEX.replace_all(text, " ");
        let mut candidates = BTreeSet::new();

        for found in CANDIDATE_REGEX.find_iter(&normalized) {
            self.collect_from_run(found.as_str(), &mut candidates);
        }

        tracing::debug!("Extracted {} IBAN candidate(s)", candidates.len());
        candidates
    }

    fn collect_from_run(&self, run: &str, out: &mut BTreeSet<String>) {
        let groups: Vec<&str> = run.split([' ', '-']).filter(|g| !g.is_empty()).collect();

        let found = collect_windows(&groups, out, |joined| {
            self.rules.is_plausible(joined) && has_valid_checksum(joined)
        });
        if found {
            return;
        }

        // No checksum-valid window: keep the structurally closest ones so
        // they can be reported as invalid. Registered countries with their
        // exact length first, any plausible window otherwise.
        let found = collect_windows(&groups, out, |joined| {
            self.rules.is_plausible(joined) && self.has_country_length(joined)
        });
        if !found {
            collect_windows(&groups, out, |joined| self.rules.is_plausible(joined));
        }
    }

    fn has_country_length(&self, iban: &str) -> bool {
        iban.get(..2)
            .and_then(|code| self.rules.country(code))
            .is_some_and(|rule| rule.length == iban.len())
    }
}

/// Scan `groups` left to right and emit, at each IBAN-shaped group, the
/// longest window accepted by `accept`. Emitted windows do not overlap.
fn collect_windows<F>(groups: &[&str], out: &mut BTreeSet<String>, accept: F) -> bool
where
    F: Fn(&str) -> bool,
{
    let mut found = false;
    let mut start = 0;

    while start < groups.len() {
        if !starts_like_iban(groups[start]) {
            start += 1;
            continue;
        }

        match longest_window(groups, start, &accept) {
            Some((end, iban)) => {
                tracing::debug!("IBAN candidate: {}", iban);
                out.insert(iban);
                found = true;
                start = end;
            }
            None => start += 1,
        }
    }

    found
}

/// Longest window `groups[start..end]` of at most `MAX_IBAN_LENGTH`
/// characters accepted by `accept`, returned with its exclusive end.
fn longest_window<F>(groups: &[&str], start: usize, accept: F) -> Option<(usize, String)>
where
    F: Fn(&str) -> bool,
{
    let mut max_end = start;
    let mut len = 0;
    while max_end < groups.len() && len + groups[max_end].len() <= MAX_IBAN_LENGTH {
        len += groups[max_end].len();
        max_end += 1;
    }

    (start + 1..=max_end).rev().find_map(|end| {
        let joined = groups[start..end].concat();
        accept(&joined).then_some((end, joined))
    })
}

fn starts_like_iban(group: &str) -> bool {
    let bytes = group.as_bytes();
    bytes.len() >= 4
        && bytes[..2].iter().all(u8::is_ascii_uppercase)
        && bytes[2..4].iter().all(u8::is_ascii_digit)
}
