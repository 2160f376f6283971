//! IBAN rule table.
//!
//! One table drives every structural decision: a generic shape and set of
//! accepted lengths for any country, tightened by exact per-country lengths
//! and BBAN layouts where the country is known. The table is built once from
//! [`ValidationConfig`] and shared behind an `Arc`.

use crate::error::{Result, RuleError};
use invoscan_core::config::MAX_IBAN_LENGTH;
use invoscan_core::ValidationConfig;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

/// Registered IBAN countries: code, total length and, where commonly
/// checked, the BBAN layout in SWIFT notation.
const BUILTIN_COUNTRIES: &[(&str, usize, Option<&str>)] = &[
    ("AD", 24, Some("4!n4!n12!c")),
    ("AE", 23, Some("3!n16!n")),
    ("AL", 28, Some("8!n16!c")),
    ("AT", 20, Some("5!n11!n")),
    ("AZ", 28, Some("4!a20!c")),
    ("BA", 20, Some("3!n3!n8!n2!n")),
    ("BE", 16, Some("3!n7!n2!n")),
    ("BG", 22, Some("4!a4!n2!n8!c")),
    ("BH", 22, Some("4!a14!c")),
    ("BI", 27, None),
    ("BR", 29, Some("8!n5!n10!n1!a1!c")),
    ("BY", 28, None),
    ("CH", 21, Some("5!n12!c")),
    ("CR", 22, Some("4!n14!n")),
    ("CY", 28, Some("3!n5!n16!c")),
    ("CZ", 24, Some("4!n6!n10!n")),
    ("DE", 22, Some("8!n10!n")),
    ("DJ", 27, None),
    ("DK", 18, Some("4!n9!n1!n")),
    ("DO", 28, Some("4!c20!n")),
    ("EE", 20, Some("2!n2!n11!n1!n")),
    ("EG", 29, None),
    ("ES", 24, Some("4!n4!n1!n1!n10!n")),
    ("FI", 18, Some("3!n11!n")),
    ("FK", 18, None),
    ("FO", 18, Some("4!n9!n1!n")),
    ("FR", 27, Some("5!n5!n11!c2!n")),
    ("GB", 22, Some("4!a6!n8!n")),
    ("GE", 22, Some("2!a16!n")),
    ("GI", 23, Some("4!a15!c")),
    ("GL", 18, Some("4!n9!n1!n")),
    ("GR", 27, Some("3!n4!n16!c")),
    ("GT", 28, Some("4!c20!c")),
    ("HN", 28, None),
    ("HR", 21, Some("7!n10!n")),
    ("HU", 28, Some("3!n4!n1!n15!n1!n")),
    ("IE", 22, Some("4!a6!n8!n")),
    ("IL", 23, Some("3!n3!n13!n")),
    ("IQ", 23, None),
    ("IS", 26, Some("4!n2!n6!n10!n")),
    ("IT", 27, Some("1!a5!n5!n12!c")),
    ("JO", 30, None),
    ("KW", 30, Some("4!a22!c")),
    ("KZ", 20, Some("3!n13!c")),
    ("LB", 28, Some("4!n20!c")),
    ("LC", 32, None),
    ("LI", 21, Some("5!n12!c")),
    ("LT", 20, Some("5!n11!n")),
    ("LU", 20, Some("3!n13!c")),
    ("LV", 21, Some("4!a13!c")),
    ("LY", 25, None),
    ("MC", 27, Some("5!n5!n11!c2!n")),
    ("MD", 24, Some("2!c18!c")),
    ("ME", 22, Some("3!n13!n2!n")),
    ("MK", 19, Some("3!n10!c2!n")),
    ("MN", 20, None),
    ("MR", 27, Some("5!n5!n11!n2!n")),
    ("MT", 31, Some("4!a5!n18!c")),
    ("MU", 30, None),
    ("NI", 28, None),
    ("NL", 18, Some("4!a10!n")),
    ("NO", 15, Some("4!n6!n1!n")),
    ("OM", 23, None),
    ("PK", 24, Some("4!a16!c")),
    ("PL", 28, Some("8!n16!n")),
    ("PS", 29, Some("4!a21!c")),
    ("PT", 25, Some("4!n4!n11!n2!n")),
    ("QA", 29, Some("4!a21!c")),
    ("RO", 24, Some("4!a16!c")),
    ("RS", 22, Some("3!n13!n2!n")),
    ("RU", 33, None),
    ("SA", 24, Some("2!n18!c")),
    ("SC", 31, None),
    ("SD", 18, None),
    ("SE", 24, Some("3!n16!n1!n")),
    ("SI", 19, Some("5!n8!n2!n")),
    ("SK", 24, Some("4!n6!n10!n")),
    ("SM", 27, Some("1!a5!n5!n12!c")),
    ("SO", 23, None),
    ("ST", 25, None),
    ("SV", 28, None),
    ("TL", 23, None),
    ("TN", 24, Some("2!n3!n13!n2!n")),
    ("TR", 26, Some("5!n1!n16!c")),
    ("UA", 29, Some("6!n19!c")),
    ("VA", 22, Some("3!n15!n")),
    ("VG", 24, Some("4!a16!n")),
    ("XK", 20, Some("4!n10!n2!n")),
    ("YE", 30, None),
];

/// Character class of one BBAN segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Digit,
    Upper,
    Alnum,
}

impl CharClass {
    fn regex(self) -> &'static str {
        match self {
            Self::Digit => "[0-9]",
            Self::Upper => "[A-Z]",
            Self::Alnum => "[A-Z0-9]",
        }
    }
}

/// A BBAN layout such as `8!n10!n`, compiled to a matcher.
///
/// Each segment is a count, an optional `!` (fixed length; without it the
/// count is a maximum) and a class: `n` digits, `a` upper-case letters,
/// `c` upper-case alphanumerics.
#[derive(Debug, Clone)]
pub struct BbanFormat {
    source: String,
    max_length: usize,
    matcher: Regex,
}

impl BbanFormat {
    /// Parse a layout string.
    pub fn parse(format: &str) -> Result<Self> {
        let invalid = |reason: String| RuleError::InvalidBbanFormat {
            format: format.to_string(),
            reason,
        };

        let mut pattern = String::from("^");
        let mut max_length = 0usize;
        let mut chars = format.chars().peekable();

        if chars.peek().is_none() {
            return Err(invalid("empty layout".to_string()));
        }

        while chars.peek().is_some() {
            let mut count = 0usize;
            let mut saw_digit = false;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                count = count * 10 + d as usize;
                saw_digit = true;
                chars.next();
            }
            if !saw_digit || count == 0 {
                return Err(invalid("segment must start with a positive count".to_string()));
            }

            let fixed = chars.next_if_eq(&'!').is_some();
            let class = match chars.next() {
                Some('n') => CharClass::Digit,
                Some('a') => CharClass::Upper,
                Some('c') => CharClass::Alnum,
                Some(other) => {
                    return Err(invalid(format!("unknown character class '{other}'")));
                }
                None => return Err(invalid("missing character class".to_string())),
            };

            pattern.push_str(class.regex());
            if fixed {
                pattern.push_str(&format!("{{{count}}}"));
            } else {
                pattern.push_str(&format!("{{1,{count}}}"));
            }
            max_length += count;
        }
        pattern.push('$');

        Ok(Self {
            source: format.to_string(),
            max_length,
            matcher: Regex::new(&pattern)?,
        })
    }

    /// Longest BBAN the layout describes.
    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Whether `bban` follows the layout.
    #[must_use]
    pub fn matches(&self, bban: &str) -> bool {
        self.matcher.is_match(bban)
    }

    /// The layout string this format was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Exact structure of IBANs issued by one country.
#[derive(Debug, Clone)]
pub struct CountryRule {
    /// ISO 3166 alpha-2 code
    pub country_code: String,
    /// Total IBAN length
    pub length: usize,
    /// BBAN layout, when known
    pub bban: Option<BbanFormat>,
}

impl CountryRule {
    /// Build a rule, checking that the layout agrees with the length.
    pub fn new(country_code: &str, length: usize, bban: Option<&str>) -> Result<Self> {
        let bban = bban.map(BbanFormat::parse).transpose()?;

        if let Some(format) = &bban {
            let expected = length.saturating_sub(4);
            if format.max_length() != expected {
                return Err(RuleError::BbanLengthMismatch {
                    country_code: country_code.to_string(),
                    expected,
                    actual: format.max_length(),
                });
            }
        }

        Ok(Self {
            country_code: country_code.to_string(),
            length,
            bban,
        })
    }
}

/// The complete rule table used by extraction and validation.
#[derive(Debug, Clone)]
pub struct IbanRules {
    pattern: Regex,
    valid_lengths: BTreeSet<usize>,
    countries: HashMap<String, CountryRule>,
}

impl Default for IbanRules {
    fn default() -> Self {
        Self::from_config(&ValidationConfig::default()).expect("built-in rule table is valid")
    }
}

impl IbanRules {
    /// Build the table from configuration.
    ///
    /// With `use_country_table` the built-in registry is loaded first;
    /// configured `countries` entries are applied on top either way,
    /// replacing built-in entries for the same code.
    pub fn from_config(config: &ValidationConfig) -> Result<Self> {
        let pattern = Regex::new(&config.iban_pattern)?;
        let mut countries = HashMap::new();

        if config.use_country_table {
            for (code, length, bban) in BUILTIN_COUNTRIES {
                countries.insert((*code).to_string(), CountryRule::new(code, *length, *bban)?);
            }
        }

        for entry in &config.countries {
            let rule = CountryRule::new(&entry.country_code, entry.length, entry.bban.as_deref())?;
            if countries.insert(entry.country_code.clone(), rule).is_some() {
                tracing::debug!("Country rule for {} overridden by config", entry.country_code);
            }
        }

        tracing::debug!(
            "IBAN rule table loaded: {} countries, {} generic lengths",
            countries.len(),
            config.valid_lengths.len()
        );

        Ok(Self {
            pattern,
            valid_lengths: config.valid_lengths.clone(),
            countries,
        })
    }

    /// Rule for a two-letter country code, if the table knows it.
    #[must_use]
    pub fn country(&self, code: &str) -> Option<&CountryRule> {
        self.countries.get(code)
    }

    /// Number of countries in the table.
    #[must_use]
    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    /// Whether `iban` matches the generic shape.
    #[must_use]
    pub fn matches_pattern(&self, iban: &str) -> bool {
        self.pattern.is_match(iban)
    }

    /// Whether `len` is in the generic set of accepted lengths.
    #[must_use]
    pub fn allows_length(&self, len: usize) -> bool {
        self.valid_lengths.contains(&len)
    }

    /// Permissive structural pre-filter used during extraction.
    ///
    /// Accepts anything with the generic shape whose length is either a
    /// generic length or the exact length of its country.
    #[must_use]
    pub fn is_plausible(&self, iban: &str) -> bool {
        if iban.len() > MAX_IBAN_LENGTH || !self.matches_pattern(iban) {
            return false;
        }

        let country_len = iban
            .get(..2)
            .and_then(|code| self.country(code))
            .map(|rule| rule.length);

        self.allows_length(iban.len()) || country_len == Some(iban.len())
    }
}
