//! Per-field PII classification.
//!
//! Matching is always per logical field: `classify` receives one traversed
//! string value, never a serialized blob of the whole payload. Whole-payload
//! scans misattribute matches (no field path) and are wrong in both
//! directions — numeric record ids read as phone numbers, while composite
//! PII split across fields goes unseen.
//!
//! Every matcher is compiled once with an explicit regex size limit, so a
//! pathological custom pattern fails at construction rather than at
//! evaluation. Combined with the linear-time `regex` engine and the scan
//! budget on value length, classification is bounded for any input.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use warden_contracts::error::{WardenError, WardenResult};
use warden_contracts::pii::PiiType;

/// The largest string value the detector will scan, in bytes. Larger values
/// are reported as over-budget and handled fail-closed by callers.
pub const SCAN_BUDGET_BYTES: usize = 64 * 1024;

/// Compiled-pattern size limit for custom matchers.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// One compiled per-type matcher.
#[derive(Debug, Clone)]
pub struct Matcher {
    pub pii_type: PiiType,
    pub pattern: Regex,
}

// The built-in patterns. Each is anchored to word boundaries or required
// separators so bare numeric identifiers do not classify as PII.
static DEFAULT_MATCHERS: LazyLock<Vec<Matcher>> = LazyLock::new(|| {
    vec![
        Matcher {
            pii_type: PiiType::Email,
            pattern: Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}")
                .expect("built-in email pattern is valid"),
        },
        Matcher {
            pii_type: PiiType::Phone,
            // Requires an explicit separator or country/area formatting;
            // a bare 10-digit run stays unmatched on purpose.
            pattern: Regex::new(
                r"(?:\+\d{1,3}[ .\-]?)?(?:\(\d{3}\)[ .\-]?|\d{3}[ .\-])\d{3}[ .\-]\d{4}\b",
            )
            .expect("built-in phone pattern is valid"),
        },
        Matcher {
            pii_type: PiiType::GovernmentId,
            pattern: Regex::new(r"\b\d{3}-\d{2}-\d{4}\b")
                .expect("built-in government-id pattern is valid"),
        },
        Matcher {
            pii_type: PiiType::PaymentCard,
            // Candidate digit runs only; Luhn verification happens in code.
            pattern: Regex::new(r"\b(?:\d[ \-]?){13,19}\b")
                .expect("built-in payment-card pattern is valid"),
        },
        Matcher {
            pii_type: PiiType::StreetAddress,
            pattern: Regex::new(
                r"\b\d{1,5}\s+(?:[A-Z][A-Za-z]*\s+){1,3}(?:St|Street|Ave|Avenue|Blvd|Boulevard|Rd|Road|Ln|Lane|Dr|Drive|Ct|Court|Way)\b\.?",
            )
            .expect("built-in street-address pattern is valid"),
        },
        Matcher {
            pii_type: PiiType::PersonalName,
            // Honorific-led names only. A bare capitalized word is not
            // evidence of a name.
            pattern: Regex::new(r"\b(?:Mr|Mrs|Ms|Dr|Prof)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?")
                .expect("built-in personal-name pattern is valid"),
        },
    ]
});

/// The PII detector: a fixed, ordered set of per-type matchers.
///
/// Stateless after construction — `classify` performs no allocation beyond
/// its result set and is safe to call concurrently.
#[derive(Debug, Clone)]
pub struct PiiDetector {
    matchers: Vec<Matcher>,
}

impl PiiDetector {
    /// A detector with the built-in matchers for every `PiiType`.
    pub fn new() -> Self {
        Self {
            matchers: DEFAULT_MATCHERS.clone(),
        }
    }

    /// Add a custom pattern for `pii_type`.
    ///
    /// The pattern is compiled with an explicit size limit; patterns that
    /// exceed it are rejected here, at construction time, so evaluation can
    /// never stall on a pathological matcher.
    pub fn with_matcher(mut self, pii_type: PiiType, pattern: &str) -> WardenResult<Self> {
        let compiled = RegexBuilder::new(pattern)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()
            .map_err(|e| WardenError::ContractValidation {
                reason: format!("custom PII pattern for '{pii_type}' rejected: {e}"),
            })?;
        self.matchers.push(Matcher {
            pii_type,
            pattern: compiled,
        });
        Ok(self)
    }

    /// All matchers registered for `pii_type`, built-in plus custom.
    pub(crate) fn matchers_for(&self, pii_type: PiiType) -> impl Iterator<Item = &Matcher> {
        self.matchers.iter().filter(move |m| m.pii_type == pii_type)
    }

    /// True when `value` exceeds the scan budget and must be handled
    /// fail-closed instead of scanned.
    pub fn exceeds_budget(&self, value: &str) -> bool {
        value.len() > SCAN_BUDGET_BYTES
    }

    /// Classify one field value. Returns the set of PII types found.
    ///
    /// Pure and total: over-budget values return the empty set (callers are
    /// expected to check `exceeds_budget` first and fail closed).
    pub fn classify(&self, value: &str) -> BTreeSet<PiiType> {
        let mut found = BTreeSet::new();
        if self.exceeds_budget(value) {
            return found;
        }

        for matcher in &self.matchers {
            if found.contains(&matcher.pii_type) {
                continue;
            }
            match matcher.pii_type {
                // Card candidates must additionally pass Luhn, which is what
                // separates a card number from an order id of similar shape.
                PiiType::PaymentCard => {
                    if matcher
                        .pattern
                        .find_iter(value)
                        .any(|m| luhn_valid(m.as_str()))
                    {
                        found.insert(PiiType::PaymentCard);
                    }
                }
                _ => {
                    if matcher.pattern.is_match(value) {
                        found.insert(matcher.pii_type);
                    }
                }
            }
        }
        found
    }
}

impl Default for PiiDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Luhn checksum over a candidate digit run (separators ignored).
fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> PiiDetector {
        PiiDetector::new()
    }

    #[test]
    fn classifies_email() {
        let found = detector().classify("contact me at jane@x.com");
        assert!(found.contains(&PiiType::Email));
    }

    #[test]
    fn classifies_formatted_phone() {
        for value in ["555-123-4567", "(555) 123 4567", "+1 555-123-4567"] {
            let found = detector().classify(value);
            assert!(found.contains(&PiiType::Phone), "should match '{}'", value);
        }
    }

    #[test]
    fn bare_numeric_id_is_not_a_phone() {
        let found = detector().classify("order 5551234567 confirmed");
        assert!(!found.contains(&PiiType::Phone));
    }

    #[test]
    fn classifies_ssn_but_not_as_phone() {
        let found = detector().classify("ssn is 123-45-6789");
        assert!(found.contains(&PiiType::GovernmentId));
        assert!(!found.contains(&PiiType::Phone));
    }

    #[test]
    fn classifies_luhn_valid_card() {
        let found = detector().classify("card 4111 1111 1111 1111 on file");
        assert!(found.contains(&PiiType::PaymentCard));
    }

    #[test]
    fn luhn_invalid_digit_run_is_not_a_card() {
        // Same shape as a PAN, fails the checksum.
        let found = detector().classify("tracking 4111 1111 1111 1112");
        assert!(!found.contains(&PiiType::PaymentCard));
    }

    #[test]
    fn classifies_street_address() {
        let found = detector().classify("ship to 450 Maple Grove Ave");
        assert!(found.contains(&PiiType::StreetAddress));
    }

    #[test]
    fn classifies_honorific_name() {
        let found = detector().classify("spoke with Dr. Elena Morales today");
        assert!(found.contains(&PiiType::PersonalName));
    }

    #[test]
    fn plain_text_is_clean() {
        let found = detector().classify("inventory count updated to 42 units");
        assert!(found.is_empty());
    }

    #[test]
    fn multiple_types_in_one_value() {
        let found = detector().classify("jane@x.com or 555-123-4567");
        assert!(found.contains(&PiiType::Email));
        assert!(found.contains(&PiiType::Phone));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn oversized_value_is_flagged_not_scanned() {
        let big = "a".repeat(SCAN_BUDGET_BYTES + 1);
        let d = detector();
        assert!(d.exceeds_budget(&big));
        assert!(d.classify(&big).is_empty());
    }

    #[test]
    fn custom_matcher_extends_a_type() {
        let d = detector()
            .with_matcher(PiiType::GovernmentId, r"\bDL-\d{8}\b")
            .unwrap();
        let found = d.classify("driver license DL-12345678");
        assert!(found.contains(&PiiType::GovernmentId));
    }

    #[test]
    fn invalid_custom_pattern_is_rejected_at_construction() {
        let err = detector()
            .with_matcher(PiiType::Email, r"([unclosed")
            .unwrap_err();
        assert!(err.to_string().contains("rejected"));
    }

    #[test]
    fn classification_is_deterministic() {
        let d = detector();
        let value = "Dr. Ada Byron, jane@x.com, 555-123-4567";
        assert_eq!(d.classify(value), d.classify(value));
    }
}
