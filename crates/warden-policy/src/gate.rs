//! The confidence gate: a pure mapping from confidence score to escalation
//! mode.
//!
//! Bands are inclusive on their lower bound, total over [0, 1]:
//!
//!   [0, human_review)              → HUMAN_REVIEW
//!   [human_review, limited_write)  → LIMITED_WRITE
//!   [limited_write, 1]             → FULL_AUTO

use warden_contracts::contract::ConfidenceThresholds;
use warden_contracts::result::EscalationMode;

/// Map `confidence` to an escalation mode under `thresholds`.
///
/// Confidence values outside [0, 1] — including NaN — fail closed to
/// `HumanReview`: a malformed score must never grant autonomy.
pub fn gate(confidence: f64, thresholds: &ConfidenceThresholds) -> EscalationMode {
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return EscalationMode::HumanReview;
    }
    if confidence < thresholds.human_review {
        EscalationMode::HumanReview
    } else if confidence < thresholds.limited_write {
        EscalationMode::LimitedWrite
    } else {
        EscalationMode::FullAuto
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> ConfidenceThresholds {
        ConfidenceThresholds {
            human_review: 0.5,
            limited_write: 0.85,
        }
    }

    #[test]
    fn below_human_review_band() {
        assert_eq!(gate(0.0, &thresholds()), EscalationMode::HumanReview);
        assert_eq!(gate(0.4, &thresholds()), EscalationMode::HumanReview);
        assert_eq!(gate(0.499, &thresholds()), EscalationMode::HumanReview);
    }

    #[test]
    fn boundaries_are_inclusive_on_the_lower_bound() {
        // Exactly at human_review: the agent enters the limited-write band.
        assert_eq!(gate(0.5, &thresholds()), EscalationMode::LimitedWrite);
        // Exactly at limited_write: full autonomy begins.
        assert_eq!(gate(0.85, &thresholds()), EscalationMode::FullAuto);
    }

    #[test]
    fn middle_band_is_limited_write() {
        assert_eq!(gate(0.6, &thresholds()), EscalationMode::LimitedWrite);
        assert_eq!(gate(0.849, &thresholds()), EscalationMode::LimitedWrite);
    }

    #[test]
    fn top_band_is_full_auto() {
        assert_eq!(gate(0.9, &thresholds()), EscalationMode::FullAuto);
        assert_eq!(gate(1.0, &thresholds()), EscalationMode::FullAuto);
    }

    #[test]
    fn malformed_confidence_fails_closed() {
        assert_eq!(gate(f64::NAN, &thresholds()), EscalationMode::HumanReview);
        assert_eq!(gate(-0.1, &thresholds()), EscalationMode::HumanReview);
        assert_eq!(gate(1.5, &thresholds()), EscalationMode::HumanReview);
        assert_eq!(
            gate(f64::INFINITY, &thresholds()),
            EscalationMode::HumanReview
        );
    }
}
