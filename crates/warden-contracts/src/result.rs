//! The engine's verdict types and the machine-parsable violation codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How much autonomy the contract grants for a given confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscalationMode {
    HumanReview,
    LimitedWrite,
    FullAuto,
}

impl fmt::Display for EscalationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscalationMode::HumanReview => f.write_str("HUMAN_REVIEW"),
            EscalationMode::LimitedWrite => f.write_str("LIMITED_WRITE"),
            EscalationMode::FullAuto => f.write_str("FULL_AUTO"),
        }
    }
}

/// The preflight verdict for one write intent.
///
/// `pass` and `mode` are independent axes: a guardrail or field violation
/// forces `pass = false`, but `mode` is still computed from confidence so
/// callers always know how much autonomy the contract would have granted
/// absent the violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyResult {
    pub pass: bool,
    /// Machine-parsable codes, e.g. `denied_fields:ssn`. Empty iff `pass`.
    pub violations: Vec<String>,
    pub mode: EscalationMode,
}

impl PolicyResult {
    /// The most conservative possible result, carrying a single
    /// engine-synthesized violation code.
    ///
    /// Used on the fail-closed paths: contract unavailable, audit sink
    /// unavailable.
    pub fn fail_closed(code: &str) -> Self {
        Self {
            pass: false,
            violations: vec![code.to_string()],
            mode: EscalationMode::HumanReview,
        }
    }
}

// ── Violation codes ───────────────────────────────────────────────────────────

/// Engine-synthesized code: the contract could not be loaded in time.
pub const CONTRACT_UNAVAILABLE: &str = "contract_unavailable";

/// Engine-synthesized code: the audit sink never acknowledged the record.
pub const AUDIT_UNAVAILABLE: &str = "audit_unavailable";

/// Constructors for the violation codes the enforcer emits. Keeping the
/// formatting in one place guarantees the codes stay machine-parsable.
pub mod violation {
    use crate::pii::PiiType;

    /// `prohibited_action:<action_type>`
    pub fn prohibited_action(action_type: &str) -> String {
        format!("prohibited_action:{action_type}")
    }

    /// `denied_fields:<csv>` — `fields` must already be sorted.
    pub fn denied_fields(fields: &[&str]) -> String {
        format!("denied_fields:{}", fields.join(","))
    }

    /// `not_allowed_fields:<csv>` — `fields` must already be sorted.
    pub fn not_allowed_fields(fields: &[&str]) -> String {
        format!("not_allowed_fields:{}", fields.join(","))
    }

    /// `pii_out_of_scope:<type>:<fieldPath>`
    pub fn pii_out_of_scope(pii_type: PiiType, path: &str) -> String {
        format!("pii_out_of_scope:{pii_type}:{path}")
    }

    /// `pii_scan_budget_exceeded:<fieldPath>` — a value too large to scan
    /// safely; treated as a violation rather than risking an unbounded scan.
    pub fn pii_scan_budget_exceeded(path: &str) -> String {
        format!("pii_scan_budget_exceeded:{path}")
    }
}
