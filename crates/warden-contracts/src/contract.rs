//! The per-agent policy contract: the declarative document that scopes what
//! an agent may write and under what confidence it may act autonomously.
//!
//! Contracts are versioned and immutable once loaded. Schema validation
//! happens exactly once, at load time, via [`AgentContract::validate`] —
//! a validated contract can be evaluated without further structural checks.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{WardenError, WardenResult};
use crate::pii::PiiType;

/// A versioned, immutable policy contract for one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentContract {
    /// Stable agent identifier, e.g. "crm-update-agent".
    pub id: String,
    /// Monotonically increasing contract version, starting at 1.
    pub version: u32,
    /// Free-text statement of what the agent is for.
    pub purpose: String,
    /// Declared read/write surfaces. Advisory and auditable; the engine
    /// does not enforce scope, only records it.
    #[serde(default)]
    pub scope: ContractScope,
    pub permissions: Permissions,
    pub retention: Retention,
    pub escalation: Escalation,
    #[serde(default)]
    pub guardrails: Guardrails,
}

/// Declared input/output surfaces for the agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractScope {
    #[serde(default)]
    pub inputs: Vec<ScopeEntry>,
    #[serde(default)]
    pub outputs: Vec<ScopeEntry>,
}

/// One declared source or destination and the fields touched there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeEntry {
    /// Source or destination identifier, e.g. "crm.customers".
    pub endpoint: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// What the agent may touch: PII classes and writable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permissions {
    pub pii: PiiPermissions,
    pub writes: WritePermissions,
}

/// PII classes the agent may handle. Anything detected outside `allowed`
/// fails the evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PiiPermissions {
    #[serde(default)]
    pub allowed: Vec<PiiType>,
    #[serde(default)]
    pub denied: Vec<PiiType>,
}

/// Field-level write permissions over top-level payload keys.
///
/// An empty `allowed_fields` means "no allow-list declared" — only the
/// deny-list is enforced in that case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WritePermissions {
    #[serde(default)]
    pub allowed_fields: Vec<String>,
    #[serde(default)]
    pub denied_fields: Vec<String>,
}

/// Retention class stamped onto every audit record for this agent.
///
/// The class is obeyed by an external, time-triggered retention sweep;
/// the engine only records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetentionClass {
    A,
    B,
    C,
}

impl fmt::Display for RetentionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionClass::A => f.write_str("A"),
            RetentionClass::B => f.write_str("B"),
            RetentionClass::C => f.write_str("C"),
        }
    }
}

/// Audit-record retention policy declared by the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retention {
    pub class: RetentionClass,
    /// How long the record is kept at all.
    pub keep_for: RetentionPeriod,
    /// When the record's payload is scrubbed, if earlier than deletion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redact_after: Option<RetentionPeriod>,
}

/// Escalation configuration: confidence thresholds plus a routing hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Escalation {
    pub confidence_thresholds: ConfidenceThresholds,
    /// Where violations should be routed for review, e.g. a queue name.
    /// Advisory; the engine records it but does not deliver anywhere.
    #[serde(default)]
    pub on_violation: String,
}

/// The two cut points of the escalation ladder.
///
/// Invariant (enforced at load time): `0 <= human_review < limited_write <= 1`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    pub human_review: f64,
    pub limited_write: f64,
}

/// Absolute, confidence-independent prohibitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Guardrails {
    /// Action types that are never permitted, regardless of confidence or
    /// field permissions.
    #[serde(default)]
    pub prohibited_actions: BTreeSet<String>,
}

impl AgentContract {
    /// Validate the contract against the schema invariants.
    ///
    /// Called by the contract store after deserialization and before
    /// caching. A contract that passes here never produces a structural
    /// error during evaluation.
    ///
    /// Checks, in order:
    /// - `id` is non-empty and `version >= 1`
    /// - threshold ordering: `0 <= human_review < limited_write <= 1`
    /// - `allowed_fields` and `denied_fields` do not overlap
    /// - `permissions.pii.allowed` and `.denied` do not overlap
    /// - `redact_after <= keep_for` when `redact_after` is present
    pub fn validate(&self) -> WardenResult<()> {
        if self.id.trim().is_empty() {
            return Err(WardenError::ContractValidation {
                reason: "contract id must be non-empty".to_string(),
            });
        }
        if self.version == 0 {
            return Err(WardenError::ContractValidation {
                reason: "contract version must be >= 1".to_string(),
            });
        }

        let t = self.escalation.confidence_thresholds;
        if !t.human_review.is_finite() || !t.limited_write.is_finite() {
            return Err(WardenError::ContractValidation {
                reason: "confidence thresholds must be finite".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&t.human_review)
            || !(0.0..=1.0).contains(&t.limited_write)
            || t.human_review >= t.limited_write
        {
            return Err(WardenError::ContractValidation {
                reason: format!(
                    "confidence thresholds must satisfy 0 <= human_review < limited_write <= 1, \
                     got human_review={}, limited_write={}",
                    t.human_review, t.limited_write
                ),
            });
        }

        let writes = &self.permissions.writes;
        let allowed: BTreeSet<&str> = writes.allowed_fields.iter().map(String::as_str).collect();
        let overlap: Vec<&str> = writes
            .denied_fields
            .iter()
            .map(String::as_str)
            .filter(|f| allowed.contains(f))
            .collect();
        if !overlap.is_empty() {
            return Err(WardenError::ContractValidation {
                reason: format!(
                    "fields cannot be both allowed and denied: {}",
                    overlap.join(", ")
                ),
            });
        }

        let pii_allowed: BTreeSet<PiiType> = self.permissions.pii.allowed.iter().copied().collect();
        let pii_overlap: Vec<String> = self
            .permissions
            .pii
            .denied
            .iter()
            .filter(|t| pii_allowed.contains(t))
            .map(|t| t.to_string())
            .collect();
        if !pii_overlap.is_empty() {
            return Err(WardenError::ContractValidation {
                reason: format!(
                    "PII types cannot be both allowed and denied: {}",
                    pii_overlap.join(", ")
                ),
            });
        }

        if let Some(redact_after) = &self.retention.redact_after {
            if redact_after.0 > self.retention.keep_for.0 {
                return Err(WardenError::ContractValidation {
                    reason: format!(
                        "redact_after ({}) must not exceed keep_for ({})",
                        redact_after, self.retention.keep_for
                    ),
                });
            }
        }

        Ok(())
    }
}

// ── Retention periods ─────────────────────────────────────────────────────────

/// A retention duration, serialized as a compact string: `"90d"`, `"12h"`,
/// `"30m"`, or `"45s"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RetentionPeriod(pub Duration);

impl RetentionPeriod {
    const DAY: u64 = 86_400;
    const HOUR: u64 = 3_600;
    const MINUTE: u64 = 60;

    /// Parse a compact duration string: an integer followed by one of
    /// `d`, `h`, `m`, `s`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let err = || format!("invalid duration '{}': expected <number><d|h|m|s>", s.trim());
        let s = s.trim();
        // Split off the final character on its char boundary; a multibyte
        // unit suffix must parse as an error, never panic.
        let (unit_at, unit) = s.char_indices().last().ok_or_else(err)?;
        let count: u64 = s[..unit_at].parse().map_err(|_| err())?;
        let secs = match unit {
            'd' => count.checked_mul(Self::DAY),
            'h' => count.checked_mul(Self::HOUR),
            'm' => count.checked_mul(Self::MINUTE),
            's' => Some(count),
            _ => None,
        }
        .ok_or_else(err)?;
        Ok(Self(Duration::from_secs(secs)))
    }
}

impl fmt::Display for RetentionPeriod {
    /// Render using the largest unit that divides the duration exactly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        if secs > 0 && secs % Self::DAY == 0 {
            write!(f, "{}d", secs / Self::DAY)
        } else if secs > 0 && secs % Self::HOUR == 0 {
            write!(f, "{}h", secs / Self::HOUR)
        } else if secs > 0 && secs % Self::MINUTE == 0 {
            write!(f, "{}m", secs / Self::MINUTE)
        } else {
            write!(f, "{}s", secs)
        }
    }
}

impl Serialize for RetentionPeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RetentionPeriod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        RetentionPeriod::parse(&s).map_err(de::Error::custom)
    }
}
