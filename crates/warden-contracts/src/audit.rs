//! The append-only audit record and its contract binding.
//!
//! One `AuditRecord` exists per evaluated intent — pass or fail — and is
//! never mutated after the sink acknowledges it. Deletion or payload
//! scrubbing is driven by an external retention sweep reading
//! `retention_class`; the engine only stamps the class.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::contract::{AgentContract, RetentionClass};
use crate::result::PolicyResult;

/// Which contract (if any) an evaluation was bound to.
///
/// Kept separate from `AgentContract` so the fail-closed path — where no
/// contract could be loaded — can still produce an audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractBinding {
    pub contract_id: String,
    /// 0 on the unresolved path; real contracts start at 1.
    pub contract_version: u32,
    pub retention_class: RetentionClass,
}

impl ContractBinding {
    /// Binding for a loaded, validated contract.
    pub fn of(contract: &AgentContract) -> Self {
        Self {
            contract_id: contract.id.clone(),
            contract_version: contract.version,
            retention_class: contract.retention.class,
        }
    }

    /// Binding used when the contract could not be loaded. Records under
    /// class C — the longest-lived class — so refusals stay reviewable.
    pub fn unresolved() -> Self {
        Self {
            contract_id: "unresolved".to_string(),
            contract_version: 0,
            retention_class: RetentionClass::C,
        }
    }
}

/// One immutable audit entry per evaluated intent.
///
/// `payload` and `rationale_excerpt` are redacted views — no raw PII value
/// is ever stored here, and the prompt template appears only as its SHA-256.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub record_id: Uuid,
    pub tenant_id: String,
    pub agent_id: String,
    pub contract_id: String,
    pub contract_version: u32,
    pub model_version: String,
    /// Lowercase hex SHA-256 of the prompt template. Never the raw prompt.
    pub prompt_template_sha256: String,
    pub action_type: String,
    pub entity_type: String,
    pub entity_id: String,
    /// The intent payload after redaction.
    pub payload: Value,
    /// The redacted rationale, truncated to a bounded excerpt.
    pub rationale_excerpt: String,
    pub confidence: f64,
    pub result: PolicyResult,
    pub retention_class: RetentionClass,
    pub recorded_at: DateTime<Utc>,
}
