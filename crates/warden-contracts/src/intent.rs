//! The write intent and the evaluation request/response envelope.
//!
//! A `WriteIntent` is produced by an external (untrusted, possibly
//! LLM-driven) agent. The engine never executes the write — it only decides
//! whether the caller may.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::PolicyResult;

/// A proposed mutation submitted by an agent for policy evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteIntent {
    /// Where the write would land, e.g. "crm.customers".
    pub dest: String,
    /// Arbitrary nested key/value structure. The engine inspects top-level
    /// keys for field permissions and every string leaf for PII.
    pub payload: Value,
    /// Action discriminant matched against contract guardrails,
    /// e.g. "update_record", "delete_record", "schema_change".
    pub action_type: String,
    /// The entity kind being mutated, e.g. "customer".
    pub entity_type: String,
    /// The specific entity, e.g. a CRM record id.
    pub entity_id: String,
    /// The agent's self-reported confidence in this write, 0..1.
    pub confidence: f64,
    /// Free-text justification. Scanned for PII like any payload value.
    pub rationale: String,
}

/// The inbound evaluation request, as handed over by the (excluded)
/// transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub tenant_id: String,
    pub agent_id: String,
    /// Pin a specific contract version; `None` loads the source's latest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_version: Option<u32>,
    /// The model that produced the intent, recorded verbatim in the audit log.
    pub model_version: String,
    pub write_intent: WriteIntent,
    /// The prompt template behind the intent. Only its SHA-256 is ever
    /// persisted — the raw template never reaches the audit log.
    pub prompt_template: String,
}

/// The engine's reply. Always well-formed: failures of any kind are folded
/// into a conservative `PolicyResult`, never surfaced as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResponse {
    /// Mirror of `policy.pass`, for callers that only need the verdict.
    pub success: bool,
    pub policy: PolicyResult,
    /// The contract that was applied, or `"unresolved"` when no contract
    /// could be loaded.
    pub contract_id: String,
}
