//! Core trait definitions for the WARDEN evaluation pipeline.
//!
//! These three traits define the trust boundary the `Governor` composes:
//!
//! - `ContractProvider` — loads and caches validated policy contracts
//! - `PolicyEnforcer`   — the pure preflight decision procedure
//! - `AuditRecorder`    — persists one immutable record per evaluation
//!
//! The façade wires them in the fixed order load → enforce → audit → return.
//! Implementations must be safe to call from any number of threads.

use std::sync::Arc;

use warden_contracts::{
    audit::{AuditRecord, ContractBinding},
    contract::AgentContract,
    error::WardenResult,
    intent::{EvaluationRequest, WriteIntent},
    result::PolicyResult,
};

/// Loads a validated contract by agent id, optionally pinned to a version.
///
/// Implementations own caching and hot-reload; callers receive immutable
/// `Arc` snapshots, so a reload never exposes a partially-updated contract.
pub trait ContractProvider: Send + Sync {
    /// Return the contract for `agent_id`, or an error when it does not
    /// exist, fails validation, or the source cannot be reached in time.
    fn load(&self, agent_id: &str, version: Option<u32>) -> WardenResult<Arc<AgentContract>>;
}

/// The preflight decision procedure.
///
/// Implementations must be pure: no I/O, no clock, no randomness. The same
/// `(contract, intent)` pair always yields an identical `PolicyResult` —
/// the determinism invariant callers and auditors rely on.
pub trait PolicyEnforcer: Send + Sync {
    /// Evaluate `intent` against `contract`. Violations are data inside the
    /// returned result, never errors.
    fn preflight(&self, contract: &AgentContract, intent: &WriteIntent) -> PolicyResult;
}

/// Persists exactly one audit record per evaluated intent.
///
/// `record` must not return until the underlying sink has acknowledged the
/// write — "no record, no action" is load-bearing for compliance. A failure
/// here forces the façade to refuse the action.
pub trait AuditRecorder: Send + Sync {
    /// Build a redacted record for this evaluation and persist it durably.
    fn record(
        &self,
        request: &EvaluationRequest,
        binding: &ContractBinding,
        result: &PolicyResult,
    ) -> WardenResult<AuditRecord>;
}
