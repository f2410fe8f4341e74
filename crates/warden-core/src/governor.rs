//! The WARDEN governance façade: the single entry point for evaluations.
//!
//! The `Governor` enforces the fixed pipeline order:
//!
//!   load contract → preflight → audit write → return
//!
//! and the fail-closed policy on every failure path:
//!
//! - contract unavailable → `pass = false`, `mode = HUMAN_REVIEW`,
//!   violation `contract_unavailable` — never a default to FULL_AUTO
//! - audit write exhausted its retries → `pass = false`,
//!   `mode = HUMAN_REVIEW`, violation `audit_unavailable` — an action that
//!   cannot be audited is never authorized
//!
//! `evaluate` is infallible at the type level: the caller always receives a
//! well-formed decision it can act on, never an exception.

use tracing::{debug, error, warn};

use warden_contracts::{
    audit::ContractBinding,
    intent::{EvaluationRequest, EvaluationResponse},
    result::{PolicyResult, AUDIT_UNAVAILABLE, CONTRACT_UNAVAILABLE},
};

use crate::traits::{AuditRecorder, ContractProvider, PolicyEnforcer};

/// The central façade composing the trusted components.
///
/// Construct one `Governor` per deployment; it is `Send + Sync` and may be
/// shared across any number of concurrent evaluations — the only shared
/// mutable state lives inside the provider's cache and the recorder's sink,
/// both of which synchronize internally.
pub struct Governor {
    contracts: Box<dyn ContractProvider>,
    enforcer: Box<dyn PolicyEnforcer>,
    audit: Box<dyn AuditRecorder>,
}

impl Governor {
    /// Create a governor from its three trusted components.
    pub fn new(
        contracts: Box<dyn ContractProvider>,
        enforcer: Box<dyn PolicyEnforcer>,
        audit: Box<dyn AuditRecorder>,
    ) -> Self {
        Self {
            contracts,
            enforcer,
            audit,
        }
    }

    /// Evaluate one write intent and return a decision.
    ///
    /// # Pipeline
    ///
    /// 1. Load the contract for `request.agent_id` (pinned version if given).
    ///    On any load error, audit the refusal under an unresolved binding
    ///    and return the `contract_unavailable` fail-closed result.
    /// 2. Run the pure preflight decision procedure.
    /// 3. Write the audit record. Only after the sink acknowledges is the
    ///    result released to the caller; if the write fails after retries,
    ///    the result is replaced by the `audit_unavailable` fail-closed
    ///    result regardless of the upstream policy outcome.
    ///
    /// Exactly one audit-record attempt is made per call, on every path.
    pub fn evaluate(&self, request: &EvaluationRequest) -> EvaluationResponse {
        debug!(
            tenant_id = %request.tenant_id,
            agent_id = %request.agent_id,
            action_type = %request.write_intent.action_type,
            entity_id = %request.write_intent.entity_id,
            "evaluating write intent"
        );

        // ── Step 1: contract load ────────────────────────────────────────────
        let contract = match self
            .contracts
            .load(&request.agent_id, request.contract_version)
        {
            Ok(contract) => contract,
            Err(e) => {
                warn!(
                    agent_id = %request.agent_id,
                    error = %e,
                    "contract unavailable, failing closed"
                );
                let result = PolicyResult::fail_closed(CONTRACT_UNAVAILABLE);
                return self.seal(request, &ContractBinding::unresolved(), result);
            }
        };

        // ── Step 2: preflight (pure) ─────────────────────────────────────────
        let result = self.enforcer.preflight(&contract, &request.write_intent);

        if !result.pass {
            warn!(
                agent_id = %request.agent_id,
                contract_id = %contract.id,
                violations = ?result.violations,
                mode = %result.mode,
                route = %contract.escalation.on_violation,
                "write intent failed preflight"
            );
        }

        // ── Step 3: audit write, then release ────────────────────────────────
        self.seal(request, &ContractBinding::of(&contract), result)
    }

    /// Write the audit record for `result` and build the response.
    ///
    /// On `AuditWriteFailed` the policy outcome is discarded (logged for
    /// operators) and replaced by the conservative `audit_unavailable`
    /// result — no record, no action.
    fn seal(
        &self,
        request: &EvaluationRequest,
        binding: &ContractBinding,
        result: PolicyResult,
    ) -> EvaluationResponse {
        match self.audit.record(request, binding, &result) {
            Ok(record) => {
                debug!(
                    record_id = %record.record_id,
                    contract_id = %binding.contract_id,
                    pass = result.pass,
                    mode = %result.mode,
                    "audit record acknowledged"
                );
                EvaluationResponse {
                    success: result.pass,
                    policy: result,
                    contract_id: binding.contract_id.clone(),
                }
            }
            Err(e) => {
                error!(
                    agent_id = %request.agent_id,
                    contract_id = %binding.contract_id,
                    error = %e,
                    discarded_result = ?result,
                    "audit sink unavailable, refusing to authorize"
                );
                EvaluationResponse {
                    success: false,
                    policy: PolicyResult::fail_closed(AUDIT_UNAVAILABLE),
                    contract_id: binding.contract_id.clone(),
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use warden_contracts::{
        audit::{AuditRecord, ContractBinding},
        contract::{
            AgentContract, ConfidenceThresholds, Escalation, Guardrails, Permissions,
            PiiPermissions, Retention, RetentionClass, RetentionPeriod, WritePermissions,
        },
        error::{WardenError, WardenResult},
        intent::{EvaluationRequest, WriteIntent},
        result::{EscalationMode, PolicyResult},
    };

    use crate::traits::{AuditRecorder, ContractProvider, PolicyEnforcer};

    use super::Governor;

    // ── Fixtures ─────────────────────────────────────────────────────────────

    fn make_contract() -> AgentContract {
        AgentContract {
            id: "crm-update-agent".to_string(),
            version: 1,
            purpose: "test".to_string(),
            scope: Default::default(),
            permissions: Permissions {
                pii: PiiPermissions::default(),
                writes: WritePermissions::default(),
            },
            retention: Retention {
                class: RetentionClass::B,
                keep_for: RetentionPeriod::parse("90d").unwrap(),
                redact_after: None,
            },
            escalation: Escalation {
                confidence_thresholds: ConfidenceThresholds {
                    human_review: 0.5,
                    limited_write: 0.85,
                },
                on_violation: "review-queue".to_string(),
            },
            guardrails: Guardrails::default(),
        }
    }

    fn make_request(confidence: f64) -> EvaluationRequest {
        EvaluationRequest {
            tenant_id: "tenant-1".to_string(),
            agent_id: "crm-update-agent".to_string(),
            contract_version: None,
            model_version: "gpt-x-2025".to_string(),
            write_intent: WriteIntent {
                dest: "crm.customers".to_string(),
                payload: json!({ "name": "Jane" }),
                action_type: "update_record".to_string(),
                entity_type: "customer".to_string(),
                entity_id: "cust-42".to_string(),
                confidence,
                rationale: "routine update".to_string(),
            },
            prompt_template: "template-v1".to_string(),
        }
    }

    // ── Mocks ────────────────────────────────────────────────────────────────

    struct StaticProvider {
        contract: Arc<AgentContract>,
    }

    impl ContractProvider for StaticProvider {
        fn load(&self, _agent_id: &str, _version: Option<u32>) -> WardenResult<Arc<AgentContract>> {
            Ok(Arc::clone(&self.contract))
        }
    }

    struct FailingProvider;

    impl ContractProvider for FailingProvider {
        fn load(&self, agent_id: &str, version: Option<u32>) -> WardenResult<Arc<AgentContract>> {
            Err(WardenError::ContractNotFound {
                agent_id: agent_id.to_string(),
                version,
            })
        }
    }

    /// An enforcer that returns a pre-configured result.
    struct FixedEnforcer {
        result: PolicyResult,
    }

    impl PolicyEnforcer for FixedEnforcer {
        fn preflight(&self, _contract: &AgentContract, _intent: &WriteIntent) -> PolicyResult {
            self.result.clone()
        }
    }

    /// Records every call; can be flipped to fail all writes.
    struct MockRecorder {
        records: Arc<Mutex<Vec<AuditRecord>>>,
        attempts: Arc<AtomicUsize>,
        fail: bool,
    }

    impl MockRecorder {
        fn new(fail: bool) -> Self {
            Self {
                records: Arc::new(Mutex::new(vec![])),
                attempts: Arc::new(AtomicUsize::new(0)),
                fail,
            }
        }
    }

    impl AuditRecorder for MockRecorder {
        fn record(
            &self,
            request: &EvaluationRequest,
            binding: &ContractBinding,
            result: &PolicyResult,
        ) -> WardenResult<AuditRecord> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(WardenError::AuditWriteFailed {
                    reason: "sink down".to_string(),
                });
            }
            let record = AuditRecord {
                record_id: Uuid::new_v4(),
                tenant_id: request.tenant_id.clone(),
                agent_id: request.agent_id.clone(),
                contract_id: binding.contract_id.clone(),
                contract_version: binding.contract_version,
                model_version: request.model_version.clone(),
                prompt_template_sha256: "00".repeat(32),
                action_type: request.write_intent.action_type.clone(),
                entity_type: request.write_intent.entity_type.clone(),
                entity_id: request.write_intent.entity_id.clone(),
                payload: request.write_intent.payload.clone(),
                rationale_excerpt: request.write_intent.rationale.clone(),
                confidence: request.write_intent.confidence,
                result: result.clone(),
                retention_class: binding.retention_class,
                recorded_at: Utc::now(),
            };
            self.records.lock().unwrap().push(record.clone());
            Ok(record)
        }
    }

    fn passing_result(mode: EscalationMode) -> PolicyResult {
        PolicyResult {
            pass: true,
            violations: vec![],
            mode,
        }
    }

    // ── Tests ────────────────────────────────────────────────────────────────

    #[test]
    fn clean_evaluation_returns_enforcer_result() {
        let recorder = MockRecorder::new(false);
        let records = Arc::clone(&recorder.records);

        let governor = Governor::new(
            Box::new(StaticProvider {
                contract: Arc::new(make_contract()),
            }),
            Box::new(FixedEnforcer {
                result: passing_result(EscalationMode::FullAuto),
            }),
            Box::new(recorder),
        );

        let response = governor.evaluate(&make_request(0.95));
        assert!(response.success);
        assert!(response.policy.pass);
        assert_eq!(response.policy.mode, EscalationMode::FullAuto);
        assert_eq!(response.contract_id, "crm-update-agent");
        assert_eq!(records.lock().unwrap().len(), 1);
    }

    #[test]
    fn contract_unavailable_fails_closed_and_still_audits() {
        let recorder = MockRecorder::new(false);
        let records = Arc::clone(&recorder.records);

        let governor = Governor::new(
            Box::new(FailingProvider),
            Box::new(FixedEnforcer {
                result: passing_result(EscalationMode::FullAuto),
            }),
            Box::new(recorder),
        );

        let response = governor.evaluate(&make_request(0.99));
        assert!(!response.success);
        assert_eq!(response.policy.mode, EscalationMode::HumanReview);
        assert_eq!(response.policy.violations, vec!["contract_unavailable"]);
        assert_eq!(response.contract_id, "unresolved");

        // Invariant: the refusal is on record, stamped with class C.
        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].retention_class, RetentionClass::C);
        assert_eq!(records[0].contract_version, 0);
    }

    /// Scenario D: the sink fails every retry — the evaluation result is
    /// forced to the audit_unavailable refusal regardless of the upstream
    /// policy outcome.
    #[test]
    fn audit_failure_overrides_passing_result() {
        let governor = Governor::new(
            Box::new(StaticProvider {
                contract: Arc::new(make_contract()),
            }),
            Box::new(FixedEnforcer {
                result: passing_result(EscalationMode::FullAuto),
            }),
            Box::new(MockRecorder::new(true)),
        );

        let response = governor.evaluate(&make_request(0.99));
        assert!(!response.success);
        assert!(!response.policy.pass);
        assert_eq!(response.policy.mode, EscalationMode::HumanReview);
        assert_eq!(response.policy.violations, vec!["audit_unavailable"]);
        // The contract itself did resolve.
        assert_eq!(response.contract_id, "crm-update-agent");
    }

    /// 1:1 audit property: N evaluations produce exactly N records,
    /// including those that failed policy.
    #[test]
    fn one_audit_record_per_evaluation() {
        let recorder = MockRecorder::new(false);
        let records = Arc::clone(&recorder.records);

        let failing = PolicyResult {
            pass: false,
            violations: vec!["denied_fields:ssn".to_string()],
            mode: EscalationMode::FullAuto,
        };

        let governor = Governor::new(
            Box::new(StaticProvider {
                contract: Arc::new(make_contract()),
            }),
            Box::new(FixedEnforcer { result: failing }),
            Box::new(recorder),
        );

        for i in 0..7 {
            let response = governor.evaluate(&make_request(0.1 * i as f64));
            assert!(!response.success);
        }
        assert_eq!(records.lock().unwrap().len(), 7);
    }
}
