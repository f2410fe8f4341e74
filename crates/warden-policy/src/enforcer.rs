//! The preflight decision procedure: one pure pass from intent to verdict.
//!
//! Evaluation order is fixed and none of the steps short-circuit:
//!
//! 1. Guardrail check (prohibited action types)
//! 2. Field-permission check (deny-list and allow-list, independently)
//! 3. PII check over every string leaf of the payload and the rationale
//! 4. Confidence gate — always computed, even when violations exist
//!
//! Violations are data, not errors: this function cannot fail for a
//! malformed-but-valid-shaped intent. Payload values that are not objects
//! simply contribute no top-level keys; values too large to scan become
//! violations instead of hangs.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use warden_contracts::{
    contract::AgentContract,
    intent::WriteIntent,
    pii::PiiType,
    result::{violation, PolicyResult},
};
use warden_core::traits::PolicyEnforcer;
use warden_pii::{string_leaves, PiiDetector};

/// Field path used when reporting PII found in the rationale text.
const RATIONALE_PATH: &str = "rationale";

/// The WARDEN policy enforcer.
///
/// Holds only the (stateless) PII detector; `preflight` performs no I/O and
/// touches no clock, so identical inputs always produce identical results.
pub struct Enforcer {
    detector: PiiDetector,
}

impl Enforcer {
    /// An enforcer with the built-in PII matchers.
    pub fn new() -> Self {
        Self {
            detector: PiiDetector::new(),
        }
    }

    /// An enforcer using a caller-configured detector (custom matchers).
    pub fn with_detector(detector: PiiDetector) -> Self {
        Self { detector }
    }
}

impl Default for Enforcer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyEnforcer for Enforcer {
    fn preflight(&self, contract: &AgentContract, intent: &WriteIntent) -> PolicyResult {
        let mut violations: Vec<String> = Vec::new();

        // ── Step 1: guardrails ───────────────────────────────────────────────
        if contract
            .guardrails
            .prohibited_actions
            .contains(&intent.action_type)
        {
            violations.push(violation::prohibited_action(&intent.action_type));
        }

        // ── Step 2: field permissions over top-level payload keys ────────────
        //
        // Deny-list and allow-list are evaluated independently; both may
        // fire for the same key. Keys are sorted so the emitted csv is
        // deterministic.
        let keys: Vec<&str> = match &intent.payload {
            Value::Object(map) => {
                let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
                keys.sort_unstable();
                keys
            }
            _ => Vec::new(),
        };

        let denied: BTreeSet<&str> = contract
            .permissions
            .writes
            .denied_fields
            .iter()
            .map(String::as_str)
            .collect();
        let denied_hits: Vec<&str> = keys.iter().copied().filter(|k| denied.contains(k)).collect();
        if !denied_hits.is_empty() {
            violations.push(violation::denied_fields(&denied_hits));
        }

        let allowed: BTreeSet<&str> = contract
            .permissions
            .writes
            .allowed_fields
            .iter()
            .map(String::as_str)
            .collect();
        // An empty allow-list means no allow-list was declared.
        if !allowed.is_empty() {
            let not_allowed: Vec<&str> = keys
                .iter()
                .copied()
                .filter(|k| !allowed.contains(k))
                .collect();
            if !not_allowed.is_empty() {
                violations.push(violation::not_allowed_fields(&not_allowed));
            }
        }

        // ── Step 3: PII over payload leaves and rationale ────────────────────
        let pii_allowed: BTreeSet<PiiType> =
            contract.permissions.pii.allowed.iter().copied().collect();

        let mut leaves = string_leaves(&intent.payload);
        leaves.push((RATIONALE_PATH.to_string(), intent.rationale.as_str()));

        for (path, value) in &leaves {
            if self.detector.exceeds_budget(value) {
                violations.push(violation::pii_scan_budget_exceeded(path));
                continue;
            }
            for pii_type in self.detector.classify(value) {
                if !pii_allowed.contains(&pii_type) {
                    violations.push(violation::pii_out_of_scope(pii_type, path));
                }
            }
        }

        // ── Step 4: confidence gate, never short-circuited ───────────────────
        let mode = crate::gate::gate(
            intent.confidence,
            &contract.escalation.confidence_thresholds,
        );

        let pass = violations.is_empty();
        debug!(
            contract_id = %contract.id,
            action_type = %intent.action_type,
            pass,
            mode = %mode,
            violation_count = violations.len(),
            "preflight complete"
        );

        PolicyResult {
            pass,
            violations,
            mode,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
