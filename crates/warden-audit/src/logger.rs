//! The audit logger: build a redacted record, persist it durably, retry
//! transient sink failures with bounded exponential backoff.
//!
//! The record is a redacted view, never a restorable one — payload and
//! rationale pass through the PII redactor before the sink sees them, and
//! the prompt template is stored only as its SHA-256. Encrypting for the
//! audit trail is deliberately not offered: it would couple audit
//! durability to key availability.

use std::time::Duration;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use uuid::Uuid;

use warden_contracts::{
    audit::{AuditRecord, ContractBinding},
    error::{WardenError, WardenResult},
    intent::EvaluationRequest,
    result::PolicyResult,
};
use warden_core::traits::AuditRecorder;
use warden_pii::PiiDetector;

use crate::sink::AuditSink;

/// Longest rationale excerpt stored in a record, in characters.
const RATIONALE_EXCERPT_CHARS: usize = 256;

/// Bounded exponential backoff for transient sink failures.
///
/// The delay doubles after each failed attempt, capped at `max_delay`.
/// Non-transient errors abort immediately — retrying a schema rejection
/// only burns the caller's latency budget.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(25),
            max_delay: Duration::from_millis(250),
        }
    }
}

/// The WARDEN audit logger.
pub struct AuditLogger {
    sink: Box<dyn AuditSink>,
    detector: PiiDetector,
    retry: RetryPolicy,
}

impl AuditLogger {
    /// A logger with the built-in PII matchers and default retry policy.
    pub fn new(sink: Box<dyn AuditSink>) -> Self {
        Self {
            sink,
            detector: PiiDetector::new(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_detector(mut self, detector: PiiDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Insert with retry; returns only after the sink acknowledged or the
    /// budget is exhausted.
    fn insert_durably(&self, record: &AuditRecord) -> WardenResult<()> {
        let mut delay = self.retry.base_delay;
        let mut last_reason = String::new();

        for attempt in 1..=self.retry.max_attempts {
            match self.sink.insert(record) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(
                        record_id = %record.record_id,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        transient = e.transient,
                        error = %e,
                        "audit sink insert failed"
                    );
                    last_reason = e.reason.clone();
                    if !e.transient {
                        break;
                    }
                    if attempt < self.retry.max_attempts {
                        std::thread::sleep(delay);
                        delay = (delay * 2).min(self.retry.max_delay);
                    }
                }
            }
        }

        Err(WardenError::AuditWriteFailed {
            reason: last_reason,
        })
    }
}

impl AuditRecorder for AuditLogger {
    fn record(
        &self,
        request: &EvaluationRequest,
        binding: &ContractBinding,
        result: &PolicyResult,
    ) -> WardenResult<AuditRecord> {
        let intent = &request.write_intent;

        let redaction = self.detector.redact(&intent.payload);
        let rationale = truncate_chars(
            &self.detector.redact_text(&intent.rationale),
            RATIONALE_EXCERPT_CHARS,
        );

        let record = AuditRecord {
            record_id: Uuid::new_v4(),
            tenant_id: request.tenant_id.clone(),
            agent_id: request.agent_id.clone(),
            contract_id: binding.contract_id.clone(),
            contract_version: binding.contract_version,
            model_version: request.model_version.clone(),
            prompt_template_sha256: sha256_hex(&request.prompt_template),
            action_type: intent.action_type.clone(),
            entity_type: intent.entity_type.clone(),
            entity_id: intent.entity_id.clone(),
            payload: redaction.payload,
            rationale_excerpt: rationale,
            confidence: intent.confidence,
            result: result.clone(),
            retention_class: binding.retention_class,
            recorded_at: Utc::now(),
        };

        self.insert_durably(&record)?;
        debug!(
            record_id = %record.record_id,
            redacted_paths = redaction.found.len(),
            "audit record persisted"
        );
        Ok(record)
    }
}

/// Lowercase hex SHA-256 of `input`.
fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Truncate on a character boundary, never mid-codepoint.
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────
