//! WARDEN Governance Engine — Demo CLI
//!
//! Runs one or all of the governance scenarios. Each scenario uses real
//! WARDEN components (contract store, preflight enforcer, audit logger,
//! governor) wired together with a mock CRM agent contract.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- clean-update
//!   cargo run -p demo -- blocked-write
//!   cargo run -p demo -- pii-leak
//!   cargo run -p demo -- low-confidence
//!   cargo run -p demo -- audit-outage
//!   cargo run -p demo -- missing-contract

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use warden_audit::{AuditLogger, AuditSink, InMemoryAuditSink, RetryPolicy, SinkError};
use warden_contracts::{
    audit::AuditRecord,
    intent::{EvaluationRequest, WriteIntent},
};
use warden_core::Governor;
use warden_policy::Enforcer;
use warden_store::{ContractStore, StaticContractSource};

// ── CLI definition ────────────────────────────────────────────────────────────

/// WARDEN — contract-bound governance for agent write actions.
///
/// Each subcommand runs one or all of the governance scenarios,
/// demonstrating guardrails, field permissions, PII scope enforcement,
/// confidence gating, and the fail-closed audit invariant.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "WARDEN governance engine demo",
    long_about = "Runs WARDEN governance scenarios showing contract loading,\n\
                  preflight enforcement, confidence gating, PII redaction,\n\
                  and the no-record-no-action audit invariant."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all governance scenarios in sequence.
    RunAll,
    /// An in-scope update that passes and runs FULL_AUTO.
    CleanUpdate,
    /// A write touching a denied field plus a prohibited action type.
    BlockedWrite,
    /// A payload carrying PII outside the contract's allowed set.
    PiiLeak,
    /// A pass-worthy write routed to HUMAN_REVIEW by low confidence.
    LowConfidence,
    /// The audit sink is down: every outcome becomes a refusal.
    AuditOutage,
    /// No contract on file for the agent: fail closed, still audited.
    MissingContract,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging. Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    match cli.command {
        Command::RunAll => {
            run_clean_update();
            run_blocked_write();
            run_pii_leak();
            run_low_confidence();
            run_audit_outage();
            run_missing_contract();
        }
        Command::CleanUpdate => run_clean_update(),
        Command::BlockedWrite => run_blocked_write(),
        Command::PiiLeak => run_pii_leak(),
        Command::LowConfidence => run_low_confidence(),
        Command::AuditOutage => run_audit_outage(),
        Command::MissingContract => run_missing_contract(),
    }

    println!("All selected scenarios completed.");
}

// ── The demo contract ─────────────────────────────────────────────────────────

const CRM_CONTRACT_YAML: &str = r#"
id: crm-update-agent
version: 3
purpose: apply reviewed updates to customer records
scope:
  inputs:
    - endpoint: crm.leads
      fields: [name, notes]
  outputs:
    - endpoint: crm.customers
      fields: [name, notes, status]
permissions:
  pii:
    allowed: [email]
    denied: [government_id, payment_card]
  writes:
    allowed_fields: [name, notes, status]
    denied_fields: [ssn, credit_card]
retention:
  class: B
  keep_for: 90d
  redact_after: 30d
escalation:
  confidence_thresholds:
    human_review: 0.5
    limited_write: 0.85
  on_violation: review-queue/crm
guardrails:
  prohibited_actions: [delete_record, schema_change, bulk_update]
"#;

// ── Wiring ────────────────────────────────────────────────────────────────────

/// A sink that refuses every insert, for the audit-outage scenario.
struct DownSink;

impl AuditSink for DownSink {
    fn insert(&self, _record: &AuditRecord) -> Result<(), SinkError> {
        Err(SinkError::transient("audit store unreachable"))
    }
}

/// Build a governor over the demo contract and the given audit sink.
fn make_governor(sink: Box<dyn AuditSink>) -> Governor {
    let store = ContractStore::new(Box::new(
        StaticContractSource::new().with_yaml("crm-update-agent", CRM_CONTRACT_YAML),
    ));
    Governor::new(
        Box::new(store),
        Box::new(Enforcer::new()),
        Box::new(AuditLogger::new(sink).with_retry(RetryPolicy {
            max_attempts: 2,
            base_delay: std::time::Duration::from_millis(10),
            max_delay: std::time::Duration::from_millis(20),
        })),
    )
}

fn make_request(agent_id: &str, intent: WriteIntent) -> EvaluationRequest {
    EvaluationRequest {
        tenant_id: "acme-corp".to_string(),
        agent_id: agent_id.to_string(),
        contract_version: None,
        model_version: "gpt-x-2025-08".to_string(),
        write_intent: intent,
        prompt_template: "You are a CRM assistant. Apply the requested update.".to_string(),
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

fn run_clean_update() {
    print_header("Clean update", "in-scope fields, high confidence");

    let sink = InMemoryAuditSink::new();
    let governor = make_governor(Box::new(sink.clone()));

    let request = make_request(
        "crm-update-agent",
        WriteIntent {
            dest: "crm.customers".to_string(),
            payload: json!({ "name": "Jane Doe", "status": "active" }),
            action_type: "update_record".to_string(),
            entity_type: "customer".to_string(),
            entity_id: "cust-42".to_string(),
            confidence: 0.93,
            rationale: "customer confirmed the name change by support ticket".to_string(),
        },
    );

    let response = governor.evaluate(&request);
    print_response(&response);
    print_audit(&sink);
}

fn run_blocked_write() {
    print_header("Blocked write", "denied field + prohibited action type");

    let sink = InMemoryAuditSink::new();
    let governor = make_governor(Box::new(sink.clone()));

    let request = make_request(
        "crm-update-agent",
        WriteIntent {
            dest: "crm.customers".to_string(),
            payload: json!({ "ssn": "123-45-6789", "name": "Jane Doe" }),
            action_type: "delete_record".to_string(),
            entity_type: "customer".to_string(),
            entity_id: "cust-42".to_string(),
            confidence: 0.97,
            rationale: "cleanup of stale records".to_string(),
        },
    );

    let response = governor.evaluate(&request);
    print_response(&response);
    print_audit(&sink);
}

fn run_pii_leak() {
    print_header("PII leak", "government id in an allowed field");

    let sink = InMemoryAuditSink::new();
    let governor = make_governor(Box::new(sink.clone()));

    let request = make_request(
        "crm-update-agent",
        WriteIntent {
            dest: "crm.customers".to_string(),
            payload: json!({
                "notes": "customer provided SSN 123-45-6789 over the phone",
            }),
            action_type: "update_record".to_string(),
            entity_type: "customer".to_string(),
            entity_id: "cust-42".to_string(),
            confidence: 0.91,
            rationale: "recording the customer's identity details".to_string(),
        },
    );

    let response = governor.evaluate(&request);
    print_response(&response);
    print_audit(&sink);
}

fn run_low_confidence() {
    print_header("Low confidence", "clean payload below the review threshold");

    let sink = InMemoryAuditSink::new();
    let governor = make_governor(Box::new(sink.clone()));

    let request = make_request(
        "crm-update-agent",
        WriteIntent {
            dest: "crm.customers".to_string(),
            payload: json!({ "status": "churned" }),
            action_type: "update_record".to_string(),
            entity_type: "customer".to_string(),
            entity_id: "cust-42".to_string(),
            confidence: 0.42,
            rationale: "inferred from a single unanswered email".to_string(),
        },
    );

    let response = governor.evaluate(&request);
    print_response(&response);
    print_audit(&sink);
}

fn run_audit_outage() {
    print_header("Audit outage", "sink down, passing result discarded");

    let governor = make_governor(Box::new(DownSink));

    let request = make_request(
        "crm-update-agent",
        WriteIntent {
            dest: "crm.customers".to_string(),
            payload: json!({ "name": "Jane Doe" }),
            action_type: "update_record".to_string(),
            entity_type: "customer".to_string(),
            entity_id: "cust-42".to_string(),
            confidence: 0.99,
            rationale: "routine update".to_string(),
        },
    );

    let response = governor.evaluate(&request);
    print_response(&response);
    println!("  (no audit record could be written — hence the refusal)");
    println!();
}

fn run_missing_contract() {
    print_header("Missing contract", "unknown agent fails closed");

    let sink = InMemoryAuditSink::new();
    let governor = make_governor(Box::new(sink.clone()));

    let request = make_request(
        "unregistered-agent",
        WriteIntent {
            dest: "crm.customers".to_string(),
            payload: json!({ "name": "Jane Doe" }),
            action_type: "update_record".to_string(),
            entity_type: "customer".to_string(),
            entity_id: "cust-42".to_string(),
            confidence: 0.99,
            rationale: "routine update".to_string(),
        },
    );

    let response = governor.evaluate(&request);
    print_response(&response);
    print_audit(&sink);
}

// ── Output helpers ────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("WARDEN — Agent Action Governance Engine");
    println!("=======================================");
    println!();
    println!("Evaluation pipeline per write intent:");
    println!("  [1] Load and validate the agent's contract (fail closed if missing)");
    println!("  [2] Preflight: guardrails, field permissions, per-field PII scan");
    println!("  [3] Confidence gate → HUMAN_REVIEW / LIMITED_WRITE / FULL_AUTO");
    println!("  [4] Redacted audit record written — no record, no action");
    println!();
}

fn print_header(name: &str, detail: &str) {
    println!("── {name} ({detail})");
}

fn print_response(response: &warden_contracts::intent::EvaluationResponse) {
    println!("  contract: {}", response.contract_id);
    println!(
        "  verdict:  pass={} mode={}",
        response.policy.pass, response.policy.mode
    );
    if response.policy.violations.is_empty() {
        println!("  violations: none");
    } else {
        for v in &response.policy.violations {
            println!("  violation: {v}");
        }
    }
}

fn print_audit(sink: &InMemoryAuditSink) {
    for record in sink.records() {
        println!(
            "  audit: record_id={} class={:?} payload={}",
            record.record_id, record.retention_class, record.payload
        );
    }
    println!();
}
