//! # warden-contracts
//!
//! Shared types, schemas, and the error taxonomy for the WARDEN governance
//! engine.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions, load-time contract validation, and
//! error types.

pub mod audit;
pub mod contract;
pub mod error;
pub mod intent;
pub mod pii;
pub mod result;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use contract::{
        AgentContract, ConfidenceThresholds, Escalation, Guardrails, Permissions,
        PiiPermissions, Retention, RetentionClass, RetentionPeriod, WritePermissions,
    };
    use error::WardenError;
    use pii::PiiType;
    use result::{EscalationMode, PolicyResult};

    fn base_contract() -> AgentContract {
        AgentContract {
            id: "crm-update-agent".to_string(),
            version: 3,
            purpose: "apply reviewed updates to customer records".to_string(),
            scope: Default::default(),
            permissions: Permissions {
                pii: PiiPermissions {
                    allowed: vec![PiiType::Email],
                    denied: vec![PiiType::GovernmentId],
                },
                writes: WritePermissions {
                    allowed_fields: vec!["name".to_string(), "notes".to_string()],
                    denied_fields: vec!["ssn".to_string()],
                },
            },
            retention: Retention {
                class: RetentionClass::B,
                keep_for: RetentionPeriod::parse("90d").unwrap(),
                redact_after: Some(RetentionPeriod::parse("30d").unwrap()),
            },
            escalation: Escalation {
                confidence_thresholds: ConfidenceThresholds {
                    human_review: 0.5,
                    limited_write: 0.85,
                },
                on_violation: "review-queue/crm".to_string(),
            },
            guardrails: Guardrails::default(),
        }
    }

    // ── Contract validation ──────────────────────────────────────────────────

    #[test]
    fn valid_contract_passes_validation() {
        base_contract().validate().unwrap();
    }

    #[test]
    fn threshold_ordering_is_enforced() {
        let mut contract = base_contract();
        contract.escalation.confidence_thresholds = ConfidenceThresholds {
            human_review: 0.9,
            limited_write: 0.5,
        };
        let err = contract.validate().unwrap_err();
        assert!(matches!(err, WardenError::ContractValidation { .. }));
        assert!(err.to_string().contains("human_review"));
    }

    #[test]
    fn equal_thresholds_are_rejected() {
        let mut contract = base_contract();
        contract.escalation.confidence_thresholds = ConfidenceThresholds {
            human_review: 0.7,
            limited_write: 0.7,
        };
        assert!(contract.validate().is_err());
    }

    #[test]
    fn out_of_range_thresholds_are_rejected() {
        let mut contract = base_contract();
        contract.escalation.confidence_thresholds = ConfidenceThresholds {
            human_review: -0.1,
            limited_write: 0.85,
        };
        assert!(contract.validate().is_err());

        contract.escalation.confidence_thresholds = ConfidenceThresholds {
            human_review: 0.5,
            limited_write: 1.2,
        };
        assert!(contract.validate().is_err());
    }

    #[test]
    fn overlapping_field_lists_are_rejected() {
        let mut contract = base_contract();
        contract
            .permissions
            .writes
            .denied_fields
            .push("name".to_string());
        let err = contract.validate().unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn overlapping_pii_lists_are_rejected() {
        let mut contract = base_contract();
        contract.permissions.pii.denied.push(PiiType::Email);
        let err = contract.validate().unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn zero_version_is_rejected() {
        let mut contract = base_contract();
        contract.version = 0;
        assert!(contract.validate().is_err());
    }

    #[test]
    fn redact_after_beyond_keep_for_is_rejected() {
        let mut contract = base_contract();
        contract.retention.redact_after = Some(RetentionPeriod::parse("180d").unwrap());
        let err = contract.validate().unwrap_err();
        assert!(err.to_string().contains("redact_after"));
    }

    // ── Retention periods ────────────────────────────────────────────────────

    #[test]
    fn retention_period_parses_all_units() {
        assert_eq!(
            RetentionPeriod::parse("90d").unwrap().0,
            Duration::from_secs(90 * 86_400)
        );
        assert_eq!(
            RetentionPeriod::parse("12h").unwrap().0,
            Duration::from_secs(12 * 3_600)
        );
        assert_eq!(
            RetentionPeriod::parse("30m").unwrap().0,
            Duration::from_secs(30 * 60)
        );
        assert_eq!(
            RetentionPeriod::parse("45s").unwrap().0,
            Duration::from_secs(45)
        );
    }

    #[test]
    fn retention_period_rejects_garbage() {
        assert!(RetentionPeriod::parse("").is_err());
        assert!(RetentionPeriod::parse("d").is_err());
        assert!(RetentionPeriod::parse("90x").is_err());
        assert!(RetentionPeriod::parse("ninety days").is_err());
    }

    #[test]
    fn retention_period_rejects_multibyte_units_without_panicking() {
        // A multibyte unit suffix must be a parse error, not a slice panic —
        // this input arrives from untrusted contract documents via serde.
        assert!(RetentionPeriod::parse("90日").is_err());
        assert!(RetentionPeriod::parse("é").is_err());
        assert!(serde_json::from_str::<RetentionPeriod>("\"90日\"").is_err());
    }

    #[test]
    fn retention_period_round_trips_through_display() {
        for s in ["90d", "12h", "30m", "45s", "1d"] {
            let parsed = RetentionPeriod::parse(s).unwrap();
            assert_eq!(parsed.to_string(), s);
            let reparsed = RetentionPeriod::parse(&parsed.to_string()).unwrap();
            assert_eq!(parsed, reparsed);
        }
    }

    // ── Serde ────────────────────────────────────────────────────────────────

    #[test]
    fn contract_round_trips_through_json() {
        let contract = base_contract();
        let json = serde_json::to_string(&contract).unwrap();
        let decoded: AgentContract = serde_json::from_str(&json).unwrap();
        decoded.validate().unwrap();
        assert_eq!(decoded.id, contract.id);
        assert_eq!(decoded.version, contract.version);
        assert_eq!(
            decoded.retention.keep_for.to_string(),
            contract.retention.keep_for.to_string()
        );
    }

    #[test]
    fn escalation_mode_uses_screaming_snake_case() {
        let json = serde_json::to_string(&EscalationMode::HumanReview).unwrap();
        assert_eq!(json, "\"HUMAN_REVIEW\"");
        let decoded: EscalationMode = serde_json::from_str("\"FULL_AUTO\"").unwrap();
        assert_eq!(decoded, EscalationMode::FullAuto);
    }

    #[test]
    fn pii_type_tokens_are_stable() {
        assert_eq!(PiiType::Email.to_string(), "email");
        assert_eq!(PiiType::GovernmentId.to_string(), "government_id");
        assert_eq!(PiiType::PaymentCard.placeholder(), "[REDACTED_PAYMENT_CARD]");
        let json = serde_json::to_string(&PiiType::StreetAddress).unwrap();
        assert_eq!(json, "\"street_address\"");
    }

    // ── PolicyResult ─────────────────────────────────────────────────────────

    #[test]
    fn fail_closed_result_is_conservative() {
        let result = PolicyResult::fail_closed(result::CONTRACT_UNAVAILABLE);
        assert!(!result.pass);
        assert_eq!(result.violations, vec!["contract_unavailable"]);
        assert_eq!(result.mode, EscalationMode::HumanReview);
    }

    #[test]
    fn violation_codes_are_machine_parsable() {
        use result::violation;
        assert_eq!(
            violation::prohibited_action("delete_record"),
            "prohibited_action:delete_record"
        );
        assert_eq!(violation::denied_fields(&["a", "b"]), "denied_fields:a,b");
        assert_eq!(
            violation::pii_out_of_scope(PiiType::Email, "customer.notes"),
            "pii_out_of_scope:email:customer.notes"
        );
    }

    // ── Error display ────────────────────────────────────────────────────────

    #[test]
    fn error_messages_carry_context() {
        let err = WardenError::ContractNotFound {
            agent_id: "lead-agent".to_string(),
            version: Some(2),
        };
        assert!(err.to_string().contains("lead-agent"));

        let err = WardenError::AuditWriteFailed {
            reason: "sink unreachable".to_string(),
        };
        assert!(err.to_string().contains("audit write failed"));
        assert!(err.to_string().contains("sink unreachable"));

        let err = WardenError::KeyUnavailable {
            key_id: "tenant-7".to_string(),
        };
        assert!(err.to_string().contains("tenant-7"));
    }
}
