//! # warden-pii
//!
//! PII detection, redaction, and field-level AEAD encryption for the WARDEN
//! governance engine.
//!
//! The three surfaces, all stateless transforms safe under arbitrary
//! concurrency:
//!
//! - [`PiiDetector::classify`] — per-field classification into `PiiType`s
//! - [`PiiDetector::redact`] / [`PiiDetector::redact_text`] — placeholder
//!   substitution with dotted-path attribution
//! - [`crypto::encrypt_fields`] / [`crypto::decrypt_fields`] — reversible
//!   AES-256-GCM envelopes, fail-closed to redaction

pub mod crypto;
pub mod detector;
pub mod redact;

pub use crypto::{decrypt_fields, encrypt_fields, Envelope, KeyProvider, StaticKeyProvider};
pub use detector::{Matcher, PiiDetector, SCAN_BUDGET_BYTES};
pub use redact::{string_leaves, Redaction, OVERSIZED_PLACEHOLDER};
