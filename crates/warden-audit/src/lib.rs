//! # warden-audit
//!
//! The audit trail for the WARDEN engine: every evaluation produces exactly
//! one record, written through a pluggable `AuditSink` with bounded retry.
//! Payload and rationale are redacted before storage and the prompt template
//! is kept only as a SHA-256 digest, so the trail can be queried without
//! re-exposing the data the policy layer protects.

pub mod logger;
pub mod sink;

pub use logger::{AuditLogger, RetryPolicy};
pub use sink::{AuditSink, InMemoryAuditSink, SinkError};
