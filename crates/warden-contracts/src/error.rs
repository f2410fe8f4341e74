//! Error taxonomy for the WARDEN governance engine.
//!
//! All fallible operations in the WARDEN pipeline return `WardenResult<T>`.
//! Note what is deliberately absent: there is no `PolicyViolation` variant.
//! Violations are data inside a `PolicyResult`, never errors — the engine
//! always hands the caller a well-formed decision.

use thiserror::Error;

/// The unified error type for the WARDEN crates.
#[derive(Debug, Error)]
pub enum WardenError {
    /// No contract exists for the requested agent (and pinned version).
    #[error("no contract found for agent '{agent_id}' (version {version:?})")]
    ContractNotFound {
        agent_id: String,
        version: Option<u32>,
    },

    /// A contract document was fetched but failed schema validation.
    ///
    /// This is a load/deploy-time error surfaced to operators; a validated
    /// contract can never produce it per-request.
    #[error("contract validation failed: {reason}")]
    ContractValidation { reason: String },

    /// The contract source itself failed: I/O error, malformed document,
    /// or a fetch that exceeded the source's own deadline.
    #[error("contract source error: {reason}")]
    ContractSource { reason: String },

    /// The audit sink did not acknowledge the record within the retry budget.
    ///
    /// This is fatal to the request — an action that cannot be audited
    /// cannot be authorized.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// A field-encryption or decryption operation failed, including AEAD
    /// tag verification failures on tampered envelopes.
    #[error("encryption error: {reason}")]
    Encryption { reason: String },

    /// The key provider could not supply the requested key.
    #[error("key '{key_id}' is not available from the key provider")]
    KeyUnavailable { key_id: String },
}

/// Convenience alias used throughout the WARDEN crates.
pub type WardenResult<T> = Result<T, WardenError>;
