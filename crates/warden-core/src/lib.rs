//! # warden-core
//!
//! The fail-closed governance façade for the WARDEN engine.
//!
//! This crate provides:
//! - The three trust-boundary traits (`ContractProvider`, `PolicyEnforcer`,
//!   `AuditRecorder`)
//! - The `Governor` that composes them in the fixed order
//!   load → enforce → audit → return
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warden_core::{Governor, traits::{ContractProvider, PolicyEnforcer, AuditRecorder}};
//! ```

pub mod governor;
pub mod traits;

pub use governor::Governor;
