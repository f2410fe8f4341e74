//! # warden-policy
//!
//! The pure decision layer of the WARDEN engine: the confidence gate and
//! the preflight enforcer. No I/O lives here — everything in this crate is
//! a deterministic function of `(AgentContract, WriteIntent)`.

pub mod enforcer;
pub mod gate;

pub use enforcer::Enforcer;
pub use gate::gate;
