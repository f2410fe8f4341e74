//! # warden-store
//!
//! Contract loading for the WARDEN engine: fetch a YAML/JSON document from
//! a `ContractSource`, validate it once against the schema invariants, and
//! cache it as an immutable `Arc` snapshot with swap-on-reload semantics.

pub mod source;
pub mod store;

pub use source::{ContractDocument, ContractFormat, ContractSource, FileContractSource, StaticContractSource};
pub use store::ContractStore;
