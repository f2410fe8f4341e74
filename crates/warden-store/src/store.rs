//! The contract store: parse, validate once, cache as immutable snapshots.
//!
//! The cache maps `(agent_id, pinned_version)` to `Arc<AgentContract>`.
//! Readers clone the `Arc` under a read lock; reloads build the replacement
//! off-lock and swap the entry atomically, so no caller ever observes a
//! partially-updated contract.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use warden_contracts::{
    contract::AgentContract,
    error::{WardenError, WardenResult},
};
use warden_core::traits::ContractProvider;

use crate::source::{ContractDocument, ContractFormat, ContractSource};

type CacheKey = (String, Option<u32>);

/// The read-mostly contract store.
pub struct ContractStore {
    source: Box<dyn ContractSource>,
    cache: RwLock<HashMap<CacheKey, Arc<AgentContract>>>,
}

impl ContractStore {
    pub fn new(source: Box<dyn ContractSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch, parse, and validate a contract, bypassing the cache.
    fn fetch_validated(
        &self,
        agent_id: &str,
        version: Option<u32>,
    ) -> WardenResult<Arc<AgentContract>> {
        let document = self.source.fetch(agent_id, version)?;
        let contract = parse_document(&document)?;

        contract.validate().inspect_err(|e| {
            warn!(agent_id, error = %e, "contract failed validation");
        })?;

        if contract.id != agent_id {
            return Err(WardenError::ContractValidation {
                reason: format!(
                    "contract id '{}' does not match requested agent '{}'",
                    contract.id, agent_id
                ),
            });
        }
        if let Some(pinned) = version {
            if contract.version != pinned {
                return Err(WardenError::ContractValidation {
                    reason: format!(
                        "contract version {} does not match pinned version {}",
                        contract.version, pinned
                    ),
                });
            }
        }

        Ok(Arc::new(contract))
    }

    /// Refetch and atomically replace the cached entry.
    ///
    /// Hot-reload hook for an external file-watcher or config push. Readers
    /// holding the previous snapshot keep it; new loads see the replacement.
    pub fn reload(&self, agent_id: &str, version: Option<u32>) -> WardenResult<Arc<AgentContract>> {
        let fresh = self.fetch_validated(agent_id, version)?;
        let key = (agent_id.to_string(), version);
        self.cache
            .write()
            .expect("contract cache lock poisoned")
            .insert(key, Arc::clone(&fresh));
        debug!(agent_id, version = fresh.version, "contract reloaded");
        Ok(fresh)
    }
}

impl ContractProvider for ContractStore {
    /// Load a validated contract, serving from cache when possible.
    fn load(&self, agent_id: &str, version: Option<u32>) -> WardenResult<Arc<AgentContract>> {
        let key: CacheKey = (agent_id.to_string(), version);

        if let Some(cached) = self
            .cache
            .read()
            .expect("contract cache lock poisoned")
            .get(&key)
        {
            debug!(agent_id, "contract cache hit");
            return Ok(Arc::clone(cached));
        }

        let fresh = self.fetch_validated(agent_id, version)?;

        // A racing loader may have inserted already; keep the existing
        // snapshot so concurrent callers agree on one instance.
        let mut cache = self.cache.write().expect("contract cache lock poisoned");
        let entry = cache.entry(key).or_insert_with(|| Arc::clone(&fresh));
        Ok(Arc::clone(entry))
    }
}

/// Parse a raw document into an `AgentContract` according to its format.
fn parse_document(document: &ContractDocument) -> WardenResult<AgentContract> {
    match document.format {
        ContractFormat::Yaml => {
            serde_yaml::from_str(&document.text).map_err(|e| WardenError::ContractSource {
                reason: format!("invalid YAML contract: {e}"),
            })
        }
        ContractFormat::Json => {
            serde_json::from_str(&document.text).map_err(|e| WardenError::ContractSource {
                reason: format!("invalid JSON contract: {e}"),
            })
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
