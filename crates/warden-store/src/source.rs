//! Contract sources: where raw contract documents come from.
//!
//! The engine treats contract authoring and storage as external; a source
//! only has to hand back the document text and its format. Parsing and
//! validation belong to the store.

use std::collections::HashMap;
use std::path::PathBuf;

use warden_contracts::error::{WardenError, WardenResult};

/// The document formats the store can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractFormat {
    Yaml,
    Json,
}

/// A raw, unparsed contract document.
#[derive(Debug, Clone)]
pub struct ContractDocument {
    pub format: ContractFormat,
    pub text: String,
}

/// Fetches contract documents by agent id and optional pinned version.
///
/// Implementations own their own deadlines: a fetch that cannot complete in
/// time returns `ContractSource` rather than blocking the evaluation
/// indefinitely.
pub trait ContractSource: Send + Sync {
    fn fetch(&self, agent_id: &str, version: Option<u32>) -> WardenResult<ContractDocument>;
}

// ── File-backed source ────────────────────────────────────────────────────────

/// Per-agent contract files under a root directory.
///
/// Unpinned loads resolve `<agent_id>.yaml|.yml|.json`; version-pinned loads
/// resolve `<agent_id>@<version>` with the same extensions. The first
/// existing candidate wins.
pub struct FileContractSource {
    root: PathBuf,
}

impl FileContractSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidates(&self, agent_id: &str, version: Option<u32>) -> Vec<(PathBuf, ContractFormat)> {
        let stem = match version {
            Some(v) => format!("{agent_id}@{v}"),
            None => agent_id.to_string(),
        };
        vec![
            (self.root.join(format!("{stem}.yaml")), ContractFormat::Yaml),
            (self.root.join(format!("{stem}.yml")), ContractFormat::Yaml),
            (self.root.join(format!("{stem}.json")), ContractFormat::Json),
        ]
    }
}

impl ContractSource for FileContractSource {
    fn fetch(&self, agent_id: &str, version: Option<u32>) -> WardenResult<ContractDocument> {
        for (path, format) in self.candidates(agent_id, version) {
            if !path.is_file() {
                continue;
            }
            let text = std::fs::read_to_string(&path).map_err(|e| WardenError::ContractSource {
                reason: format!("failed to read '{}': {}", path.display(), e),
            })?;
            return Ok(ContractDocument { format, text });
        }
        Err(WardenError::ContractNotFound {
            agent_id: agent_id.to_string(),
            version,
        })
    }
}

// ── In-memory source ──────────────────────────────────────────────────────────

/// A fixed in-memory source for tests and demos.
#[derive(Default)]
pub struct StaticContractSource {
    docs: HashMap<(String, Option<u32>), ContractDocument>,
}

impl StaticContractSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a YAML document for unpinned loads of `agent_id`.
    pub fn with_yaml(mut self, agent_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.docs.insert(
            (agent_id.into(), None),
            ContractDocument {
                format: ContractFormat::Yaml,
                text: text.into(),
            },
        );
        self
    }

    /// Register a JSON document for a version-pinned load of `agent_id`.
    pub fn with_json_version(
        mut self,
        agent_id: impl Into<String>,
        version: u32,
        text: impl Into<String>,
    ) -> Self {
        self.docs.insert(
            (agent_id.into(), Some(version)),
            ContractDocument {
                format: ContractFormat::Json,
                text: text.into(),
            },
        );
        self
    }

    /// Replace the unpinned document for `agent_id` (hot-reload simulation).
    pub fn replace_yaml(&mut self, agent_id: &str, text: impl Into<String>) {
        self.docs.insert(
            (agent_id.to_string(), None),
            ContractDocument {
                format: ContractFormat::Yaml,
                text: text.into(),
            },
        );
    }
}

impl ContractSource for StaticContractSource {
    fn fetch(&self, agent_id: &str, version: Option<u32>) -> WardenResult<ContractDocument> {
        self.docs
            .get(&(agent_id.to_string(), version))
            .cloned()
            .ok_or_else(|| WardenError::ContractNotFound {
                agent_id: agent_id.to_string(),
                version,
            })
    }
}
