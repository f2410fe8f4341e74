//! Structure-aware redaction: walk a payload, replace matched leaves with
//! typed placeholders, and report the dotted path of every redaction.
//!
//! Traversal uses an explicit work stack rather than recursion, so
//! adversarially deep payloads cannot overflow the call stack.

use std::collections::BTreeMap;

use serde_json::Value;

use warden_contracts::pii::PiiType;

use crate::detector::PiiDetector;

/// Placeholder for values too large to scan within the detector's budget.
pub const OVERSIZED_PLACEHOLDER: &str = "[REDACTED_OVERSIZED]";

/// The outcome of redacting one payload.
#[derive(Debug, Clone)]
pub struct Redaction {
    /// The payload with every matched leaf replaced by its placeholder.
    pub payload: Value,
    /// Dotted field path → PII types found there, sorted by path.
    pub found: BTreeMap<String, Vec<PiiType>>,
    /// Paths of leaves that exceeded the scan budget and were replaced
    /// wholesale. Callers treat these fail-closed.
    pub oversized: Vec<String>,
}

/// Join a parent path and a child segment into dotted-path form.
fn join(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}

/// Visit every string leaf of `root` with its dotted path, in sorted path
/// order. Array elements use their index as a path segment.
pub fn string_leaves(root: &Value) -> Vec<(String, &str)> {
    let mut leaves = Vec::new();
    let mut stack: Vec<(String, &Value)> = vec![(String::new(), root)];

    while let Some((path, value)) = stack.pop() {
        match value {
            Value::String(s) => leaves.push((path, s.as_str())),
            Value::Object(map) => {
                for (key, child) in map {
                    stack.push((join(&path, key), child));
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    stack.push((join(&path, &index.to_string()), child));
                }
            }
            // Numbers, booleans, nulls carry no scannable text.
            _ => {}
        }
    }

    leaves.sort_by(|a, b| a.0.cmp(&b.0));
    leaves
}

impl PiiDetector {
    /// Redact every PII-bearing string leaf of `payload`.
    ///
    /// Each matched leaf is replaced by the concatenated placeholders of its
    /// detected types, in canonical type order — e.g. a value containing
    /// both an email and a phone number becomes
    /// `[REDACTED_EMAIL][REDACTED_PHONE]`.
    pub fn redact(&self, payload: &Value) -> Redaction {
        let mut out = payload.clone();
        let mut found: BTreeMap<String, Vec<PiiType>> = BTreeMap::new();
        let mut oversized: Vec<String> = Vec::new();

        let mut stack: Vec<(String, &mut Value)> = vec![(String::new(), &mut out)];
        while let Some((path, value)) = stack.pop() {
            match value {
                Value::String(s) => {
                    if self.exceeds_budget(s) {
                        *value = Value::String(OVERSIZED_PLACEHOLDER.to_string());
                        oversized.push(path);
                        continue;
                    }
                    let types = self.classify(s);
                    if !types.is_empty() {
                        let placeholder: String =
                            types.iter().map(|t| t.placeholder()).collect();
                        *value = Value::String(placeholder);
                        found.insert(path, types.into_iter().collect());
                    }
                }
                Value::Object(map) => {
                    for (key, child) in map.iter_mut() {
                        stack.push((join(&path, key), child));
                    }
                }
                Value::Array(items) => {
                    for (index, child) in items.iter_mut().enumerate() {
                        stack.push((join(&path, &index.to_string()), child));
                    }
                }
                _ => {}
            }
        }

        oversized.sort();
        Redaction {
            payload: out,
            found,
            oversized,
        }
    }

    /// Redact PII inside free text (e.g. an intent rationale), replacing
    /// each match in place rather than the whole value.
    ///
    /// Over-budget text collapses to the oversized placeholder.
    pub fn redact_text(&self, text: &str) -> String {
        if self.exceeds_budget(text) {
            return OVERSIZED_PLACEHOLDER.to_string();
        }
        let types = self.classify(text);
        let mut out = text.to_string();
        for pii_type in types {
            // classify() already confirmed a match for each returned type,
            // so re-running its pattern over the text is safe and cheap.
            for matcher in self.matchers_for(pii_type) {
                out = matcher
                    .pattern
                    .replace_all(&out, pii_type.placeholder().as_str())
                    .into_owned();
            }
        }
        out
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
