//! Reversible field-level encryption with AES-256-GCM.
//!
//! Each targeted field is replaced by an authenticated-encryption envelope
//! carrying algorithm, key id, a fresh random nonce, ciphertext, and the
//! AEAD tag as separate base64 fields. Decryption verifies the tag before
//! any plaintext is returned; a tampered envelope is an error, never
//! corrupted data.
//!
//! Key material comes exclusively from the caller-supplied `KeyProvider` —
//! this module never generates, stores, or caches long-lived keys.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use warden_contracts::error::{WardenError, WardenResult};

/// The only algorithm the envelope format currently carries.
pub const ENVELOPE_ALGORITHM: &str = "AES-256-GCM";

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Placeholder substituted when a field cannot be encrypted. The fallback
/// is always redaction — never plaintext, never partial ciphertext.
pub const ENCRYPTION_FALLBACK_PLACEHOLDER: &str = "[REDACTED_ENCRYPTION_FAILED]";

/// Supplies symmetric keys by id. An external collaborator: provisioning,
/// rotation, and storage of keys happen outside the engine.
pub trait KeyProvider: Send + Sync {
    /// Return the 256-bit key for `key_id`, or `KeyUnavailable`.
    fn key(&self, key_id: &str) -> WardenResult<[u8; 32]>;
}

/// A fixed in-memory key provider for tests and demos.
pub struct StaticKeyProvider {
    key_id: String,
    key: [u8; 32],
}

impl StaticKeyProvider {
    pub fn new(key_id: impl Into<String>, key: [u8; 32]) -> Self {
        Self {
            key_id: key_id.into(),
            key,
        }
    }
}

impl KeyProvider for StaticKeyProvider {
    fn key(&self, key_id: &str) -> WardenResult<[u8; 32]> {
        if key_id == self.key_id {
            Ok(self.key)
        } else {
            Err(WardenError::KeyUnavailable {
                key_id: key_id.to_string(),
            })
        }
    }
}

/// The on-wire envelope replacing an encrypted field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub algorithm: String,
    pub key_id: String,
    /// 12-byte nonce, base64. Fresh from `OsRng` for every envelope.
    pub nonce: String,
    /// Ciphertext without the tag, base64.
    pub ciphertext: String,
    /// 16-byte AEAD tag, base64. Verified before decryption returns.
    pub tag: String,
}

impl Envelope {
    /// True if `value` has the shape of an envelope this module produced.
    pub fn is_envelope(value: &Value) -> bool {
        value.get("algorithm").and_then(Value::as_str) == Some(ENVELOPE_ALGORITHM)
            && value.get("nonce").is_some()
            && value.get("ciphertext").is_some()
            && value.get("tag").is_some()
    }
}

/// Encrypt one JSON value into an envelope under `key_id`.
fn seal_value(value: &Value, key_id: &str, key: &[u8; 32]) -> WardenResult<Envelope> {
    let plaintext = serde_json::to_vec(value).map_err(|e| WardenError::Encryption {
        reason: format!("field serialization failed: {e}"),
    })?;

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| WardenError::Encryption {
        reason: "invalid key length".to_string(),
    })?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // aes-gcm appends the tag to the ciphertext; the envelope carries it
    // as its own field.
    let mut sealed = cipher
        .encrypt(nonce, plaintext.as_slice())
        .map_err(|_| WardenError::Encryption {
            reason: "AEAD encryption failed".to_string(),
        })?;
    if sealed.len() < TAG_LEN {
        return Err(WardenError::Encryption {
            reason: "ciphertext shorter than tag".to_string(),
        });
    }
    let tag = sealed.split_off(sealed.len() - TAG_LEN);

    Ok(Envelope {
        algorithm: ENVELOPE_ALGORITHM.to_string(),
        key_id: key_id.to_string(),
        nonce: BASE64.encode(nonce_bytes),
        ciphertext: BASE64.encode(sealed),
        tag: BASE64.encode(tag),
    })
}

/// Decrypt one envelope back into its JSON value, verifying the tag.
fn open_envelope(envelope: &Envelope, key: &[u8; 32]) -> WardenResult<Value> {
    if envelope.algorithm != ENVELOPE_ALGORITHM {
        return Err(WardenError::Encryption {
            reason: format!("unsupported algorithm '{}'", envelope.algorithm),
        });
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| WardenError::Encryption {
        reason: "invalid key length".to_string(),
    })?;

    let decode = |field: &str, data: &str| {
        BASE64.decode(data).map_err(|e| WardenError::Encryption {
            reason: format!("invalid base64 in envelope {field}: {e}"),
        })
    };
    let nonce_bytes = decode("nonce", &envelope.nonce)?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(WardenError::Encryption {
            reason: "invalid nonce length".to_string(),
        });
    }
    let mut combined = decode("ciphertext", &envelope.ciphertext)?;
    combined.extend(decode("tag", &envelope.tag)?);

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), combined.as_slice())
        .map_err(|_| WardenError::Encryption {
            reason: "AEAD tag verification failed".to_string(),
        })?;

    serde_json::from_slice(&plaintext).map_err(|e| WardenError::Encryption {
        reason: format!("decrypted payload is not valid JSON: {e}"),
    })
}

/// Resolve a dotted field path to a mutable value, if present.
fn value_at_path_mut<'v>(root: &'v mut Value, path: &str) -> Option<&'v mut Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Encrypt the listed fields of `payload` in place of their plaintext.
///
/// Fields are dotted paths; paths absent from the payload are skipped.
/// Per the fail-closed contract, any field that cannot be encrypted — key
/// unavailable, serialization failure, cipher failure — is replaced by a
/// redaction placeholder instead, and its path is returned in the second
/// tuple element. Plaintext never survives in a targeted field.
pub fn encrypt_fields(
    payload: &Value,
    fields: &[&str],
    key_id: &str,
    provider: &dyn KeyProvider,
) -> (Value, Vec<String>) {
    let mut out = payload.clone();
    let mut fallbacks = Vec::new();

    let key = match provider.key(key_id) {
        Ok(key) => Some(key),
        Err(e) => {
            warn!(key_id = %key_id, error = %e, "key unavailable, redacting targeted fields");
            None
        }
    };

    for field in fields {
        let Some(slot) = value_at_path_mut(&mut out, field) else {
            continue;
        };

        let sealed = key
            .as_ref()
            .ok_or(())
            .and_then(|k| seal_value(slot, key_id, k).map_err(|_| ()))
            .and_then(|envelope| serde_json::to_value(envelope).map_err(|_| ()));

        match sealed {
            Ok(envelope) => *slot = envelope,
            Err(()) => {
                *slot = Value::String(ENCRYPTION_FALLBACK_PLACEHOLDER.to_string());
                fallbacks.push(field.to_string());
            }
        }
    }

    (out, fallbacks)
}

/// Decrypt the listed fields of `payload`, the exact inverse of
/// `encrypt_fields`.
///
/// Fields that are absent or not envelope-shaped are left untouched. Any
/// envelope whose tag fails verification aborts the whole call with
/// `WardenError::Encryption` — corrupted plaintext is never returned.
pub fn decrypt_fields(
    payload: &Value,
    fields: &[&str],
    provider: &dyn KeyProvider,
) -> WardenResult<Value> {
    let mut out = payload.clone();

    for field in fields {
        let Some(slot) = value_at_path_mut(&mut out, field) else {
            continue;
        };
        if !Envelope::is_envelope(slot) {
            continue;
        }

        let envelope: Envelope =
            serde_json::from_value(slot.clone()).map_err(|e| WardenError::Encryption {
                reason: format!("malformed envelope at '{field}': {e}"),
            })?;
        let key = provider.key(&envelope.key_id)?;
        *slot = open_envelope(&envelope, &key)?;
    }

    Ok(out)
}

// ── Tests ────────────────────────────────────────────────────────────────────
