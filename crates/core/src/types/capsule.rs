//! Provenance capsule and verification verdict types
//!
//! A capsule is an externally issued record attesting to a file's hash,
//! timestamp and three named signatures. Field names on the wire are the
//! camelCase names below; `hashChain` is a three element array of
//! `[algorithm, hash, standard]`.
//!
//! Every field deserializes leniently: a missing key, a `null` or a value of
//! the wrong shape becomes the field's default. A structurally broken capsule
//! therefore still reaches the verifier, which reports the missing pieces as
//! verification errors. Only a payload that is not a JSON object fails to
//! parse.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Deserialize a field, falling back to its default on `null` or a type mismatch
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Strip a leading `algorithm:` prefix from a hash string
///
/// ```
/// use sealcheck_core::normalize_hash;
/// assert_eq!(normalize_hash("sha256:abcd"), "abcd");
/// assert_eq!(normalize_hash("abcd"), "abcd");
/// ```
#[must_use]
pub fn normalize_hash(hash: &str) -> &str {
    hash.split_once(':').map_or(hash, |(_, rest)| rest)
}

/// `[algorithm, hash, standard]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct HashChain {
    pub algorithm: String,
    pub hash: String,
    pub standard: String,
}

impl From<Vec<String>> for HashChain {
    fn from(parts: Vec<String>) -> Self {
        let mut parts = parts.into_iter();
        Self {
            algorithm: parts.next().unwrap_or_default(),
            hash: parts.next().unwrap_or_default(),
            standard: parts.next().unwrap_or_default(),
        }
    }
}

impl From<HashChain> for Vec<String> {
    fn from(chain: HashChain) -> Self {
        vec![chain.algorithm, chain.hash, chain.standard]
    }
}

/// The three named signer fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsuleSignatures {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub signer_a: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub signer_b: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub signer_c: Option<String>,
}

impl CapsuleSignatures {
    /// Look a signer up by its wire name (`signerA`, `signerB`, `signerC`)
    #[must_use]
    pub fn get(&self, signer: &str) -> Option<&str> {
        match signer {
            "signerA" => self.signer_a.as_deref(),
            "signerB" => self.signer_b.as_deref(),
            "signerC" => self.signer_c.as_deref(),
            _ => None,
        }
    }
}

/// Externally issued provenance record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Capsule {
    #[serde(deserialize_with = "lenient")]
    pub protocol_version: String,
    /// ISO-8601 date-time
    #[serde(deserialize_with = "lenient")]
    pub timestamp: String,
    #[serde(deserialize_with = "lenient")]
    pub source_node: String,
    #[serde(deserialize_with = "lenient")]
    pub message_id: String,
    #[serde(deserialize_with = "lenient")]
    pub hash_chain: HashChain,
    #[serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub resonance_value: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub signatures: CapsuleSignatures,
    #[serde(deserialize_with = "lenient")]
    pub root_seal: String,
}

impl Capsule {
    /// The embedded file hash with any `algorithm:` prefix removed
    #[must_use]
    pub fn file_hash(&self) -> &str {
        normalize_hash(&self.hash_chain.hash)
    }

    /// The hash algorithm named in the hash chain
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.hash_chain.algorithm
    }
}

/// Resonance tolerance result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResonanceCheck {
    pub value: f64,
    pub valid: bool,
}

/// Per-signer membership result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerCheck {
    pub expected_node: String,
    pub valid: bool,
}

/// Root seal binding result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootBindingCheck {
    pub expected_root: String,
    pub valid: bool,
}

/// Verdict produced by the capsule verifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsuleVerification {
    /// `coherence >= 0.999` and no errors
    pub valid: bool,
    /// Normalized file hash
    pub file_hash: String,
    pub algorithm: String,
    pub resonance: ResonanceCheck,
    pub signatures: BTreeMap<String, SignerCheck>,
    pub root_binding: RootBindingCheck,
    /// Fraction of the six checks passed, in `[0, 1]`
    pub coherence: f64,
    pub errors: Vec<String>,
}
