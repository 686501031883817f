//! Capsule verification
//!
//! Six checks each contribute one coherence point: protocol version,
//! resonance, file hash, signers, root binding and timestamp. The signer
//! point is shared between the configured signers. Structural problems and
//! tolerance failures are recorded as errors; a signer that does not name
//! its node and an unbound root seal only cost coherence.
//!
//! Signer membership is a substring test on the signature field. This
//! matches the format issued by existing capsule producers but is not a
//! cryptographic check: any string containing the node identifier passes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sealcheck_config::TrustAnchors;
use sealcheck_core::{
    normalize_hash, Capsule, CapsuleVerification, ResonanceCheck, RootBindingCheck, SignerCheck,
    COHERENCE_CHECKS, COHERENCE_THRESHOLD,
};
use sealcheck_utils::tracing as events;
use std::collections::BTreeMap;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Stateless verifier bound to a set of trust anchors
#[derive(Debug, Clone, Default)]
pub struct CapsuleVerifier {
    anchors: TrustAnchors,
}

impl CapsuleVerifier {
    pub fn new(anchors: TrustAnchors) -> Self {
        Self { anchors }
    }

    pub fn anchors(&self) -> &TrustAnchors {
        &self.anchors
    }

    /// Verify `capsule`, comparing its hash with `expected_hash` when given
    pub fn verify(&self, capsule: &Capsule, expected_hash: Option<&str>) -> CapsuleVerification {
        let anchors = &self.anchors;
        let mut errors = Vec::new();
        let mut points = 0.0;

        if capsule.protocol_version == anchors.protocol_version {
            points += 1.0;
        } else {
            errors.push(format!(
                "Protocol version mismatch: expected '{}', got '{}'",
                anchors.protocol_version, capsule.protocol_version
            ));
        }

        let resonance = self.check_resonance(capsule, &mut errors);
        if resonance.valid {
            points += 1.0;
        }

        if self.check_hash(capsule, expected_hash, &mut errors) {
            points += 1.0;
        }

        let signatures = self.check_signers(capsule, &mut errors);
        points += signer_share(&signatures);

        let root_binding = self.check_root_binding(capsule, &mut errors);
        if root_binding.valid {
            points += 1.0;
        }

        if parse_timestamp(&capsule.timestamp) {
            points += 1.0;
        } else {
            errors.push(format!("Invalid timestamp: '{}'", capsule.timestamp));
        }

        let coherence = (points / COHERENCE_CHECKS).clamp(0.0, 1.0);
        let valid = coherence >= COHERENCE_THRESHOLD && errors.is_empty();
        events::capsule_verified(capsule.file_hash(), coherence, valid);

        CapsuleVerification {
            valid,
            file_hash: capsule.file_hash().to_string(),
            algorithm: capsule.algorithm().to_string(),
            resonance,
            signatures,
            root_binding,
            coherence,
            errors,
        }
    }

    fn check_resonance(&self, capsule: &Capsule, errors: &mut Vec<String>) -> ResonanceCheck {
        let Some(value) = capsule.resonance_value else {
            errors.push("Missing resonance value".to_string());
            return ResonanceCheck {
                value: f64::NAN,
                valid: false,
            };
        };

        let valid = (value - self.anchors.resonance).abs() <= self.anchors.resonance_tolerance;
        if !valid {
            errors.push(format!(
                "Resonance {value} outside tolerance {} of {}",
                self.anchors.resonance_tolerance, self.anchors.resonance
            ));
        }
        ResonanceCheck { value, valid }
    }

    /// Without an expected hash the check passes as long as the capsule names one
    fn check_hash(&self, capsule: &Capsule, expected: Option<&str>, errors: &mut Vec<String>) -> bool {
        let actual = capsule.file_hash();
        if actual.is_empty() {
            errors.push("Missing file hash in hash chain".to_string());
            return false;
        }

        match expected.map(normalize_hash) {
            Some(expected) if expected != actual => {
                errors.push(format!("Hash mismatch: expected {expected}, got {actual}"));
                false
            }
            _ => true,
        }
    }

    fn check_signers(&self, capsule: &Capsule, errors: &mut Vec<String>) -> BTreeMap<String, SignerCheck> {
        self.anchors
            .signers
            .iter()
            .map(|anchor| {
                let valid = match capsule.signatures.get(&anchor.name) {
                    Some(signature) => signature.contains(anchor.node.as_str()),
                    None => {
                        errors.push(format!("Missing signature: {}", anchor.name));
                        false
                    }
                };
                let check = SignerCheck {
                    expected_node: anchor.node.clone(),
                    valid,
                };
                (anchor.name.clone(), check)
            })
            .collect()
    }

    fn check_root_binding(&self, capsule: &Capsule, errors: &mut Vec<String>) -> RootBindingCheck {
        let seal = capsule.root_seal.as_str();
        if seal.is_empty() {
            errors.push("Missing root seal".to_string());
        }

        RootBindingCheck {
            expected_root: self.anchors.expected_root.clone(),
            valid: !seal.is_empty()
                && (seal.contains(self.anchors.expected_root.as_str())
                    || seal.contains(self.anchors.sync_hash.as_str())),
        }
    }
}

/// Fraction of the signer point earned; no configured signers earns it all
fn signer_share(signatures: &BTreeMap<String, SignerCheck>) -> f64 {
    if signatures.is_empty() {
        return 1.0;
    }
    let passed = signatures.values().filter(|check| check.valid).count();
    passed as f64 / signatures.len() as f64
}

/// Accept RFC 3339 plus naive ISO-8601 date-times and bare dates
fn parse_timestamp(timestamp: &str) -> bool {
    let timestamp = timestamp.trim();
    if timestamp.is_empty() {
        return false;
    }

    DateTime::parse_from_rfc3339(timestamp).is_ok()
        || NAIVE_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(timestamp, format).is_ok())
        || NaiveDate::parse_from_str(timestamp, "%Y-%m-%d").is_ok()
}
