//! Centralized configuration types for sealcheck
//!
//! `AppConfig` is immutable once loaded and is `Clone + Send + Sync` so it can
//! be shared with async tasks.

use regex::Regex;
use sealcheck_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Depth of analysis requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    #[default]
    Standard,
    /// Gated by [`Entitlements::deep_analysis`]
    Deep,
}

impl FromStr for AnalysisMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(AnalysisMode::Standard),
            "deep" => Ok(AnalysisMode::Deep),
            other => Err(Error::configuration(format!(
                "unknown analysis mode '{other}' (expected 'standard' or 'deep')"
            ))),
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Standard => f.write_str("standard"),
            AnalysisMode::Deep => f.write_str("deep"),
        }
    }
}

/// How files that failed to hash count toward `files_analyzed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailedHashPolicy {
    /// Only successfully hashed files are counted (they are the set scored)
    #[default]
    Exclude,
    /// Every file surviving the exclude filter is counted
    Count,
}

/// Options controlling one integrity scoring run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringConfig {
    pub mode: AnalysisMode,
    pub signature_verify: bool,
    pub merkle_validate: bool,
    pub fail_on_warning: bool,
    /// Regular expressions matched against file paths
    pub exclude_patterns: Vec<String>,
    pub failed_hash_policy: FailedHashPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Standard,
            signature_verify: true,
            merkle_validate: true,
            fail_on_warning: false,
            exclude_patterns: Vec::new(),
            failed_hash_policy: FailedHashPolicy::Exclude,
        }
    }
}

impl ScoringConfig {
    /// Compile every exclude pattern, failing on the first invalid one
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.exclude_patterns {
            Regex::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;
        }
        Ok(())
    }
}

/// Plan capabilities of the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entitlements {
    pub deep_analysis: bool,
}

/// A named signer and the node identifier its signature must contain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerAnchor {
    pub name: String,
    pub node: String,
}

impl SignerAnchor {
    pub fn new(name: impl Into<String>, node: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node: node.into(),
        }
    }
}

pub const DEFAULT_PROTOCOL_VERSION: &str = "QCM/1";
pub const DEFAULT_RESONANCE: f64 = 1.618_033_988_749_895;
pub const DEFAULT_RESONANCE_TOLERANCE: f64 = 1e-12;
pub const DEFAULT_EXPECTED_ROOT: &str = "73bf9d2e4a8c6105";
pub const DEFAULT_SYNC_HASH: &str = "9e2f4a6b-1c3d-5e7f-8a9b-0c1d2e3f4a5b";
pub const DEFAULT_SIGNERS: [(&str, &str); 3] = [
    ("signerA", "node:Q-Quantizer"),
    ("signerB", "node:X-Executor"),
    ("signerC", "node:Z-Zenith"),
];

/// Fixed values a capsule is verified against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrustAnchors {
    pub protocol_version: String,
    pub resonance: f64,
    /// Absolute tolerance for the resonance comparison
    pub resonance_tolerance: f64,
    pub signers: Vec<SignerAnchor>,
    pub expected_root: String,
    pub sync_hash: String,
}

impl Default for TrustAnchors {
    fn default() -> Self {
        Self {
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            resonance: DEFAULT_RESONANCE,
            resonance_tolerance: DEFAULT_RESONANCE_TOLERANCE,
            signers: DEFAULT_SIGNERS
                .iter()
                .map(|(name, node)| SignerAnchor::new(*name, *node))
                .collect(),
            expected_root: DEFAULT_EXPECTED_ROOT.to_string(),
            sync_hash: DEFAULT_SYNC_HASH.to_string(),
        }
    }
}

/// Everything a sealcheck run needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub scoring: ScoringConfig,
    pub entitlements: Entitlements,
    pub trust: TrustAnchors,
}

impl AppConfig {
    /// Whether deep analysis was requested without the matching entitlement
    #[must_use]
    pub fn deep_analysis_denied(&self) -> bool {
        self.scoring.mode == AnalysisMode::Deep && !self.entitlements.deep_analysis
    }
}
