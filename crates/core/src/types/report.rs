//! Integrity report types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of the signature presence check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignatureStatus {
    /// At least one signature file is present (contents are not validated)
    Verified,
    /// No signature file was found
    NoSignatures,
    /// Signature checking was disabled
    #[default]
    NotChecked,
}

impl fmt::Display for SignatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignatureStatus::Verified => "verified",
            SignatureStatus::NoSignatures => "no_signatures",
            SignatureStatus::NotChecked => "not_checked",
        };
        f.write_str(label)
    }
}

/// Tamper-evidence score and findings for one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    /// Final score, clamped to `0..=100`
    pub score: u8,
    pub signature_status: SignatureStatus,
    pub merkle_root: Option<String>,
    pub policy_violations: u32,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub files_analyzed: usize,
}

impl Default for IntegrityReport {
    fn default() -> Self {
        Self {
            score: 100,
            signature_status: SignatureStatus::NotChecked,
            merkle_root: None,
            policy_violations: 0,
            warnings: Vec::new(),
            errors: Vec::new(),
            files_analyzed: 0,
        }
    }
}

/// Check-run conclusion derived from a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Neutral,
    Failure,
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Conclusion::Success => "success",
            Conclusion::Neutral => "neutral",
            Conclusion::Failure => "failure",
        };
        f.write_str(label)
    }
}
