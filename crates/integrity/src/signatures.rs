//! Signature file presence detection
//!
//! Only the presence of a signature file is checked. The contents of the
//! signature files are never validated cryptographically, so a `verified`
//! status means "a signature file exists", nothing more.

use sealcheck_core::{FileRecord, SignatureStatus};

const SIGNATURE_SUFFIXES: [&str; 3] = [".sig", ".asc", ".signature"];
const SIGNATURE_FILE_NAME: &str = "SIGNATURE";

pub const NO_SIGNATURES_WARNING: &str = "No signature files found; commit provenance cannot be verified";

/// Signature status plus any advisory warnings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCheck {
    pub status: SignatureStatus,
    pub warnings: Vec<String>,
}

fn is_signature_file(file: &FileRecord) -> bool {
    SIGNATURE_SUFFIXES
        .iter()
        .any(|suffix| file.path.ends_with(suffix))
        || file.file_name() == SIGNATURE_FILE_NAME
}

/// Classify `files` by the presence of signature files
pub fn check_signatures(files: &[FileRecord]) -> SignatureCheck {
    if files.iter().any(is_signature_file) {
        SignatureCheck {
            status: SignatureStatus::Verified,
            warnings: Vec::new(),
        }
    } else {
        SignatureCheck {
            status: SignatureStatus::NoSignatures,
            warnings: vec![NO_SIGNATURES_WARNING.to_string()],
        }
    }
}
