//! File records handed over by the file-fetch collaborator

use crate::constants::HASH_ERROR_SENTINEL;
use serde::{Deserialize, Serialize};

/// One file of a source tree snapshot.
///
/// `content_digest` is `None` until the file has been hashed. The sentinel
/// value `"error"` marks a file whose hashing failed; such records never take
/// part in tree construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Repository-relative path using `/` separators
    pub path: String,
    /// Size in bytes as reported by the collaborator
    pub size: u64,
    /// Lowercase hex digest of the content, or the hash error sentinel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_digest: Option<String>,
    /// Raw file content, when loaded
    #[serde(skip)]
    pub content: Option<Vec<u8>>,
}

impl FileRecord {
    /// Create a record without content or digest
    #[must_use]
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            content_digest: None,
            content: None,
        }
    }

    /// Create a record carrying loaded content; the size is taken from it
    #[must_use]
    pub fn with_content(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        Self {
            path: path.into(),
            size: content.len() as u64,
            content_digest: None,
            content: Some(content),
        }
    }

    /// Attach a digest
    #[must_use]
    pub fn digest(mut self, digest: impl Into<String>) -> Self {
        self.content_digest = Some(digest.into());
        self
    }

    /// Mark this record as failed to hash
    #[must_use]
    pub fn hash_failed(mut self) -> Self {
        self.content_digest = Some(HASH_ERROR_SENTINEL.to_string());
        self
    }

    /// True when the collaborator signalled a hashing failure
    #[must_use]
    pub fn has_failed_hash(&self) -> bool {
        self.content_digest.as_deref() == Some(HASH_ERROR_SENTINEL)
    }

    /// The digest if it is usable as a Merkle leaf
    #[must_use]
    pub fn valid_digest(&self) -> Option<&str> {
        self.content_digest
            .as_deref()
            .filter(|digest| is_valid_digest(digest))
    }

    /// Last path segment
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A digest takes part in tree construction unless it is empty or the
/// hash error sentinel
#[must_use]
pub fn is_valid_digest(digest: &str) -> bool {
    !digest.is_empty() && digest != HASH_ERROR_SENTINEL
}
