//! Deterministic content hashing
//!
//! All digests are lowercase hexadecimal strings. The digest function is a
//! trait so the scorer and the Merkle tree can be run with another fixed-width
//! hash; SHA-256 is the default everywhere.

use sealcheck_core::FileRecord;
use sha2::{Digest, Sha256};

/// A fixed-width cryptographic digest rendered as lowercase hex
pub trait ContentDigest: Send + Sync {
    /// Name used in `algorithm:` prefixes
    fn algorithm(&self) -> &'static str;

    /// Hash raw bytes
    fn digest_hex(&self, data: &[u8]) -> String;

    /// Parent digest of two child digests.
    ///
    /// The children are concatenated as hex strings, not as raw bytes, before
    /// re-hashing. Roots are only comparable across implementations that keep
    /// this convention.
    fn combine(&self, left: &str, right: &str) -> String {
        let mut joined = String::with_capacity(left.len() + right.len());
        joined.push_str(left);
        joined.push_str(right);
        self.digest_hex(joined.as_bytes())
    }
}

/// SHA-256 digest
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl ContentDigest for Sha256Digest {
    fn algorithm(&self) -> &'static str {
        "sha256"
    }

    fn digest_hex(&self, data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }
}

/// SHA-256 of raw bytes
#[must_use]
pub fn hash_content(data: &[u8]) -> String {
    Sha256Digest.digest_hex(data)
}

/// SHA-256 of a UTF-8 string
#[must_use]
pub fn hash_str(data: &str) -> String {
    hash_content(data.as_bytes())
}

/// Files split by hashing outcome
#[derive(Debug, Default)]
pub struct HashedFiles {
    /// Records carrying a usable digest, in input order
    pub hashed: Vec<FileRecord>,
    /// Paths of records that could not be hashed
    pub failed: Vec<String>,
}

/// Give every record a digest.
///
/// A record that already carries a valid digest keeps it. A record with
/// loaded content is hashed. Anything else, including records the
/// collaborator already marked with the error sentinel, is a failure.
pub fn hash_files<D: ContentDigest + ?Sized>(digest: &D, files: Vec<FileRecord>) -> HashedFiles {
    let mut out = HashedFiles::default();

    for mut file in files {
        if file.valid_digest().is_some() {
            out.hashed.push(file);
            continue;
        }

        match (&file.content, file.has_failed_hash()) {
            (Some(content), false) => {
                file.content_digest = Some(digest.digest_hex(content));
                out.hashed.push(file);
            }
            _ => {
                tracing::debug!(path = %file.path, "file could not be hashed");
                out.failed.push(file.path);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vectors() {
        assert_eq!(
            hash_str(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hash_str("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_combine_uses_hex_concatenation() {
        let left = hash_str("left");
        let right = hash_str("right");
        let expected = hash_str(&format!("{left}{right}"));
        assert_eq!(Sha256Digest.combine(&left, &right), expected);
        assert_ne!(Sha256Digest.combine(&right, &left), expected);
    }

    #[test]
    fn test_hash_files_partitions_records() {
        let files = vec![
            FileRecord::with_content("a.txt", b"alpha".to_vec()),
            FileRecord::new("b.txt", 10),
            FileRecord::new("c.txt", 10).digest("precomputed"),
            FileRecord::new("d.txt", 10).hash_failed(),
        ];

        let result = hash_files(&Sha256Digest, files);

        let paths: Vec<&str> = result.hashed.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "c.txt"]);
        assert_eq!(
            result.hashed[0].content_digest.as_deref(),
            Some(hash_str("alpha").as_str())
        );
        assert_eq!(result.hashed[1].content_digest.as_deref(), Some("precomputed"));
        assert_eq!(result.failed, vec!["b.txt", "d.txt"]);
    }
}
