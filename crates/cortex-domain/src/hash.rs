//! Content and identity hashing
//!
//! Two digests are used across the engine: sha256 for file content hashes
//! (change detection, branch-store copying) and a truncated sha1 for stable
//! chunk ids.

use sha1::{Digest as Sha1Digest, Sha1};
use sha2::{Digest, Sha256};

use crate::constants::CHUNK_ID_LENGTH;
use crate::entities::ChunkType;

/// sha256 of raw file bytes, hex-encoded
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Stable chunk id: `sha1(path \0 chunk_type \0 ordinal)` truncated to 16
/// hex characters. Identical across runs for the same (path, type, ordinal).
pub fn chunk_id(file_path: &str, chunk_type: ChunkType, ordinal: u32) -> String {
    let mut hasher = Sha1::new();
    hasher.update(file_path.as_bytes());
    hasher.update(b"\0");
    hasher.update(chunk_type.as_str().as_bytes());
    hasher.update(b"\0");
    hasher.update(ordinal.to_string().as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..CHUNK_ID_LENGTH].to_string()
}

/// Stable short hash of a project root path, used for the cache directory
pub fn project_hash(canonical_path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_path.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_stable_and_distinct() {
        let a = chunk_id("src/main.go", ChunkType::Symbols, 0);
        let b = chunk_id("src/main.go", ChunkType::Symbols, 0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);

        let c = chunk_id("src/main.go", ChunkType::Definitions, 0);
        let d = chunk_id("src/main.go", ChunkType::Symbols, 1);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_content_hash_is_sha256_hex() {
        let h = content_hash(b"hello");
        assert_eq!(h.len(), 64);
        assert_eq!(
            h,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_project_hash_distinguishes_paths() {
        assert_ne!(project_hash("/a/b"), project_hash("/a/c"));
        assert_eq!(project_hash("/a/b").len(), 16);
    }
}
