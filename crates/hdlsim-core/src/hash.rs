//! Content hashing for generated artifacts.
//!
//! Artifacts are addressed by the SHA-256 of their exact bytes, so two
//! generations from identical input can be compared by hash alone.

use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 content hash.
pub type ContentHash = [u8; 32];

/// Compute the SHA-256 hash of raw bytes.
pub fn content_hash(bytes: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Format a content hash as a hex string.
pub fn hash_hex(hash: &ContentHash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Hex SHA-256 of a text body.
pub fn text_hash(text: &str) -> String {
    hash_hex(&content_hash(text.as_bytes()))
}
