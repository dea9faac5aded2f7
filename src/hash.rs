//! BLAKE3 checksums for snapshot payloads

use blake3::Hasher;

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Checksum of a byte buffer, `blake3:<hex>`
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    format!("{HASH_PREFIX}{}", hasher.finalize().to_hex())
}

/// Whether `bytes` still hash to `expected`
pub fn verify(expected: &str, bytes: &[u8]) -> bool {
    hash_bytes(bytes) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_bytes_is_prefixed_and_stable() {
        let hash = hash_bytes(b"apiVersion: graft/v0\n");
        assert!(hash.starts_with(HASH_PREFIX));
        assert_eq!(hash.len(), HASH_PREFIX.len() + 64);
        assert_eq!(hash, hash_bytes(b"apiVersion: graft/v0\n"));
    }

    #[test]
    fn test_verify_detects_changes() {
        let hash = hash_bytes(b"original");
        assert!(verify(&hash, b"original"));
        assert!(!verify(&hash, b"tampered"));
    }
}
