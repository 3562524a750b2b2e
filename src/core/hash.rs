// Digest helper

use crate::core::Hash256;
use sha2::{Digest, Sha256};

/// SHA-256 over arbitrary bytes
pub fn sha256(data: &[u8]) -> Hash256 {
    let digest = Sha256::digest(data);
    Hash256::from_slice(&digest).expect("SHA256 always returns 32 bytes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_deterministic() {
        let a = sha256(b"hello world");
        let b = sha256(b"hello world");
        assert_eq!(a, b);
        assert_ne!(a, sha256(b"hello worlds"));
    }

    #[test]
    fn test_sha256_known_vector() {
        // SHA-256 of the empty string
        let hash = sha256(b"");
        assert_eq!(
            hash.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
