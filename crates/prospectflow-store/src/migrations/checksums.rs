use sha2::{Digest, Sha256};

/// SHA-256 of a migration body, hex encoded
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_stable_hex() {
        let first = compute_checksum("SELECT 1");
        assert_eq!(first.len(), 64);
        assert_eq!(first, compute_checksum("SELECT 1"));
        assert_ne!(first, compute_checksum("SELECT 2"));
    }
}
