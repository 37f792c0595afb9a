//! Digest provider backed by `shared-crypto`.

use crate::ports::outbound::{DigestError, DigestProvider};
use shared_crypto::HashAlgorithm;

/// Software digest provider.
///
/// Optionally restricted to a subset of algorithms, mirroring crypto
/// providers (e.g. HSM-backed ones) that only implement some of them.
#[derive(Clone, Debug)]
pub struct SharedCryptoDigest {
    allowed: Option<Vec<HashAlgorithm>>,
}

impl SharedCryptoDigest {
    /// Provider supporting every algorithm.
    pub fn new() -> Self {
        Self { allowed: None }
    }

    /// Provider supporting only `algorithms`.
    pub fn with_algorithms(algorithms: &[HashAlgorithm]) -> Self {
        Self {
            allowed: Some(algorithms.to_vec()),
        }
    }
}

impl Default for SharedCryptoDigest {
    fn default() -> Self {
        Self::new()
    }
}

impl DigestProvider for SharedCryptoDigest {
    fn hash(&self, data: &[u8], algorithm: HashAlgorithm) -> Result<Vec<u8>, DigestError> {
        if let Some(allowed) = &self.allowed {
            if !allowed.contains(&algorithm) {
                return Err(DigestError::UnsupportedAlgorithm(algorithm));
            }
        }
        Ok(shared_crypto::hash(algorithm, data).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_matches_shared_crypto() {
        let provider = SharedCryptoDigest::new();

        let digest = provider.hash(b"identity", HashAlgorithm::Sha3_256).unwrap();

        assert_eq!(
            digest,
            shared_crypto::hash(HashAlgorithm::Sha3_256, b"identity").to_vec()
        );
    }

    #[test]
    fn test_restricted_provider_rejects_other_algorithms() {
        let provider = SharedCryptoDigest::with_algorithms(&[HashAlgorithm::Sha256]);

        assert!(provider.hash(b"x", HashAlgorithm::Sha256).is_ok());
        assert_eq!(
            provider.hash(b"x", HashAlgorithm::Blake3),
            Err(DigestError::UnsupportedAlgorithm(HashAlgorithm::Blake3))
        );
    }
}
