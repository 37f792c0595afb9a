//! # Hashing
//!
//! One-shot digests over the algorithms the identity layer can be
//! configured with. All of them produce 256-bit outputs.

use crate::CryptoError;
use serde::{Deserialize, Serialize};
use sha2::Digest as _;
use std::fmt;
use std::str::FromStr;

/// 256-bit digest output.
pub type Digest32 = [u8; 32];

/// Hash algorithm selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
    /// SHA-256 (FIPS 180-4)
    #[default]
    Sha256,
    /// SHA3-256 (FIPS 202)
    Sha3_256,
    /// BLAKE3 in its default 32-byte mode
    Blake3,
}

impl HashAlgorithm {
    /// Canonical lowercase name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha3_256 => "sha3-256",
            HashAlgorithm::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "sha3-256" | "sha3_256" => Ok(HashAlgorithm::Sha3_256),
            "blake3" => Ok(HashAlgorithm::Blake3),
            other => Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Hash data with the selected algorithm (one-shot).
pub fn hash(algorithm: HashAlgorithm, data: &[u8]) -> Digest32 {
    hash_many(algorithm, &[data])
}

/// Hash the concatenation of several inputs without allocating it.
pub fn hash_many(algorithm: HashAlgorithm, inputs: &[&[u8]]) -> Digest32 {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = sha2::Sha256::new();
            for input in inputs {
                hasher.update(input);
            }
            hasher.finalize().into()
        }
        HashAlgorithm::Sha3_256 => {
            let mut hasher = sha3::Sha3_256::new();
            for input in inputs {
                hasher.update(input);
            }
            hasher.finalize().into()
        }
        HashAlgorithm::Blake3 => {
            let mut hasher = blake3::Hasher::new();
            for input in inputs {
                hasher.update(input);
            }
            *hasher.finalize().as_bytes()
        }
    }
}
