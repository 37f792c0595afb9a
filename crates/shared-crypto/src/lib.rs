//! # Shared Crypto - Digest and Signature Primitives
//!
//! Low-level building blocks used by the identity layer and its reference
//! membership authorities.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256, SHA3-256, BLAKE3 | PKI-IDs, block data hashes |
//! | `signatures` | Ed25519 | Peer identity signing keys |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, strict verification (no malleable encodings)
//! - **Hashing**: Every algorithm yields a 32-byte digest

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{hash, hash_many, Digest32, HashAlgorithm};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
