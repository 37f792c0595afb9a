//! # Identity Crypto Service
//!
//! Identity resolution, signing and signature verification for gossip
//! messages exchanged between peers of a permissioned network.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Identifiers, signed payloads, blocks, errors
//! - **Ports Layer** (`ports/`): The caller-facing API and the collaborator traits
//! - **Service Layer** (`service.rs`): Identity resolution and verification dispatch
//! - **Adapters Layer** (`adapters/`): Reference collaborators (Ed25519 MSP,
//!   in-memory channel store, org-based policies, shared-crypto digests)
//!
//! ## Trust Sources
//!
//! ```text
//!                    ┌────────────────────────┐
//!  identity bytes ──→│   identity resolution  │
//!                    └───────────┬────────────┘
//!           local MSP (own org) │ channel MSPs (first valid wins)
//!                    ┌──────────┴───────────┐
//!                    ↓                      ↓
//!          IdentityScope::Local   IdentityScope::Channel(id)
//!                    │                      │
//!         identity.verify(sig)   channel readers policy.evaluate
//! ```
//!
//! ## Security Notes
//!
//! - Returned errors never embed raw identity bytes; those only reach
//!   `debug` level logs, hex-encoded
//! - Block verification never succeeds without a policy verdict

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{
    ChannelConfigStore, ChannelPolicyManager, Ed25519Msp, MspManager, SharedCryptoDigest,
    SignedByOrgsPolicy,
};
pub use config::{ConfigError, IdentityCryptoConfig};
pub use domain::block::{Block, BlockHeader, BlockMetadata, MetadataSignature, SignatureHeader};
pub use domain::entities::{ChannelId, IdentityScope, PkiId, SignedData};
pub use domain::errors::{CryptoServiceError, CryptoServiceResult};
pub use ports::inbound::{MembershipRegistrySync, MessageCryptoApi};
pub use ports::outbound::{
    ChannelMembershipRegistry, DigestError, DigestProvider, Identity, LocalMembership,
    MembershipAuthority, MembershipError, Policy, PolicyError, PolicyManager,
    PolicyManagerRegistry, SigningIdentity,
};
pub use service::IdentityCryptoService;
pub use shared_crypto::HashAlgorithm;
