//! # Adapters Module
//!
//! Reference implementations of the outbound ports, plus the channel store
//! the synchronization owner writes to.

pub mod digest;
pub mod msp;
pub mod policy;
pub mod store;

pub use digest::SharedCryptoDigest;
pub use msp::{Ed25519Identity, Ed25519Msp, LocalSigner, MspManager, SerializedIdentity};
pub use policy::{ChannelPolicyManager, SignedByOrgsPolicy};
pub use store::ChannelConfigStore;
