//! # Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators this subsystem composes: membership authorities, channel
//! registries, policies and the digest provider.
//!
//! Error messages produced by implementations are passed through to callers,
//! so they must not embed raw identity bytes.

use crate::domain::entities::{ChannelId, SignedData};
use shared_crypto::HashAlgorithm;
use std::sync::Arc;
use thiserror::Error;

/// Error from a membership authority or one of its identities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MembershipError {
    /// The bytes are not an identity this authority understands
    #[error("Failed deserializing identity: {reason}")]
    Deserialization { reason: String },

    /// The identity was issued by another organization
    #[error("Identity belongs to MSP {actual}, expected {expected}")]
    ForeignMsp { expected: String, actual: String },

    /// The identity carries no valid endorsement from its MSP's root key
    #[error("Identity was not issued by MSP {msp_id}")]
    UntrustedIssuer { msp_id: String },

    /// The identity has expired
    #[error("Identity expired at {not_after}")]
    Expired { not_after: u64 },

    /// The identity has been revoked
    #[error("Identity has been revoked")]
    Revoked,

    /// The signature does not verify under the identity's key
    #[error("Invalid signature: {reason}")]
    InvalidSignature { reason: String },

    /// This authority holds no root key and cannot issue identities
    #[error("MSP {msp_id} cannot issue identities")]
    NotAnIssuer { msp_id: String },

    /// The signing key does not match the identity it is enrolled with
    #[error("Signing key does not match its enrolled identity")]
    SignerMismatch,

    /// No signing identity is configured
    #[error("No local signing identity configured")]
    NoSigningIdentity,

    /// The signing identity failed
    #[error("Signing failed: {reason}")]
    SigningFailed { reason: String },
}

/// Error from a policy evaluation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// The signature set does not satisfy the policy
    #[error("{reason}")]
    Denied { reason: String },
}

/// Error from the digest provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DigestError {
    /// The provider is not configured for this algorithm
    #[error("Hash algorithm {0} not supported by this provider")]
    UnsupportedAlgorithm(HashAlgorithm),

    /// The hash engine failed
    #[error("Hash engine failure: {0}")]
    Engine(String),
}

/// A deserialized identity.
pub trait Identity: Send + Sync {
    /// Identifier of the organization (MSP) that issued the identity.
    fn org_id(&self) -> &str;

    /// Principal behind the identity. Equal for every encoding of the same
    /// identity, so policies count signers by it rather than by wire bytes.
    fn id(&self) -> Vec<u8>;

    /// Check the identity is currently valid (issued by its MSP,
    /// unexpired, unrevoked).
    fn validate(&self) -> Result<(), MembershipError>;

    /// Verify `signature` over `message` with the identity's key.
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), MembershipError>;
}

/// The identity this node signs with.
pub trait SigningIdentity: Send + Sync {
    /// Identifier of the organization (MSP) this node belongs to.
    fn org_id(&self) -> &str;

    /// Serialized form of the identity, as gossiped to other peers.
    fn serialize(&self) -> Vec<u8>;

    /// Sign a message.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, MembershipError>;
}

/// Parses serialized identities within one administrative scope.
pub trait MembershipAuthority: Send + Sync {
    /// Deserialize an identity. Does not check validity.
    fn deserialize_identity(&self, serialized: &[u8])
        -> Result<Box<dyn Identity>, MembershipError>;
}

/// The node's own membership authority.
pub trait LocalMembership: MembershipAuthority {
    /// The node's signing identity.
    fn local_signing_identity(&self) -> Result<Arc<dyn SigningIdentity>, MembershipError>;
}

/// Read side of the channel → membership authority registry.
///
/// Implementations may be mutated concurrently; each call must return a
/// coherent value, but successive calls need not observe one snapshot.
pub trait ChannelMembershipRegistry: Send + Sync {
    /// Membership authority of one channel.
    fn authority(&self, channel: &ChannelId) -> Option<Arc<dyn MembershipAuthority>>;

    /// All currently known channels with their authorities, in the order
    /// identity resolution should try them.
    fn channels(&self) -> Vec<(ChannelId, Arc<dyn MembershipAuthority>)>;
}

/// A named access rule of a channel.
pub trait Policy: Send + Sync {
    /// Decide whether the signature set satisfies the rule.
    fn evaluate(&self, signed_data: &[SignedData]) -> Result<(), PolicyError>;
}

/// The policies of one channel.
pub trait PolicyManager: Send + Sync {
    /// Look up a policy by name.
    fn policy(&self, name: &str) -> Option<Arc<dyn Policy>>;
}

/// Read side of the channel → policy manager registry.
pub trait PolicyManagerRegistry: Send + Sync {
    /// Policy manager of one channel.
    fn policy_manager(&self, channel: &ChannelId) -> Option<Arc<dyn PolicyManager>>;
}

/// Cryptographic hash provider.
pub trait DigestProvider: Send + Sync {
    /// Hash `data` with `algorithm`.
    fn hash(&self, data: &[u8], algorithm: HashAlgorithm) -> Result<Vec<u8>, DigestError>;
}
