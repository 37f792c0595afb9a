//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use crate::domain::entities::{ChannelId, IdentityScope, PkiId};
use crate::domain::errors::CryptoServiceResult;
use crate::ports::outbound::{MembershipAuthority, PolicyManager};
use std::sync::Arc;

/// Message crypto API used by gossip message handlers.
///
/// Implementations must be thread-safe (`Send + Sync`) and callable from
/// any number of concurrent tasks without external locking.
pub trait MessageCryptoApi: Send + Sync {
    // =========================================================================
    // Identities
    // =========================================================================

    /// Check that a serialized peer identity is valid: not malformed,
    /// revoked or expired, under either the local organization or one of
    /// the known channels.
    fn validate_identity(&self, peer_identity: &[u8]) -> CryptoServiceResult<()>;

    /// Resolve the scope a valid identity belongs to.
    fn resolve_identity(&self, peer_identity: &[u8]) -> CryptoServiceResult<IdentityScope>;

    /// PKI-ID of a serialized identity.
    ///
    /// Returns an empty identifier if the identity is empty or the digest
    /// cannot be computed. The identity is not validated.
    fn pki_id(&self, peer_identity: &[u8]) -> PkiId;

    /// Like [`MessageCryptoApi::pki_id`], but reports why no identifier
    /// could be derived.
    fn try_pki_id(&self, peer_identity: &[u8]) -> CryptoServiceResult<PkiId>;

    // =========================================================================
    // Signatures
    // =========================================================================

    /// Sign a message with this peer's signing key.
    fn sign(&self, message: &[u8]) -> CryptoServiceResult<Vec<u8>>;

    /// Verify that `signature` over `message` was produced by the holder of
    /// `peer_identity`.
    ///
    /// Local-organization identities are verified directly; channel
    /// identities are checked against that channel's readers policy.
    fn verify(
        &self,
        peer_identity: &[u8],
        signature: &[u8],
        message: &[u8],
    ) -> CryptoServiceResult<()>;

    /// Verify a signature in the context of a specific channel, by asking
    /// the channel's readers policy.
    fn verify_by_channel(
        &self,
        channel: &ChannelId,
        peer_identity: &[u8],
        signature: &[u8],
        message: &[u8],
    ) -> CryptoServiceResult<()>;

    /// Verify that a serialized block belongs to `channel` and is signed
    /// according to the channel's block validation policy.
    fn verify_block(&self, channel: &ChannelId, signed_block: &[u8]) -> CryptoServiceResult<()>;
}

/// Write side of the channel registries.
///
/// Only the channel synchronization owner (fed by configuration blocks
/// from the ordering service) calls this; the identity crypto service never
/// does.
pub trait MembershipRegistrySync: Send + Sync {
    /// Install or replace the membership authority and policies of a channel.
    fn apply_channel(
        &self,
        channel: ChannelId,
        authority: Arc<dyn MembershipAuthority>,
        policies: Arc<dyn PolicyManager>,
    );

    /// Forget a channel. Returns whether it was known.
    fn remove_channel(&self, channel: &ChannelId) -> bool;
}
