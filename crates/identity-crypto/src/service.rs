//! # Identity Crypto Service
//!
//! Application service implementing [`MessageCryptoApi`].
//!
//! ## Identity resolution
//!
//! 1. Reject empty identities.
//! 2. Try the local MSP. If it deserializes the identity and the identity
//!    belongs to this node's organization, its validity check is final:
//!    channel MSPs are never consulted for it, even when it fails.
//! 3. Otherwise try every channel MSP in registry order; the first one that
//!    both deserializes and validates the identity wins.
//! 4. If none does, fail with `NoAuthorityFound`.
//!
//! The service holds no mutable state. Registries are read on every call
//! and may change between (or during) calls.

use crate::config::IdentityCryptoConfig;
use crate::domain::block::Block;
use crate::domain::entities::{ChannelId, IdentityScope, PkiId, SignedData};
use crate::domain::errors::{CryptoServiceError, CryptoServiceResult};
use crate::ports::inbound::MessageCryptoApi;
use crate::ports::outbound::{
    ChannelMembershipRegistry, DigestProvider, Identity, LocalMembership, PolicyManagerRegistry,
};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// An identity that its owning membership authority has confirmed valid.
struct ResolvedIdentity {
    identity: Box<dyn Identity>,
    scope: IdentityScope,
}

/// Identity Crypto Service.
///
/// Composes the local MSP, the channel MSP registry, the channel policy
/// registry and a digest provider. Cheap to share behind an `Arc`.
pub struct IdentityCryptoService<L, C, P, D>
where
    L: LocalMembership,
    C: ChannelMembershipRegistry,
    P: PolicyManagerRegistry,
    D: DigestProvider,
{
    config: IdentityCryptoConfig,
    local_msp: Arc<L>,
    channel_msps: Arc<C>,
    policies: Arc<P>,
    digest: Arc<D>,
}

impl<L, C, P, D> IdentityCryptoService<L, C, P, D>
where
    L: LocalMembership,
    C: ChannelMembershipRegistry,
    P: PolicyManagerRegistry,
    D: DigestProvider,
{
    /// Create a new identity crypto service.
    ///
    /// # Arguments
    /// * `config` - Algorithms and policy names
    /// * `local_msp` - Membership authority of this node's organization
    /// * `channel_msps` - Channel → membership authority registry
    /// * `policies` - Channel → policy manager registry
    /// * `digest` - Hash provider for PKI-IDs and block data
    pub fn new(
        config: IdentityCryptoConfig,
        local_msp: Arc<L>,
        channel_msps: Arc<C>,
        policies: Arc<P>,
        digest: Arc<D>,
    ) -> Self {
        Self {
            config,
            local_msp,
            channel_msps,
            policies,
            digest,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &IdentityCryptoConfig {
        &self.config
    }

    fn resolve(&self, peer_identity: &[u8]) -> CryptoServiceResult<ResolvedIdentity> {
        if peer_identity.is_empty() {
            return Err(CryptoServiceError::EmptyIdentity);
        }

        match self.local_msp.deserialize_identity(peer_identity) {
            Ok(identity) => {
                let local_org = self.local_org_id()?;
                if identity.org_id() == local_org {
                    // Local-organization identities are decided by the local
                    // MSP alone.
                    identity
                        .validate()
                        .map_err(|e| CryptoServiceError::IdentityInvalid {
                            reason: e.to_string(),
                        })?;
                    return Ok(ResolvedIdentity {
                        identity,
                        scope: IdentityScope::Local,
                    });
                }
                debug!(
                    "[mcs] Identity of org {} is not local (org {})",
                    identity.org_id(),
                    local_org
                );
            }
            Err(e) => {
                debug!(
                    "[mcs] Local MSP failed deserializing identity [{}]: {}",
                    hex::encode(peer_identity),
                    e
                );
            }
        }

        for (channel, msp) in self.channel_msps.channels() {
            let identity = match msp.deserialize_identity(peer_identity) {
                Ok(identity) => identity,
                Err(e) => {
                    debug!(
                        "[mcs] Failed deserializing identity [{}] on [{}]: {}",
                        hex::encode(peer_identity),
                        channel,
                        e
                    );
                    continue;
                }
            };

            if let Err(e) = identity.validate() {
                debug!(
                    "[mcs] Failed validating identity [{}] on [{}]: {}",
                    hex::encode(peer_identity),
                    channel,
                    e
                );
                continue;
            }

            debug!(
                "[mcs] Validation succeeded [{}] on [{}]",
                hex::encode(peer_identity),
                channel
            );
            return Ok(ResolvedIdentity {
                identity,
                scope: IdentityScope::Channel(channel),
            });
        }

        Err(CryptoServiceError::NoAuthorityFound)
    }

    fn local_org_id(&self) -> CryptoServiceResult<String> {
        self.local_msp
            .local_signing_identity()
            .map(|signer| signer.org_id().to_string())
            .map_err(|e| {
                error!("[mcs] Local signing identity unavailable: {}", e);
                CryptoServiceError::SigningUnavailable {
                    reason: e.to_string(),
                }
            })
    }

    fn evaluate_channel_policy(
        &self,
        channel: &ChannelId,
        policy_name: &str,
        signed_data: &[SignedData],
    ) -> CryptoServiceResult<()> {
        let manager = self.policies.policy_manager(channel).ok_or_else(|| {
            warn!("[mcs] No policy manager for channel [{}]", channel);
            CryptoServiceError::ChannelNotFound {
                channel: channel.clone(),
            }
        })?;

        let policy = manager.policy(policy_name).ok_or_else(|| {
            warn!(
                "[mcs] Policy [{}] missing for channel [{}]",
                policy_name, channel
            );
            CryptoServiceError::PolicyNotFound {
                channel: channel.clone(),
                policy: policy_name.to_string(),
            }
        })?;
        debug!(
            "[mcs] Evaluating policy [{}] of channel [{}] over {} signature(s)",
            policy_name,
            channel,
            signed_data.len()
        );

        policy
            .evaluate(signed_data)
            .map_err(|e| CryptoServiceError::PolicyDenied {
                channel: channel.clone(),
                policy: policy_name.to_string(),
                reason: e.to_string(),
            })
    }
}

impl<L, C, P, D> MessageCryptoApi for IdentityCryptoService<L, C, P, D>
where
    L: LocalMembership,
    C: ChannelMembershipRegistry,
    P: PolicyManagerRegistry,
    D: DigestProvider,
{
    fn validate_identity(&self, peer_identity: &[u8]) -> CryptoServiceResult<()> {
        self.resolve(peer_identity).map(|_| ())
    }

    fn resolve_identity(&self, peer_identity: &[u8]) -> CryptoServiceResult<IdentityScope> {
        self.resolve(peer_identity).map(|resolved| resolved.scope)
    }

    fn pki_id(&self, peer_identity: &[u8]) -> PkiId {
        match self.try_pki_id(peer_identity) {
            Ok(pki_id) => pki_id,
            Err(CryptoServiceError::EmptyIdentity) => {
                error!("[mcs] Invalid peer identity: it must be non-empty");
                PkiId::empty()
            }
            Err(e) => {
                error!("[mcs] Failed computing PKI-ID: {}", e);
                debug!(
                    "[mcs] PKI-ID failure for identity [{}]",
                    hex::encode(peer_identity)
                );
                PkiId::empty()
            }
        }
    }

    fn try_pki_id(&self, peer_identity: &[u8]) -> CryptoServiceResult<PkiId> {
        if peer_identity.is_empty() {
            return Err(CryptoServiceError::EmptyIdentity);
        }

        self.digest
            .hash(peer_identity, self.config.pki_id_algorithm)
            .map(PkiId::from)
            .map_err(|e| CryptoServiceError::DigestFailure {
                reason: e.to_string(),
            })
    }

    fn sign(&self, message: &[u8]) -> CryptoServiceResult<Vec<u8>> {
        let signer = self.local_msp.local_signing_identity().map_err(|e| {
            error!("[mcs] Cannot sign, local signing identity unavailable: {}", e);
            CryptoServiceError::SigningUnavailable {
                reason: e.to_string(),
            }
        })?;

        signer
            .sign(message)
            .map_err(|e| CryptoServiceError::SigningFailed {
                reason: e.to_string(),
            })
    }

    fn verify(
        &self,
        peer_identity: &[u8],
        signature: &[u8],
        message: &[u8],
    ) -> CryptoServiceResult<()> {
        let resolved = self.resolve(peer_identity).map_err(|e| {
            debug!("[mcs] Failed getting validated identity: {}", e);
            e
        })?;

        match resolved.scope {
            IdentityScope::Local => resolved
                .identity
                .verify(message, signature)
                .map_err(|e| CryptoServiceError::SignatureInvalid {
                    reason: e.to_string(),
                }),
            IdentityScope::Channel(channel) => {
                self.verify_by_channel(&channel, peer_identity, signature, message)
            }
        }
    }

    fn verify_by_channel(
        &self,
        channel: &ChannelId,
        peer_identity: &[u8],
        signature: &[u8],
        message: &[u8],
    ) -> CryptoServiceResult<()> {
        if peer_identity.is_empty() {
            return Err(CryptoServiceError::EmptyIdentity);
        }

        let signed = [SignedData::new(message, peer_identity, signature)];
        self.evaluate_channel_policy(channel, &self.config.reader_policy, &signed)
    }

    fn verify_block(&self, channel: &ChannelId, signed_block: &[u8]) -> CryptoServiceResult<()> {
        let block = Block::decode(signed_block).map_err(|e| CryptoServiceError::BlockMalformed {
            reason: e.to_string(),
        })?;

        if &block.channel_id != channel {
            warn!(
                "[mcs] Block {} claims channel [{}], received on [{}]",
                block.header.number, block.channel_id, channel
            );
            return Err(CryptoServiceError::BlockChannelMismatch {
                expected: channel.clone(),
                actual: block.channel_id,
            });
        }

        let data_hash = self
            .digest
            .hash(
                &Block::data_hash_input(&block.data),
                self.config.block_data_hash_algorithm,
            )
            .map_err(|e| CryptoServiceError::DigestFailure {
                reason: e.to_string(),
            })?;
        if data_hash != block.header.data_hash {
            return Err(CryptoServiceError::BlockDataHashMismatch {
                number: block.header.number,
            });
        }

        if block.metadata.signatures.is_empty() {
            return Err(CryptoServiceError::BlockMalformed {
                reason: format!("block {} carries no signatures", block.header.number),
            });
        }

        let mut signed_data = Vec::with_capacity(block.metadata.signatures.len());
        for entry in &block.metadata.signatures {
            let payload = block.signing_payload(&entry.signature_header).map_err(|e| {
                CryptoServiceError::BlockMalformed {
                    reason: e.to_string(),
                }
            })?;
            signed_data.push(SignedData {
                data: payload,
                identity: entry.signature_header.creator.clone(),
                signature: entry.signature.clone(),
            });
        }

        self.evaluate_channel_policy(channel, &self.config.block_validation_policy, &signed_data)
    }
}

// =============================================================================
// TESTS
// =============================================================================
