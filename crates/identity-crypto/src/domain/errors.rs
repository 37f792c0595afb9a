//! # Service Errors
//!
//! Error kinds surfaced to callers of the identity crypto service.
//!
//! Per-candidate deserialization and validity failures during identity
//! resolution never appear here individually; once every candidate has been
//! exhausted only [`CryptoServiceError::NoAuthorityFound`] is reported.
//! No variant carries raw identity bytes.

use super::entities::ChannelId;
use thiserror::Error;

/// Errors returned by the identity crypto service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoServiceError {
    /// The caller passed no identity bytes
    #[error("Invalid peer identity: it must be non-empty")]
    EmptyIdentity,

    /// No membership authority could deserialize and validate the identity
    #[error("Peer identity cannot be validated: no membership authority able to do it")]
    NoAuthorityFound,

    /// A local-organization identity failed its validity check
    #[error("Peer identity is invalid: {reason}")]
    IdentityInvalid { reason: String },

    /// Direct signature verification against a local identity failed
    #[error("Signature verification failed: {reason}")]
    SignatureInvalid { reason: String },

    /// The channel policy rejected the signed payload
    #[error("Policy {policy} of channel {channel} denied the signature set: {reason}")]
    PolicyDenied {
        channel: ChannelId,
        policy: String,
        reason: String,
    },

    /// No policy manager is registered for the channel
    #[error("No policy manager for channel {channel}")]
    ChannelNotFound { channel: ChannelId },

    /// The channel's policy manager has no policy with this name
    #[error("Policy {policy} not found for channel {channel}")]
    PolicyNotFound { channel: ChannelId, policy: String },

    /// The digest provider failed
    #[error("Digest computation failed: {reason}")]
    DigestFailure { reason: String },

    /// No local signing identity is configured (configuration fault)
    #[error("Local signing identity unavailable: {reason}")]
    SigningUnavailable { reason: String },

    /// The local signing identity failed to produce a signature
    #[error("Signing failed: {reason}")]
    SigningFailed { reason: String },

    /// The signed block could not be decoded or is structurally incomplete
    #[error("Malformed block: {reason}")]
    BlockMalformed { reason: String },

    /// The block declares a different channel than the one it was received on
    #[error("Block belongs to channel {actual}, expected {expected}")]
    BlockChannelMismatch {
        expected: ChannelId,
        actual: ChannelId,
    },

    /// The block header does not commit to the block data
    #[error("Block data hash mismatch for block {number}")]
    BlockDataHashMismatch { number: u64 },
}

impl CryptoServiceError {
    /// Whether retrying the same call can never succeed without a
    /// configuration change.
    pub fn is_configuration_fault(&self) -> bool {
        matches!(
            self,
            CryptoServiceError::SigningUnavailable { .. }
                | CryptoServiceError::ChannelNotFound { .. }
                | CryptoServiceError::PolicyNotFound { .. }
        )
    }
}

/// Result type for identity crypto service operations.
pub type CryptoServiceResult<T> = Result<T, CryptoServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_denied_passes_reason_through() {
        let err = CryptoServiceError::PolicyDenied {
            channel: ChannelId::from("ch1"),
            policy: "/Channel/Application/Readers".into(),
            reason: "signer org OrgX not in [Org1]".into(),
        };

        assert!(err.to_string().ends_with("signer org OrgX not in [Org1]"));
    }

    #[test]
    fn test_configuration_faults() {
        assert!(CryptoServiceError::SigningUnavailable {
            reason: "none".into()
        }
        .is_configuration_fault());
        assert!(!CryptoServiceError::NoAuthorityFound.is_configuration_fault());
        assert!(!CryptoServiceError::EmptyIdentity.is_configuration_fault());
    }
}
