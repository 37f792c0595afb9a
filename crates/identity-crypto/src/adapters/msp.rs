//! # Ed25519 Membership Service Provider
//!
//! Minimal membership authority for one organization. Each MSP has a root
//! Ed25519 key; an identity is the canonical bincode encoding of
//! [`SerializedIdentity`]: the issuing MSP id, the member's public key, an
//! optional expiry (unix seconds) and the root key's endorsement over those
//! three claims.
//!
//! Validity means: endorsed by this MSP's root key, not revoked, not
//! expired. Peers only need the root public key ([`Ed25519Msp::verifier`]);
//! issuing requires the root key pair.

use crate::domain::codec;
use crate::ports::outbound::{
    Identity, LocalMembership, MembershipAuthority, MembershipError, SigningIdentity,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Domain separator of the endorsed claims.
const CLAIMS_CONTEXT: &str = "gossip-identity/v1";

/// Wire form of an identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedIdentity {
    pub msp_id: String,
    pub public_key: [u8; 32],
    /// Expiry in unix seconds; `None` never expires
    pub not_after: Option<u64>,
    /// Root-key signature over [`SerializedIdentity::claims`]
    pub endorsement: Vec<u8>,
}

impl SerializedIdentity {
    /// Bytes the MSP root key endorses.
    pub fn claims(&self) -> Result<Vec<u8>, MembershipError> {
        codec::encode(&(CLAIMS_CONTEXT, &self.msp_id, &self.public_key, self.not_after)).map_err(
            |e| MembershipError::Deserialization {
                reason: e.to_string(),
            },
        )
    }

    /// Encode for transport.
    pub fn encode(&self) -> Result<Vec<u8>, MembershipError> {
        codec::encode(self).map_err(|e| MembershipError::Deserialization {
            reason: e.to_string(),
        })
    }

    /// Decode bytes received from a peer. Anything but exactly one encoded
    /// identity is rejected.
    pub fn decode(bytes: &[u8]) -> Result<Self, MembershipError> {
        codec::decode(bytes).map_err(|e| MembershipError::Deserialization {
            reason: e.to_string(),
        })
    }
}

type RevocationList = Arc<RwLock<HashSet<[u8; 32]>>>;

/// Principal of `public_key` within `msp_id`.
fn principal(msp_id: &str, public_key: &Ed25519PublicKey) -> Vec<u8> {
    let mut id = Vec::with_capacity(msp_id.len() + 33);
    id.extend_from_slice(msp_id.as_bytes());
    id.push(0);
    id.extend_from_slice(public_key.as_bytes());
    id
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A deserialized Ed25519 identity.
pub struct Ed25519Identity {
    msp_id: String,
    public_key: Ed25519PublicKey,
    not_after: Option<u64>,
    claims: Vec<u8>,
    endorsement: Vec<u8>,
    root: Ed25519PublicKey,
    revoked: RevocationList,
}

impl Ed25519Identity {
    /// The identity's verification key.
    pub fn public_key(&self) -> &Ed25519PublicKey {
        &self.public_key
    }

    fn check_endorsement(&self) -> Result<(), MembershipError> {
        let untrusted = || MembershipError::UntrustedIssuer {
            msp_id: self.msp_id.clone(),
        };
        let endorsement =
            Ed25519Signature::from_slice(&self.endorsement).map_err(|_| untrusted())?;
        self.root
            .verify(&self.claims, &endorsement)
            .map_err(|_| untrusted())
    }
}

impl Identity for Ed25519Identity {
    fn org_id(&self) -> &str {
        &self.msp_id
    }

    fn id(&self) -> Vec<u8> {
        principal(&self.msp_id, &self.public_key)
    }

    fn validate(&self) -> Result<(), MembershipError> {
        self.check_endorsement()?;
        if self.revoked.read().contains(self.public_key.as_bytes()) {
            return Err(MembershipError::Revoked);
        }
        if let Some(not_after) = self.not_after {
            if not_after < now_secs() {
                return Err(MembershipError::Expired { not_after });
            }
        }
        Ok(())
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), MembershipError> {
        let signature = Ed25519Signature::from_slice(signature).map_err(|e| {
            MembershipError::InvalidSignature {
                reason: e.to_string(),
            }
        })?;

        self.public_key
            .verify(message, &signature)
            .map_err(|e| MembershipError::InvalidSignature {
                reason: e.to_string(),
            })
    }
}

/// This node's signing identity.
pub struct LocalSigner {
    msp_id: String,
    keypair: Ed25519KeyPair,
    serialized: Vec<u8>,
}

impl LocalSigner {
    /// The signer's verification key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }
}

impl SigningIdentity for LocalSigner {
    fn org_id(&self) -> &str {
        &self.msp_id
    }

    fn serialize(&self) -> Vec<u8> {
        self.serialized.clone()
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, MembershipError> {
        Ok(self.keypair.sign(message).to_vec())
    }
}

/// Membership authority of one organization.
pub struct Ed25519Msp {
    msp_id: String,
    root: Ed25519PublicKey,
    issuer: Option<Ed25519KeyPair>,
    revoked: RevocationList,
    signer: Option<Arc<LocalSigner>>,
}

impl Ed25519Msp {
    /// New organization with a freshly generated root key.
    pub fn new(msp_id: impl Into<String>) -> Self {
        Self::with_root_key(msp_id, Ed25519KeyPair::generate())
    }

    /// Issuing MSP holding the organization's root key pair.
    pub fn with_root_key(msp_id: impl Into<String>, root: Ed25519KeyPair) -> Self {
        let mut msp = Self::verifier(msp_id, root.public_key());
        msp.issuer = Some(root);
        msp
    }

    /// Verifying-only MSP trusting `root` (e.g. a channel member
    /// organization, or another peer of the same organization).
    pub fn verifier(msp_id: impl Into<String>, root: Ed25519PublicKey) -> Self {
        Self {
            msp_id: msp_id.into(),
            root,
            issuer: None,
            revoked: Arc::new(RwLock::new(HashSet::new())),
            signer: None,
        }
    }

    /// Attach a signing key, issuing its identity with this MSP's root key.
    pub fn with_signer(
        self,
        keypair: Ed25519KeyPair,
        not_after: Option<u64>,
    ) -> Result<Self, MembershipError> {
        let identity = self.issue(&keypair.public_key(), not_after)?;
        self.with_enrolled_signer(keypair, identity)
    }

    /// Attach a signing key together with the identity the organization
    /// issued for it, making the MSP usable as the local membership
    /// authority.
    pub fn with_enrolled_signer(
        mut self,
        keypair: Ed25519KeyPair,
        identity: Vec<u8>,
    ) -> Result<Self, MembershipError> {
        let enrolled = self.deserialize_identity(&identity)?;
        if enrolled.id() != principal(&self.msp_id, &keypair.public_key()) {
            return Err(MembershipError::SignerMismatch);
        }
        enrolled.validate()?;

        self.signer = Some(Arc::new(LocalSigner {
            msp_id: self.msp_id.clone(),
            keypair,
            serialized: identity,
        }));
        Ok(self)
    }

    /// Identifier of the organization.
    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// Root public key identities of this MSP are endorsed with.
    pub fn root_key(&self) -> Ed25519PublicKey {
        self.root
    }

    /// Serialized identity for `public_key`, endorsed by the root key.
    pub fn issue(
        &self,
        public_key: &Ed25519PublicKey,
        not_after: Option<u64>,
    ) -> Result<Vec<u8>, MembershipError> {
        let issuer = self
            .issuer
            .as_ref()
            .ok_or_else(|| MembershipError::NotAnIssuer {
                msp_id: self.msp_id.clone(),
            })?;

        let mut identity = SerializedIdentity {
            msp_id: self.msp_id.clone(),
            public_key: *public_key.as_bytes(),
            not_after,
            endorsement: Vec::new(),
        };
        identity.endorsement = issuer.sign(&identity.claims()?).to_vec();
        identity.encode()
    }

    /// Revoke every identity carrying `public_key`. Takes effect for
    /// identities already deserialized as well.
    pub fn revoke(&self, public_key: &Ed25519PublicKey) {
        info!("[mcs] MSP {} revoking a key", self.msp_id);
        self.revoked.write().insert(*public_key.as_bytes());
    }
}

impl MembershipAuthority for Ed25519Msp {
    fn deserialize_identity(
        &self,
        serialized: &[u8],
    ) -> Result<Box<dyn Identity>, MembershipError> {
        let decoded = SerializedIdentity::decode(serialized)?;

        if decoded.msp_id != self.msp_id {
            return Err(MembershipError::ForeignMsp {
                expected: self.msp_id.clone(),
                actual: decoded.msp_id,
            });
        }

        let public_key = Ed25519PublicKey::from_bytes(decoded.public_key).map_err(|e| {
            MembershipError::Deserialization {
                reason: e.to_string(),
            }
        })?;
        let claims = decoded.claims()?;

        Ok(Box::new(Ed25519Identity {
            msp_id: decoded.msp_id,
            public_key,
            not_after: decoded.not_after,
            claims,
            endorsement: decoded.endorsement,
            root: self.root,
            revoked: self.revoked.clone(),
        }))
    }
}

impl LocalMembership for Ed25519Msp {
    fn local_signing_identity(&self) -> Result<Arc<dyn SigningIdentity>, MembershipError> {
        self.signer
            .clone()
            .map(|signer| signer as Arc<dyn SigningIdentity>)
            .ok_or(MembershipError::NoSigningIdentity)
    }
}

/// Membership authority of a channel: the MSPs of every member
/// organization, dispatched on the MSP id an identity claims.
#[derive(Default)]
pub struct MspManager {
    msps: HashMap<String, Arc<Ed25519Msp>>,
}

impl MspManager {
    /// Manager with no member organizations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a member organization.
    pub fn with_msp(mut self, msp: Arc<Ed25519Msp>) -> Self {
        self.msps.insert(msp.msp_id().to_string(), msp);
        self
    }

    /// Ids of the member organizations.
    pub fn msp_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.msps.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl MembershipAuthority for MspManager {
    fn deserialize_identity(
        &self,
        serialized: &[u8],
    ) -> Result<Box<dyn Identity>, MembershipError> {
        let decoded = SerializedIdentity::decode(serialized)?;

        match self.msps.get(&decoded.msp_id) {
            Some(msp) => msp.deserialize_identity(serialized),
            None => Err(MembershipError::Deserialization {
                reason: format!("no MSP {} in this channel", decoded.msp_id),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_msp() -> Ed25519Msp {
        Ed25519Msp::new("Org1MSP")
            .with_signer(Ed25519KeyPair::generate(), None)
            .unwrap()
    }

    /// Identity for `key` claiming `msp_id`, endorsed by `endorser`.
    fn self_made(msp_id: &str, key: &Ed25519PublicKey, endorser: &Ed25519KeyPair) -> Vec<u8> {
        let mut identity = SerializedIdentity {
            msp_id: msp_id.to_string(),
            public_key: *key.as_bytes(),
            not_after: None,
            endorsement: Vec::new(),
        };
        identity.endorsement = endorser.sign(&identity.claims().unwrap()).to_vec();
        identity.encode().unwrap()
    }

    #[test]
    fn test_signer_identity_roundtrip() {
        let msp = local_msp();
        let signer = msp.local_signing_identity().unwrap();

        let identity = msp.deserialize_identity(&signer.serialize()).unwrap();

        assert_eq!(identity.org_id(), "Org1MSP");
        assert!(identity.validate().is_ok());

        let signature = signer.sign(b"hello").unwrap();
        assert!(identity.verify(b"hello", &signature).is_ok());
        assert!(identity.verify(b"hellO", &signature).is_err());
    }

    #[test]
    fn test_verifier_accepts_identities_of_its_root() {
        let org1 = Ed25519Msp::new("Org1MSP");
        let peer_view = Ed25519Msp::verifier("Org1MSP", org1.root_key());
        let key = Ed25519KeyPair::generate().public_key();

        let identity = peer_view
            .deserialize_identity(&org1.issue(&key, None).unwrap())
            .unwrap();

        assert!(identity.validate().is_ok());
    }

    #[test]
    fn test_self_made_identity_untrusted() {
        let msp = Ed25519Msp::new("Org1MSP");
        let attacker = Ed25519KeyPair::generate();

        let unendorsed = SerializedIdentity {
            msp_id: "Org1MSP".into(),
            public_key: *attacker.public_key().as_bytes(),
            not_after: None,
            endorsement: Vec::new(),
        }
        .encode()
        .unwrap();
        let self_endorsed = self_made("Org1MSP", &attacker.public_key(), &attacker);

        for bytes in [unendorsed, self_endorsed] {
            let identity = msp.deserialize_identity(&bytes).unwrap();
            assert_eq!(
                identity.validate(),
                Err(MembershipError::UntrustedIssuer {
                    msp_id: "Org1MSP".into()
                })
            );
        }
    }

    #[test]
    fn test_extended_expiry_breaks_endorsement() {
        let msp = Ed25519Msp::new("Org1MSP");
        let key = Ed25519KeyPair::generate().public_key();
        let mut decoded = SerializedIdentity::decode(&msp.issue(&key, Some(1)).unwrap()).unwrap();

        decoded.not_after = None;
        let identity = msp.deserialize_identity(&decoded.encode().unwrap()).unwrap();

        assert!(matches!(
            identity.validate(),
            Err(MembershipError::UntrustedIssuer { .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let msp = local_msp();
        let mut bytes = msp.local_signing_identity().unwrap().serialize();
        bytes.push(0xAA);

        assert!(matches!(
            msp.deserialize_identity(&bytes),
            Err(MembershipError::Deserialization { .. })
        ));
    }

    #[test]
    fn test_id_is_independent_of_encoding() {
        let msp = Ed25519Msp::new("Org1MSP");
        let key = Ed25519KeyPair::generate().public_key();

        let short_lived = msp
            .deserialize_identity(&msp.issue(&key, Some(u64::MAX)).unwrap())
            .unwrap();
        let forever = msp
            .deserialize_identity(&msp.issue(&key, None).unwrap())
            .unwrap();

        assert_eq!(short_lived.id(), forever.id());
    }

    #[test]
    fn test_foreign_msp_rejected() {
        let org1 = local_msp();
        let org2 = Ed25519Msp::new("Org2MSP");
        let bytes = org1.local_signing_identity().unwrap().serialize();

        assert!(matches!(
            org2.deserialize_identity(&bytes),
            Err(MembershipError::ForeignMsp { .. })
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let msp = Ed25519Msp::new("Org1MSP");

        assert!(matches!(
            msp.deserialize_identity(b"not an identity"),
            Err(MembershipError::Deserialization { .. })
        ));
    }

    #[test]
    fn test_expired_identity_fails_validation() {
        let msp = Ed25519Msp::new("Org1MSP");
        let key = Ed25519KeyPair::generate().public_key();
        let bytes = msp.issue(&key, Some(1)).unwrap();

        let identity = msp.deserialize_identity(&bytes).unwrap();

        assert_eq!(
            identity.validate(),
            Err(MembershipError::Expired { not_after: 1 })
        );
    }

    #[test]
    fn test_revocation_applies_to_live_identities() {
        let msp = Ed25519Msp::new("Org1MSP");
        let key = Ed25519KeyPair::generate().public_key();
        let identity = msp
            .deserialize_identity(&msp.issue(&key, None).unwrap())
            .unwrap();
        assert!(identity.validate().is_ok());

        msp.revoke(&key);

        assert_eq!(identity.validate(), Err(MembershipError::Revoked));
    }

    #[test]
    fn test_short_signature_rejected() {
        let msp = local_msp();
        let bytes = msp.local_signing_identity().unwrap().serialize();
        let identity = msp.deserialize_identity(&bytes).unwrap();

        assert!(matches!(
            identity.verify(b"m", &[1, 2, 3]),
            Err(MembershipError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn test_verifier_cannot_issue() {
        let org1 = Ed25519Msp::new("Org1MSP");
        let peer_view = Ed25519Msp::verifier("Org1MSP", org1.root_key());
        let key = Ed25519KeyPair::generate().public_key();

        assert_eq!(
            peer_view.issue(&key, None),
            Err(MembershipError::NotAnIssuer {
                msp_id: "Org1MSP".into()
            })
        );
    }

    #[test]
    fn test_enrolled_signer_must_match_identity() {
        let org1 = Ed25519Msp::new("Org1MSP");
        let enrolled_key = Ed25519KeyPair::generate();
        let identity = org1.issue(&enrolled_key.public_key(), None).unwrap();

        let mismatched = Ed25519Msp::verifier("Org1MSP", org1.root_key())
            .with_enrolled_signer(Ed25519KeyPair::generate(), identity.clone());
        assert!(matches!(mismatched, Err(MembershipError::SignerMismatch)));

        let peer = Ed25519Msp::verifier("Org1MSP", org1.root_key())
            .with_enrolled_signer(enrolled_key, identity.clone())
            .unwrap();
        assert_eq!(peer.local_signing_identity().unwrap().serialize(), identity);
    }

    #[test]
    fn test_self_made_identity_cannot_be_enrolled() {
        let org1 = Ed25519Msp::new("Org1MSP");
        let attacker = Ed25519KeyPair::generate();
        let identity = self_made("Org1MSP", &attacker.public_key(), &attacker);

        let result = Ed25519Msp::verifier("Org1MSP", org1.root_key())
            .with_enrolled_signer(attacker, identity);

        assert!(matches!(
            result,
            Err(MembershipError::UntrustedIssuer { .. })
        ));
    }

    #[test]
    fn test_msp_manager_dispatches_on_msp_id() {
        let org1 = Arc::new(Ed25519Msp::new("Org1MSP"));
        let org2 = Arc::new(Ed25519Msp::new("Org2MSP"));
        let manager = MspManager::new().with_msp(org1.clone()).with_msp(org2);
        let key = Ed25519KeyPair::generate().public_key();

        let identity = manager
            .deserialize_identity(&org1.issue(&key, None).unwrap())
            .unwrap();
        assert_eq!(identity.org_id(), "Org1MSP");
        assert_eq!(manager.msp_ids(), vec!["Org1MSP", "Org2MSP"]);

        let outsider = Ed25519Msp::new("Org3MSP").issue(&key, None).unwrap();
        assert!(matches!(
            manager.deserialize_identity(&outsider),
            Err(MembershipError::Deserialization { .. })
        ));
    }

    #[test]
    fn test_verifying_only_msp_has_no_signer() {
        let msp = Ed25519Msp::new("Org2MSP");

        assert!(matches!(
            msp.local_signing_identity(),
            Err(MembershipError::NoSigningIdentity)
        ));
    }
}
