//! # Domain Entities
//!
//! Call-scoped values exchanged between the service and its collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a logical channel (an independently governed trust scope).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Create a channel identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ChannelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// PKI identifier of a peer: the digest of its serialized identity.
///
/// An empty `PkiId` means "unusable", never "identifier zero".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PkiId(Vec<u8>);

impl PkiId {
    /// The empty (unusable) identifier.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Whether the identifier is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the raw digest bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for PkiId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for PkiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Administrative scope an identity was resolved in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IdentityScope {
    /// The identity belongs to this node's own organization.
    Local,
    /// The identity was validated by the membership authority of a channel.
    Channel(ChannelId),
}

impl IdentityScope {
    /// The owning channel, if any.
    pub fn channel(&self) -> Option<&ChannelId> {
        match self {
            IdentityScope::Local => None,
            IdentityScope::Channel(id) => Some(id),
        }
    }

    /// Whether the identity is in the local organization's scope.
    pub fn is_local(&self) -> bool {
        matches!(self, IdentityScope::Local)
    }
}

impl fmt::Display for IdentityScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityScope::Local => f.write_str("local"),
            IdentityScope::Channel(id) => write!(f, "channel:{id}"),
        }
    }
}

/// A signed statement submitted to a policy evaluator.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedData {
    /// The signed bytes
    pub data: Vec<u8>,
    /// Serialized identity of the signer
    pub identity: Vec<u8>,
    /// Signature over `data`
    pub signature: Vec<u8>,
}

impl SignedData {
    /// Build a signed statement from borrowed parts.
    pub fn new(data: &[u8], identity: &[u8], signature: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            identity: identity.to_vec(),
            signature: signature.to_vec(),
        }
    }
}

// Identity bytes stay out of Debug output so they cannot leak through
// error reports or `{:?}` logging at non-debug levels.
impl fmt::Debug for SignedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedData")
            .field("data_len", &self.data.len())
            .field("identity_len", &self.identity.len())
            .field("signature_len", &self.signature.len())
            .finish()
    }
}
