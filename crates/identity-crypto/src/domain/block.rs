//! # Signed Blocks
//!
//! Blocks disseminated over gossip carry their channel, a header committing
//! to the block data, and metadata holding the orderer signatures.
//!
//! ## Signed bytes
//!
//! Each metadata signature covers
//! `metadata.value ‖ encode(signature_header) ‖ encode(header)`, so a
//! signature binds the signer, its nonce and the exact header.
//!
//! ## Data hash
//!
//! The header's data hash covers every entry prefixed with its length as a
//! little-endian `u64`, so entries cannot be re-split without changing it.

use super::codec;
use super::entities::ChannelId;
use serde::{Deserialize, Serialize};
use shared_crypto::{hash_many, HashAlgorithm};
use thiserror::Error;

/// Block encoding/decoding failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("block codec error: {0}")]
pub struct BlockCodecError(pub String);

/// Block header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Height of the block in its channel's chain
    pub number: u64,
    /// Hash of the previous block header
    pub previous_hash: Vec<u8>,
    /// Hash over the length-prefixed block data entries
    pub data_hash: Vec<u8>,
}

/// Who signed, plus a nonce preventing signature reuse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureHeader {
    /// Serialized identity of the signer
    pub creator: Vec<u8>,
    /// Signer-chosen nonce
    pub nonce: Vec<u8>,
}

/// One signature in the block metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSignature {
    pub signature_header: SignatureHeader,
    pub signature: Vec<u8>,
}

/// Block metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMetadata {
    /// Opaque value co-signed by every metadata signature
    pub value: Vec<u8>,
    pub signatures: Vec<MetadataSignature>,
}

/// A block as disseminated over gossip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Channel the block claims to belong to
    pub channel_id: ChannelId,
    pub header: BlockHeader,
    /// Opaque envelopes
    pub data: Vec<Vec<u8>>,
    pub metadata: BlockMetadata,
}

impl Block {
    /// Create an unsigned block whose header commits to `data`.
    pub fn new(
        channel_id: ChannelId,
        number: u64,
        previous_hash: Vec<u8>,
        data: Vec<Vec<u8>>,
        algorithm: HashAlgorithm,
    ) -> Self {
        let data_hash = Self::compute_data_hash(&data, algorithm);
        Self {
            channel_id,
            header: BlockHeader {
                number,
                previous_hash,
                data_hash,
            },
            data,
            metadata: BlockMetadata::default(),
        }
    }

    /// Hash committing to every data entry and its boundaries.
    pub fn compute_data_hash(data: &[Vec<u8>], algorithm: HashAlgorithm) -> Vec<u8> {
        let lengths: Vec<[u8; 8]> = data
            .iter()
            .map(|entry| (entry.len() as u64).to_le_bytes())
            .collect();
        let mut parts: Vec<&[u8]> = Vec::with_capacity(data.len() * 2);
        for (length, entry) in lengths.iter().zip(data) {
            parts.push(length);
            parts.push(entry);
        }
        hash_many(algorithm, &parts).to_vec()
    }

    /// Bytes fed to the data hash: each entry prefixed with its length.
    pub fn data_hash_input(data: &[Vec<u8>]) -> Vec<u8> {
        let total = data.iter().map(|entry| entry.len() + 8).sum::<usize>();
        let mut input = Vec::with_capacity(total);
        for entry in data {
            input.extend_from_slice(&(entry.len() as u64).to_le_bytes());
            input.extend_from_slice(entry);
        }
        input
    }

    /// Bytes a metadata signature with this header must cover.
    pub fn signing_payload(
        &self,
        signature_header: &SignatureHeader,
    ) -> Result<Vec<u8>, BlockCodecError> {
        let encoded_sig_header =
            codec::encode(signature_header).map_err(|e| BlockCodecError(e.to_string()))?;
        let encoded_header =
            codec::encode(&self.header).map_err(|e| BlockCodecError(e.to_string()))?;

        let mut payload = Vec::with_capacity(
            self.metadata.value.len() + encoded_sig_header.len() + encoded_header.len(),
        );
        payload.extend_from_slice(&self.metadata.value);
        payload.extend_from_slice(&encoded_sig_header);
        payload.extend_from_slice(&encoded_header);
        Ok(payload)
    }

    /// Attach a signature produced over [`Block::signing_payload`].
    pub fn push_signature(&mut self, signature_header: SignatureHeader, signature: Vec<u8>) {
        self.metadata.signatures.push(MetadataSignature {
            signature_header,
            signature,
        });
    }

    /// Serialize for transport.
    pub fn encode(&self) -> Result<Vec<u8>, BlockCodecError> {
        codec::encode(self).map_err(|e| BlockCodecError(e.to_string()))
    }

    /// Deserialize a block received from the network.
    pub fn decode(bytes: &[u8]) -> Result<Self, BlockCodecError> {
        if bytes.is_empty() {
            return Err(BlockCodecError("empty block".to_string()));
        }
        codec::decode(bytes).map_err(|e| BlockCodecError(e.to_string()))
    }
}
