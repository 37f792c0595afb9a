//! Fuzz target for identity resolution and message verification.
//!
//! ## Running
//!
//! ```bash
//! cd crates/identity-crypto
//! cargo +nightly fuzz run fuzz_verify_message
//! ```

#![no_main]

use identity_crypto::{
    ChannelConfigStore, Ed25519Msp, IdentityCryptoConfig, IdentityCryptoService, MessageCryptoApi,
    SharedCryptoDigest,
};
use libfuzzer_sys::fuzz_target;
use shared_crypto::Ed25519KeyPair;
use std::sync::Arc;

/// Fuzz input for verification.
#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput {
    /// Serialized peer identity
    identity: Vec<u8>,
    signature: Vec<u8>,
    message: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let local = Arc::new(
        Ed25519Msp::with_root_key("Org1MSP", Ed25519KeyPair::from_seed([2; 32]))
            .with_signer(Ed25519KeyPair::from_seed([1; 32]), None)
            .unwrap(),
    );
    let store = Arc::new(ChannelConfigStore::new());
    let service = IdentityCryptoService::new(
        IdentityCryptoConfig::default(),
        local,
        store.clone(),
        store,
        Arc::new(SharedCryptoDigest::new()),
    );

    let first = service.verify(&input.identity, &input.signature, &input.message);
    let second = service.verify(&input.identity, &input.signature, &input.message);
    assert_eq!(first, second);

    // PKI-IDs are empty exactly for empty identities
    assert_eq!(
        service.pki_id(&input.identity).is_empty(),
        input.identity.is_empty()
    );
});
