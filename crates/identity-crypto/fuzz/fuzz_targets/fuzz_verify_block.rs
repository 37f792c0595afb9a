//! Fuzz target for block verification.
//!
//! Arbitrary bytes received as a block must be rejected with an error,
//! never accepted and never a panic.
//!
//! ## Running
//!
//! ```bash
//! cd crates/identity-crypto
//! cargo +nightly fuzz run fuzz_verify_block
//! ```

#![no_main]

use identity_crypto::config::BLOCK_VALIDATION;
use identity_crypto::{
    ChannelConfigStore, ChannelId, ChannelPolicyManager, Ed25519Msp, IdentityCryptoConfig,
    IdentityCryptoService, MembershipRegistrySync, MessageCryptoApi, SharedCryptoDigest,
    SignedByOrgsPolicy,
};
use libfuzzer_sys::fuzz_target;
use shared_crypto::Ed25519KeyPair;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let local = Arc::new(
        Ed25519Msp::with_root_key("Org1MSP", Ed25519KeyPair::from_seed([2; 32]))
            .with_signer(Ed25519KeyPair::from_seed([1; 32]), None)
            .unwrap(),
    );
    let orderer = Arc::new(Ed25519Msp::with_root_key(
        "OrdererMSP",
        Ed25519KeyPair::from_seed([3; 32]),
    ));
    let policies = ChannelPolicyManager::new().with_policy(
        BLOCK_VALIDATION,
        Arc::new(SignedByOrgsPolicy::any_member_of(orderer.clone(), ["OrdererMSP"])),
    );
    let store = Arc::new(ChannelConfigStore::new());
    store.apply_channel(ChannelId::from("fuzz"), orderer, Arc::new(policies));

    let service = IdentityCryptoService::new(
        IdentityCryptoConfig::default(),
        local,
        store.clone(),
        store,
        Arc::new(SharedCryptoDigest::new()),
    );

    // No orderer identity was ever issued, so nothing can carry a valid signature
    assert!(service.verify_block(&ChannelId::from("fuzz"), data).is_err());
});
