//! # Channel Config Store
//!
//! In-memory channel registry shared by the synchronization owner (writer)
//! and the identity crypto service (reader).
//!
//! Channels are kept in a `BTreeMap`, so identity resolution tries channel
//! MSPs in lexicographic channel-id order. Enumeration clones the entries
//! under the read lock and releases it before any MSP is called.

use crate::domain::entities::ChannelId;
use crate::ports::inbound::MembershipRegistrySync;
use crate::ports::outbound::{
    ChannelMembershipRegistry, MembershipAuthority, PolicyManager, PolicyManagerRegistry,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct ChannelEntry {
    authority: Arc<dyn MembershipAuthority>,
    policies: Arc<dyn PolicyManager>,
}

/// Channel → (membership authority, policy manager) store.
#[derive(Default)]
pub struct ChannelConfigStore {
    channels: RwLock<BTreeMap<ChannelId, ChannelEntry>>,
}

impl ChannelConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of known channels.
    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    /// Whether no channel is known.
    pub fn is_empty(&self) -> bool {
        self.channels.read().is_empty()
    }

    /// Known channel ids, in resolution order.
    pub fn channel_ids(&self) -> Vec<ChannelId> {
        self.channels.read().keys().cloned().collect()
    }
}

impl MembershipRegistrySync for ChannelConfigStore {
    fn apply_channel(
        &self,
        channel: ChannelId,
        authority: Arc<dyn MembershipAuthority>,
        policies: Arc<dyn PolicyManager>,
    ) {
        info!("[mcs] Applying configuration of channel [{}]", channel);
        self.channels
            .write()
            .insert(channel, ChannelEntry { authority, policies });
    }

    fn remove_channel(&self, channel: &ChannelId) -> bool {
        let removed = self.channels.write().remove(channel).is_some();
        if removed {
            info!("[mcs] Removed channel [{}]", channel);
        }
        removed
    }
}

impl ChannelMembershipRegistry for ChannelConfigStore {
    fn authority(&self, channel: &ChannelId) -> Option<Arc<dyn MembershipAuthority>> {
        self.channels
            .read()
            .get(channel)
            .map(|entry| entry.authority.clone())
    }

    fn channels(&self) -> Vec<(ChannelId, Arc<dyn MembershipAuthority>)> {
        self.channels
            .read()
            .iter()
            .map(|(id, entry)| (id.clone(), entry.authority.clone()))
            .collect()
    }
}

impl PolicyManagerRegistry for ChannelConfigStore {
    fn policy_manager(&self, channel: &ChannelId) -> Option<Arc<dyn PolicyManager>> {
        self.channels
            .read()
            .get(channel)
            .map(|entry| entry.policies.clone())
    }
}
