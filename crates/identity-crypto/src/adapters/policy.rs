//! # Channel Policies
//!
//! Reference policy evaluator and per-channel policy table.

use crate::domain::entities::SignedData;
use crate::ports::outbound::{MembershipAuthority, Policy, PolicyError, PolicyManager};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Satisfied by signatures from at least `threshold` distinct identities
/// that belong to one of the allowed organizations.
///
/// A signed statement counts when its identity deserializes under the
/// channel authority, is currently valid, belongs to an allowed
/// organization and its signature verifies over the data. Signers are
/// told apart by [`Identity::id`](crate::ports::outbound::Identity::id),
/// not by their serialized bytes.
pub struct SignedByOrgsPolicy {
    authority: Arc<dyn MembershipAuthority>,
    orgs: BTreeSet<String>,
    threshold: usize,
}

impl SignedByOrgsPolicy {
    /// Require `threshold` (at least one) valid signers from `orgs`.
    pub fn new<I, S>(authority: Arc<dyn MembershipAuthority>, orgs: I, threshold: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            authority,
            orgs: orgs.into_iter().map(Into::into).collect(),
            threshold: threshold.max(1),
        }
    }

    /// Any single valid member of `orgs`.
    pub fn any_member_of<I, S>(authority: Arc<dyn MembershipAuthority>, orgs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(authority, orgs, 1)
    }

    /// Principal of the signer when the statement counts.
    fn check(&self, signed: &SignedData) -> Result<Vec<u8>, String> {
        let identity = self
            .authority
            .deserialize_identity(&signed.identity)
            .map_err(|e| e.to_string())?;

        if !self.orgs.contains(identity.org_id()) {
            return Err(format!(
                "signer org {} is not one of [{}]",
                identity.org_id(),
                self.org_list()
            ));
        }

        identity.validate().map_err(|e| e.to_string())?;
        identity
            .verify(&signed.data, &signed.signature)
            .map_err(|e| e.to_string())?;
        Ok(identity.id())
    }

    fn org_list(&self) -> String {
        self.orgs.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

impl Policy for SignedByOrgsPolicy {
    fn evaluate(&self, signed_data: &[SignedData]) -> Result<(), PolicyError> {
        let mut satisfied: HashSet<Vec<u8>> = HashSet::new();
        let mut last_failure = None;

        for signed in signed_data {
            if satisfied.len() >= self.threshold {
                break;
            }
            match self.check(signed) {
                Ok(principal) => {
                    satisfied.insert(principal);
                }
                Err(reason) => {
                    debug!("[mcs] Signed data rejected by policy: {}", reason);
                    last_failure = Some(reason);
                }
            }
        }

        if satisfied.len() >= self.threshold {
            return Ok(());
        }

        let mut reason = format!(
            "{} of {} required signature(s) from [{}]",
            satisfied.len(),
            self.threshold,
            self.org_list()
        );
        if let Some(failure) = last_failure {
            reason.push_str(": ");
            reason.push_str(&failure);
        }
        Err(PolicyError::Denied { reason })
    }
}

/// Named policies of one channel.
#[derive(Default)]
pub struct ChannelPolicyManager {
    policies: HashMap<String, Arc<dyn Policy>>,
}

impl ChannelPolicyManager {
    /// Empty policy table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a named policy.
    pub fn with_policy(mut self, name: impl Into<String>, policy: Arc<dyn Policy>) -> Self {
        self.policies.insert(name.into(), policy);
        self
    }
}

impl PolicyManager for ChannelPolicyManager {
    fn policy(&self, name: &str) -> Option<Arc<dyn Policy>> {
        self.policies.get(name).cloned()
    }
}
