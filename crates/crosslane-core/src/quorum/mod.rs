//! Attestation quorum
//!
//! Authorizes voters, records endorsements, and answers "has quorum been
//! reached" queries. The quorum also owns threshold policy: how much
//! agreement a message needs is derived here from its attributes, and the
//! registry freezes the answer at proposal time.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crosslane_common::{
    classify_impact, verify_endorsement, AccountId, Attribute, ImpactClass, MessageId,
    QuorumError, Result, BASELINE_SIGNATURE_THRESHOLD, ELEVATED_SIGNATURE_THRESHOLD,
};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::journal::{EventJournal, RelayEvent};

/// Records endorsement votes from a fixed, add-only set of attestors
pub struct AttestationQuorum {
    /// Authorized attestor identities
    attestors: RwLock<HashSet<AccountId>>,
    /// Distinct voters per message
    records: RwLock<HashMap<MessageId, HashSet<AccountId>>>,
    /// Shared event journal
    journal: Arc<EventJournal>,
}

impl AttestationQuorum {
    /// Create a quorum over a fixed attestor set
    pub fn new(
        attestors: impl IntoIterator<Item = AccountId>,
        journal: Arc<EventJournal>,
    ) -> Self {
        Self {
            attestors: RwLock::new(attestors.into_iter().collect()),
            records: RwLock::new(HashMap::new()),
            journal,
        }
    }

    /// Whether an identity is in the attestor registry
    pub async fn is_authorized(&self, attestor: &AccountId) -> bool {
        self.attestors.read().await.contains(attestor)
    }

    /// Register an additional attestor; the registry is add-only
    #[instrument(skip(self, attestor))]
    pub async fn add_attestor(&self, attestor: AccountId) {
        let mut attestors = self.attestors.write().await;
        if attestors.insert(attestor) {
            info!(attestor = %attestor, total = attestors.len(), "Attestor registered");
        }
    }

    /// Number of registered attestors
    pub async fn attestor_count(&self) -> usize {
        self.attestors.read().await.len()
    }

    /// Record an endorsement of `message_id` signed by `attestor`
    ///
    /// The signature must verify against the caller's own key. Returns the
    /// running count of distinct votes for the message. No state changes on
    /// any failure path.
    #[instrument(skip(self, attestor, signature))]
    pub async fn attest(
        &self,
        attestor: &AccountId,
        message_id: MessageId,
        signature: &[u8; 64],
    ) -> Result<usize> {
        if !self.is_authorized(attestor).await {
            return Err(QuorumError::Unauthorized(*attestor).into());
        }

        let valid = verify_endorsement(attestor, &message_id, signature).unwrap_or(false);
        if !valid {
            return Err(QuorumError::InvalidSignature(*attestor).into());
        }

        let votes = {
            let mut records = self.records.write().await;
            let voters = records.entry(message_id).or_default();
            if !voters.insert(*attestor) {
                return Err(QuorumError::DuplicateVote {
                    attestor: *attestor,
                    message_id,
                }
                .into());
            }
            voters.len()
        };

        self.journal.record(RelayEvent::AttestationRecorded {
            message_id,
            attestor: *attestor,
            votes,
        });
        debug!(message_id = %message_id, attestor = %attestor, votes, "Endorsement recorded");

        Ok(votes)
    }

    /// Distinct endorsements recorded for a message; 0 if none
    pub async fn vote_count(&self, message_id: &MessageId) -> usize {
        self.records
            .read()
            .await
            .get(message_id)
            .map(|voters| voters.len())
            .unwrap_or(0)
    }

    /// Signature threshold a message with these attributes must reach
    ///
    /// Pure and side-effect-free: the registry calls this once at proposal
    /// time and trusts the frozen result permanently.
    pub fn derive_threshold(&self, attributes: &[Attribute]) -> u8 {
        match classify_impact(attributes) {
            ImpactClass::Elevated => ELEVATED_SIGNATURE_THRESHOLD,
            ImpactClass::Standard => BASELINE_SIGNATURE_THRESHOLD,
        }
    }
}
