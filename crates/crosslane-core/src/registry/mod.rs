//! Message registry
//!
//! Accepts proposals in strict nonce order, freezes each message's signature
//! threshold at proposal time, and performs the one-time forwarding call once
//! the quorum threshold is reached. A delivery failure aborts the whole
//! execute operation with no state change, so execution can be retried.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crosslane_common::{
    derive_message_id, AccountId, Attribute, MessageId, MessageStatus, ProposalEnvelope,
    RegistryError, RelayMessage, Result,
};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::dispatch::{DeliveryRequest, DestinationHandler};
use crate::journal::{EventJournal, RelayEvent};
use crate::quorum::AttestationQuorum;

/// Mutable registry state kept under one lock; every mutation validates and
/// commits within a single write acquisition
struct RegistryState {
    messages: HashMap<MessageId, RelayMessage>,
    nonce: u64,
}

/// Nonce-ordered proposal intake and quorum-gated execution
pub struct MessageRegistry {
    owner: AccountId,
    state: RwLock<RegistryState>,
    /// Destination handlers keyed by routing key
    routes: RwLock<HashMap<String, Arc<dyn DestinationHandler>>>,
    quorum: RwLock<Arc<AttestationQuorum>>,
    /// Execute-in-flight flag, held per top-level entry rather than per message
    executing: AtomicBool,
    journal: Arc<EventJournal>,
}

/// Scoped hold of the execute-in-flight flag, released on every exit path
struct ExecuteGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ExecuteGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for ExecuteGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl MessageRegistry {
    /// Create a registry owned by `owner`, gated by `quorum`
    pub fn new(
        owner: AccountId,
        quorum: Arc<AttestationQuorum>,
        journal: Arc<EventJournal>,
    ) -> Self {
        Self {
            owner,
            state: RwLock::new(RegistryState {
                messages: HashMap::new(),
                nonce: 0,
            }),
            routes: RwLock::new(HashMap::new()),
            quorum: RwLock::new(quorum),
            executing: AtomicBool::new(false),
            journal,
        }
    }

    /// Register a message proposal
    ///
    /// The payload must carry a [`ProposalEnvelope`] whose embedded nonce
    /// equals the registry counter; the counter advances only when a proposal
    /// is accepted. Re-proposing an identical message is idempotent: the
    /// existing id comes back unchanged and no threshold is recomputed.
    #[instrument(skip(self, payload, attributes))]
    pub async fn propose(
        &self,
        dest_chain: &str,
        receiver: &str,
        payload: Vec<u8>,
        attributes: Vec<Attribute>,
    ) -> Result<MessageId> {
        let envelope = ProposalEnvelope::decode(&payload)?;
        let message_id = derive_message_id(
            dest_chain,
            receiver,
            &payload,
            &attributes,
            envelope.expected_nonce,
        );

        let mut state = self.state.write().await;

        // The identity lookup runs before the nonce comparison: a
        // byte-identical re-proposal carries a stale embedded nonce once the
        // counter advanced, and must still resolve to its existing id.
        if let Some(existing) = state.messages.get(&message_id) {
            if existing.is_executed() {
                return Err(RegistryError::AlreadyExecuted(message_id).into());
            }
            debug!(message_id = %message_id, "Duplicate proposal, returning existing id");
            return Ok(message_id);
        }

        if envelope.expected_nonce != state.nonce {
            return Err(RegistryError::InvalidNonce {
                expected: state.nonce,
                supplied: envelope.expected_nonce,
            }
            .into());
        }
        // Counter advances only on acceptance
        state.nonce += 1;

        let required = self.quorum.read().await.derive_threshold(&attributes);
        let message = RelayMessage::new(
            dest_chain.to_string(),
            receiver.to_string(),
            payload,
            attributes,
            envelope.expected_nonce,
            required,
        );
        state.messages.insert(message_id, message);
        drop(state);

        self.journal.record(RelayEvent::MessageProposed {
            message_id,
            dest_chain: dest_chain.to_string(),
            receiver: receiver.to_string(),
        });
        info!(
            message_id = %message_id,
            dest_chain,
            receiver,
            nonce = envelope.expected_nonce,
            required_signatures = required,
            "Message proposed"
        );

        Ok(message_id)
    }

    /// Execute a message whose quorum threshold has been reached
    ///
    /// The destination handler runs before the status flips, so a message
    /// only becomes executed once delivery is confirmed. The in-flight guard
    /// blocks reentrant execution for the duration of the call.
    #[instrument(skip(self))]
    pub async fn execute(&self, message_id: MessageId) -> Result<()> {
        let _guard = ExecuteGuard::acquire(&self.executing)
            .ok_or(RegistryError::ReentrantExecution)?;

        let (dest_chain, receiver, payload, attributes, required) = {
            let state = self.state.read().await;
            let message = state
                .messages
                .get(&message_id)
                .ok_or(RegistryError::NotFound(message_id))?;
            if message.is_executed() {
                return Err(RegistryError::AlreadyExecuted(message_id).into());
            }
            (
                message.dest_chain.clone(),
                message.receiver.clone(),
                message.payload.clone(),
                message.attributes.clone(),
                message.required_signatures,
            )
        };

        let quorum = self.quorum.read().await.clone();
        let votes = quorum.vote_count(&message_id).await;
        if votes < required as usize {
            return Err(RegistryError::NotEnoughSignatures { votes, required }.into());
        }

        let handler = self
            .routes
            .read()
            .await
            .get(&dest_chain)
            .cloned()
            .ok_or_else(|| {
                RegistryError::DeliveryFailed(format!(
                    "no destination handler registered for {dest_chain}"
                ))
            })?;

        let request = DeliveryRequest {
            message_id,
            dest_chain: dest_chain.clone(),
            receiver: receiver.clone(),
            payload,
            attributes,
        };

        if let Err(e) = handler.deliver(request).await {
            warn!(message_id = %message_id, error = %e, "Delivery failed, message stays pending");
            return Err(RegistryError::DeliveryFailed(e.to_string()).into());
        }

        {
            let mut state = self.state.write().await;
            let message = state
                .messages
                .get_mut(&message_id)
                .ok_or(RegistryError::NotFound(message_id))?;
            message.status = MessageStatus::Executed;
        }

        self.journal.record(RelayEvent::MessageExecuted {
            message_id,
            dest_chain: dest_chain.clone(),
            receiver,
        });
        info!(message_id = %message_id, dest_chain = %dest_chain, "Message executed");

        Ok(())
    }

    /// Fetch a message by id
    pub async fn get_message(&self, message_id: &MessageId) -> Result<RelayMessage> {
        self.state
            .read()
            .await
            .messages
            .get(message_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(*message_id).into())
    }

    /// Current value of the proposal nonce counter
    pub async fn nonce(&self) -> u64 {
        self.state.read().await.nonce
    }

    /// Associate a routing key with a destination handler; owner only
    #[instrument(skip(self, caller, handler))]
    pub async fn register_destination(
        &self,
        caller: &AccountId,
        chain_key: &str,
        handler: Arc<dyn DestinationHandler>,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        if chain_key.is_empty() {
            return Err(
                RegistryError::InvalidConfiguration("empty destination chain key".to_string())
                    .into(),
            );
        }

        self.routes.write().await.insert(chain_key.to_string(), handler);
        info!(chain_key, "Destination handler registered");
        Ok(())
    }

    /// Replace the attestation quorum reference; owner only
    ///
    /// A quorum with no registered attestors is rejected: it could never
    /// endorse anything, so swapping it in would strand every pending message.
    #[instrument(skip(self, caller, quorum))]
    pub async fn set_quorum(
        &self,
        caller: &AccountId,
        quorum: Arc<AttestationQuorum>,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        if quorum.attestor_count().await == 0 {
            return Err(RegistryError::InvalidConfiguration(
                "attestation quorum has no registered attestors".to_string(),
            )
            .into());
        }

        *self.quorum.write().await = quorum;
        info!("Attestation quorum replaced");
        Ok(())
    }

    fn ensure_owner(&self, caller: &AccountId) -> Result<()> {
        if caller != &self.owner {
            return Err(RegistryError::Unauthorized.into());
        }
        Ok(())
    }
}
