//! # Crosslane Core
//!
//! Message registry and attestation quorum for the Crosslane cross-chain
//! relay.
//!
//! ## Components
//!
//! - **Quorum**: fixed attestor registry, endorsement votes, threshold policy
//! - **Registry**: nonce-ordered proposals, quorum-gated one-shot execution
//! - **Dispatch**: capability interface to destination handlers
//! - **Journal**: append-only relay event log with a live feed
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Relay                            │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────────┐   ┌──────────────┐   ┌─────────────┐  │
//! │  │ Message       │───│ Attestation  │   │   Journal   │  │
//! │  │ Registry      │   │ Quorum       │───│ (events)    │  │
//! │  └──────┬────────┘   └──────────────┘   └─────────────┘  │
//! │         │ deliver                                        │
//! │  ┌──────▼────────┐                                       │
//! │  │ Destination   │  (external, per routing key)          │
//! │  │ Handler       │                                       │
//! │  └───────────────┘                                       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Control flow: a submitter proposes a message; authorized attestors endorse
//! its id; once endorsements reach the threshold frozen at proposal time,
//! anyone may execute, which forwards the payload to the registered
//! destination handler and marks the message executed exactly once.

pub mod dispatch;
pub mod journal;
pub mod quorum;
pub mod registry;

pub use dispatch::{DeliveryError, DeliveryRequest, DestinationHandler};
pub use journal::{EventJournal, RelayEvent};
pub use quorum::AttestationQuorum;
pub use registry::MessageRegistry;

use std::sync::Arc;

use crosslane_common::{AccountId, CrosslaneError, Result};

/// Relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Registry owner identity, printable account form
    pub owner: String,
    /// Initial attestor identities, printable account form
    pub attestors: Vec<String>,
    /// Live-feed buffer size per journal subscriber
    pub journal_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            attestors: Vec::new(),
            journal_capacity: 256,
        }
    }
}

impl RelayConfig {
    /// Load configuration from the environment
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = Self::default();

        if let Ok(owner) = std::env::var("CROSSLANE_OWNER") {
            cfg.owner = owner;
        }
        if let Ok(attestors) = std::env::var("CROSSLANE_ATTESTORS") {
            cfg.attestors = attestors
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(capacity) = std::env::var("CROSSLANE_JOURNAL_CAPACITY") {
            if let Ok(v) = capacity.parse() {
                cfg.journal_capacity = v;
            }
        }

        Ok(cfg)
    }
}

/// Wired relay instance: one quorum, one registry, one shared journal
pub struct Relay {
    config: RelayConfig,
    journal: Arc<EventJournal>,
    quorum: Arc<AttestationQuorum>,
    registry: Arc<MessageRegistry>,
}

impl Relay {
    /// Build a relay from configuration
    pub fn new(config: RelayConfig) -> Result<Self> {
        let owner: AccountId = config
            .owner
            .parse()
            .map_err(|_| CrosslaneError::Config("owner is not a valid account id".to_string()))?;

        if config.attestors.is_empty() {
            return Err(CrosslaneError::Config(
                "at least one attestor is required".to_string(),
            ));
        }
        let mut attestors = Vec::with_capacity(config.attestors.len());
        for raw in &config.attestors {
            let id: AccountId = raw.parse().map_err(|_| {
                CrosslaneError::Config(format!("attestor is not a valid account id: {raw}"))
            })?;
            attestors.push(id);
        }

        let journal = Arc::new(EventJournal::new(config.journal_capacity));
        let quorum = Arc::new(AttestationQuorum::new(attestors, journal.clone()));
        let registry = Arc::new(MessageRegistry::new(owner, quorum.clone(), journal.clone()));

        Ok(Self {
            config,
            journal,
            quorum,
            registry,
        })
    }

    /// Get the attestation quorum
    pub fn quorum(&self) -> &Arc<AttestationQuorum> {
        &self.quorum
    }

    /// Get the message registry
    pub fn registry(&self) -> &Arc<MessageRegistry> {
        &self.registry
    }

    /// Get the event journal
    pub fn journal(&self) -> &Arc<EventJournal> {
        &self.journal
    }

    /// Get configuration
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosslane_common::AccountKeypair;

    #[test]
    fn test_relay_requires_a_parseable_owner() {
        let config = RelayConfig {
            owner: "not-an-account".to_string(),
            attestors: vec![AccountKeypair::generate().id().to_string()],
            ..RelayConfig::default()
        };
        assert!(matches!(
            Relay::new(config),
            Err(CrosslaneError::Config(_))
        ));
    }

    #[test]
    fn test_relay_requires_attestors() {
        let config = RelayConfig {
            owner: AccountKeypair::generate().id().to_string(),
            attestors: Vec::new(),
            ..RelayConfig::default()
        };
        assert!(matches!(
            Relay::new(config),
            Err(CrosslaneError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_relay_wires_the_components() {
        let owner = AccountKeypair::generate();
        let attestor = AccountKeypair::generate();
        let config = RelayConfig {
            owner: owner.id().to_string(),
            attestors: vec![attestor.id().to_string()],
            ..RelayConfig::default()
        };

        let relay = Relay::new(config).unwrap();
        assert!(relay.quorum().is_authorized(&attestor.id()).await);
        assert_eq!(relay.registry().nonce().await, 0);
        assert!(relay.journal().is_empty());
    }
}
