//! Proposal payload envelope
//!
//! A proposal's payload must itself encode the sender's view of ordering: the
//! expected nonce, the original sender, and the inner payload destined for
//! the handler. The registry decodes this envelope before anything else.

use serde::{Deserialize, Serialize};

use crate::error::{CrosslaneError, RegistryError, Result};

/// The nonce-bearing inner encoding of a proposal payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalEnvelope {
    /// Nonce the sender expects the registry counter to hold
    pub expected_nonce: u64,
    /// Originating account on the source chain, opaque to the registry
    pub original_sender: String,
    /// Payload forwarded to the destination handler
    pub inner_payload: Vec<u8>,
}

impl ProposalEnvelope {
    pub fn new(expected_nonce: u64, original_sender: impl Into<String>, inner_payload: Vec<u8>) -> Self {
        Self {
            expected_nonce,
            original_sender: original_sender.into(),
            inner_payload,
        }
    }

    /// Encode to the compact wire form
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| CrosslaneError::Serialization(e.to_string()))
    }

    /// Decode from the compact wire form
    pub fn decode(bytes: &[u8]) -> std::result::Result<Self, RegistryError> {
        bincode::deserialize(bytes).map_err(|e| RegistryError::MalformedEnvelope(e.to_string()))
    }
}
