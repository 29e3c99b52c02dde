//! Relay messages and deterministic message identity
//!
//! A message's identity is a blake3 hash over the canonical encoding of its
//! five identifying fields: destination chain, receiver, payload, attributes,
//! and proposal nonce. Off-process tooling can recompute the same id from the
//! same fields, byte for byte.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::attribute::Attribute;

/// Deterministic identity of a relay message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId([u8; 32]);

impl MessageId {
    /// Build an id from raw hash bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw hash bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Message lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    /// Proposed, waiting for quorum
    Pending,
    /// Delivered to the destination handler, terminal
    Executed,
}

/// A proposed cross-chain message and its frozen execution requirements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayMessage {
    /// Destination chain routing key
    pub dest_chain: String,
    /// Receiver identifier on the destination chain
    pub receiver: String,
    /// Envelope-encoded payload, opaque past the envelope
    pub payload: Vec<u8>,
    /// Pass-through attributes; the impact key scales the threshold
    pub attributes: Vec<Attribute>,
    /// Proposal nonce, the message's position in the accepted sequence
    pub nonce: u64,
    /// Proposal time, UTC milliseconds
    pub created_at: i64,
    /// Signature threshold frozen at proposal time
    pub required_signatures: u8,
    /// Lifecycle state
    pub status: MessageStatus,
}

impl RelayMessage {
    /// Create a pending message stamped with the current time
    pub fn new(
        dest_chain: String,
        receiver: String,
        payload: Vec<u8>,
        attributes: Vec<Attribute>,
        nonce: u64,
        required_signatures: u8,
    ) -> Self {
        Self {
            dest_chain,
            receiver,
            payload,
            attributes,
            nonce,
            created_at: Utc::now().timestamp_millis(),
            required_signatures,
            status: MessageStatus::Pending,
        }
    }

    /// Whether this message reached its terminal state
    pub fn is_executed(&self) -> bool {
        self.status == MessageStatus::Executed
    }

    /// Recompute this message's identity from its own fields
    pub fn message_id(&self) -> MessageId {
        derive_message_id(
            &self.dest_chain,
            &self.receiver,
            &self.payload,
            &self.attributes,
            self.nonce,
        )
    }
}

/// Derive the identity of a message from its five identifying fields
///
/// Every variable-length field is length-prefixed (little-endian u64, u32 for
/// the attribute count) before hashing, so no two distinct field tuples share
/// an encoding.
pub fn derive_message_id(
    dest_chain: &str,
    receiver: &str,
    payload: &[u8],
    attributes: &[Attribute],
    nonce: u64,
) -> MessageId {
    let mut hasher = blake3::Hasher::new();

    hasher.update(&(dest_chain.len() as u64).to_le_bytes());
    hasher.update(dest_chain.as_bytes());

    hasher.update(&(receiver.len() as u64).to_le_bytes());
    hasher.update(receiver.as_bytes());

    hasher.update(&(payload.len() as u64).to_le_bytes());
    hasher.update(payload);

    hasher.update(&(attributes.len() as u32).to_le_bytes());
    for attribute in attributes {
        hasher.update(&attribute.canonical_bytes());
    }

    hasher.update(&nonce.to_le_bytes());

    MessageId(*hasher.finalize().as_bytes())
}
