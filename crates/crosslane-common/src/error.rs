//! Error types for the Crosslane relay
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

use crate::crypto::account::{AccountId, IdentityError};
use crate::types::message::MessageId;

/// Result type alias using CrosslaneError
pub type Result<T> = std::result::Result<T, CrosslaneError>;

/// Unified error type for Crosslane operations
#[derive(Debug, Error)]
pub enum CrosslaneError {
    // Quorum errors
    #[error("Quorum error: {0}")]
    Quorum(#[from] QuorumError),

    // Registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    // Identity errors
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Attestation quorum errors
#[derive(Debug, Error)]
pub enum QuorumError {
    #[error("Attestor is not authorized: {0}")]
    Unauthorized(AccountId),

    #[error("Duplicate vote by {attestor} on message {message_id}")]
    DuplicateVote {
        attestor: AccountId,
        message_id: MessageId,
    },

    #[error("Invalid endorsement signature from {0}")]
    InvalidSignature(AccountId),
}

/// Message registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid nonce: expected {expected}, got {supplied}")]
    InvalidNonce { expected: u64, supplied: u64 },

    #[error("Malformed proposal envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Message not found: {0}")]
    NotFound(MessageId),

    #[error("Message already executed: {0}")]
    AlreadyExecuted(MessageId),

    #[error("Not enough signatures: {votes} recorded, {required} required")]
    NotEnoughSignatures { votes: usize, required: u8 },

    #[error("Caller is not the registry owner")]
    Unauthorized,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Another execution is in flight")]
    ReentrantExecution,
}

impl From<serde_json::Error> for CrosslaneError {
    fn from(err: serde_json::Error) -> Self {
        CrosslaneError::Serialization(err.to_string())
    }
}
