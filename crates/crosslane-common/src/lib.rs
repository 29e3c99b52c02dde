//! # Crosslane Common
//!
//! Shared types, errors, and signing primitives for the Crosslane relay.
//!
//! ## Core Types
//!
//! - [`AccountId`]: Ed25519-keyed identity for attestors and the registry owner
//! - [`MessageId`]: deterministic content hash binding a message and its nonce
//! - [`RelayMessage`]: a proposed cross-chain message and its lifecycle state
//! - [`Attribute`]: self-describing key/value pair riding along with a message
//! - [`ProposalEnvelope`]: the nonce-bearing wire encoding of a proposal payload
//!
//! ## Crypto
//!
//! - [`crypto::account`]: identity encoding plus endorsement sign/verify

pub mod crypto;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use crypto::account::{verify_endorsement, AccountId, AccountKeypair, IdentityError};
pub use error::{CrosslaneError, QuorumError, RegistryError, Result};
pub use types::{
    attribute::{classify_impact, Attribute, ImpactClass, IMPACT_ATTRIBUTE_KEY},
    envelope::ProposalEnvelope,
    message::{derive_message_id, MessageId, MessageStatus, RelayMessage},
};

/// Crosslane version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Signatures required for a standard-impact message
pub const BASELINE_SIGNATURE_THRESHOLD: u8 = 1;

/// Signatures required for an elevated-impact message
pub const ELEVATED_SIGNATURE_THRESHOLD: u8 = 2;
