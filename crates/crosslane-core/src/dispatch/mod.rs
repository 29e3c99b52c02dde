//! Destination dispatch
//!
//! The registry forwards an executed message to whatever external system
//! registered itself for the message's routing key. The handler is a
//! capability: the registry holds an opaque handle and knows nothing about
//! the destination's shape.

use async_trait::async_trait;
use crosslane_common::{Attribute, MessageId};
use thiserror::Error;

/// Execution envelope forwarded to a destination handler
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub message_id: MessageId,
    pub dest_chain: String,
    pub receiver: String,
    pub payload: Vec<u8>,
    pub attributes: Vec<Attribute>,
}

/// Failure reported by a destination handler
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Handler rejected delivery: {0}")]
    Rejected(String),

    #[error("Destination unreachable: {0}")]
    Unreachable(String),
}

/// Accepts execution envelopes for a destination chain
///
/// Any error returned from `deliver` aborts the surrounding execute
/// operation; the message stays pending and the call may be retried.
#[async_trait]
pub trait DestinationHandler: Send + Sync {
    async fn deliver(&self, request: DeliveryRequest) -> Result<(), DeliveryError>;
}
