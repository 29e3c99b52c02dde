//! Relay event journal
//!
//! Append-only in-memory log of relay lifecycle events with a broadcast feed
//! for live subscribers. Events are serializable so off-process verification
//! tooling can replay them against recomputed message ids.

use crosslane_common::{AccountId, MessageId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Events recorded by the relay components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RelayEvent {
    /// A proposal was accepted and stored as pending
    MessageProposed {
        message_id: MessageId,
        dest_chain: String,
        receiver: String,
    },
    /// An attestor endorsement was recorded
    AttestationRecorded {
        message_id: MessageId,
        attestor: AccountId,
        votes: usize,
    },
    /// A message was delivered and marked executed
    MessageExecuted {
        message_id: MessageId,
        dest_chain: String,
        receiver: String,
    },
}

/// Append-only journal with a live broadcast feed
pub struct EventJournal {
    entries: RwLock<Vec<RelayEvent>>,
    feed: broadcast::Sender<RelayEvent>,
}

impl EventJournal {
    /// Create a journal whose live feed buffers `capacity` events per lagging subscriber
    pub fn new(capacity: usize) -> Self {
        let (feed, _) = broadcast::channel(capacity);
        Self {
            entries: RwLock::new(Vec::new()),
            feed,
        }
    }

    /// Append an event and fan it out to subscribers
    pub fn record(&self, event: RelayEvent) {
        trace!(?event, "journal append");
        self.entries.write().push(event.clone());
        // A send with no live subscribers is not an error
        let _ = self.feed.send(event);
    }

    /// Subscribe to the live feed
    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.feed.subscribe()
    }

    /// Snapshot of all recorded events, oldest first
    pub fn entries(&self) -> Vec<RelayEvent> {
        self.entries.read().clone()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposed(id_byte: u8) -> RelayEvent {
        RelayEvent::MessageProposed {
            message_id: MessageId::from_bytes([id_byte; 32]),
            dest_chain: "evm:1".to_string(),
            receiver: "0xabc".to_string(),
        }
    }

    #[test]
    fn test_entries_preserve_order() {
        let journal = EventJournal::new(8);
        assert!(journal.is_empty());

        journal.record(proposed(1));
        journal.record(proposed(2));

        let entries = journal.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], proposed(1));
        assert_eq!(entries[1], proposed(2));
    }

    #[tokio::test]
    async fn test_subscribers_see_live_events() {
        let journal = EventJournal::new(8);
        let mut feed = journal.subscribe();

        journal.record(proposed(3));
        assert_eq!(feed.recv().await.unwrap(), proposed(3));
    }

    #[test]
    fn test_record_without_subscribers_is_fine() {
        let journal = EventJournal::new(8);
        journal.record(proposed(4));
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn test_events_serialize() {
        let json = serde_json::to_string(&proposed(5)).unwrap();
        assert!(json.contains("MessageProposed"));
        let back: RelayEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, proposed(5));
    }
}
