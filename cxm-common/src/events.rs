//! Event types and EventBus
//!
//! The bus is the live insert feed: every row accepted into the remote
//! store is announced here, including rows the announcing client itself
//! just wrote. Delivery is asynchronous, at-least-once from the consumer's
//! perspective, and carries no ordering guarantee relative to local writes.
//! Consumers reconcile through the identifier-keyed submission log, never by
//! arrival order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::normalize::RawSubmission;

/// CaixaMaster event types
///
/// Events are broadcast via [`EventBus`] and serialized as-is for SSE
/// transmission to dashboard clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CxmEvent {
    /// A submission row was inserted into the remote store
    ///
    /// Carries the storage-convention record, exactly as persisted;
    /// consumers normalize before use.
    SubmissionRecorded {
        record: RawSubmission,
        /// When the insert was observed (not the submission's own timestamp)
        timestamp: DateTime<Utc>,
    },

    /// A staff account was added to the roster
    UserAdded {
        user_id: Uuid,
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// A staff account was removed from the roster
    UserRemoved {
        user_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl CxmEvent {
    /// Event type name, used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            CxmEvent::SubmissionRecorded { .. } => "SubmissionRecorded",
            CxmEvent::UserAdded { .. } => "UserAdded",
            CxmEvent::UserRemoved { .. } => "UserRemoved",
        }
    }
}

/// Central event distribution bus
///
/// Wraps `tokio::sync::broadcast`, providing non-blocking publish (slow
/// subscribers never block producers), multiple concurrent subscribers, and
/// automatic cleanup when subscribers drop. A missed or lagged delivery
/// only delays visibility for that observer; it never corrupts state.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CxmEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CxmEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: CxmEvent) -> Result<usize, broadcast::error::SendError<CxmEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscriber case
    ///
    /// Feed delivery is best-effort; a feed with no listeners is not an
    /// error condition.
    pub fn emit_lossy(&self, event: CxmEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("event emitted with no subscribers");
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Submission;

    fn sample_event() -> CxmEvent {
        let sub = Submission {
            id: Uuid::from_u128(7),
            user_id: Uuid::from_u128(8),
            user_name: "Ana".to_string(),
            submitted_at: Utc::now(),
            completed_items: [1, 2, 3].into_iter().collect(),
            is_full_complete: false,
            notes: None,
        };
        CxmEvent::SubmissionRecorded {
            record: RawSubmission::remote(&sub),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_emit_delivers_to_all_subscribers() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(sample_event()).expect("emit should succeed");

        assert_eq!(rx1.try_recv().unwrap().event_type(), "SubmissionRecorded");
        assert_eq!(rx2.try_recv().unwrap().event_type(), "SubmissionRecorded");
    }

    #[test]
    fn test_emit_lossy_without_subscribers_does_not_panic() {
        let bus = EventBus::new(2);
        bus.emit_lossy(sample_event());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(sample_event()).unwrap();
        assert_eq!(json["type"], "SubmissionRecorded");
        // Feed payloads use the storage convention.
        assert!(json["record"].get("user_id").is_some());
        assert!(json["record"].get("userId").is_none());
    }

    #[test]
    fn test_roster_events_roundtrip() {
        let event = CxmEvent::UserRemoved {
            user_id: Uuid::from_u128(3),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: CxmEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_type(), "UserRemoved");
    }
}
