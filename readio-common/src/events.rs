//! Event types for the READIO player.
//!
//! Provides the shared `PlayerEvent` enum and the `EventBus` used to fan
//! events out to SSE clients and internal observers.
//!
//! The bus is a thin wrapper over `tokio::sync::broadcast`: one-to-many,
//! lossy under backpressure (slow subscribers drop old events rather than
//! blocking the player).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::types::PlaybackState;

/// READIO player events.
///
/// Events are broadcast via [`EventBus`] and serialized for SSE
/// transmission, tagged by variant name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Playback state changed (any transition of the player state machine)
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: DateTime<Utc>,
    },

    /// A track's audio started playing
    TrackStarted {
        track_id: Uuid,
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// A track finished (naturally) or was skipped away from
    TrackCompleted {
        track_id: Uuid,
        /// false when the track was skipped rather than played to the end
        completed: bool,
        timestamp: DateTime<Utc>,
    },

    /// A track could not be resolved, synthesized, or loaded
    ///
    /// The player skips past failed tracks; this event is the only
    /// surface the failure reaches.
    TrackFailed {
        track_id: Uuid,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Periodic progress update while audio plays
    ///
    /// Progress is a fraction in [0, 1] within the current track. Not
    /// emitted while paused.
    PlaybackProgress {
        track_id: Uuid,
        progress: f32,
        timestamp: DateTime<Utc>,
    },

    /// Queue contents or cursor changed
    QueueChanged {
        queue: Vec<Uuid>,
        current_index: Option<usize>,
        timestamp: DateTime<Utc>,
    },
}

impl PlayerEvent {
    /// Variant name, used as the SSE `event:` field.
    pub fn event_type(&self) -> &'static str {
        match self {
            PlayerEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            PlayerEvent::TrackStarted { .. } => "TrackStarted",
            PlayerEvent::TrackCompleted { .. } => "TrackCompleted",
            PlayerEvent::TrackFailed { .. } => "TrackFailed",
            PlayerEvent::PlaybackProgress { .. } => "PlaybackProgress",
            PlayerEvent::QueueChanged { .. } => "QueueChanged",
        }
    }
}

/// Broadcast bus for [`PlayerEvent`].
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity.
    ///
    /// Capacity bounds how far a slow subscriber may lag before it starts
    /// losing events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events.
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` when nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PlayerEvent,
    ) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscriber case.
    ///
    /// Used for high-frequency events (progress ticks) where a missing
    /// listener is normal.
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
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
    use std::sync::Arc;

    #[test]
    fn test_eventbus_new() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_eventbus_subscribe() {
        let bus = EventBus::new(10);
        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_eventbus_emit() {
        let bus = Arc::new(EventBus::new(10));
        let mut rx = bus.subscribe();

        let event = PlayerEvent::PlaybackStateChanged {
            old_state: PlaybackState::Idle,
            new_state: PlaybackState::Resolving,
            timestamp: Utc::now(),
        };

        bus.emit(event).expect("emit should succeed");

        let received = rx.try_recv().expect("should receive event");
        assert_eq!(received.event_type(), "PlaybackStateChanged");
    }

    #[test]
    fn test_eventbus_emit_no_subscribers() {
        let bus = EventBus::new(10);
        let event = PlayerEvent::QueueChanged {
            queue: vec![],
            current_index: None,
            timestamp: Utc::now(),
        };
        assert!(bus.emit(event).is_err());
    }

    #[test]
    fn test_eventbus_emit_lossy_on_full_channel() {
        let bus = EventBus::new(2);
        let mut _rx = bus.subscribe(); // subscribe but never receive

        for i in 0..10 {
            bus.emit_lossy(PlayerEvent::PlaybackProgress {
                track_id: Uuid::new_v4(),
                progress: i as f32 / 10.0,
                timestamp: Utc::now(),
            });
        }

        assert_eq!(bus.capacity(), 2);
    }

    #[test]
    fn test_eventbus_multiple_subscribers() {
        let bus = Arc::new(EventBus::new(10));
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let event = PlayerEvent::TrackStarted {
            track_id: Uuid::new_v4(),
            title: "Morning Brief".to_string(),
            timestamp: Utc::now(),
        };

        bus.emit(event).expect("emit should succeed");

        assert_eq!(rx1.try_recv().unwrap().event_type(), "TrackStarted");
        assert_eq!(rx2.try_recv().unwrap().event_type(), "TrackStarted");
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = PlayerEvent::TrackFailed {
            track_id: Uuid::nil(),
            reason: "synthesis failed".to_string(),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"TrackFailed\""));
        assert!(json.contains("synthesis failed"));

        let back: PlayerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_type(), "TrackFailed");
    }

    #[test]
    fn test_event_type_method() {
        let events = vec![
            (
                PlayerEvent::PlaybackStateChanged {
                    old_state: PlaybackState::Playing,
                    new_state: PlaybackState::Paused,
                    timestamp: Utc::now(),
                },
                "PlaybackStateChanged",
            ),
            (
                PlayerEvent::TrackCompleted {
                    track_id: Uuid::new_v4(),
                    completed: true,
                    timestamp: Utc::now(),
                },
                "TrackCompleted",
            ),
            (
                PlayerEvent::PlaybackProgress {
                    track_id: Uuid::new_v4(),
                    progress: 0.5,
                    timestamp: Utc::now(),
                },
                "PlaybackProgress",
            ),
            (
                PlayerEvent::QueueChanged {
                    queue: vec![Uuid::new_v4()],
                    current_index: Some(0),
                    timestamp: Utc::now(),
                },
                "QueueChanged",
            ),
        ];

        for (event, expected) in events {
            assert_eq!(event.event_type(), expected);
        }
    }
}
