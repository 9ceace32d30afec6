//! One-way notifications to the presentation layer
//!
//! The engine never calls into rendering code; it publishes [`GameEvent`]s
//! on a broadcast channel and moves on. Subscribers that lag or disappear
//! are the presentation layer's problem, never the engine's.

use crate::game::types::{DiePlacement, PlayerId, RankedPlayer, Settlement};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// Everything the engine tells the outside world.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Sustained motion began (gesture feedback, only while idle).
    ShakeStarted,
    /// Sustained motion ended.
    ShakeStopped,
    /// A turn began; the dice are in the cup.
    RollStarted { player_id: PlayerId },
    /// The dice hit the tray. Positions are presentation-only scatter.
    DiceLanded {
        faces: [u8; 6],
        positions: Vec<DiePlacement>,
    },
    /// The point total is disclosed.
    PointsRevealed { total: u32 },
    /// A settlement was applied to the table.
    SettlementApplied {
        player_id: PlayerId,
        point_total: u32,
        settlement: Settlement,
        pot_after: i64,
    },
    /// The session ended with an exact win.
    VictoryReached { ranking: Vec<RankedPlayer> },
    /// Play moved to the next seat.
    TurnAdvanced {
        player_index: usize,
        player_id: PlayerId,
    },
    /// The session was torn down back to setup.
    SessionReset,
}

/// Broadcast fan-out for [`GameEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GameEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }

    /// The event feed as a `Stream`, for consumers that prefer one.
    pub fn stream(&self) -> BroadcastStream<GameEvent> {
        BroadcastStream::new(self.subscribe())
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publish an event. A send with no subscribers is fine.
    pub fn emit(&self, event: GameEvent) {
        tracing::debug!(event = ?event, "event emitted");
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_without_subscribers_does_not_panic() {
        let bus = EventBus::new(8);
        bus.emit(GameEvent::ShakeStarted);
    }

    #[tokio::test]
    async fn subscribers_receive_events_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.emit(GameEvent::ShakeStarted);
        bus.emit(GameEvent::ShakeStopped);
        assert_eq!(rx.recv().await.unwrap(), GameEvent::ShakeStarted);
        assert_eq!(rx.recv().await.unwrap(), GameEvent::ShakeStopped);
    }

    #[test]
    fn events_serialize_with_a_type_tag() {
        let json = serde_json::to_string(&GameEvent::PointsRevealed { total: 21 }).unwrap();
        assert_eq!(json, "{\"type\":\"points_revealed\",\"total\":21}");
    }
}
