//! Broadcast event bus distributing `CoachEvent` to subscribers.
//!
//! Built on `tokio::sync::broadcast`. Publishing with no active subscribers
//! is a no-op; slow subscribers observe `RecvError::Lagged` and skip ahead.

use swingcoach_types::event::CoachEvent;
use tokio::sync::broadcast;

/// Default channel capacity. Text deltas dominate the traffic.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Multi-consumer event bus. Clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoachEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CoachEvent> {
        self.sender.subscribe()
    }

    /// Publish to all current subscribers; dropped when nobody listens.
    pub fn publish(&self, event: CoachEvent) {
        let _ = self.sender.send(event);
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let bus = EventBus::new(16);
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();
        let id = Uuid::now_v7();

        bus.publish(CoachEvent::ConversationUpdated { conversation_id: id });

        for rx in [&mut first, &mut second] {
            match rx.recv().await.unwrap() {
                CoachEvent::ConversationUpdated { conversation_id } => assert_eq!(conversation_id, id),
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let bus = EventBus::default();
        assert_eq!(bus.receiver_count(), 0);
        bus.publish(CoachEvent::ConversationActivated {
            conversation_id: Uuid::now_v7(),
        });
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_events() {
        let bus = EventBus::new(4);
        bus.publish(CoachEvent::ConversationUpdated {
            conversation_id: Uuid::now_v7(),
        });
        let mut rx = bus.subscribe();
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
