//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::{BattleEvent, RandomnessEvent, VaultEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Ledger, roster and block changes, plus rejected commands
    Vault,
    /// Attack requests and resolved battles
    Battle,
    /// Randomness requests and deliveries
    Randomness,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Vault, Topic::Battle, Topic::Randomness];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Vault(VaultEvent),
    Battle(BattleEvent),
    Randomness(RandomnessEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Vault(_) => Topic::Vault,
            Event::Battle(_) => Topic::Battle,
            Event::Randomness(_) => Topic::Randomness,
        }
    }
}

impl From<VaultEvent> for Event {
    fn from(event: VaultEvent) -> Self {
        Event::Vault(event)
    }
}

impl From<BattleEvent> for Event {
    fn from(event: BattleEvent) -> Self {
        Event::Battle(event)
    }
}

impl From<RandomnessEvent> for Event {
    fn from(event: RandomnessEvent) -> Self {
        Event::Randomness(event)
    }
}

/// Topic-based event bus
///
/// Channels are created once per topic and never change, so the map needs no
/// lock. Publishing is best-effort: events without subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<Event>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();

        Self {
            channels: Arc::new(channels),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();

        if let Some(tx) = self.channels.get(&topic)
            && tx.send(event).is_err()
        {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        match self.channels.get(&topic) {
            Some(tx) => tx.subscribe(),
            // Every topic is created in `with_capacity`; a detached receiver
            // simply never yields.
            None => broadcast::channel(1).1,
        }
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::{ClanId, RandomnessRequest, RequestId};

    fn requested(id: u64) -> RandomnessEvent {
        RandomnessEvent::Requested {
            request_id: RequestId(id),
            request: RandomnessRequest {
                attacker: ClanId(1),
                defender: ClanId(2),
                num_words: 2,
            },
        }
    }

    #[tokio::test]
    async fn events_only_reach_their_topic() {
        let bus = EventBus::with_capacity(4);
        let mut randomness = bus.subscribe(Topic::Randomness);
        let mut vault = bus.subscribe(Topic::Vault);

        bus.publish(requested(1));

        let event = randomness.recv().await.unwrap();
        assert_eq!(event.topic(), Topic::Randomness);
        assert!(vault.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(requested(2));
        let receivers = bus.subscribe_multiple(&Topic::ALL);
        assert_eq!(receivers.len(), 3);
    }
}
