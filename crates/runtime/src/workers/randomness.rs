//! Worker that answers randomness tickets through a [`RandomnessProvider`].
//!
//! Tickets arrive from the [`RandomnessBridge`](crate::oracle::RandomnessBridge)
//! once their attack is committed. Each answer goes back to the contest worker
//! as an ordinary fulfillment command, so it is validated like any external
//! delivery.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::api::{Fulfillment, RandomnessProvider, RuntimeHandle};
use crate::events::{EventBus, RandomnessEvent};
use crate::oracle::RandomnessTicket;

pub struct RandomnessWorker {
    provider: Arc<dyn RandomnessProvider>,
    tickets: mpsc::UnboundedReceiver<RandomnessTicket>,
    handle: RuntimeHandle,
    event_bus: EventBus,
    shutdown: oneshot::Receiver<()>,
}

impl RandomnessWorker {
    pub fn new(
        provider: Arc<dyn RandomnessProvider>,
        tickets: mpsc::UnboundedReceiver<RandomnessTicket>,
        handle: RuntimeHandle,
        shutdown: oneshot::Receiver<()>,
    ) -> Self {
        let event_bus = handle.event_bus().clone();
        Self {
            provider,
            tickets,
            handle,
            event_bus,
            shutdown,
        }
    }

    /// Main worker loop. Stops on the shutdown signal or when the bridge is gone.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                _ = &mut self.shutdown => break,
                Some(ticket) = self.tickets.recv() => {
                    self.deliver(ticket).await;
                }
                else => break,
            }
        }
        debug!(target: "runtime::randomness", "RandomnessWorker stopped");
    }

    async fn deliver(&self, ticket: RandomnessTicket) {
        let request_id = ticket.request_id;
        let Fulfillment { words, unit_cost } = match self.provider.fulfill(&ticket).await {
            Ok(fulfillment) => fulfillment,
            Err(error) => {
                warn!(
                    target: "runtime::randomness",
                    request_id = request_id.0,
                    error = %error,
                    "randomness provider failed, attack stays pending"
                );
                self.event_bus.publish(RandomnessEvent::ProviderFailed {
                    request_id,
                    error: error.to_string(),
                });
                return;
            }
        };

        match self
            .handle
            .fulfill_randomness(request_id, words, unit_cost)
            .await
        {
            Ok(resolved) => debug!(
                target: "runtime::randomness",
                request_id = request_id.0,
                attacker_won = resolved.attacker_won,
                "fulfillment delivered"
            ),
            // Engine rejections are logged and published by the contest worker.
            Err(error) => debug!(
                target: "runtime::randomness",
                request_id = request_id.0,
                error = %error,
                "fulfillment not applied"
            ),
        }
    }
}
