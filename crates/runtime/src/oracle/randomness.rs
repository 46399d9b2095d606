//! Outbound half of the randomness protocol.
//!
//! The engine calls [`RandomnessOracle::request_randomness`] synchronously in
//! the middle of `attack_vaults`. The bridge hands out the request id at once
//! but only stages the ticket; the contest worker dispatches staged tickets
//! after the attack is committed and discards them when it is not.
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use vault_core::{OracleError, RandomnessOracle, RandomnessRequest, RequestId};

/// A request waiting for words.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomnessTicket {
    pub request_id: RequestId,
    pub request: RandomnessRequest,
}

#[derive(Debug)]
pub struct RandomnessBridge {
    last_id: AtomicU64,
    staged: Mutex<Vec<RandomnessTicket>>,
    outbox: Option<mpsc::UnboundedSender<RandomnessTicket>>,
}

impl RandomnessBridge {
    /// Bridge whose tickets are only announced; words arrive from outside.
    pub fn detached(last_id: u64) -> Self {
        Self {
            last_id: AtomicU64::new(last_id),
            staged: Mutex::new(Vec::new()),
            outbox: None,
        }
    }

    /// Bridge that forwards committed tickets to a provider worker.
    pub fn with_outbox(last_id: u64, outbox: mpsc::UnboundedSender<RandomnessTicket>) -> Self {
        Self {
            outbox: Some(outbox),
            ..Self::detached(last_id)
        }
    }

    /// Forwards staged tickets and returns them for announcement.
    pub fn dispatch_staged(&self) -> Vec<RandomnessTicket> {
        let tickets = self.take_staged();
        if let Some(outbox) = &self.outbox {
            for ticket in &tickets {
                if outbox.send(*ticket).is_err() {
                    tracing::warn!(
                        request_id = ticket.request_id.0,
                        "randomness worker gone, request left for manual fulfillment"
                    );
                }
            }
        }
        tickets
    }

    /// Drops tickets staged by a command that was not committed.
    pub fn discard_staged(&self) -> usize {
        self.take_staged().len()
    }

    fn take_staged(&self) -> Vec<RandomnessTicket> {
        self.staged
            .lock()
            .map(|mut staged| std::mem::take(&mut *staged))
            .unwrap_or_default()
    }
}

impl RandomnessOracle for RandomnessBridge {
    fn request_randomness(&self, request: RandomnessRequest) -> Result<RequestId, OracleError> {
        if self.outbox.as_ref().is_some_and(|outbox| outbox.is_closed()) {
            return Err(OracleError::RandomnessRejected(
                "randomness worker stopped".into(),
            ));
        }
        let mut staged = self
            .staged
            .lock()
            .map_err(|_| OracleError::RandomnessNotAvailable)?;
        let request_id = RequestId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        staged.push(RandomnessTicket {
            request_id,
            request,
        });
        Ok(request_id)
    }
}
