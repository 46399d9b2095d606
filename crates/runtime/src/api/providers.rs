//! Asynchronous randomness sources.
//!
//! The engine only issues requests; a [`RandomnessProvider`] produces the
//! words some time later and the randomness worker feeds them back as a
//! fulfillment command. Tests usually skip providers entirely and fulfill
//! through [`RuntimeHandle::fulfill_randomness`](super::RuntimeHandle).
use std::time::Duration;

use async_trait::async_trait;
use vault_core::env::{PcgRng, mix_seed};
use vault_core::{Amount, RandomWord};

use super::errors::Result;
use crate::oracle::RandomnessTicket;

/// Words delivered for one request, with the unit cost the delivery consumed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fulfillment {
    pub words: Vec<RandomWord>,
    pub unit_cost: Amount,
}

#[async_trait]
pub trait RandomnessProvider: Send + Sync {
    /// Produce the words for `ticket`.
    ///
    /// An error leaves the attack pending; nothing retries it.
    async fn fulfill(&self, ticket: &RandomnessTicket) -> Result<Fulfillment>;
}

/// Reproducible words derived from a seed and the request id.
#[derive(Clone, Debug)]
pub struct SeededRandomness {
    seed: u64,
    unit_cost: Amount,
    delay: Duration,
}

impl SeededRandomness {
    const WORD_DOMAIN: u32 = 0x5eed;

    pub fn new(seed: u64, unit_cost: Amount) -> Self {
        Self {
            seed,
            unit_cost,
            delay: Duration::ZERO,
        }
    }

    /// Wait this long before answering, like an external callback would.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn words_for(&self, ticket: &RandomnessTicket) -> Vec<RandomWord> {
        let base = mix_seed(self.seed, Self::WORD_DOMAIN, ticket.request_id.0);
        (0..u64::from(ticket.request.num_words))
            .map(|index| PcgRng::next_u64(mix_seed(base, Self::WORD_DOMAIN, index)))
            .collect()
    }
}

#[async_trait]
impl RandomnessProvider for SeededRandomness {
    async fn fulfill(&self, ticket: &RandomnessTicket) -> Result<Fulfillment> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Fulfillment {
            words: self.words_for(ticket),
            unit_cost: self.unit_cost,
        })
    }
}

/// Words drawn from the thread-local entropy source.
#[derive(Clone, Debug)]
pub struct EntropyRandomness {
    unit_cost: Amount,
}

impl EntropyRandomness {
    pub fn new(unit_cost: Amount) -> Self {
        Self { unit_cost }
    }
}

#[async_trait]
impl RandomnessProvider for EntropyRandomness {
    async fn fulfill(&self, ticket: &RandomnessTicket) -> Result<Fulfillment> {
        let words = (0..ticket.request.num_words)
            .map(|_| rand::random::<RandomWord>())
            .collect();
        Ok(Fulfillment {
            words,
            unit_cost: self.unit_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::{ClanId, RandomnessRequest, RequestId};

    fn ticket(id: u64, num_words: u32) -> RandomnessTicket {
        RandomnessTicket {
            request_id: RequestId(id),
            request: RandomnessRequest {
                attacker: ClanId(1),
                defender: ClanId(2),
                num_words,
            },
        }
    }

    #[tokio::test]
    async fn seeded_words_depend_on_seed_and_request() {
        let provider = SeededRandomness::new(7, 25);
        let first = provider.fulfill(&ticket(1, 2)).await.unwrap();
        let again = provider.fulfill(&ticket(1, 2)).await.unwrap();
        let other = provider.fulfill(&ticket(2, 2)).await.unwrap();

        assert_eq!(first, again);
        assert_eq!(first.words.len(), 2);
        assert_eq!(first.unit_cost, 25);
        assert_ne!(first.words, other.words);
        assert_ne!(
            first.words,
            SeededRandomness::new(8, 25).words_for(&ticket(1, 2))
        );
    }

    #[tokio::test]
    async fn entropy_returns_requested_word_count() {
        let fulfillment = EntropyRandomness::new(1).fulfill(&ticket(3, 5)).await.unwrap();
        assert_eq!(fulfillment.words.len(), 5);
    }
}
