//! Randomness source interface and deterministic mixing helpers.
//!
//! The Randomness Source is asynchronous: the engine issues a request and
//! receives the words later as an independent fulfillment message. Everything
//! the engine derives from the delivered words (shuffles, overflow words) goes
//! through [`PcgRng`] and [`mix_seed`] so results are bit-for-bit reproducible.

use super::OracleError;
use crate::state::{ClanId, RequestId};

/// Random word as delivered by the Randomness Source.
pub type RandomWord = u64;

/// Parameters of one randomness request issued by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomnessRequest {
    pub attacker: ClanId,
    pub defender: ClanId,
    pub num_words: u32,
}

/// Outbound half of the randomness protocol.
///
/// Implementations must return immediately; the words arrive later through
/// `VaultEngine::fulfill_randomness`.
pub trait RandomnessOracle: Send + Sync {
    /// Enqueues a request and returns the id the fulfillment will carry.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RandomnessRejected` if the source cannot accept
    /// the request right now.
    fn request_randomness(&self, request: RandomnessRequest) -> Result<RequestId, OracleError>;
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// Stateless PCG-XSH-RR step: 64-bit state in, 32-bit output. Callers derive
/// a distinct seed for every draw with [`mix_seed`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Generate a u32 value from a seed.
    pub fn next_u32(seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }

    /// Generate a u64 value from a seed (two chained steps).
    pub fn next_u64(seed: u64) -> u64 {
        let first = Self::pcg_step(seed);
        let second = Self::pcg_step(first);
        (u64::from(Self::pcg_output(first)) << 32) | u64::from(Self::pcg_output(second))
    }

    /// Uniform-ish value in `[0, bound)`; `bound == 0` yields 0.
    pub fn below(seed: u64, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        Self::next_u32(seed) % bound
    }
}

/// Combines a base word with a domain tag and an index into a fresh seed.
///
/// Constants are the SplitMix64 / FxHash multipliers followed by a murmur
/// finalizer, so nearby inputs produce unrelated seeds.
pub fn mix_seed(base: u64, domain: u32, index: u64) -> u64 {
    let mut hash = base;
    hash ^= index.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(domain).wrapping_mul(0x517cc1b727220a95);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ceb9fe1a85ec53);
    hash ^= hash >> 33;

    hash
}
