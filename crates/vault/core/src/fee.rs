//! Attack prepayment pricing.

use crate::state::Amount;

/// Number of recent fulfillment costs the average covers.
pub const FEE_SAMPLES: usize = 4;

/// FIFO moving average of the unit cost reported by randomness fulfillments.
///
/// Empty slots count as zero until four samples have been recorded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackFeeEstimator {
    samples: [Amount; FEE_SAMPLES],
    cursor: usize,
    average: Amount,
}

impl AttackFeeEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evicts the oldest sample and recomputes the average.
    pub fn record_sample(&mut self, unit_cost: Amount) {
        self.samples[self.cursor] = unit_cost;
        self.cursor = (self.cursor + 1) % FEE_SAMPLES;
        self.average = self
            .samples
            .iter()
            .fold(0, |sum: Amount, sample| sum.saturating_add(*sample))
            / FEE_SAMPLES as Amount;
    }

    pub fn average(&self) -> Amount {
        self.average
    }

    /// Samples oldest first.
    pub fn samples(&self) -> [Amount; FEE_SAMPLES] {
        std::array::from_fn(|i| self.samples[(self.cursor + i) % FEE_SAMPLES])
    }

    /// Prepayment required for one attack.
    pub fn attack_cost(&self, base_cost: Amount, expected_work_units: Amount) -> Amount {
        base_cost.saturating_add(self.average.saturating_mul(expected_work_units))
    }
}
