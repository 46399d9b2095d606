//! Seeded Fisher–Yates shuffle for battle rosters.

use crate::env::{PcgRng, mix_seed};
use crate::state::PlayerId;

const SHUFFLE_DOMAIN: u32 = 0x5f1e;

/// Pads `roster` with [`PlayerId::NONE`] to `len` entries and shuffles it.
///
/// Every swap index is drawn from [`PcgRng`] seeded by `seed` and the loop
/// position, so the permutation depends only on the inputs. Entries past
/// `len` are dropped.
pub fn pad_and_shuffle(roster: &[PlayerId], len: usize, seed: u64) -> Vec<PlayerId> {
    let mut padded: Vec<PlayerId> = roster.iter().copied().take(len).collect();
    padded.resize(len, PlayerId::NONE);

    for i in (1..padded.len()).rev() {
        let bound = u32::try_from(i + 1).unwrap_or(u32::MAX);
        let j = PcgRng::below(mix_seed(seed, SHUFFLE_DOMAIN, i as u64), bound) as usize;
        padded.swap(i, j);
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(ids: &[u64]) -> Vec<PlayerId> {
        ids.iter().copied().map(PlayerId).collect()
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let input = roster(&[1, 2, 3, 4, 5, 6]);
        let mut shuffled = pad_and_shuffle(&input, 6, 77);
        shuffled.sort();
        assert_eq!(shuffled, input);
    }

    #[test]
    fn shuffle_pads_with_none() {
        let shuffled = pad_and_shuffle(&roster(&[9]), 3, 5);
        assert_eq!(shuffled.len(), 3);
        assert_eq!(shuffled.iter().filter(|id| id.is_none()).count(), 2);
        assert!(shuffled.contains(&PlayerId(9)));
    }

    #[test]
    fn same_seed_same_order() {
        let input = roster(&[10, 20, 30, 40, 50, 60, 70, 80]);
        assert_eq!(pad_and_shuffle(&input, 8, 1), pad_and_shuffle(&input, 8, 1));
    }

    #[test]
    fn some_seed_reorders() {
        let input = roster(&[10, 20, 30, 40, 50, 60, 70, 80]);
        let reordered = (0..32).any(|seed| pad_and_shuffle(&input, 8, seed) != input);
        assert!(reordered);
    }
}
