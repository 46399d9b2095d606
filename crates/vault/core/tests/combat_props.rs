//! Property-based tests for battle resolution and rating updates.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use proptest::prelude::*;

use vault_core::{
    AccountId, BattleSetup, Decision, ItemId, PlayerId, PlayerOracle, Skill, VaultConfig,
    adjust_ratings, resolve,
};

struct Levels(HashMap<PlayerId, u16>);

impl PlayerOracle for Levels {
    fn effective_level(&self, player: PlayerId, _skill: Skill) -> u16 {
        self.0.get(&player).copied().unwrap_or(0)
    }
    fn is_active_controller(&self, _caller: AccountId, _player: PlayerId) -> bool {
        true
    }
    fn is_upgraded(&self, _player: PlayerId) -> bool {
        true
    }
    fn has_item(&self, _player: PlayerId, _item: ItemId) -> bool {
        false
    }
}

fn roster(offset: u64, levels: &[u16]) -> Vec<PlayerId> {
    (0..levels.len() as u64).map(|i| PlayerId(offset + i + 1)).collect()
}

fn level_table(a: &[PlayerId], la: &[u16], b: &[PlayerId], lb: &[u16]) -> Levels {
    Levels(
        a.iter()
            .zip(la)
            .chain(b.iter().zip(lb))
            .map(|(id, level)| (*id, *level))
            .collect(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Identical inputs always produce identical outcomes.
    #[test]
    fn prop_resolve_is_deterministic(
        levels_a in prop::collection::vec(0u16..150, 0..20),
        levels_b in prop::collection::vec(0u16..150, 0..20),
        words in prop::collection::vec(any::<u64>(), 2..6),
        extra in 0u8..5,
    ) {
        let a = roster(0, &levels_a);
        let b = roster(1_000, &levels_b);
        let oracle = level_table(&a, &levels_a, &b, &levels_b);
        let skills = VaultConfig::default().battle_skills;
        let setup = BattleSetup::new(&a, &b, &skills, &words).with_extra_rolls(extra, 0);

        let first = resolve(&setup, &oracle).unwrap();
        let second = resolve(&setup, &oracle).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.rounds.len(), skills.len());

        if a.is_empty() || b.is_empty() {
            prop_assert_eq!(first.decision, Decision::Walkover);
            prop_assert_eq!(first.did_a_win, !a.is_empty() || b.is_empty());
        } else {
            let len = a.len().max(b.len());
            prop_assert_eq!(first.shuffled_a.len(), len);
            prop_assert_eq!(first.shuffled_b.len(), len);
            prop_assert_eq!(first.did_a_win, first.wins() * 2 > skills.len());
            for round in &first.rounds {
                prop_assert!(round.hits_a <= round.rolls_a);
                prop_assert!(round.hits_b <= round.rolls_b);
                prop_assert!(round.rolls_a <= VaultConfig::MAX_ROLLS_PER_SIDE);
            }
        }
    }

    /// Ratings stay within u16 for every input.
    #[test]
    fn prop_ratings_stay_in_range(
        ka in any::<u16>(),
        kd in any::<u16>(),
        ra in any::<u16>(),
        rd in any::<u16>(),
        did_a_win in any::<bool>(),
    ) {
        let (na, nd) = adjust_ratings(ka, kd, ra, rd, did_a_win);
        if did_a_win {
            prop_assert!(na >= ra);
            prop_assert!(nd <= rd);
        } else {
            prop_assert!(na <= ra);
            prop_assert!(nd >= rd);
        }
    }
}

#[test]
fn extreme_rating_pairs() {
    const MAX: u16 = u16::MAX;
    // (ka, kd, rating_a, rating_d, did_a_win) -> (new_a, new_d)
    let cases = [
        ((32, 16, 0, 0, true), (16, 0)),
        ((32, 16, 0, 0, false), (0, 8)),
        ((MAX, MAX, 0, 0, true), (32_767, 0)),
        ((MAX, MAX, 0, 0, false), (0, 32_767)),
        ((32, 16, 0, MAX, true), (31, MAX - 15)),
        ((32, 16, 0, MAX, false), (0, MAX)),
        ((MAX, MAX, 0, MAX, true), (64_886, 649)),
        ((MAX, MAX, 0, MAX, false), (0, MAX)),
        ((32, 16, MAX, MAX, true), (MAX, MAX - 8)),
        ((32, 16, MAX, MAX, false), (MAX - 16, MAX)),
        ((MAX, MAX, MAX, MAX, true), (MAX, 32_768)),
        ((MAX, MAX, MAX, MAX, false), (32_768, MAX)),
        ((32, 16, MAX, 0, true), (MAX, 0)),
        ((32, 16, MAX, 0, false), (MAX - 31, 15)),
        ((MAX, MAX, MAX, 0, true), (MAX, 0)),
        ((MAX, MAX, MAX, 0, false), (649, 64_886)),
    ];
    for ((ka, kd, ra, rd, did_a_win), expected) in cases {
        assert_eq!(
            adjust_ratings(ka, kd, ra, rd, did_a_win),
            expected,
            "ka={ka} kd={kd} ra={ra} rd={rd} a_won={did_a_win}"
        );
    }
}

#[test]
fn mismatch_needs_no_randomness() {
    let a = [PlayerId(1)];
    let oracle = Levels(HashMap::new());
    let skills = [Skill::Melee];

    let outcome = resolve(&BattleSetup::new(&a, &[], &skills, &[]), &oracle).unwrap();
    assert!(outcome.did_a_win);

    let outcome = resolve(&BattleSetup::new(&[], &a, &skills, &[]), &oracle).unwrap();
    assert!(!outcome.did_a_win);
}
