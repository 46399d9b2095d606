//! Property-based tests for the lock ledger.
//!
//! Random sequences of locks, claims, battle transfers and clock advances
//! must keep the ledger's bookkeeping consistent.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use vault_core::{Amount, LedgerError, LockLedger, Timestamp, VaultConfig};

#[derive(Clone, Debug)]
enum Op {
    Lock { amount: Amount, delay: u64 },
    LockOrMerge { amount: Amount, delay: u64 },
    Claim,
    LoseBattle { percent: u8, delay: u64 },
    Advance { seconds: u64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u128..10_000, 0u64..1_000).prop_map(|(amount, delay)| Op::Lock { amount, delay }),
        (1u128..10_000, 0u64..1_000).prop_map(|(amount, delay)| Op::LockOrMerge { amount, delay }),
        Just(Op::Claim),
        (0u8..=100, 0u64..1_000).prop_map(|(percent, delay)| Op::LoseBattle { percent, delay }),
        (0u64..500).prop_map(|seconds| Op::Advance { seconds }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Outstanding sub-locks always sum to the locked total and offset never
    /// moves backwards.
    #[test]
    fn prop_ledger_stays_balanced(ops in prop::collection::vec(op(), 1..60)) {
        let mut ledger = LockLedger::new();
        let mut winner = LockLedger::new();
        let mut now: Timestamp = 1;
        let mut last_offset = 0;

        for op in ops {
            match op {
                Op::Lock { amount, delay } => {
                    let before = ledger.total_locked();
                    match ledger.lock(amount, now + delay, now) {
                        Ok(_) => prop_assert_eq!(ledger.total_locked(), before + amount),
                        Err(LedgerError::AmountZero) => prop_assert_eq!(amount, 0),
                        Err(LedgerError::MaxLockedVaultsReached) => {
                            prop_assert!(ledger.is_full());
                            prop_assert_eq!(ledger.total_locked(), before);
                        }
                        Err(other) => prop_assert!(false, "unexpected {other:?}"),
                    }
                }
                Op::LockOrMerge { amount, delay } => {
                    let before = ledger.total_locked();
                    ledger.lock_or_merge(amount, now + delay, now).unwrap();
                    prop_assert_eq!(ledger.total_locked(), before + amount);
                }
                Op::Claim => {
                    let claimable = ledger.claimable(now);
                    match ledger.claim(now) {
                        Ok(amount) => prop_assert_eq!(amount, claimable),
                        Err(error) => {
                            prop_assert_eq!(error, LedgerError::NothingToClaim);
                            prop_assert_eq!(claimable, 0);
                        }
                    }
                }
                Op::LoseBattle { percent, delay } => {
                    let loser_before = ledger.total_locked();
                    let winner_before = winner.total_locked();
                    let (moved, _) = LockLedger::transfer_on_loss(
                        &mut ledger,
                        &mut winner,
                        percent,
                        now + delay,
                        now,
                    )
                    .unwrap();
                    prop_assert_eq!(moved, loser_before * Amount::from(percent) / 100);
                    prop_assert_eq!(ledger.total_locked(), loser_before - moved);
                    prop_assert_eq!(winner.total_locked(), winner_before + moved);
                }
                Op::Advance { seconds } => now += seconds,
            }

            prop_assert_eq!(ledger.outstanding(), ledger.total_locked());
            prop_assert_eq!(winner.outstanding(), winner.total_locked());
            prop_assert!(ledger.offset() >= last_offset);
            prop_assert!(ledger.pending_len() <= VaultConfig::MAX_LOCK_SLOTS);
            last_offset = ledger.offset();
        }
    }

    /// Claiming far in the future releases everything and empties the window.
    #[test]
    fn prop_everything_matures(
        amounts in prop::collection::vec(1u128..1_000, 1..12),
        delays in prop::collection::vec(0u64..1_000, 12),
    ) {
        let mut ledger = LockLedger::new();
        for (amount, delay) in amounts.iter().zip(&delays) {
            ledger.lock_or_merge(*amount, 10 + delay, 10).unwrap();
        }
        let total: Amount = amounts.iter().sum();
        prop_assert_eq!(ledger.total_locked(), total);

        prop_assert_eq!(ledger.claim(10_000).unwrap(), total);
        prop_assert_eq!(ledger.total_locked(), 0);
        prop_assert_eq!(ledger.pending_len(), 0);
        prop_assert_eq!(ledger.offset(), ledger.next());
    }
}
