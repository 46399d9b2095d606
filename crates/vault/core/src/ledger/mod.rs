//! Per-clan ledger of time-locked funds.
//!
//! Locks live in a fixed ring of [`VaultConfig::MAX_LOCK_SLOTS`] slots, each
//! holding up to two sub-locks. `offset` and `next` are logical positions that
//! only grow; the physical position of logical slot `n` is
//! `n % MAX_LOCK_SLOTS`. Slots in `[offset, next)` are pending. A spent slot
//! keeps its fields until a later lock reuses its physical position.
//!
//! Invariant: the outstanding amount of every pending sub-lock sums to
//! [`LockLedger::total_locked`].
mod error;
mod slot;

pub use error::LedgerError;
pub use slot::{LockSlot, SubLock};

use crate::config::VaultConfig;
use crate::state::{Amount, Timestamp};

const CAPACITY: usize = VaultConfig::MAX_LOCK_SLOTS;

/// Where a new lock ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LockPlacement {
    /// Stored as the `b` half of an existing slot.
    Paired { slot: u64 },
    /// Opened a new slot.
    Appended { slot: u64 },
    /// Folded into an existing sub-lock because the ring was full.
    Merged { slot: u64 },
}

impl LockPlacement {
    pub const fn slot(&self) -> u64 {
        match self {
            Self::Paired { slot } | Self::Appended { slot } | Self::Merged { slot } => *slot,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LockLedger {
    slots: [LockSlot; CAPACITY],
    offset: u64,
    next: u64,
    total_locked: Amount,
}

impl LockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_locked(&self) -> Amount {
        self.total_locked
    }

    /// Logical index of the oldest pending slot.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Logical index the next appended slot will take.
    pub fn next(&self) -> u64 {
        self.next
    }

    pub fn pending_len(&self) -> usize {
        (self.next - self.offset) as usize
    }

    pub fn is_full(&self) -> bool {
        self.pending_len() >= CAPACITY
    }

    /// Slot at logical index `n`, as long as its physical position has not been reused.
    pub fn slot(&self, n: u64) -> Option<&LockSlot> {
        let oldest_readable = self.next.saturating_sub(CAPACITY as u64);
        (n >= oldest_readable && n < self.next).then(|| &self.slots[Self::physical(n)])
    }

    /// Pending slots, oldest first, with their logical index.
    pub fn pending(&self) -> impl Iterator<Item = (u64, &LockSlot)> {
        (self.offset..self.next).map(move |n| (n, &self.slots[Self::physical(n)]))
    }

    /// Sum of outstanding sub-lock amounts over the pending window.
    pub fn outstanding(&self) -> Amount {
        self.pending().map(|(_, slot)| slot.outstanding()).sum()
    }

    /// Amount a `claim(now)` would pay out.
    pub fn claimable(&self, now: Timestamp) -> Amount {
        self.pending()
            .flat_map(|(_, slot)| slot.sub_locks())
            .filter(|lock| lock.is_claimable(now))
            .map(|lock| lock.amount)
            .sum()
    }

    /// Locks `amount` until `maturity`.
    ///
    /// Pairs into the newest pending slot when its first lock has not matured
    /// yet, its second half is free and `maturity` does not precede the first
    /// lock's; otherwise opens a new slot.
    ///
    /// # Errors
    ///
    /// - `AmountZero` if `amount` is zero
    /// - `MaxLockedVaultsReached` if a new slot is needed and the ring is full
    /// - `AmountOverflow` if the total would overflow
    pub fn lock(
        &mut self,
        amount: Amount,
        maturity: Timestamp,
        now: Timestamp,
    ) -> Result<LockPlacement, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::AmountZero);
        }
        let total = self
            .total_locked
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow)?;

        if let Some(newest) = self.newest_pending() {
            let slot = &mut self.slots[Self::physical(newest)];
            if slot.b.is_none() && slot.a.maturity > now && maturity >= slot.a.maturity {
                slot.b = Some(SubLock::new(amount, maturity));
                self.total_locked = total;
                return Ok(LockPlacement::Paired { slot: newest });
            }
        }

        if self.is_full() {
            return Err(LedgerError::MaxLockedVaultsReached);
        }

        let index = self.next;
        self.slots[Self::physical(index)] = LockSlot::new(amount, maturity);
        self.next += 1;
        self.total_locked = total;
        Ok(LockPlacement::Appended { slot: index })
    }

    /// Like [`lock`](Self::lock), but never fails for capacity.
    ///
    /// With a full ring the amount is folded into the newest outstanding
    /// sub-lock, whose maturity becomes the later of the two.
    pub fn lock_or_merge(
        &mut self,
        amount: Amount,
        maturity: Timestamp,
        now: Timestamp,
    ) -> Result<LockPlacement, LedgerError> {
        match self.lock(amount, maturity, now) {
            Err(LedgerError::MaxLockedVaultsReached) => self.merge(amount, maturity),
            other => other,
        }
    }

    fn merge(&mut self, amount: Amount, maturity: Timestamp) -> Result<LockPlacement, LedgerError> {
        let total = self
            .total_locked
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow)?;

        for n in (self.offset..self.next).rev() {
            let slot = &mut self.slots[Self::physical(n)];
            let target = match slot.b.as_mut() {
                Some(b) if !b.claimed => b,
                _ if !slot.a.claimed => &mut slot.a,
                _ => continue,
            };
            target.amount = target
                .amount
                .checked_add(amount)
                .ok_or(LedgerError::AmountOverflow)?;
            target.maturity = target.maturity.max(maturity);
            self.total_locked = total;
            return Ok(LockPlacement::Merged { slot: n });
        }

        // A full ring always starts with an unspent slot after compaction.
        Err(LedgerError::MaxLockedVaultsReached)
    }

    /// Claims every matured sub-lock and returns the amount released.
    ///
    /// # Errors
    ///
    /// `NothingToClaim` if nothing has matured.
    pub fn claim(&mut self, now: Timestamp) -> Result<Amount, LedgerError> {
        let mut released: Amount = 0;
        for n in self.offset..self.next {
            for lock in self.slots[Self::physical(n)].sub_locks_mut() {
                if lock.is_claimable(now) {
                    lock.claimed = true;
                    released += lock.amount;
                }
            }
        }

        if released == 0 {
            return Err(LedgerError::NothingToClaim);
        }
        self.total_locked -= released;
        self.compact();
        Ok(released)
    }

    /// Removes `amount` from the oldest outstanding sub-locks.
    ///
    /// Sub-locks reduced to zero count as claimed. `amount` is capped at the
    /// locked total; the removed amount is returned.
    pub fn withdraw_oldest(&mut self, amount: Amount) -> Amount {
        let amount = amount.min(self.total_locked);
        let mut remaining = amount;
        for n in self.offset..self.next {
            if remaining == 0 {
                break;
            }
            for lock in self.slots[Self::physical(n)].sub_locks_mut() {
                if lock.claimed || remaining == 0 {
                    continue;
                }
                let taken = remaining.min(lock.amount);
                lock.amount -= taken;
                remaining -= taken;
                if lock.amount == 0 {
                    lock.claimed = true;
                }
            }
        }
        self.total_locked -= amount;
        self.compact();
        amount
    }

    /// Moves `percent` of the loser's locked total into the winner's ledger.
    ///
    /// The winner receives the amount as a lock maturing at `maturity`,
    /// merging when its ring is full. Returns the amount moved and where the
    /// winner stored it; a zero amount moves nothing.
    pub fn transfer_on_loss(
        loser: &mut Self,
        winner: &mut Self,
        percent: u8,
        maturity: Timestamp,
        now: Timestamp,
    ) -> Result<(Amount, Option<LockPlacement>), LedgerError> {
        let amount = percent_of(loser.total_locked, percent);
        if amount == 0 {
            return Ok((0, None));
        }
        let placement = winner.lock_or_merge(amount, maturity, now)?;
        Ok((loser.withdraw_oldest(amount), Some(placement)))
    }

    fn newest_pending(&self) -> Option<u64> {
        (self.next > self.offset).then(|| self.next - 1)
    }

    fn compact(&mut self) {
        while self.offset < self.next && self.slots[Self::physical(self.offset)].is_spent() {
            self.offset += 1;
        }
    }

    fn physical(n: u64) -> usize {
        (n % CAPACITY as u64) as usize
    }
}

/// `total * percent / 100` without overflowing, percent capped at 100.
pub fn percent_of(total: Amount, percent: u8) -> Amount {
    let percent = Amount::from(percent.min(100));
    total / 100 * percent + total % 100 * percent / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Timestamp = 10_000;

    fn assert_balanced(ledger: &LockLedger) {
        assert_eq!(ledger.outstanding(), ledger.total_locked());
    }

    #[test]
    fn lock_then_claim_at_maturity() {
        let mut ledger = LockLedger::new();
        ledger.lock(400, T + 1000, T).unwrap();
        assert_eq!(ledger.total_locked(), 400);

        assert_eq!(ledger.claim(T + 999), Err(LedgerError::NothingToClaim));
        assert_eq!(ledger.total_locked(), 400);

        assert_eq!(ledger.claim(T + 1000), Ok(400));
        assert_eq!(ledger.total_locked(), 0);
        assert_eq!(ledger.offset(), 1);
        assert_balanced(&ledger);
    }

    #[test]
    fn zero_amount_is_rejected() {
        let mut ledger = LockLedger::new();
        assert_eq!(ledger.lock(0, T, T), Err(LedgerError::AmountZero));
        assert_eq!(ledger.next(), 0);
    }

    #[test]
    fn later_lock_pairs_into_newest_slot() {
        let mut ledger = LockLedger::new();
        assert_eq!(ledger.lock(10, T + 100, T), Ok(LockPlacement::Appended { slot: 0 }));
        assert_eq!(ledger.lock(20, T + 200, T), Ok(LockPlacement::Paired { slot: 0 }));
        // b is taken, so a third lock opens a slot.
        assert_eq!(ledger.lock(30, T + 300, T), Ok(LockPlacement::Appended { slot: 1 }));
        assert_eq!(ledger.pending_len(), 2);
        assert_eq!(ledger.total_locked(), 60);
    }

    #[test]
    fn earlier_maturity_does_not_pair() {
        let mut ledger = LockLedger::new();
        ledger.lock(10, T + 100, T).unwrap();
        assert_eq!(ledger.lock(5, T + 50, T), Ok(LockPlacement::Appended { slot: 1 }));
    }

    #[test]
    fn matured_slot_does_not_pair() {
        let mut ledger = LockLedger::new();
        ledger.lock(10, T + 100, T).unwrap();
        assert_eq!(
            ledger.lock(5, T + 500, T + 100),
            Ok(LockPlacement::Appended { slot: 1 })
        );
    }

    fn fill(ledger: &mut LockLedger) {
        // Decreasing maturities never pair.
        for i in 0..CAPACITY as u64 {
            ledger.lock(100, T + 1000 - i, T).unwrap();
        }
    }

    #[test]
    fn full_ring_rejects_new_slot() {
        let mut ledger = LockLedger::new();
        fill(&mut ledger);
        assert!(ledger.is_full());
        assert_eq!(
            ledger.lock(1, T + 1, T),
            Err(LedgerError::MaxLockedVaultsReached)
        );
        assert_eq!(ledger.total_locked(), 500);
    }

    #[test]
    fn full_ring_merges_into_newest_sub_lock() {
        let mut ledger = LockLedger::new();
        fill(&mut ledger);
        let placement = ledger.lock_or_merge(50, T + 1, T).unwrap();
        assert_eq!(placement, LockPlacement::Merged { slot: 4 });

        let newest = ledger.slot(4).unwrap();
        assert_eq!(newest.a.amount, 150);
        assert_eq!(newest.a.maturity, T + 1000 - 4);
        assert_eq!(ledger.total_locked(), 550);
        assert_balanced(&ledger);
    }

    #[test]
    fn claim_walks_all_pending_slots() {
        let mut ledger = LockLedger::new();
        ledger.lock(10, T + 500, T).unwrap();
        ledger.lock(20, T + 100, T).unwrap();

        // Only the younger slot has matured; offset stays behind the older one.
        assert_eq!(ledger.claim(T + 100), Ok(20));
        assert_eq!(ledger.offset(), 0);
        assert_eq!(ledger.pending_len(), 2);

        assert_eq!(ledger.claim(T + 500), Ok(10));
        assert_eq!(ledger.offset(), 2);
        assert_balanced(&ledger);
    }

    #[test]
    fn claimed_slot_stays_readable_until_reused() {
        let mut ledger = LockLedger::new();
        ledger.lock(10, T, T - 1).unwrap();
        ledger.claim(T).unwrap();

        let historical = ledger.slot(0).unwrap();
        assert!(historical.a.claimed);
        assert_eq!(historical.a.amount, 10);

        for i in 0..CAPACITY as u64 {
            ledger.lock(1, T + 100 - i, T).unwrap();
        }
        assert!(ledger.slot(0).is_none());
    }

    #[test]
    fn ring_wraps_after_claims() {
        let mut ledger = LockLedger::new();
        for round in 0..3u64 {
            fill(&mut ledger);
            assert!(ledger.claim(T + 1000).is_ok());
            assert_eq!(ledger.offset(), (round + 1) * CAPACITY as u64);
        }
        assert_eq!(ledger.total_locked(), 0);
    }

    #[test]
    fn transfer_takes_oldest_first() {
        let mut loser = LockLedger::new();
        let mut winner = LockLedger::new();
        loser.lock(50, T + 100, T).unwrap();
        loser.lock(950, T + 50, T).unwrap();

        let (moved, placement) =
            LockLedger::transfer_on_loss(&mut loser, &mut winner, 10, T + 700, T).unwrap();
        assert_eq!(moved, 100);
        assert_eq!(placement, Some(LockPlacement::Appended { slot: 0 }));
        assert_eq!(loser.total_locked(), 900);
        assert_eq!(winner.total_locked(), 100);

        // First slot drained and marked claimed, second slot reduced.
        assert_eq!(loser.offset(), 1);
        assert_eq!(loser.slot(1).unwrap().a.amount, 900);
        assert_eq!(winner.slot(0).unwrap().a, SubLock::new(100, T + 700));
        assert_balanced(&loser);
        assert_balanced(&winner);
    }

    #[test]
    fn transfer_of_nothing_is_noop() {
        let mut loser = LockLedger::new();
        let mut winner = LockLedger::new();
        loser.lock(9, T + 100, T).unwrap();

        let moved = LockLedger::transfer_on_loss(&mut loser, &mut winner, 10, T + 700, T).unwrap();
        assert_eq!(moved, (0, None));
        assert_eq!(loser.total_locked(), 9);
        assert_eq!(winner.next(), 0);
    }

    #[test]
    fn percent_of_does_not_overflow() {
        assert_eq!(percent_of(1000, 10), 100);
        assert_eq!(percent_of(999, 10), 99);
        assert_eq!(percent_of(Amount::MAX, 100), Amount::MAX);
        assert_eq!(percent_of(1000, 250), 1000);
    }
}
