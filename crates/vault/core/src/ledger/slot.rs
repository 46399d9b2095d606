use crate::state::{Amount, Timestamp};

/// One time-locked amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubLock {
    pub amount: Amount,
    pub maturity: Timestamp,
    pub claimed: bool,
}

impl SubLock {
    pub const fn new(amount: Amount, maturity: Timestamp) -> Self {
        Self {
            amount,
            maturity,
            claimed: false,
        }
    }

    #[inline]
    pub const fn is_matured(&self, now: Timestamp) -> bool {
        self.maturity <= now
    }

    #[inline]
    pub const fn is_claimable(&self, now: Timestamp) -> bool {
        !self.claimed && self.is_matured(now)
    }

    /// Unclaimed amount still counted in the ledger total.
    #[inline]
    pub const fn outstanding(&self) -> Amount {
        if self.claimed { 0 } else { self.amount }
    }
}

/// A ring position holding up to two locks.
///
/// When `b` is populated `a.maturity <= b.maturity`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LockSlot {
    pub a: SubLock,
    pub b: Option<SubLock>,
}

impl LockSlot {
    pub const fn new(amount: Amount, maturity: Timestamp) -> Self {
        Self {
            a: SubLock::new(amount, maturity),
            b: None,
        }
    }

    /// Every populated sub-lock is claimed.
    pub fn is_spent(&self) -> bool {
        self.a.claimed && self.b.is_none_or(|b| b.claimed)
    }

    pub fn outstanding(&self) -> Amount {
        self.a.outstanding() + self.b.map_or(0, |b| b.outstanding())
    }

    /// Sub-locks oldest first.
    pub fn sub_locks_mut(&mut self) -> impl Iterator<Item = &mut SubLock> {
        std::iter::once(&mut self.a).chain(self.b.as_mut())
    }

    pub fn sub_locks(&self) -> impl Iterator<Item = &SubLock> {
        std::iter::once(&self.a).chain(self.b.as_ref())
    }
}
