//! Custody of the stake currency behind the ledgers.
//!
//! The engine only keeps accounting; a [`FundsCustody`] moves the real
//! balances. The worker calls it after the engine accepted a command and
//! before the new state is committed, so a refusal leaves state untouched.
//! Battle seizures are the one exception: they commit regardless and a
//! refusal is only reported.
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use vault_core::{Amount, ClanId, PlayerId};

use super::errors::{Result, RuntimeError};

/// Why funds are arriving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CustodyReason {
    /// Attack prepayment; pays for randomness, never credited to a clan.
    AttackPrepayment,
    /// Deposit into a clan's vault through `lock_funds`.
    Lock,
}

#[async_trait]
pub trait FundsCustody: Send + Sync {
    async fn receive(&self, clan: ClanId, amount: Amount, reason: CustodyReason) -> Result<()>;

    /// Battle seizure from the losing clan's vault to the winner's.
    async fn transfer(&self, from: ClanId, to: ClanId, amount: Amount) -> Result<()>;

    /// Pay matured funds out to a clan member.
    async fn release(&self, clan: ClanId, player: PlayerId, amount: Amount) -> Result<()>;
}

#[derive(Debug, Default)]
struct Books {
    vaults: HashMap<ClanId, Amount>,
    fees: Amount,
    paid_out: HashMap<PlayerId, Amount>,
}

/// Per-clan bank balances held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCustody {
    books: Mutex<Books>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vault_balance(&self, clan: ClanId) -> Amount {
        self.books
            .lock()
            .map(|books| books.vaults.get(&clan).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn fees_collected(&self) -> Amount {
        self.books.lock().map(|books| books.fees).unwrap_or(0)
    }

    pub fn paid_out(&self, player: PlayerId) -> Amount {
        self.books
            .lock()
            .map(|books| books.paid_out.get(&player).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn with_books<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut Books) -> std::result::Result<T, String>,
    ) -> Result<T> {
        let mut books = self.books.lock().map_err(|_| RuntimeError::Custody {
            operation,
            reason: "custody books poisoned".into(),
        })?;
        f(&mut books).map_err(|reason| RuntimeError::Custody { operation, reason })
    }
}

fn debit(
    vaults: &mut HashMap<ClanId, Amount>,
    clan: ClanId,
    amount: Amount,
) -> std::result::Result<(), String> {
    let balance = vaults.get(&clan).copied().unwrap_or(0);
    let remaining = balance
        .checked_sub(amount)
        .ok_or_else(|| format!("{clan} holds {balance}, needs {amount}"))?;
    vaults.insert(clan, remaining);
    Ok(())
}

fn credit(
    vaults: &mut HashMap<ClanId, Amount>,
    clan: ClanId,
    amount: Amount,
) -> std::result::Result<(), String> {
    let balance = vaults.get(&clan).copied().unwrap_or(0);
    let total = balance
        .checked_add(amount)
        .ok_or_else(|| format!("{clan} balance overflow"))?;
    vaults.insert(clan, total);
    Ok(())
}

#[async_trait]
impl FundsCustody for InMemoryCustody {
    async fn receive(&self, clan: ClanId, amount: Amount, reason: CustodyReason) -> Result<()> {
        self.with_books("receive", |books| match reason {
            CustodyReason::AttackPrepayment => {
                books.fees = books.fees.saturating_add(amount);
                Ok(())
            }
            CustodyReason::Lock => credit(&mut books.vaults, clan, amount),
        })
    }

    async fn transfer(&self, from: ClanId, to: ClanId, amount: Amount) -> Result<()> {
        self.with_books("transfer", |books| {
            debit(&mut books.vaults, from, amount)?;
            credit(&mut books.vaults, to, amount)
        })
    }

    async fn release(&self, clan: ClanId, player: PlayerId, amount: Amount) -> Result<()> {
        self.with_books("release", |books| {
            debit(&mut books.vaults, clan, amount)?;
            let paid = books.paid_out.entry(player).or_default();
            *paid = paid.saturating_add(amount);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn balances_follow_deposits_seizures_and_payouts() {
        let custody = InMemoryCustody::new();
        let (red, blue) = (ClanId(1), ClanId(2));

        custody.receive(red, 1_000, CustodyReason::Lock).await.unwrap();
        custody
            .receive(blue, 40, CustodyReason::AttackPrepayment)
            .await
            .unwrap();
        custody.transfer(red, blue, 100).await.unwrap();
        custody.release(blue, PlayerId(9), 100).await.unwrap();

        assert_eq!(custody.vault_balance(red), 900);
        assert_eq!(custody.vault_balance(blue), 0);
        assert_eq!(custody.fees_collected(), 40);
        assert_eq!(custody.paid_out(PlayerId(9)), 100);
    }

    #[tokio::test]
    async fn overdraft_is_refused_without_side_effects() {
        let custody = InMemoryCustody::new();
        custody
            .receive(ClanId(1), 10, CustodyReason::Lock)
            .await
            .unwrap();

        let error = custody
            .transfer(ClanId(1), ClanId(2), 11)
            .await
            .unwrap_err();
        assert!(matches!(error, RuntimeError::Custody { operation: "transfer", .. }));
        assert_eq!(custody.vault_balance(ClanId(1)), 10);
        assert_eq!(custody.vault_balance(ClanId(2)), 0);
    }
}
