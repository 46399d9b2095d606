//! Locked funds and defensive items.

use super::{AttacksBlocked, ContestError, FundsClaimed, FundsLocked, VaultEngine, after};
use crate::env::{ItemEffect, VaultEnv};
use crate::ledger::LedgerError;
use crate::state::{AccountId, Amount, ClanId, ItemId, PlayerId, Timestamp};

impl VaultEngine<'_> {
    /// Releases every matured lock of `clan` to `player`.
    ///
    /// # Errors
    ///
    /// - `NotOwnerOfPlayerAndActive` if `caller` does not control `player`
    /// - `PlayerNotInClan` if `player` is not a member of `clan`
    /// - `NothingToClaim` if no lock has matured
    pub fn claim_funds(
        &mut self,
        env: VaultEnv<'_>,
        clan: ClanId,
        player: PlayerId,
        caller: AccountId,
        now: Timestamp,
    ) -> Result<FundsClaimed, ContestError> {
        Self::authorize_controller(&env, caller, player)?;
        if !env.clans()?.is_member(clan, player) {
            return Err(ContestError::PlayerNotInClan { clan, player });
        }
        if self.state.clan(clan).is_none() {
            return Err(LedgerError::NothingToClaim.into());
        }

        let amount = self.clan_mut(clan).ledger.claim(now)?;
        Ok(FundsClaimed {
            clan,
            player,
            amount,
        })
    }

    /// Locks `amount` in `clan`'s vault for `lock_duration`.
    ///
    /// System entry point for income such as territory rewards; no caller
    /// authorization is performed.
    pub fn lock_funds(
        &mut self,
        clan: ClanId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<FundsLocked, ContestError> {
        if amount == 0 {
            return Err(LedgerError::AmountZero.into());
        }
        let maturity = after(now, self.config.lock_duration);
        let placement = self.clan_mut(clan).ledger.lock(amount, maturity, now)?;
        Ok(FundsLocked {
            clan,
            amount,
            maturity,
            placement,
        })
    }

    /// Spends a block item: `clan` cannot be attacked for the item's duration.
    pub fn block_attacks(
        &mut self,
        env: VaultEnv<'_>,
        clan: ClanId,
        item: ItemId,
        leader: PlayerId,
        caller: AccountId,
        now: Timestamp,
    ) -> Result<AttacksBlocked, ContestError> {
        Self::authorize_leader(&env, caller, leader, clan)?;

        let effect = env
            .items()?
            .effect(item)
            .ok_or(ContestError::ItemNotFound { item })?;
        if !env.players()?.has_item(leader, item) {
            return Err(ContestError::ItemNotOwned {
                item,
                player: leader,
            });
        }
        let ItemEffect::BlockAttacks { duration } = effect else {
            return Err(ContestError::NotABlockAttacksItem { item });
        };

        let current = self.clan(clan);
        if current.is_block_attacks_cooldown_active(now) {
            return Err(ContestError::BlockAttacksCooldown {
                until: current.block_attacks_cooldown_until,
            });
        }
        drop(current);

        let blocking_until = after(now, duration);
        let cooldown_until = after(blocking_until, self.config.block_attacks_cooldown);
        let state = self.clan_mut(clan);
        state.blocking_attacks_until = blocking_until;
        state.block_attacks_cooldown_until = cooldown_until;

        Ok(AttacksBlocked {
            clan,
            item,
            blocking_until,
            cooldown_until,
        })
    }
}
