//! Vault contestation state machine.
//!
//! The [`VaultEngine`] is the authoritative reducer for [`VaultState`]. Every
//! operation validates exhaustively before touching state, so a returned
//! error always leaves the state as it was. Attacks are two-phase:
//! `attack_vaults` stores a [`PendingAttack`](crate::state::PendingAttack)
//! and requests randomness; `fulfill_randomness` later resolves the battle.
mod attack;
mod combatants;
mod errors;
mod funds;
mod outcome;

pub use errors::ContestError;
pub use outcome::{
    AttackRequest, AttackRequested, AttacksBlocked, BattleResolved, ClanDissolved,
    CombatantAssignment, CombatantRemoved, CombatantsAssigned, FundsClaimed, FundsLocked,
    RatingChange,
};

use std::borrow::Cow;

use crate::config::VaultConfig;
use crate::env::VaultEnv;
use crate::state::{AccountId, Amount, ClanId, ClanVaultState, PlayerId, Timestamp, VaultState};

/// Engine over a borrowed state and configuration.
pub struct VaultEngine<'a> {
    state: &'a mut VaultState,
    config: &'a VaultConfig,
}

impl<'a> VaultEngine<'a> {
    pub fn new(state: &'a mut VaultState, config: &'a VaultConfig) -> Self {
        Self { state, config }
    }

    pub fn state(&self) -> &VaultState {
        self.state
    }

    pub fn config(&self) -> &VaultConfig {
        self.config
    }

    /// Prepayment currently required by `attack_vaults`.
    pub fn attack_cost(&self) -> Amount {
        self.state
            .fee
            .attack_cost(self.config.base_attack_cost, self.config.expected_work_units)
    }

    /// Clan record, or the record a first touch would create.
    pub fn clan(&self, clan: ClanId) -> Cow<'_, ClanVaultState> {
        self.state.clan_or_fresh(clan, self.config.initial_rating)
    }

    fn clan_mut(&mut self, clan: ClanId) -> &mut ClanVaultState {
        self.state.clan_mut(clan, self.config.initial_rating)
    }

    /// `caller` controls an active `leader` who leads `clan`.
    fn authorize_leader(
        env: &VaultEnv<'_>,
        caller: AccountId,
        leader: PlayerId,
        clan: ClanId,
    ) -> Result<(), ContestError> {
        Self::authorize_controller(env, caller, leader)?;
        if !env.clans()?.is_leader(clan, leader) {
            return Err(ContestError::NotLeader {
                clan,
                player: leader,
            });
        }
        Ok(())
    }

    fn authorize_controller(
        env: &VaultEnv<'_>,
        caller: AccountId,
        player: PlayerId,
    ) -> Result<(), ContestError> {
        if !env.players()?.is_active_controller(caller, player) {
            return Err(ContestError::NotOwnerOfPlayerAndActive { caller, player });
        }
        Ok(())
    }
}

fn after(now: Timestamp, delay: u64) -> Timestamp {
    now.saturating_add(delay)
}
