//! Roster management and clan registry notifications.

use std::collections::BTreeSet;

use super::{
    ClanDissolved, CombatantAssignment, CombatantRemoved, CombatantsAssigned, ContestError,
    VaultEngine, after,
};
use crate::config::VaultConfig;
use crate::env::VaultEnv;
use crate::state::{ClanId, PlayerId, Roster, Timestamp, vacate_slot};

impl VaultEngine<'_> {
    /// Replaces a clan's vault combatants.
    ///
    /// An empty list clears the roster. Pending attacks keep the roster they
    /// captured.
    pub fn assign_combatants(
        &mut self,
        env: VaultEnv<'_>,
        assignment: &CombatantAssignment,
        now: Timestamp,
    ) -> Result<CombatantsAssigned, ContestError> {
        let clan = assignment.clan;
        Self::authorize_leader(&env, assignment.caller, assignment.leader, clan)?;

        let current = self.clan(clan);
        if current.is_combatant_change_cooldown_active(now) {
            return Err(ContestError::ClanCombatantsChangeCooldown {
                until: current.combatant_change_cooldown_until,
            });
        }
        drop(current);

        let players = &assignment.players;
        if players.len() > VaultConfig::MAX_COMBATANTS {
            return Err(ContestError::TooManyCombatants {
                count: players.len(),
                max: VaultConfig::MAX_COMBATANTS,
            });
        }

        let mut seen = BTreeSet::new();
        if let Some(duplicate) = players.iter().find(|player| !seen.insert(**player)) {
            return Err(ContestError::PlayerCannotBeInAssignedMoreThanOnce { player: *duplicate });
        }

        let clans = env.clans()?;
        let registry = env.players()?;
        let roles = env.roles()?;
        for &player in players {
            if !clans.is_member(clan, player) {
                return Err(ContestError::PlayerNotInClan { clan, player });
            }
            if !registry.is_upgraded(player) {
                return Err(ContestError::PlayerNotUpgraded { player });
            }
            let elsewhere = self
                .state
                .combatant_clan(player)
                .is_some_and(|assigned| assigned != clan);
            if elsewhere || roles.is_territory_combatant(player) {
                return Err(ContestError::PlayerAlreadyExistingCombatant { player });
            }
        }

        let roster: Roster = players.iter().copied().collect();
        let change_cooldown_until = after(now, self.config.combatant_change_cooldown);

        let state = self.clan_mut(clan);
        let previous = std::mem::replace(&mut state.combatants, roster);
        state.combatant_change_cooldown_until = change_cooldown_until;

        for &player in previous.iter() {
            self.state.unindex_combatant(player, clan);
        }
        for &player in players {
            self.state.index_combatant(player, clan);
        }

        Ok(CombatantsAssigned {
            clan,
            previous: previous.to_vec(),
            combatants: players.clone(),
            change_cooldown_until,
        })
    }

    /// Clan registry notification: `player` left `clan`.
    ///
    /// The player's slot becomes [`PlayerId::NONE`] in the clan roster and in
    /// every pending attack the clan launched.
    pub fn player_left_clan(&mut self, clan: ClanId, player: PlayerId) -> CombatantRemoved {
        let was_combatant = self.state.clan(clan).is_some() && self.clan_mut(clan).vacate(player);
        self.state.unindex_combatant(player, clan);

        let affected_requests = self
            .state
            .pending_attacks_mut()
            .filter(|attack| attack.attacker == clan)
            .filter_map(|attack| {
                vacate_slot(&mut attack.attacker_players, player).then_some(attack.request_id)
            })
            .collect();

        CombatantRemoved {
            clan,
            player,
            was_combatant,
            affected_requests,
        }
    }

    /// Clan registry notification: `clan` no longer exists.
    ///
    /// The record and its locked funds are kept; only the roster and the
    /// clan's pending attack snapshots are emptied.
    pub fn clan_dissolved(&mut self, clan: ClanId) -> ClanDissolved {
        let removed = if self.state.clan(clan).is_some() {
            self.clan_mut(clan).vacate_all()
        } else {
            Vec::new()
        };
        for &player in &removed {
            self.state.unindex_combatant(player, clan);
        }

        let affected_requests = self
            .state
            .pending_attacks_mut()
            .filter(|attack| attack.attacker == clan)
            .map(|attack| {
                attack
                    .attacker_players
                    .iter_mut()
                    .for_each(|slot| *slot = PlayerId::NONE);
                attack.request_id
            })
            .collect();

        ClanDissolved {
            clan,
            removed,
            affected_requests,
        }
    }
}
