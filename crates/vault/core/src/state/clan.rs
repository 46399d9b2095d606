use arrayvec::ArrayVec;

use super::{ClanId, PlayerId, Timestamp};
use crate::config::VaultConfig;
use crate::ledger::LockLedger;

/// Assigned vault combatants, in assignment order.
pub type Roster = ArrayVec<PlayerId, { VaultConfig::MAX_COMBATANTS }>;

/// Per-clan vault record. Created on first touch and never removed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClanVaultState {
    pub ledger: LockLedger,
    /// Departed players leave a [`PlayerId::NONE`] in their slot.
    pub combatants: Roster,
    pub attack_cooldown_until: Timestamp,
    pub combatant_change_cooldown_until: Timestamp,
    pub last_attacked_clan: Option<ClanId>,
    pub last_attacked_clan_cooldown_until: Timestamp,
    pub blocking_attacks_until: Timestamp,
    pub block_attacks_cooldown_until: Timestamp,
    pub rating: u16,
}

impl ClanVaultState {
    pub fn new(initial_rating: u16) -> Self {
        Self {
            ledger: LockLedger::new(),
            combatants: Roster::new(),
            attack_cooldown_until: 0,
            combatant_change_cooldown_until: 0,
            last_attacked_clan: None,
            last_attacked_clan_cooldown_until: 0,
            blocking_attacks_until: 0,
            block_attacks_cooldown_until: 0,
            rating: initial_rating,
        }
    }

    pub fn live_combatants(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.combatants.iter().copied().filter(|id| id.is_some())
    }

    pub fn has_live_combatant(&self) -> bool {
        self.live_combatants().next().is_some()
    }

    pub fn is_attack_cooldown_active(&self, now: Timestamp) -> bool {
        now < self.attack_cooldown_until
    }

    /// True while this clan may not fight `other` again.
    pub fn is_same_clan_cooldown_active(&self, other: ClanId, now: Timestamp) -> bool {
        self.last_attacked_clan == Some(other) && now < self.last_attacked_clan_cooldown_until
    }

    pub fn is_blocking_attacks(&self, now: Timestamp) -> bool {
        now < self.blocking_attacks_until
    }

    pub fn is_block_attacks_cooldown_active(&self, now: Timestamp) -> bool {
        now < self.block_attacks_cooldown_until
    }

    pub fn is_combatant_change_cooldown_active(&self, now: Timestamp) -> bool {
        now < self.combatant_change_cooldown_until
    }

    pub fn arm_same_clan_cooldown(&mut self, other: ClanId, until: Timestamp) {
        self.last_attacked_clan = Some(other);
        self.last_attacked_clan_cooldown_until = until;
    }

    /// Replaces the slot of `player` with [`PlayerId::NONE`]. Returns whether it was assigned.
    pub fn vacate(&mut self, player: PlayerId) -> bool {
        vacate_slot(&mut self.combatants, player)
    }

    /// Vacates every slot and returns the players that were assigned.
    pub fn vacate_all(&mut self) -> Vec<PlayerId> {
        let removed = self.live_combatants().collect();
        self.combatants.iter_mut().for_each(|slot| *slot = PlayerId::NONE);
        removed
    }
}

pub(crate) fn vacate_slot(roster: &mut Roster, player: PlayerId) -> bool {
    if player.is_none() {
        return false;
    }
    match roster.iter_mut().find(|slot| **slot == player) {
        Some(slot) => {
            *slot = PlayerId::NONE;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_roster(ids: &[u64]) -> ClanVaultState {
        let mut clan = ClanVaultState::new(1000);
        clan.combatants
            .extend(ids.iter().copied().map(PlayerId));
        clan
    }

    #[test]
    fn vacate_keeps_slot_position() {
        let mut clan = with_roster(&[1, 2, 3]);
        assert!(clan.vacate(PlayerId(2)));
        assert_eq!(
            clan.combatants.as_slice(),
            &[PlayerId(1), PlayerId::NONE, PlayerId(3)]
        );
        assert!(!clan.vacate(PlayerId(2)));
        assert!(!clan.vacate(PlayerId::NONE));
    }

    #[test]
    fn vacate_all_reports_live_players() {
        let mut clan = with_roster(&[4, 0, 5]);
        assert_eq!(clan.vacate_all(), vec![PlayerId(4), PlayerId(5)]);
        assert!(!clan.has_live_combatant());
        assert_eq!(clan.combatants.len(), 3);
    }

    #[test]
    fn same_clan_cooldown_is_per_victim() {
        let mut clan = ClanVaultState::new(1000);
        clan.arm_same_clan_cooldown(ClanId(7), 100);
        assert!(clan.is_same_clan_cooldown_active(ClanId(7), 99));
        assert!(!clan.is_same_clan_cooldown_active(ClanId(7), 100));
        assert!(!clan.is_same_clan_cooldown_active(ClanId(8), 50));
    }
}
