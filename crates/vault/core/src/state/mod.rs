//! Authoritative vault state.
//!
//! [`VaultState`] holds every clan record, the table of in-flight attacks and
//! the fee estimator. Runtime layers clone or query it but mutate it
//! exclusively through [`VaultEngine`](crate::engine::VaultEngine).
mod clan;
mod ids;
mod pending;

use std::borrow::Cow;
use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

pub use clan::{ClanVaultState, Roster};
pub use ids::{AccountId, Amount, ClanId, ItemId, PlayerId, RequestId, Skill, Timestamp};
pub use pending::PendingAttack;

pub(crate) use clan::vacate_slot;

use crate::fee::AttackFeeEstimator;

/// Canonical snapshot of the contestation engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VaultState {
    clans: BTreeMap<ClanId, ClanVaultState>,
    pending: BTreeMap<RequestId, PendingAttack>,
    /// Reverse index: live vault combatant → clan it fights for.
    combatant_clans: BTreeMap<PlayerId, ClanId>,
    /// Highest request id ever accepted, fulfilled or not.
    last_request_id: RequestId,
    pub fee: AttackFeeEstimator,
}

impl VaultState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clan(&self, id: ClanId) -> Option<&ClanVaultState> {
        self.clans.get(&id)
    }

    /// The stored record, or a fresh one if the clan was never touched.
    pub fn clan_or_fresh(&self, id: ClanId, initial_rating: u16) -> Cow<'_, ClanVaultState> {
        match self.clans.get(&id) {
            Some(clan) => Cow::Borrowed(clan),
            None => Cow::Owned(ClanVaultState::new(initial_rating)),
        }
    }

    pub(crate) fn clan_mut(&mut self, id: ClanId, initial_rating: u16) -> &mut ClanVaultState {
        self.clans
            .entry(id)
            .or_insert_with(|| ClanVaultState::new(initial_rating))
    }

    /// Mutable access to two distinct clans at once.
    pub(crate) fn clan_pair_mut(
        &mut self,
        first: ClanId,
        second: ClanId,
        initial_rating: u16,
    ) -> Option<(&mut ClanVaultState, &mut ClanVaultState)> {
        if first == second {
            return None;
        }
        self.clan_mut(first, initial_rating);
        self.clan_mut(second, initial_rating);

        let mut first_state = None;
        let mut second_state = None;
        for (id, clan) in self.clans.iter_mut() {
            if *id == first {
                first_state = Some(clan);
            } else if *id == second {
                second_state = Some(clan);
            }
        }
        first_state.zip(second_state)
    }

    pub fn clans(&self) -> impl Iterator<Item = (ClanId, &ClanVaultState)> {
        self.clans.iter().map(|(id, clan)| (*id, clan))
    }

    pub fn pending(&self, request_id: RequestId) -> Option<&PendingAttack> {
        self.pending.get(&request_id)
    }

    pub fn pending_attacks(&self) -> impl Iterator<Item = &PendingAttack> {
        self.pending.values()
    }

    pub(crate) fn pending_attacks_mut(&mut self) -> impl Iterator<Item = &mut PendingAttack> {
        self.pending.values_mut()
    }

    pub(crate) fn insert_pending(&mut self, attack: PendingAttack) {
        self.last_request_id = self.last_request_id.max(attack.request_id);
        self.pending.insert(attack.request_id, attack);
    }

    /// Highest request id this state has ever issued.
    ///
    /// New ids must be strictly greater, so a late delivery for a resolved
    /// request can never match a newer attack.
    pub fn last_request_id(&self) -> RequestId {
        self.last_request_id
    }

    pub(crate) fn take_pending(&mut self, request_id: RequestId) -> Option<PendingAttack> {
        self.pending.remove(&request_id)
    }

    /// Clan a player is currently assigned to as a vault combatant.
    pub fn combatant_clan(&self, player: PlayerId) -> Option<ClanId> {
        self.combatant_clans.get(&player).copied()
    }

    pub(crate) fn index_combatant(&mut self, player: PlayerId, clan: ClanId) {
        if player.is_some() {
            self.combatant_clans.insert(player, clan);
        }
    }

    pub(crate) fn unindex_combatant(&mut self, player: PlayerId, clan: ClanId) {
        if self.combatant_clans.get(&player) == Some(&clan) {
            self.combatant_clans.remove(&player);
        }
    }

    /// SHA-256 commitment over the whole state.
    ///
    /// Fields are hashed in a fixed order with little-endian encoding, so two
    /// equal states always produce the same root.
    pub fn state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();

        hasher.update((self.clans.len() as u64).to_le_bytes());
        for (id, clan) in &self.clans {
            hasher.update(id.0.to_le_bytes());
            hash_clan(&mut hasher, clan);
        }

        hasher.update((self.pending.len() as u64).to_le_bytes());
        for attack in self.pending.values() {
            hash_pending(&mut hasher, attack);
        }
        hasher.update(self.last_request_id.0.to_le_bytes());

        for sample in self.fee.samples() {
            hasher.update(sample.to_le_bytes());
        }

        hasher.finalize().into()
    }
}

fn hash_clan(hasher: &mut Sha256, clan: &ClanVaultState) {
    hasher.update(clan.rating.to_le_bytes());
    hasher.update(clan.ledger.total_locked().to_le_bytes());
    hasher.update(clan.ledger.offset().to_le_bytes());
    hasher.update(clan.ledger.next().to_le_bytes());
    for (index, slot) in clan.ledger.pending() {
        hasher.update(index.to_le_bytes());
        for lock in slot.sub_locks() {
            hasher.update(lock.amount.to_le_bytes());
            hasher.update(lock.maturity.to_le_bytes());
            hasher.update([u8::from(lock.claimed)]);
        }
    }
    hash_roster(hasher, &clan.combatants);
    for timestamp in [
        clan.attack_cooldown_until,
        clan.combatant_change_cooldown_until,
        clan.last_attacked_clan_cooldown_until,
        clan.blocking_attacks_until,
        clan.block_attacks_cooldown_until,
    ] {
        hasher.update(timestamp.to_le_bytes());
    }
    hasher.update(clan.last_attacked_clan.map_or(u64::MAX, |id| u64::from(id.0)).to_le_bytes());
}

fn hash_pending(hasher: &mut Sha256, attack: &PendingAttack) {
    hasher.update(attack.request_id.0.to_le_bytes());
    hasher.update(attack.attacker.0.to_le_bytes());
    hasher.update(attack.defender.0.to_le_bytes());
    hash_roster(hasher, &attack.attacker_players);
    hasher.update(attack.item.map_or(u64::MAX, |id| u64::from(id.0)).to_le_bytes());
    hasher.update([attack.extra_rolls]);
    hasher.update(attack.prepayment.to_le_bytes());
    hasher.update(attack.requested_at.to_le_bytes());
}

fn hash_roster(hasher: &mut Sha256, roster: &Roster) {
    hasher.update((roster.len() as u64).to_le_bytes());
    for player in roster {
        hasher.update(player.0.to_le_bytes());
    }
}
