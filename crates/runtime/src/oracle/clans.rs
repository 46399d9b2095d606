//! [`vault_core::ClanOracle`] backed by an in-memory clan registry.
use std::collections::HashMap;
use std::sync::RwLock;

use vault_core::{ClanId, ClanOracle, PlayerId};

#[derive(Debug, Default)]
struct Membership {
    clan_of: HashMap<PlayerId, ClanId>,
    leaders: HashMap<ClanId, PlayerId>,
}

/// Clan membership and leadership.
///
/// Changing membership here does not touch vault rosters; the owner must
/// also send the matching `player_left_clan` or `clan_dissolved`
/// notification to the runtime.
#[derive(Debug, Default)]
pub struct ClanRegistry {
    inner: RwLock<Membership>,
}

impl ClanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `player` to `clan`, moving them out of any previous clan.
    pub fn join(&self, clan: ClanId, player: PlayerId) {
        if let Ok(mut inner) = self.inner.write() {
            inner.clan_of.insert(player, clan);
        }
    }

    /// Makes `player` a member and the leader of `clan`.
    pub fn set_leader(&self, clan: ClanId, player: PlayerId) {
        if let Ok(mut inner) = self.inner.write() {
            inner.clan_of.insert(player, clan);
            inner.leaders.insert(clan, player);
        }
    }

    /// Removes `player` from their clan and returns it.
    pub fn leave(&self, player: PlayerId) -> Option<ClanId> {
        let mut inner = self.inner.write().ok()?;
        let clan = inner.clan_of.remove(&player)?;
        if inner.leaders.get(&clan) == Some(&player) {
            inner.leaders.remove(&clan);
        }
        Some(clan)
    }

    /// Removes every member of `clan` and returns them.
    pub fn dissolve(&self, clan: ClanId) -> Vec<PlayerId> {
        let Ok(mut inner) = self.inner.write() else {
            return Vec::new();
        };
        inner.leaders.remove(&clan);
        let mut members: Vec<PlayerId> = inner
            .clan_of
            .iter()
            .filter(|(_, member_of)| **member_of == clan)
            .map(|(player, _)| *player)
            .collect();
        for player in &members {
            inner.clan_of.remove(player);
        }
        members.sort_unstable();
        members
    }

    pub fn clan_of(&self, player: PlayerId) -> Option<ClanId> {
        self.inner.read().ok()?.clan_of.get(&player).copied()
    }

    pub fn leader_of(&self, clan: ClanId) -> Option<PlayerId> {
        self.inner.read().ok()?.leaders.get(&clan).copied()
    }
}

impl ClanOracle for ClanRegistry {
    fn is_member(&self, clan: ClanId, player: PlayerId) -> bool {
        self.clan_of(player) == Some(clan)
    }

    fn is_leader(&self, clan: ClanId, player: PlayerId) -> bool {
        self.leader_of(clan) == Some(player)
    }
}
