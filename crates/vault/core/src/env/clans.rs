//! Clan Registry oracle.

use crate::state::{ClanId, PlayerId};

/// Read-only view of clan membership and ranks.
///
/// Departures and dissolutions are pushed to the engine separately through
/// `VaultEngine::player_left_clan` and `VaultEngine::clan_dissolved`.
pub trait ClanOracle: Send + Sync {
    fn is_member(&self, clan: ClanId, player: PlayerId) -> bool;

    /// Leaders may attack, assign combatants and block attacks for the clan.
    fn is_leader(&self, clan: ClanId, player: PlayerId) -> bool;
}
