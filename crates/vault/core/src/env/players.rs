//! Player Registry oracle.
//!
//! The registry owns player identity, experience totals and level derivation.
//! The engine only asks narrow questions about a player.

use crate::state::{AccountId, ItemId, PlayerId, Skill};

/// Read-only view of the Player Registry.
pub trait PlayerOracle: Send + Sync {
    /// Effective level of `player` in `skill`, including any boosts.
    ///
    /// Unknown players report level 0.
    fn effective_level(&self, player: PlayerId, skill: Skill) -> u16;

    /// Whether `caller` currently controls `player` and the player is active.
    fn is_active_controller(&self, caller: AccountId, player: PlayerId) -> bool;

    /// Whether `player` has the upgrade required to fight in vault battles.
    fn is_upgraded(&self, player: PlayerId) -> bool;

    /// Whether `player` holds at least one unit of `item`.
    fn has_item(&self, player: PlayerId, item: ItemId) -> bool;
}
