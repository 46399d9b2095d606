//! Mutually exclusive combatant roles held outside the vault system.

use crate::state::PlayerId;

/// Exposes combatant commitments owned by other systems (territories).
///
/// A player committed as a territory combatant cannot also defend a vault.
pub trait RoleOracle: Send + Sync {
    fn is_territory_combatant(&self, player: PlayerId) -> bool;
}
