//! Territory roles that exclude a player from vault duty.
use std::collections::HashSet;
use std::sync::RwLock;

use vault_core::{PlayerId, RoleOracle};

#[derive(Debug, Default)]
pub struct RoleRegistry {
    territory: RwLock<HashSet<PlayerId>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_territory_combatant(&self, player: PlayerId, assigned: bool) {
        if let Ok(mut territory) = self.territory.write() {
            if assigned {
                territory.insert(player);
            } else {
                territory.remove(&player);
            }
        }
    }
}

impl RoleOracle for RoleRegistry {
    fn is_territory_combatant(&self, player: PlayerId) -> bool {
        self.territory
            .read()
            .map(|territory| territory.contains(&player))
            .unwrap_or(false)
    }
}
