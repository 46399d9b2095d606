//! Runtime implementations of the `vault-core` oracle traits.
//!
//! The registries are shared behind [`Arc`] so their owner can keep editing
//! membership, levels and inventories while the runtime reads them. The
//! [`OracleManager`] bundles them into a [`VaultEnv`] on demand.
mod clans;
mod items;
mod players;
mod randomness;
mod roles;

use std::sync::Arc;

use vault_core::VaultEnv;

pub use clans::ClanRegistry;
pub use items::ItemCatalog;
pub use players::{PlayerRecord, PlayerRegistry};
pub use randomness::{RandomnessBridge, RandomnessTicket};
pub use roles::RoleRegistry;

/// Manages all oracle implementations and provides unified access
#[derive(Clone, Default)]
pub struct OracleManager {
    players: Arc<PlayerRegistry>,
    clans: Arc<ClanRegistry>,
    items: Arc<ItemCatalog>,
    roles: Arc<RoleRegistry>,
}

impl OracleManager {
    pub fn new(
        players: Arc<PlayerRegistry>,
        clans: Arc<ClanRegistry>,
        items: Arc<ItemCatalog>,
        roles: Arc<RoleRegistry>,
    ) -> Self {
        Self {
            players,
            clans,
            items,
            roles,
        }
    }

    /// Environment for one engine call, with `randomness` as the outbound source.
    pub fn as_vault_env<'a>(&'a self, randomness: &'a RandomnessBridge) -> VaultEnv<'a> {
        VaultEnv::with_all(
            self.players.as_ref(),
            self.clans.as_ref(),
            self.items.as_ref(),
            self.roles.as_ref(),
            randomness,
        )
    }

    pub fn players(&self) -> &Arc<PlayerRegistry> {
        &self.players
    }

    pub fn clans(&self) -> &Arc<ClanRegistry> {
        &self.clans
    }

    pub fn items(&self) -> &Arc<ItemCatalog> {
        &self.items
    }

    pub fn roles(&self) -> &Arc<RoleRegistry> {
        &self.roles
    }
}
