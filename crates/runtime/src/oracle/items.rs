//! Minimal [`vault_core::ItemOracle`] backed by an in-memory map.
use std::collections::HashMap;
use std::sync::RwLock;

use vault_core::{ItemEffect, ItemId, ItemOracle};

/// ItemOracle implementation with item effect definitions
#[derive(Debug, Default)]
pub struct ItemCatalog {
    effects: RwLock<HashMap<ItemId, ItemEffect>>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an item definition
    pub fn define(&self, item: ItemId, effect: ItemEffect) {
        if let Ok(mut effects) = self.effects.write() {
            effects.insert(item, effect);
        }
    }
}

impl ItemOracle for ItemCatalog {
    fn effect(&self, item: ItemId) -> Option<ItemEffect> {
        self.effects.read().ok()?.get(&item).copied()
    }
}
