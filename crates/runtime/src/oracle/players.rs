//! [`vault_core::PlayerOracle`] backed by an in-memory player registry.
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use vault_core::{AccountId, ItemId, PlayerId, PlayerOracle, Skill};

/// Everything the vault needs to know about one player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerRecord {
    pub controller: AccountId,
    /// Level used for every skill without an override.
    pub level: u16,
    pub skill_levels: HashMap<Skill, u16>,
    pub active: bool,
    pub upgraded: bool,
    pub items: HashSet<ItemId>,
}

impl PlayerRecord {
    pub fn new(controller: AccountId, level: u16) -> Self {
        Self {
            controller,
            level,
            skill_levels: HashMap::new(),
            active: true,
            upgraded: true,
            items: HashSet::new(),
        }
    }

    pub fn with_skill(mut self, skill: Skill, level: u16) -> Self {
        self.skill_levels.insert(skill, level);
        self
    }

    pub fn with_item(mut self, item: ItemId) -> Self {
        self.items.insert(item);
        self
    }
}

/// Player registry shared between the runtime and its owner.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    records: RwLock<HashMap<PlayerId, PlayerRecord>>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, player: PlayerId, record: PlayerRecord) {
        if let Ok(mut records) = self.records.write() {
            records.insert(player, record);
        }
    }

    pub fn record(&self, player: PlayerId) -> Option<PlayerRecord> {
        self.records
            .read()
            .ok()
            .and_then(|records| records.get(&player).cloned())
    }

    /// Applies `f` to the record of `player`. Returns `false` for unknown players.
    pub fn update(&self, player: PlayerId, f: impl FnOnce(&mut PlayerRecord)) -> bool {
        self.records
            .write()
            .ok()
            .and_then(|mut records| records.get_mut(&player).map(f))
            .is_some()
    }

    pub fn grant_item(&self, player: PlayerId, item: ItemId) -> bool {
        self.update(player, |record| {
            record.items.insert(item);
        })
    }

    /// Burns one item, e.g. after an outcome reported it as consumed.
    pub fn take_item(&self, player: PlayerId, item: ItemId) -> bool {
        let mut taken = false;
        self.update(player, |record| taken = record.items.remove(&item));
        taken
    }

    fn read<T>(&self, player: PlayerId, f: impl FnOnce(&PlayerRecord) -> T) -> Option<T> {
        self.records.read().ok()?.get(&player).map(f)
    }
}

impl PlayerOracle for PlayerRegistry {
    fn effective_level(&self, player: PlayerId, skill: Skill) -> u16 {
        self.read(player, |record| {
            record
                .skill_levels
                .get(&skill)
                .copied()
                .unwrap_or(record.level)
        })
        .unwrap_or(0)
    }

    fn is_active_controller(&self, caller: AccountId, player: PlayerId) -> bool {
        self.read(player, |record| record.active && record.controller == caller)
            .unwrap_or(false)
    }

    fn is_upgraded(&self, player: PlayerId) -> bool {
        self.read(player, |record| record.upgraded).unwrap_or(false)
    }

    fn has_item(&self, player: PlayerId, item: ItemId) -> bool {
        self.read(player, |record| record.items.contains(&item))
            .unwrap_or(false)
    }
}
