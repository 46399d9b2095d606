//! Scenario files describing the registries around a vault system.
//!
//! A scenario lists clans with their members, levels and inventories, the
//! item catalog, and optional starting deposits and rosters. It fills the
//! oracle registries directly and replays deposits and roster assignments
//! through a [`RuntimeHandle`] so they follow the ordinary rules.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vault_core::{
    AccountId, Amount, ClanId, CombatantAssignment, ItemEffect, ItemId, PlayerId, Skill,
};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::oracle::{
    ClanRegistry, ItemCatalog, OracleManager, PlayerRecord, PlayerRegistry, RoleRegistry,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub id: u64,
    /// Controlling account; defaults to the player id.
    #[serde(default)]
    pub controller: Option<u64>,
    pub level: u16,
    #[serde(default)]
    pub skills: BTreeMap<Skill, u16>,
    #[serde(default = "default_true")]
    pub upgraded: bool,
    #[serde(default)]
    pub items: Vec<u32>,
    #[serde(default)]
    pub territory: bool,
}

impl PlayerSpec {
    pub fn player(&self) -> PlayerId {
        PlayerId(self.id)
    }

    pub fn account(&self) -> AccountId {
        AccountId(self.controller.unwrap_or(self.id))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClanSpec {
    pub id: u32,
    /// Must also appear in `members`.
    pub leader: u64,
    pub members: Vec<PlayerSpec>,
    #[serde(default)]
    pub combatants: Vec<u64>,
    /// Deposits locked when the scenario is seeded, in order.
    #[serde(default)]
    pub deposits: Vec<Amount>,
}

impl ClanSpec {
    pub fn clan(&self) -> ClanId {
        ClanId(self.id)
    }

    pub fn leader_spec(&self) -> Option<&PlayerSpec> {
        self.members.iter().find(|member| member.id == self.leader)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub id: u32,
    pub effect: ItemEffect,
}

/// Scenario configuration for vault initialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub clans: Vec<ClanSpec>,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
}

fn default_true() -> bool {
    true
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Self =
            serde_json::from_str(json).map_err(|e| RuntimeError::InvalidScenario(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::InvalidScenario(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = BTreeMap::new();
        for clan in &self.clans {
            if clan.leader_spec().is_none() {
                return Err(RuntimeError::InvalidScenario(format!(
                    "leader {} of clan {} is not a member",
                    clan.leader, clan.id
                )));
            }
            for member in &clan.members {
                if member.id == PlayerId::NONE.0 {
                    return Err(RuntimeError::InvalidScenario(
                        "player id 0 is reserved".into(),
                    ));
                }
                if let Some(other) = seen.insert(member.id, clan.id) {
                    return Err(RuntimeError::InvalidScenario(format!(
                        "player {} is in clans {} and {}",
                        member.id, other, clan.id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn clan(&self, id: ClanId) -> Option<&ClanSpec> {
        self.clans.iter().find(|clan| clan.id == id.0)
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerSpec> {
        self.clans
            .iter()
            .flat_map(|clan| clan.members.iter())
            .find(|member| member.id == id.0)
    }

    /// Fresh registries holding everything the scenario describes.
    pub fn build_oracles(&self) -> OracleManager {
        let players = PlayerRegistry::new();
        let clans = ClanRegistry::new();
        let items = ItemCatalog::new();
        let roles = RoleRegistry::new();

        for item in &self.items {
            items.define(ItemId(item.id), item.effect);
        }

        for clan in &self.clans {
            for member in &clan.members {
                let mut record = PlayerRecord::new(member.account(), member.level);
                record.upgraded = member.upgraded;
                record
                    .skill_levels
                    .extend(member.skills.iter().map(|(skill, level)| (*skill, *level)));
                record.items.extend(member.items.iter().copied().map(ItemId));
                players.register(member.player(), record);

                clans.join(clan.clan(), member.player());
                roles.set_territory_combatant(member.player(), member.territory);
            }
            clans.set_leader(clan.clan(), PlayerId(clan.leader));
        }

        tracing::info!(
            clans = self.clans.len(),
            items = self.items.len(),
            "Scenario oracles built"
        );

        OracleManager::new(
            Arc::new(players),
            Arc::new(clans),
            Arc::new(items),
            Arc::new(roles),
        )
    }

    /// Replays deposits and roster assignments through the runtime.
    pub async fn seed(&self, handle: &RuntimeHandle) -> Result<()> {
        for clan in &self.clans {
            for &amount in &clan.deposits {
                handle.lock_funds(clan.clan(), amount).await?;
            }

            if clan.combatants.is_empty() {
                continue;
            }
            let leader = clan.leader_spec().ok_or_else(|| {
                RuntimeError::InvalidScenario(format!("clan {} has no leader", clan.id))
            })?;
            handle
                .assign_combatants(CombatantAssignment {
                    caller: leader.account(),
                    leader: leader.player(),
                    clan: clan.clan(),
                    players: clan.combatants.iter().copied().map(PlayerId).collect(),
                })
                .await?;
        }
        Ok(())
    }
}
