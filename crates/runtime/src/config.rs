//! Runtime configuration structures and environment loaders.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use vault_core::{Skill, VaultConfig};

/// Configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub vault: VaultConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Directory for state snapshots. `None` keeps state in memory only.
    pub state_dir: Option<PathBuf>,
    /// Number of snapshot revisions kept by the worker.
    pub snapshot_retention: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            vault: VaultConfig::new(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            state_dir: None,
            snapshot_retention: 8,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `VAULT_EVENT_BUFFER` - Broadcast capacity per topic (default: 100)
    /// - `VAULT_COMMAND_BUFFER` - Worker command queue size (default: 32)
    /// - `VAULT_STATE_DIR` - Snapshot directory; `default` picks the
    ///   platform data directory (default: in-memory)
    /// - `VAULT_SNAPSHOT_RETENTION` - Revisions kept on disk (default: 8)
    /// - `VAULT_ATTACK_COOLDOWN`, `VAULT_SAME_CLAN_ATTACK_COOLDOWN`,
    ///   `VAULT_COMBATANT_CHANGE_COOLDOWN`, `VAULT_BLOCK_ATTACKS_COOLDOWN`,
    ///   `VAULT_LOCK_DURATION`, `VAULT_BATTLE_LOCK_DURATION` - seconds
    /// - `VAULT_TRANSFER_PERCENT`, `VAULT_ROLL_LEVEL_STEP`,
    ///   `VAULT_ATTACKER_K`, `VAULT_DEFENDER_K`, `VAULT_INITIAL_RATING`
    /// - `VAULT_BASE_ATTACK_COST`, `VAULT_EXPECTED_WORK_UNITS`
    /// - `VAULT_BATTLE_SKILLS` - comma separated, e.g. `melee,magic,health`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("VAULT_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("VAULT_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(retention) = read_env::<u64>("VAULT_SNAPSHOT_RETENTION") {
            config.snapshot_retention = retention.max(1);
        }
        config.state_dir = env::var("VAULT_STATE_DIR").ok().and_then(|dir| {
            if dir == "default" {
                Self::default_state_dir()
            } else {
                Some(PathBuf::from(dir))
            }
        });

        let vault = &mut config.vault;
        override_with(&mut vault.attack_cooldown, "VAULT_ATTACK_COOLDOWN");
        override_with(
            &mut vault.same_clan_attack_cooldown,
            "VAULT_SAME_CLAN_ATTACK_COOLDOWN",
        );
        override_with(
            &mut vault.combatant_change_cooldown,
            "VAULT_COMBATANT_CHANGE_COOLDOWN",
        );
        override_with(
            &mut vault.block_attacks_cooldown,
            "VAULT_BLOCK_ATTACKS_COOLDOWN",
        );
        override_with(&mut vault.lock_duration, "VAULT_LOCK_DURATION");
        override_with(&mut vault.battle_lock_duration, "VAULT_BATTLE_LOCK_DURATION");
        override_with(&mut vault.transfer_percent, "VAULT_TRANSFER_PERCENT");
        override_with(&mut vault.roll_level_step, "VAULT_ROLL_LEVEL_STEP");
        override_with(&mut vault.attacker_k, "VAULT_ATTACKER_K");
        override_with(&mut vault.defender_k, "VAULT_DEFENDER_K");
        override_with(&mut vault.initial_rating, "VAULT_INITIAL_RATING");
        override_with(&mut vault.base_attack_cost, "VAULT_BASE_ATTACK_COST");
        override_with(&mut vault.expected_work_units, "VAULT_EXPECTED_WORK_UNITS");

        if let Some(skills) = env::var("VAULT_BATTLE_SKILLS")
            .ok()
            .and_then(|raw| parse_skills(&raw))
        {
            vault.battle_skills = skills;
        }

        config
    }

    /// Platform data directory for snapshots, e.g. `~/.local/share/vault/state`.
    pub fn default_state_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "vault").map(|dirs| dirs.data_dir().join("state"))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn override_with<T: FromStr>(slot: &mut T, key: &str) {
    if let Some(value) = read_env(key) {
        *slot = value;
    }
}

/// Unknown names invalidate the whole list.
fn parse_skills(raw: &str) -> Option<Vec<Skill>> {
    let skills = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Skill::from_str)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    (!skills.is_empty()).then_some(skills)
}
