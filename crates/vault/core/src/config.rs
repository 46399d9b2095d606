use crate::state::{Amount, Skill};

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

/// Vault contestation constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VaultConfig {
    /// Minimum delay between two attacks launched by the same clan.
    pub attack_cooldown: u64,
    /// Minimum delay before the same clan pair can fight again.
    pub same_clan_attack_cooldown: u64,
    /// Minimum delay between two roster changes of the same clan.
    pub combatant_change_cooldown: u64,
    /// Extra delay after a block expires before another block item can be used.
    pub block_attacks_cooldown: u64,
    /// Maturity delay for funds locked through `lock_funds`.
    pub lock_duration: u64,
    /// Maturity delay for funds seized in a battle.
    pub battle_lock_duration: u64,
    /// Percentage of the loser's locked total moved to the winner.
    pub transfer_percent: u8,
    /// Levels per additional dice roll.
    pub roll_level_step: u16,
    /// Rating learning rate for the attacking clan.
    pub attacker_k: u16,
    /// Rating learning rate for the defending clan.
    pub defender_k: u16,
    /// Rating assigned to a clan the first time it is touched.
    pub initial_rating: u16,
    /// Flat part of the attack prepayment.
    pub base_attack_cost: Amount,
    /// Work units a randomness fulfillment is expected to consume.
    pub expected_work_units: Amount,
    /// Skills contested in a vault battle, in order.
    pub battle_skills: Vec<Skill>,
}

impl VaultConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of pending lock slots per clan ledger.
    pub const MAX_LOCK_SLOTS: usize = 5;
    /// Maximum number of assigned vault combatants per clan.
    pub const MAX_COMBATANTS: usize = 20;
    /// Upper bound on dice rolls for one side in one skill.
    pub const MAX_ROLLS_PER_SIDE: u16 = 16;
    /// Random words the engine requests for every battle.
    pub const RANDOM_WORDS_PER_BATTLE: u32 = 2;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ATTACK_COOLDOWN: u64 = 4 * HOUR;
    pub const DEFAULT_SAME_CLAN_ATTACK_COOLDOWN: u64 = DAY;
    pub const DEFAULT_COMBATANT_CHANGE_COOLDOWN: u64 = DAY;
    pub const DEFAULT_BLOCK_ATTACKS_COOLDOWN: u64 = DAY;
    pub const DEFAULT_LOCK_DURATION: u64 = 7 * DAY;
    pub const DEFAULT_BATTLE_LOCK_DURATION: u64 = 7 * DAY;
    pub const DEFAULT_TRANSFER_PERCENT: u8 = 10;
    pub const DEFAULT_ROLL_LEVEL_STEP: u16 = 20;
    pub const DEFAULT_ATTACKER_K: u16 = 32;
    pub const DEFAULT_DEFENDER_K: u16 = 16;
    pub const DEFAULT_INITIAL_RATING: u16 = 1000;
    pub const DEFAULT_BASE_ATTACK_COST: Amount = 10_000;
    pub const DEFAULT_EXPECTED_WORK_UNITS: Amount = 3_000_000;

    pub fn new() -> Self {
        Self {
            attack_cooldown: Self::DEFAULT_ATTACK_COOLDOWN,
            same_clan_attack_cooldown: Self::DEFAULT_SAME_CLAN_ATTACK_COOLDOWN,
            combatant_change_cooldown: Self::DEFAULT_COMBATANT_CHANGE_COOLDOWN,
            block_attacks_cooldown: Self::DEFAULT_BLOCK_ATTACKS_COOLDOWN,
            lock_duration: Self::DEFAULT_LOCK_DURATION,
            battle_lock_duration: Self::DEFAULT_BATTLE_LOCK_DURATION,
            transfer_percent: Self::DEFAULT_TRANSFER_PERCENT,
            roll_level_step: Self::DEFAULT_ROLL_LEVEL_STEP,
            attacker_k: Self::DEFAULT_ATTACKER_K,
            defender_k: Self::DEFAULT_DEFENDER_K,
            initial_rating: Self::DEFAULT_INITIAL_RATING,
            base_attack_cost: Self::DEFAULT_BASE_ATTACK_COST,
            expected_work_units: Self::DEFAULT_EXPECTED_WORK_UNITS,
            battle_skills: vec![
                Skill::Melee,
                Skill::Ranged,
                Skill::Magic,
                Skill::Defence,
                Skill::Health,
            ],
        }
    }

    /// Percentages above 100 are treated as 100.
    pub fn transfer_percent(&self) -> u8 {
        self.transfer_percent.min(100)
    }

    /// A zero step would divide by zero; it is read as one level per roll.
    pub fn roll_level_step(&self) -> u16 {
        self.roll_level_step.max(1)
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self::new()
    }
}
