//! Deterministic rules for clan vault contestation.
//!
//! `vault-core` holds the battle resolver, the rating adjuster, the per-clan
//! lock ledger, the attack fee estimator and the [`engine::VaultEngine`] state
//! machine that ties them together. It performs no I/O and never reads a
//! clock; collaborators are reached through the oracle traits in [`env`].
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod fee;
pub mod ledger;
pub mod rating;
pub mod state;

pub use combat::{
    BattleOutcome, BattleSetup, Decision, DuelOutcome, DuelSetup, ResolveError, SkillResult,
    SkillRound, resolve, resolve_duel,
};
pub use config::VaultConfig;
pub use engine::{
    AttackRequest, AttackRequested, AttacksBlocked, BattleResolved, ClanDissolved,
    CombatantAssignment, CombatantRemoved, CombatantsAssigned, ContestError, FundsClaimed,
    FundsLocked, RatingChange, VaultEngine,
};
pub use env::{
    ClanOracle, Env, ItemEffect, ItemOracle, OracleError, PlayerOracle, RandomWord,
    RandomnessOracle, RandomnessRequest, RoleOracle, VaultEnv,
};
pub use error::{ErrorSeverity, GameError};
pub use fee::AttackFeeEstimator;
pub use ledger::{LedgerError, LockLedger, LockPlacement, LockSlot, SubLock};
pub use rating::adjust_ratings;
pub use state::{
    AccountId, Amount, ClanId, ClanVaultState, ItemId, PendingAttack, PlayerId, RequestId, Roster,
    Skill, Timestamp, VaultState,
};
