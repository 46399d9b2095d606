//! Battle resolution.
//!
//! Pure functions that turn two rosters, their skill levels and delivered
//! random words into a per-skill verdict. All logic is deterministic and
//! side-effect free, so a battle can be replayed from its inputs.
//!
//! # Core Functions
//!
//! - `resolve`: full battle (walkover check, shuffle, dice, verdict)
//! - `resolve_duel`: one player per side plus a rating update
//! - `roll_count`: dice rolls a fighter gets for a skill

mod dice;
mod duel;
mod resolver;
mod result;
mod shuffle;

pub use dice::{BitStream, roll_count};
pub use duel::{DuelOutcome, DuelSetup, resolve_duel};
pub use resolver::{BattleSetup, ResolveError, resolve};
pub use result::{BattleOutcome, Decision, SkillResult, SkillRound};
pub use shuffle::pad_and_shuffle;
