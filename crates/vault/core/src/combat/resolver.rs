//! Roster-vs-roster battle resolution.

use super::dice::{BitStream, roll_count};
use super::result::{BattleOutcome, Decision, SkillResult, SkillRound};
use super::shuffle::pad_and_shuffle;
use crate::config::VaultConfig;
use crate::env::{PlayerOracle, RandomWord, mix_seed};
use crate::error::{ErrorSeverity, GameError};
use crate::state::{PlayerId, Skill};

const SIDE_A_SEED_DOMAIN: u32 = 0xa;
const SIDE_B_SEED_DOMAIN: u32 = 0xb;

/// Minimum number of random words a dice battle needs (one per side).
pub const MIN_RANDOM_WORDS: usize = 2;

/// Errors raised while resolving a battle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolveError {
    #[error("battle needs at least {required} random words, got {supplied}")]
    NotEnoughRandomWords { required: usize, supplied: usize },
}

impl GameError for ResolveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotEnoughRandomWords { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotEnoughRandomWords { .. } => "COMBAT_NOT_ENOUGH_RANDOM_WORDS",
        }
    }
}

/// Inputs of one battle. Side A is the aggressor.
#[derive(Clone, Copy, Debug)]
pub struct BattleSetup<'a> {
    pub roster_a: &'a [PlayerId],
    pub roster_b: &'a [PlayerId],
    pub skills: &'a [Skill],
    pub random_words: &'a [RandomWord],
    pub extra_rolls_a: u8,
    pub extra_rolls_b: u8,
    pub roll_level_step: u16,
}

impl<'a> BattleSetup<'a> {
    /// Setup with no bonus rolls and the default level step.
    pub fn new(
        roster_a: &'a [PlayerId],
        roster_b: &'a [PlayerId],
        skills: &'a [Skill],
        random_words: &'a [RandomWord],
    ) -> Self {
        Self {
            roster_a,
            roster_b,
            skills,
            random_words,
            extra_rolls_a: 0,
            extra_rolls_b: 0,
            roll_level_step: VaultConfig::DEFAULT_ROLL_LEVEL_STEP,
        }
    }

    pub fn with_extra_rolls(mut self, extra_rolls_a: u8, extra_rolls_b: u8) -> Self {
        self.extra_rolls_a = extra_rolls_a;
        self.extra_rolls_b = extra_rolls_b;
        self
    }

    pub fn with_roll_level_step(mut self, roll_level_step: u16) -> Self {
        self.roll_level_step = roll_level_step;
        self
    }
}

/// Resolves a battle between two rosters.
///
/// 1. An empty roster loses by walkover without touching the random words;
///    when both are empty side A wins.
/// 2. Both rosters are padded to the longer length and shuffled, seeded from
///    `random_words[0]` (A) and `random_words[1]` (B).
/// 3. Skill `k` is fought by the members at position `k % len`. Each gets
///    [`roll_count`] rolls (zero for [`PlayerId::NONE`]); every roll reads one
///    bit of that side's [`BitStream`] and a set bit is a hit.
/// 4. More hits wins the skill. Side A wins the battle only with a strict
///    majority of skills.
///
/// # Errors
///
/// `NotEnoughRandomWords` if dice are needed and fewer than two words were supplied.
pub fn resolve<L>(setup: &BattleSetup<'_>, levels: &L) -> Result<BattleOutcome, ResolveError>
where
    L: PlayerOracle + ?Sized,
{
    if setup.roster_a.is_empty() || setup.roster_b.is_empty() {
        return Ok(walkover(setup));
    }

    if setup.random_words.len() < MIN_RANDOM_WORDS {
        return Err(ResolveError::NotEnoughRandomWords {
            required: MIN_RANDOM_WORDS,
            supplied: setup.random_words.len(),
        });
    }

    let len = setup.roster_a.len().max(setup.roster_b.len());
    let seed_a = mix_seed(setup.random_words[0], SIDE_A_SEED_DOMAIN, 0);
    let seed_b = mix_seed(setup.random_words[1], SIDE_B_SEED_DOMAIN, 0);
    let shuffled_a = pad_and_shuffle(setup.roster_a, len, seed_a);
    let shuffled_b = pad_and_shuffle(setup.roster_b, len, seed_b);

    let mut stream_a = BitStream::new(setup.random_words, 0);
    let mut stream_b = BitStream::new(setup.random_words, 1);

    let rounds: Vec<SkillRound> = setup
        .skills
        .iter()
        .enumerate()
        .map(|(k, &skill)| {
            let fighter_a = shuffled_a[k % len];
            let fighter_b = shuffled_b[k % len];
            let rolls_a = fighter_rolls(fighter_a, skill, setup.extra_rolls_a, setup, levels);
            let rolls_b = fighter_rolls(fighter_b, skill, setup.extra_rolls_b, setup, levels);
            let hits_a = stream_a.hits(rolls_a);
            let hits_b = stream_b.hits(rolls_b);
            SkillRound {
                skill,
                fighter_a,
                fighter_b,
                rolls_a,
                rolls_b,
                hits_a,
                hits_b,
                result: compare(hits_a, hits_b),
            }
        })
        .collect();

    let wins = rounds
        .iter()
        .filter(|round| round.result == SkillResult::Win)
        .count();
    let did_a_win = wins * 2 > setup.skills.len();

    Ok(BattleOutcome {
        rounds,
        did_a_win,
        decision: Decision::Dice,
        shuffled_a,
        shuffled_b,
    })
}

fn walkover(setup: &BattleSetup<'_>) -> BattleOutcome {
    let did_a_win = !setup.roster_a.is_empty() || setup.roster_b.is_empty();
    let result = if did_a_win {
        SkillResult::Win
    } else {
        SkillResult::Lose
    };
    let first = |roster: &[PlayerId]| roster.first().copied().unwrap_or(PlayerId::NONE);

    BattleOutcome {
        rounds: setup
            .skills
            .iter()
            .map(|&skill| SkillRound {
                skill,
                fighter_a: first(setup.roster_a),
                fighter_b: first(setup.roster_b),
                rolls_a: 0,
                rolls_b: 0,
                hits_a: 0,
                hits_b: 0,
                result,
            })
            .collect(),
        did_a_win,
        decision: Decision::Walkover,
        shuffled_a: setup.roster_a.to_vec(),
        shuffled_b: setup.roster_b.to_vec(),
    }
}

fn fighter_rolls<L>(
    fighter: PlayerId,
    skill: Skill,
    extra_rolls: u8,
    setup: &BattleSetup<'_>,
    levels: &L,
) -> u16
where
    L: PlayerOracle + ?Sized,
{
    if fighter.is_none() {
        return 0;
    }
    let level = levels.effective_level(fighter, skill);
    roll_count(level, setup.roll_level_step, extra_rolls)
}

fn compare(hits_a: u16, hits_b: u16) -> SkillResult {
    match hits_a.cmp(&hits_b) {
        std::cmp::Ordering::Greater => SkillResult::Win,
        std::cmp::Ordering::Less => SkillResult::Lose,
        std::cmp::Ordering::Equal => SkillResult::Draw,
    }
}
