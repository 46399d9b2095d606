//! Battle verdict types.

use crate::state::{PlayerId, Skill};

/// Verdict for one skill, from side A's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillResult {
    Win,
    Lose,
    Draw,
}

impl SkillResult {
    /// The same verdict seen from side B.
    pub const fn flipped(self) -> Self {
        match self {
            Self::Win => Self::Lose,
            Self::Lose => Self::Win,
            Self::Draw => Self::Draw,
        }
    }
}

/// How the overall verdict was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Decision {
    /// One or both rosters were empty; no randomness was consumed.
    Walkover,
    /// Dice were rolled for every skill.
    Dice,
}

/// Detailed record of one contested skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillRound {
    pub skill: Skill,
    pub fighter_a: PlayerId,
    pub fighter_b: PlayerId,
    pub rolls_a: u16,
    pub rolls_b: u16,
    pub hits_a: u16,
    pub hits_b: u16,
    pub result: SkillResult,
}

/// Complete battle result.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleOutcome {
    pub rounds: Vec<SkillRound>,
    pub did_a_win: bool,
    pub decision: Decision,
    /// Side A after padding and shuffling (unchanged for a walkover).
    pub shuffled_a: Vec<PlayerId>,
    /// Side B after padding and shuffling (unchanged for a walkover).
    pub shuffled_b: Vec<PlayerId>,
}

impl BattleOutcome {
    pub fn skill_results(&self) -> Vec<SkillResult> {
        self.rounds.iter().map(|round| round.result).collect()
    }

    pub fn wins(&self) -> usize {
        self.count(SkillResult::Win)
    }

    pub fn losses(&self) -> usize {
        self.count(SkillResult::Lose)
    }

    pub fn draws(&self) -> usize {
        self.count(SkillResult::Draw)
    }

    fn count(&self, result: SkillResult) -> usize {
        self.rounds
            .iter()
            .filter(|round| round.result == result)
            .count()
    }
}
