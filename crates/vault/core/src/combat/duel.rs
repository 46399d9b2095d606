//! Player-vs-player duels.

use super::resolver::{BattleSetup, ResolveError, resolve};
use super::result::BattleOutcome;
use crate::env::{PlayerOracle, RandomWord};
use crate::rating::adjust_ratings;
use crate::state::{PlayerId, Skill};

/// One player per side, each with a current rating and learning rate.
#[derive(Clone, Copy, Debug)]
pub struct DuelSetup<'a> {
    pub challenger: PlayerId,
    pub opponent: PlayerId,
    pub challenger_rating: u16,
    pub opponent_rating: u16,
    pub challenger_k: u16,
    pub opponent_k: u16,
    pub skills: &'a [Skill],
    pub random_words: &'a [RandomWord],
    pub extra_rolls_challenger: u8,
    pub extra_rolls_opponent: u8,
    pub roll_level_step: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuelOutcome {
    pub battle: BattleOutcome,
    pub challenger_won: bool,
    pub challenger_rating: u16,
    pub opponent_rating: u16,
}

/// Resolves a duel and applies the rating update to both players.
pub fn resolve_duel<L>(setup: &DuelSetup<'_>, levels: &L) -> Result<DuelOutcome, ResolveError>
where
    L: PlayerOracle + ?Sized,
{
    let roster_a = [setup.challenger];
    let roster_b = [setup.opponent];
    let battle = resolve(
        &BattleSetup {
            roster_a: &roster_a,
            roster_b: &roster_b,
            skills: setup.skills,
            random_words: setup.random_words,
            extra_rolls_a: setup.extra_rolls_challenger,
            extra_rolls_b: setup.extra_rolls_opponent,
            roll_level_step: setup.roll_level_step,
        },
        levels,
    )?;

    let (challenger_rating, opponent_rating) = adjust_ratings(
        setup.challenger_k,
        setup.opponent_k,
        setup.challenger_rating,
        setup.opponent_rating,
        battle.did_a_win,
    );

    Ok(DuelOutcome {
        challenger_won: battle.did_a_win,
        battle,
        challenger_rating,
        opponent_rating,
    })
}
