//! One-on-one duel between two scenario players.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use vault_core::env::{PcgRng, mix_seed};
use vault_core::{DuelSetup, PlayerId, RandomWord, VaultConfig, resolve_duel};
use vault_runtime::{PlayerRegistry, RuntimeConfig};

use super::load_scenario;

const DUEL_WORD_DOMAIN: u32 = 0xd0e1;

/// Resolve a duel between two players
#[derive(Parser)]
pub struct Duel {
    /// Challenger player id
    #[arg(value_name = "CHALLENGER")]
    challenger: u64,

    /// Opponent player id
    #[arg(value_name = "OPPONENT")]
    opponent: u64,

    /// Scenario file (defaults to the bundled demo)
    #[arg(short, long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Seed for the duel's random words
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Challenger rating before the duel (default: initial rating)
    #[arg(long)]
    challenger_rating: Option<u16>,

    /// Opponent rating before the duel (default: initial rating)
    #[arg(long)]
    opponent_rating: Option<u16>,

    /// Extra dice rolls granted to the challenger
    #[arg(long, default_value_t = 0)]
    extra_rolls: u8,
}

impl Duel {
    pub fn execute(self) -> Result<()> {
        let scenario = load_scenario(self.scenario.as_deref())?;
        for id in [self.challenger, self.opponent] {
            if scenario.player(PlayerId(id)).is_none() {
                bail!("Player {id} is not part of the scenario");
            }
        }

        let config = RuntimeConfig::from_env().vault;
        let oracles = scenario.build_oracles();
        let players: &PlayerRegistry = oracles.players();
        let words = duel_words(self.seed);

        let setup = DuelSetup {
            challenger: PlayerId(self.challenger),
            opponent: PlayerId(self.opponent),
            challenger_rating: self.challenger_rating.unwrap_or(config.initial_rating),
            opponent_rating: self.opponent_rating.unwrap_or(config.initial_rating),
            challenger_k: config.attacker_k,
            opponent_k: config.defender_k,
            skills: &config.battle_skills,
            random_words: &words,
            extra_rolls_challenger: self.extra_rolls,
            extra_rolls_opponent: 0,
            roll_level_step: config.roll_level_step(),
        };
        let outcome = resolve_duel(&setup, players)?;

        println!("{} vs {}", setup.challenger, setup.opponent);
        for round in &outcome.battle.rounds {
            println!(
                "  {:<8} {:>2}/{:<2} vs {:>2}/{:<2}  {:?}",
                round.skill.to_string(),
                round.hits_a,
                round.rolls_a,
                round.hits_b,
                round.rolls_b,
                round.result
            );
        }
        println!(
            "{} {} ({}W/{}L/{}D)",
            setup.challenger,
            if outcome.challenger_won { "wins" } else { "loses" },
            outcome.battle.wins(),
            outcome.battle.losses(),
            outcome.battle.draws()
        );
        println!(
            "Ratings: {} -> {}, {} -> {}",
            setup.challenger_rating,
            outcome.challenger_rating,
            setup.opponent_rating,
            outcome.opponent_rating
        );
        Ok(())
    }
}

fn duel_words(seed: u64) -> Vec<RandomWord> {
    (0..u64::from(VaultConfig::RANDOM_WORDS_PER_BATTLE))
        .map(|index| PcgRng::next_u64(mix_seed(seed, DUEL_WORD_DOMAIN, index)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duel_words_depend_only_on_seed() {
        assert_eq!(duel_words(3), duel_words(3));
        assert_ne!(duel_words(3), duel_words(4));
        assert_eq!(
            duel_words(3).len(),
            VaultConfig::RANDOM_WORDS_PER_BATTLE as usize
        );
    }
}
