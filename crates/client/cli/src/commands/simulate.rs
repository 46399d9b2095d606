//! Replays a scenario through a live runtime.
//!
//! Every round each clan attacks the next clan in scenario order. Randomness
//! comes from a seeded provider, so a given scenario and seed always produce
//! the same battles. Time is simulated: the clock jumps past every cooldown
//! between rounds and past the lock durations before the final claims.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use vault_core::{AttackRequest, BattleResolved, RequestId};
use vault_runtime::{
    BattleEvent, Clock, Event, InMemoryCustody, ManualClock, Runtime, RuntimeConfig,
    SeededRandomness, SystemClock, Topic,
};

use super::load_scenario;

/// Replay a scenario through the runtime
#[derive(Parser)]
pub struct Simulate {
    /// Scenario file (defaults to the bundled demo)
    #[arg(short, long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Seed for the randomness provider
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of attack rounds
    #[arg(short, long, default_value_t = 3)]
    rounds: u32,

    /// Unit cost reported with every fulfillment
    #[arg(long, default_value_t = 1_000)]
    unit_cost: u64,

    /// Persist snapshots in this directory instead of memory
    #[arg(long, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    /// Print resolved battles as JSON lines
    #[arg(long)]
    json: bool,
}

impl Simulate {
    pub async fn execute(self) -> Result<()> {
        let scenario = load_scenario(self.scenario.as_deref())?;
        if scenario.clans.len() < 2 {
            bail!("A simulation needs at least two clans");
        }

        let mut config = RuntimeConfig::from_env();
        if self.state_dir.is_some() {
            config.state_dir = self.state_dir.clone();
        }
        let vault = config.vault.clone();

        let clock = Arc::new(ManualClock::new(SystemClock.now()));
        let custody = Arc::new(InMemoryCustody::new());
        let runtime = Runtime::builder()
            .config(config)
            .oracles(scenario.build_oracles())
            .clock(clock.clone())
            .custody(custody.clone())
            .randomness_provider(SeededRandomness::new(self.seed, u128::from(self.unit_cost)))
            .build()
            .await
            .context("Failed to start runtime")?;
        let handle = runtime.handle();
        let mut battles = handle.subscribe(Topic::Battle);

        scenario
            .seed(&handle)
            .await
            .context("Failed to seed scenario")?;
        info!(
            clans = scenario.clans.len(),
            rounds = self.rounds,
            seed = self.seed,
            "Simulation started"
        );

        let round_gap = vault.attack_cooldown.max(vault.same_clan_attack_cooldown) + 1;
        for round in 1..=self.rounds {
            println!("Round {round}");
            for (index, clan) in scenario.clans.iter().enumerate() {
                let target = &scenario.clans[(index + 1) % scenario.clans.len()];
                let Some(leader) = clan.leader_spec() else {
                    continue;
                };

                let request = AttackRequest {
                    caller: leader.account(),
                    leader: leader.player(),
                    attacker: clan.clan(),
                    defender: target.clan(),
                    item: None,
                    payment: handle.attack_cost().await?,
                };
                match handle.attack_vaults(request).await {
                    Ok(requested) => {
                        let resolved = wait_for_battle(&mut battles, requested.request_id).await?;
                        self.report(&resolved)?;
                    }
                    Err(error) => println!(
                        "  {} -> {}: skipped ({})",
                        clan.clan(),
                        target.clan(),
                        error.error_code()
                    ),
                }
            }
            clock.advance(round_gap);
        }

        println!("Standings");
        for clan in &scenario.clans {
            let record = handle.query_clan(clan.clan()).await?;
            println!(
                "  {}: rating {}, locked {}, custody {}",
                clan.clan(),
                record.rating,
                record.ledger.total_locked(),
                custody.vault_balance(clan.clan())
            );
        }
        println!("Fees collected: {}", custody.fees_collected());
        println!("Next attack cost: {}", handle.attack_cost().await?);

        clock.advance(vault.lock_duration.max(vault.battle_lock_duration));
        println!("Claims");
        for clan in &scenario.clans {
            let Some(leader) = clan.leader_spec() else {
                continue;
            };
            match handle
                .claim_funds(clan.clan(), leader.player(), leader.account())
                .await
            {
                Ok(claimed) => println!(
                    "  {}: {} paid to {}",
                    clan.clan(),
                    claimed.amount,
                    claimed.player
                ),
                Err(error) => println!("  {}: {}", clan.clan(), error.error_code()),
            }
        }

        drop(handle);
        runtime.shutdown().await?;
        Ok(())
    }

    fn report(&self, resolved: &BattleResolved) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(resolved)?);
            return Ok(());
        }

        let battle = &resolved.battle;
        println!(
            "  {} -> {}: {} ({}W/{}L/{}D, {:?}), seized {}, rating {} -> {}",
            resolved.attacker,
            resolved.defender,
            if resolved.attacker_won { "won" } else { "lost" },
            battle.wins(),
            battle.losses(),
            battle.draws(),
            battle.decision,
            resolved.transferred,
            resolved.attacker_rating.before,
            resolved.attacker_rating.after,
        );
        Ok(())
    }
}

/// Waits until the provider's answer for `request_id` has been applied.
async fn wait_for_battle(
    battles: &mut broadcast::Receiver<Event>,
    request_id: RequestId,
) -> Result<Box<BattleResolved>> {
    let wait = async {
        loop {
            match battles.recv().await {
                Ok(Event::Battle(BattleEvent::BattleResolved { outcome, .. }))
                    if outcome.request_id == request_id =>
                {
                    return Ok(outcome);
                }
                Ok(Event::Battle(BattleEvent::FulfillmentRejected {
                    request_id: rejected,
                    code,
                    ..
                })) if rejected == request_id => {
                    bail!("Fulfillment of {request_id} was rejected: {code}");
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Battle events lagged"),
                Err(RecvError::Closed) => bail!("Event bus closed"),
            }
        }
    };

    tokio::time::timeout(Duration::from_secs(10), wait)
        .await
        .with_context(|| format!("Timed out waiting for randomness of {request_id}"))?
}
