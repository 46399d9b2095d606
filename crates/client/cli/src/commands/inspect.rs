//! Read and inspect vault snapshots written by the file repository.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use vault_core::{VaultConfig, VaultState};
use vault_runtime::{FileStateRepository, RuntimeConfig, StateRepository};

/// Inspect a stored vault snapshot
#[derive(Parser)]
pub struct Inspect {
    /// Snapshot directory (default: VAULT_STATE_DIR, then the platform data directory)
    #[arg(short, long, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    /// Revision to read (default: newest)
    #[arg(short, long, value_name = "REVISION")]
    revision: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Clans, locks and pending attacks
    Summary,
    /// Full JSON output
    Json,
}

impl Inspect {
    pub fn execute(self) -> Result<()> {
        let dir = self
            .state_dir
            .or_else(|| RuntimeConfig::from_env().state_dir)
            .or_else(RuntimeConfig::default_state_dir)
            .context("No state directory configured")?;
        let repository = FileStateRepository::new(&dir)
            .with_context(|| format!("Failed to open state directory: {}", dir.display()))?;

        let (revision, state) = match self.revision {
            Some(revision) => {
                let state = repository.load(revision)?.with_context(|| {
                    format!("Revision {revision} not found in {}", dir.display())
                })?;
                (revision, state)
            }
            None => repository
                .load_latest()?
                .with_context(|| format!("No snapshots found in {}", dir.display()))?,
        };

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state)?),
            OutputFormat::Summary => {
                let revisions = repository.list_revisions()?;
                print_summary(&dir, revision, &revisions, &state);
            }
        }
        Ok(())
    }
}

fn print_summary(dir: &std::path::Path, revision: u64, revisions: &[u64], state: &VaultState) {
    println!("Snapshot: {} (revision {revision})", dir.display());
    println!("Stored revisions: {revisions:?}");
    println!("State root: {}", hex::encode(state.state_root()));
    println!(
        "Fee samples: {:?} (average {})",
        state.fee.samples(),
        state.fee.average()
    );

    println!("Clans:");
    for (clan, record) in state.clans() {
        println!(
            "  {clan}: rating {}, locked {}, slots {}/{}, combatants {}",
            record.rating,
            record.ledger.total_locked(),
            record.ledger.pending_len(),
            VaultConfig::MAX_LOCK_SLOTS,
            record.live_combatants().count()
        );
        for (n, slot) in record.ledger.pending() {
            for lock in slot.sub_locks() {
                println!("    lock #{n}: {} until {}", lock.amount, lock.maturity);
            }
        }
        if record.attack_cooldown_until > 0 {
            println!("    attack cooldown until {}", record.attack_cooldown_until);
        }
        if record.blocking_attacks_until > 0 {
            println!("    blocking attacks until {}", record.blocking_attacks_until);
        }
    }

    println!("Pending attacks:");
    for attack in state.pending_attacks() {
        println!(
            "  {}: {} -> {}, {} fighters, prepaid {}, requested at {}",
            attack.request_id,
            attack.attacker,
            attack.defender,
            attack.attacker_players.iter().filter(|p| !p.is_none()).count(),
            attack.prepayment,
            attack.requested_at
        );
    }
}
