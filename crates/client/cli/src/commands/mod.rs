//! Subcommand implementations.

mod duel;
mod inspect;
mod simulate;

pub use duel::Duel;
pub use inspect::Inspect;
pub use simulate::Simulate;

use std::path::Path;

use anyhow::{Context, Result};
use vault_runtime::Scenario;

const DEMO_SCENARIO: &str = include_str!("../../scenarios/demo.json");

/// Loads `path`, or the bundled demo scenario when no path is given.
fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    match path {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("Failed to load scenario: {}", path.display())),
        None => Scenario::from_json(DEMO_SCENARIO).context("Bundled demo scenario is invalid"),
    }
}
