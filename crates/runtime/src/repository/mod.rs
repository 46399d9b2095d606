//! Repository layer for the mutable vault state.
//!
//! Registry data (players, clans, items) lives in oracles; repositories only
//! hold what the engine itself changes.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileStateRepository;
pub use memory::InMemoryStateRepo;
pub use traits::StateRepository;
