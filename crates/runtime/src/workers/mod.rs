//! Worker tasks that back the runtime orchestration.
//!
//! The contest worker executes every vault command; the randomness worker is
//! only spawned when a randomness provider is configured.

mod contest;
mod randomness;

pub use contest::{Command, ContestServices, ContestWorker};
pub use randomness::RandomnessWorker;
