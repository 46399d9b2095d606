//! Async orchestration for the vault contestation engine.
//!
//! The runtime owns the authoritative [`vault_core::VaultState`] inside a
//! single worker task, wires oracles, randomness delivery, funds custody and
//! persistence around it, and exposes [`RuntimeHandle`] for clients.
pub mod api;
pub mod clock;
pub mod config;
pub mod events;
pub mod oracle;
pub mod repository;
pub mod runtime;
pub mod scenario;
pub mod workers;

pub use api::{
    CustodyReason, EntropyRandomness, Fulfillment, FundsCustody, InMemoryCustody,
    RandomnessProvider, Result, RuntimeError, RuntimeHandle, SeededRandomness,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RuntimeConfig;
pub use events::{BattleEvent, Event, EventBus, RandomnessEvent, Topic, VaultEvent};
pub use oracle::{
    ClanRegistry, ItemCatalog, OracleManager, PlayerRecord, PlayerRegistry, RandomnessBridge,
    RandomnessTicket, RoleRegistry,
};
pub use repository::{FileStateRepository, InMemoryStateRepo, RepositoryError, StateRepository};
pub use runtime::{Runtime, RuntimeBuilder};
pub use scenario::Scenario;
