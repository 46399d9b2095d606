//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the vault system.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::info;
use vault_core::VaultState;

use crate::api::{
    FundsCustody, InMemoryCustody, RandomnessProvider, Result, RuntimeError, RuntimeHandle,
};
use crate::clock::{Clock, SystemClock};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, Topic};
use crate::oracle::{OracleManager, RandomnessBridge};
use crate::repository::{FileStateRepository, InMemoryStateRepo, StateRepository};
use crate::workers::{Command, ContestServices, ContestWorker, RandomnessWorker};

/// Main runtime that orchestrates the vault workers
///
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    oracles: OracleManager,

    contest_worker_handle: JoinHandle<()>,
    randomness_worker: Option<(JoinHandle<()>, oneshot::Sender<()>)>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Registries the runtime reads; edits are visible to the next command.
    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Waits for the contest worker to drain its queue, which only happens
    /// once every [`RuntimeHandle`] clone has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        if let Some((worker, stop)) = self.randomness_worker {
            let _ = stop.send(());
            worker.await.map_err(RuntimeError::WorkerJoin)?;
        }

        drop(self.handle);

        self.contest_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        info!(target: "runtime", "Runtime shut down");
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    state: Option<VaultState>,
    oracles: Option<OracleManager>,
    clock: Option<Arc<dyn Clock>>,
    custody: Option<Arc<dyn FundsCustody>>,
    repository: Option<Arc<dyn StateRepository>>,
    randomness_provider: Option<Arc<dyn RandomnessProvider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            state: None,
            oracles: None,
            clock: None,
            custody: None,
            repository: None,
            randomness_provider: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Start from this state instead of the newest stored snapshot.
    pub fn initial_state(mut self, state: VaultState) -> Self {
        self.state = Some(state);
        self
    }

    /// Set required oracle manager
    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Time source (default: [`SystemClock`])
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Funds custody (default: [`InMemoryCustody`])
    pub fn custody(mut self, custody: Arc<dyn FundsCustody>) -> Self {
        self.custody = Some(custody);
        self
    }

    /// State repository (default: file repository under
    /// `config.state_dir`, or in-memory when unset)
    pub fn repository(mut self, repository: Arc<dyn StateRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Answer randomness requests automatically.
    ///
    /// Without a provider, requests are only announced on
    /// [`Topic::Randomness`] and must be fulfilled through
    /// [`RuntimeHandle::fulfill_randomness`].
    pub fn randomness_provider(mut self, provider: impl RandomnessProvider + 'static) -> Self {
        self.randomness_provider = Some(Arc::new(provider));
        self
    }

    /// Build the runtime
    pub async fn build(self) -> Result<Runtime> {
        let oracles = self.oracles.ok_or(RuntimeError::MissingOracles)?;

        let repository: Arc<dyn StateRepository> = match (self.repository, &self.config.state_dir) {
            (Some(repository), _) => repository,
            (None, Some(dir)) => Arc::new(FileStateRepository::new(dir)?),
            (None, None) => Arc::new(InMemoryStateRepo::new()),
        };

        let (revision, initial_state) = match self.state {
            Some(state) => (0, state),
            None => match repository.load_latest()? {
                Some((revision, state)) => {
                    info!(target: "runtime", revision, "Restored vault state");
                    (revision, state)
                }
                None => (0, VaultState::new()),
            },
        };

        let last_request_id = initial_state.last_request_id().0;

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let (bridge, randomness_worker) = match self.randomness_provider {
            Some(provider) => {
                let (ticket_tx, ticket_rx) = mpsc::unbounded_channel();
                let (stop_tx, stop_rx) = oneshot::channel();
                let worker = RandomnessWorker::new(provider, ticket_rx, handle.clone(), stop_rx);
                let worker_handle = tokio::spawn(async move {
                    worker.run().await;
                });
                (
                    RandomnessBridge::with_outbox(last_request_id, ticket_tx),
                    Some((worker_handle, stop_tx)),
                )
            }
            None => (RandomnessBridge::detached(last_request_id), None),
        };

        let services = ContestServices {
            oracles: oracles.clone(),
            randomness: Arc::new(bridge),
            custody: self
                .custody
                .unwrap_or_else(|| Arc::new(InMemoryCustody::new())),
            repository,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        };

        let contest_worker = ContestWorker::new(
            initial_state,
            revision,
            self.config.vault,
            self.config.snapshot_retention,
            services,
            command_rx,
            event_bus,
        );

        let contest_worker_handle = tokio::spawn(async move {
            contest_worker.run().await;
        });

        Ok(Runtime {
            handle,
            oracles,
            contest_worker_handle,
            randomness_worker,
        })
    }
}
