//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, the engine, custody, randomness
//! providers and repositories so clients can bubble them up with consistent
//! context.
use thiserror::Error;
use tokio::sync::oneshot;
use vault_core::{ContestError, GameError, RequestId};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("contest worker command channel closed")]
    CommandChannelClosed,

    #[error("contest worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Contest(#[from] ContestError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("funds custody refused to {operation}: {reason}")]
    Custody {
        operation: &'static str,
        reason: String,
    },

    #[error("randomness provider failed for {request_id:?}: {reason}")]
    RandomnessProvider {
        request_id: RequestId,
        reason: String,
    },

    #[error("runtime requires oracles to be configured before building")]
    MissingOracles,

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}

impl RuntimeError {
    /// Stable code for logs and rejection events.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Contest(error) => error.error_code(),
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::Repository(_) => "RUNTIME_REPOSITORY",
            Self::Custody { .. } => "RUNTIME_CUSTODY",
            Self::RandomnessProvider { .. } => "RUNTIME_RANDOMNESS_PROVIDER",
            Self::MissingOracles => "RUNTIME_MISSING_ORACLES",
            Self::InvalidScenario(_) => "RUNTIME_INVALID_SCENARIO",
        }
    }

    /// The engine error, when the command was rejected by the rules.
    pub fn as_contest(&self) -> Option<&ContestError> {
        match self {
            Self::Contest(error) => Some(error),
            _ => None,
        }
    }
}
