//! Oracle access errors.

use crate::error::{ErrorSeverity, GameError};

/// Errors that occur when accessing oracle data.
///
/// Missing oracles are fatal: the engine cannot validate anything without
/// its collaborators.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("PlayerOracle not available")]
    PlayersNotAvailable,

    #[error("ClanOracle not available")]
    ClansNotAvailable,

    #[error("ItemOracle not available")]
    ItemsNotAvailable,

    #[error("RoleOracle not available")]
    RolesNotAvailable,

    #[error("RandomnessOracle not available")]
    RandomnessNotAvailable,

    /// The randomness source refused to accept a new request.
    #[error("randomness source rejected the request: {0}")]
    RandomnessRejected(String),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            PlayersNotAvailable | ClansNotAvailable | ItemsNotAvailable | RolesNotAvailable
            | RandomnessNotAvailable => ErrorSeverity::Fatal,
            RandomnessRejected(_) => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            PlayersNotAvailable => "ORACLE_PLAYERS_NOT_AVAILABLE",
            ClansNotAvailable => "ORACLE_CLANS_NOT_AVAILABLE",
            ItemsNotAvailable => "ORACLE_ITEMS_NOT_AVAILABLE",
            RolesNotAvailable => "ORACLE_ROLES_NOT_AVAILABLE",
            RandomnessNotAvailable => "ORACLE_RANDOMNESS_NOT_AVAILABLE",
            RandomnessRejected(_) => "ORACLE_RANDOMNESS_REJECTED",
        }
    }
}
