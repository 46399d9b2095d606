use crate::error::{ErrorSeverity, GameError};

/// Errors raised by [`LockLedger`](super::LockLedger) operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LedgerError {
    #[error("cannot lock a zero amount")]
    AmountZero,

    #[error("no matured funds to claim")]
    NothingToClaim,

    #[error("all lock slots are in use")]
    MaxLockedVaultsReached,

    #[error("locked total would overflow")]
    AmountOverflow,
}

impl GameError for LedgerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AmountZero => ErrorSeverity::Validation,
            Self::NothingToClaim | Self::MaxLockedVaultsReached => ErrorSeverity::Recoverable,
            Self::AmountOverflow => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AmountZero => "LEDGER_AMOUNT_ZERO",
            Self::NothingToClaim => "LEDGER_NOTHING_TO_CLAIM",
            Self::MaxLockedVaultsReached => "LEDGER_MAX_LOCKED_VAULTS_REACHED",
            Self::AmountOverflow => "LEDGER_AMOUNT_OVERFLOW",
        }
    }
}
