//! Common error infrastructure for vault-core.
//!
//! Domain-specific errors (`ResolveError`, `LedgerError`, `ContestError`,
//! `OracleError`) live next to the code that raises them. This module holds
//! the shared classification so the runtime can treat them uniformly.
//!
//! # Design Principles
//!
//! - **Distinct reasons**: every failure is its own variant, never a catch-all
//! - **Stable codes**: `error_code()` returns an upper-snake identifier that
//!   front-ends and tests can branch on
//! - **Severity Classification**: errors are categorized for recovery strategies

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same request may succeed later (cooldowns, maturity)
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: protocol violations that abort only the offending call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Retry after time passes or state changes.
    ///
    /// Examples: cooldown not elapsed, nothing matured yet
    Recoverable,

    /// Invalid input, should not retry without changes.
    ///
    /// Examples: attacking own clan, unknown item
    Validation,

    /// Internal error - unexpected state inconsistency.
    Internal,

    /// Fatal to the call - e.g. a randomness callback for an unknown request.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug or protocol violation.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all vault-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_predicates() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert!(ErrorSeverity::Internal.is_internal());
        assert_eq!(ErrorSeverity::Validation.as_str(), "validation");
    }
}
