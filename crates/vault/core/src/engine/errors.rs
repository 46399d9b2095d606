//! Error types for vault contestation operations.

use crate::combat::ResolveError;
use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::ledger::LedgerError;
use crate::state::{AccountId, Amount, ClanId, ItemId, PlayerId, RequestId, Timestamp};

/// Every reason a [`VaultEngine`](super::VaultEngine) operation can be refused.
///
/// A returned error always means the state was left untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContestError {
    #[error("{caller} does not control an active {player}")]
    NotOwnerOfPlayerAndActive { caller: AccountId, player: PlayerId },

    #[error("{player} is not the leader of {clan}")]
    NotLeader { clan: ClanId, player: PlayerId },

    #[error("a clan cannot attack itself")]
    CannotAttackSelf,

    #[error("{clan} has no assigned combatants")]
    NoCombatants { clan: ClanId },

    #[error("{item} is not a known vault item")]
    ItemNotFound { item: ItemId },

    #[error("{player} does not own {item}")]
    ItemNotOwned { item: ItemId, player: PlayerId },

    #[error("{item} cannot be used for an attack")]
    NotAnAttackItem { item: ItemId },

    #[error("{item} does not block attacks")]
    NotABlockAttacksItem { item: ItemId },

    #[error("{clan} was fought too recently (until {until})")]
    ClanAttackingSameClanCooldown { clan: ClanId, until: Timestamp },

    #[error("clan is on attack cooldown until {until}")]
    ClanAttackingCooldown { until: Timestamp },

    #[error("{clan} is blocking attacks until {until}")]
    ClanIsBlockingAttacks { clan: ClanId, until: Timestamp },

    #[error("block attacks item is on cooldown until {until}")]
    BlockAttacksCooldown { until: Timestamp },

    #[error("combatants cannot change until {until}")]
    ClanCombatantsChangeCooldown { until: Timestamp },

    #[error("{count} combatants exceed the maximum of {max}")]
    TooManyCombatants { count: usize, max: usize },

    #[error("{player} is listed more than once")]
    PlayerCannotBeInAssignedMoreThanOnce { player: PlayerId },

    #[error("{player} is not a member of {clan}")]
    PlayerNotInClan { clan: ClanId, player: PlayerId },

    #[error("{player} is not upgraded")]
    PlayerNotUpgraded { player: PlayerId },

    #[error("{player} is already a combatant elsewhere")]
    PlayerAlreadyExistingCombatant { player: PlayerId },

    #[error("attack costs {required}, paid {supplied}")]
    InsufficientCost { required: Amount, supplied: Amount },

    #[error("randomness unavailable: {0}")]
    RandomnessUnavailable(OracleError),

    #[error("{request_id} is not a pending request")]
    RequestIdNotKnown { request_id: RequestId },

    #[error("{request_id} was already issued by the randomness source")]
    RequestIdReused { request_id: RequestId },

    #[error("battle needs {required} random words, got {supplied}")]
    NotEnoughRandomWords { required: usize, supplied: usize },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl From<ResolveError> for ContestError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::NotEnoughRandomWords { required, supplied } => {
                Self::NotEnoughRandomWords { required, supplied }
            }
        }
    }
}

impl GameError for ContestError {
    fn severity(&self) -> ErrorSeverity {
        use ContestError::*;
        match self {
            NotOwnerOfPlayerAndActive { .. }
            | NotLeader { .. }
            | CannotAttackSelf
            | NoCombatants { .. }
            | ItemNotFound { .. }
            | ItemNotOwned { .. }
            | NotAnAttackItem { .. }
            | NotABlockAttacksItem { .. }
            | TooManyCombatants { .. }
            | PlayerCannotBeInAssignedMoreThanOnce { .. }
            | PlayerNotInClan { .. }
            | PlayerNotUpgraded { .. }
            | PlayerAlreadyExistingCombatant { .. }
            | InsufficientCost { .. } => ErrorSeverity::Validation,

            ClanAttackingSameClanCooldown { .. }
            | ClanAttackingCooldown { .. }
            | ClanIsBlockingAttacks { .. }
            | BlockAttacksCooldown { .. }
            | ClanCombatantsChangeCooldown { .. } => ErrorSeverity::Recoverable,

            RandomnessUnavailable(_) => ErrorSeverity::Recoverable,
            RequestIdNotKnown { .. } | NotEnoughRandomWords { .. } => ErrorSeverity::Fatal,
            RequestIdReused { .. } => ErrorSeverity::Internal,

            Ledger(error) => error.severity(),
            Oracle(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        use ContestError::*;
        match self {
            NotOwnerOfPlayerAndActive { .. } => "CONTEST_NOT_OWNER_OF_PLAYER_AND_ACTIVE",
            NotLeader { .. } => "CONTEST_NOT_LEADER",
            CannotAttackSelf => "CONTEST_CANNOT_ATTACK_SELF",
            NoCombatants { .. } => "CONTEST_NO_COMBATANTS",
            ItemNotFound { .. } => "CONTEST_ITEM_NOT_FOUND",
            ItemNotOwned { .. } => "CONTEST_ITEM_NOT_OWNED",
            NotAnAttackItem { .. } => "CONTEST_NOT_AN_ATTACK_ITEM",
            NotABlockAttacksItem { .. } => "CONTEST_NOT_A_BLOCK_ATTACKS_ITEM",
            ClanAttackingSameClanCooldown { .. } => "CONTEST_CLAN_ATTACKING_SAME_CLAN_COOLDOWN",
            ClanAttackingCooldown { .. } => "CONTEST_CLAN_ATTACKING_COOLDOWN",
            ClanIsBlockingAttacks { .. } => "CONTEST_CLAN_IS_BLOCKING_ATTACKS",
            BlockAttacksCooldown { .. } => "CONTEST_BLOCK_ATTACKS_COOLDOWN",
            ClanCombatantsChangeCooldown { .. } => "CONTEST_CLAN_COMBATANTS_CHANGE_COOLDOWN",
            TooManyCombatants { .. } => "CONTEST_TOO_MANY_COMBATANTS",
            PlayerCannotBeInAssignedMoreThanOnce { .. } => {
                "CONTEST_PLAYER_CANNOT_BE_IN_ASSIGNED_MORE_THAN_ONCE"
            }
            PlayerNotInClan { .. } => "CONTEST_PLAYER_NOT_IN_CLAN",
            PlayerNotUpgraded { .. } => "CONTEST_PLAYER_NOT_UPGRADED",
            PlayerAlreadyExistingCombatant { .. } => "CONTEST_PLAYER_ALREADY_EXISTING_COMBATANT",
            InsufficientCost { .. } => "CONTEST_INSUFFICIENT_COST",
            RandomnessUnavailable(_) => "CONTEST_RANDOMNESS_UNAVAILABLE",
            RequestIdNotKnown { .. } => "CONTEST_REQUEST_ID_NOT_KNOWN",
            RequestIdReused { .. } => "CONTEST_REQUEST_ID_REUSED",
            NotEnoughRandomWords { .. } => "CONTEST_NOT_ENOUGH_RANDOM_WORDS",
            Ledger(error) => error.error_code(),
            Oracle(error) => error.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_codes() {
        let ledger = ContestError::from(LedgerError::NothingToClaim);
        assert_eq!(ledger.error_code(), "LEDGER_NOTHING_TO_CLAIM");
        assert!(ledger.severity().is_recoverable());

        let resolve = ContestError::from(ResolveError::NotEnoughRandomWords {
            required: 2,
            supplied: 1,
        });
        assert_eq!(resolve.error_code(), "CONTEST_NOT_ENOUGH_RANDOM_WORDS");
        assert!(resolve.severity().is_internal());
    }
}
