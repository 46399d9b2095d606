//! Results returned by successful engine operations.
//!
//! Each outcome carries everything a collaborator needs to act on it: the
//! runtime turns them into events, and custody turns [`FundsClaimed`] into an
//! actual payout.

use crate::combat::BattleOutcome;
use crate::ledger::LockPlacement;
use crate::state::{AccountId, Amount, ClanId, ItemId, PlayerId, RequestId, Timestamp};

/// Parameters of an attack on another clan's vault.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRequest {
    pub caller: AccountId,
    pub leader: PlayerId,
    pub attacker: ClanId,
    pub defender: ClanId,
    pub item: Option<ItemId>,
    pub payment: Amount,
}

/// Parameters of a roster change.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantAssignment {
    pub caller: AccountId,
    pub leader: PlayerId,
    pub clan: ClanId,
    pub players: Vec<PlayerId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRequested {
    pub request_id: RequestId,
    pub attacker: ClanId,
    pub defender: ClanId,
    pub attacker_players: Vec<PlayerId>,
    /// Item the inventory should burn, if one was used.
    pub consumed_item: Option<ItemId>,
    pub extra_rolls: u8,
    /// Amount the caller prepaid; custody keeps it.
    pub prepayment: Amount,
    pub attack_cost: Amount,
    pub attack_cooldown_until: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleResolved {
    pub request_id: RequestId,
    pub attacker: ClanId,
    pub defender: ClanId,
    pub battle: BattleOutcome,
    pub attacker_won: bool,
    pub attacker_rating: RatingChange,
    pub defender_rating: RatingChange,
    /// Amount moved from the defender's ledger to the attacker's.
    pub transferred: Amount,
    pub placement: Option<LockPlacement>,
    pub unit_cost: Amount,
    pub next_attack_cost: Amount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingChange {
    pub before: u16,
    pub after: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantsAssigned {
    pub clan: ClanId,
    pub previous: Vec<PlayerId>,
    pub combatants: Vec<PlayerId>,
    pub change_cooldown_until: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantRemoved {
    pub clan: ClanId,
    pub player: PlayerId,
    /// Whether the player held a slot in the clan roster.
    pub was_combatant: bool,
    /// Pending attacks whose attacker snapshot lost the player.
    pub affected_requests: Vec<RequestId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClanDissolved {
    pub clan: ClanId,
    pub removed: Vec<PlayerId>,
    pub affected_requests: Vec<RequestId>,
}

/// Instruction for custody to pay `amount` to `player`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FundsClaimed {
    pub clan: ClanId,
    pub player: PlayerId,
    pub amount: Amount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FundsLocked {
    pub clan: ClanId,
    pub amount: Amount,
    pub maturity: Timestamp,
    pub placement: LockPlacement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttacksBlocked {
    pub clan: ClanId,
    pub item: ItemId,
    pub blocking_until: Timestamp,
    pub cooldown_until: Timestamp,
}
