//! Event types for different topics.

use serde::{Deserialize, Serialize};
use vault_core::{
    Amount, AttackRequested, AttacksBlocked, BattleResolved, ClanDissolved, ClanId,
    CombatantRemoved, CombatantsAssigned, FundsClaimed, FundsLocked, RandomnessRequest, RequestId,
    Timestamp,
};

/// Ledger, roster and block changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VaultEvent {
    FundsLocked(FundsLocked),
    FundsClaimed(FundsClaimed),
    CombatantsAssigned(CombatantsAssigned),
    CombatantRemoved(CombatantRemoved),
    ClanDissolved(ClanDissolved),
    AttacksBlocked(AttacksBlocked),

    /// The engine or custody refused a command; state is unchanged.
    CommandRejected {
        command: String,
        code: String,
        message: String,
        at: Timestamp,
    },
}

/// Attack lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BattleEvent {
    AttackRequested {
        outcome: AttackRequested,
        at: Timestamp,
    },

    BattleResolved {
        outcome: Box<BattleResolved>,
        /// Hex SHA-256 of the state after the battle was applied.
        state_root: String,
        at: Timestamp,
    },

    /// A fulfillment was refused; the request, if known, stays pending.
    FulfillmentRejected {
        request_id: RequestId,
        code: String,
        message: String,
    },

    /// The battle committed but custody did not move the seized funds.
    /// The ledgers stay authoritative; the books need reconciling.
    SettlementFailed {
        request_id: RequestId,
        from: ClanId,
        to: ClanId,
        amount: Amount,
        reason: String,
    },
}

/// Randomness protocol events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RandomnessEvent {
    Requested {
        request_id: RequestId,
        request: RandomnessRequest,
    },

    Delivered {
        request_id: RequestId,
        words: usize,
        unit_cost: Amount,
    },

    ProviderFailed {
        request_id: RequestId,
        error: String,
    },
}
