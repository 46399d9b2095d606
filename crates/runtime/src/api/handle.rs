//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers one async method per
//! vault operation, plus subscriptions to event topics.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};
use vault_core::{
    AccountId, Amount, AttackRequest, AttackRequested, AttacksBlocked, BattleResolved,
    ClanDissolved, ClanId, ClanVaultState, CombatantAssignment, CombatantRemoved,
    CombatantsAssigned, FundsClaimed, FundsLocked, ItemId, PlayerId, RandomWord, RequestId,
    VaultState,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Start an attack; the battle resolves when randomness is fulfilled.
    pub async fn attack_vaults(&self, request: AttackRequest) -> Result<AttackRequested> {
        self.request(|reply| Command::AttackVaults { request, reply }).await?
    }

    pub async fn assign_combatants(
        &self,
        assignment: CombatantAssignment,
    ) -> Result<CombatantsAssigned> {
        self.request(|reply| Command::AssignCombatants { assignment, reply }).await?
    }

    pub async fn claim_funds(
        &self,
        clan: ClanId,
        player: PlayerId,
        caller: AccountId,
    ) -> Result<FundsClaimed> {
        self.request(|reply| Command::ClaimFunds {
            clan,
            player,
            caller,
            reply,
        })
        .await?
    }

    pub async fn block_attacks(
        &self,
        clan: ClanId,
        item: ItemId,
        leader: PlayerId,
        caller: AccountId,
    ) -> Result<AttacksBlocked> {
        self.request(|reply| Command::BlockAttacks {
            clan,
            item,
            leader,
            caller,
            reply,
        })
        .await?
    }

    /// Deposit `amount` into `clan`'s vault. System entry point.
    pub async fn lock_funds(&self, clan: ClanId, amount: Amount) -> Result<FundsLocked> {
        self.request(|reply| Command::LockFunds {
            clan,
            amount,
            reply,
        })
        .await?
    }

    /// Clan registry notification.
    pub async fn player_left_clan(
        &self,
        clan: ClanId,
        player: PlayerId,
    ) -> Result<CombatantRemoved> {
        self.request(|reply| Command::PlayerLeftClan {
            clan,
            player,
            reply,
        })
        .await?
    }

    /// Clan registry notification.
    pub async fn clan_dissolved(&self, clan: ClanId) -> Result<ClanDissolved> {
        self.request(|reply| Command::ClanDissolved { clan, reply }).await?
    }

    /// Deliver random words for a pending attack.
    ///
    /// The randomness worker calls this for configured providers; tests and
    /// external sources call it directly.
    pub async fn fulfill_randomness(
        &self,
        request_id: RequestId,
        words: Vec<RandomWord>,
        unit_cost: Amount,
    ) -> Result<BattleResolved> {
        self.request(|reply| Command::FulfillRandomness {
            request_id,
            words,
            unit_cost,
            reply,
        })
        .await?
    }

    /// Prepayment the next attack must carry.
    pub async fn attack_cost(&self) -> Result<Amount> {
        self.request(|reply| Command::QueryAttackCost { reply }).await
    }

    /// Current record of `clan`, or the record a first touch would create.
    pub async fn query_clan(&self, clan: ClanId) -> Result<ClanVaultState> {
        self.request(|reply| Command::QueryClan { clan, reply }).await
    }

    /// Query the current vault state (read-only snapshot)
    pub async fn query_state(&self) -> Result<VaultState> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Vault` - Ledger, roster and block changes, rejected commands
    /// - `Topic::Battle` - Attacks requested and battles resolved
    /// - `Topic::Randomness` - Requests, deliveries and provider failures
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
