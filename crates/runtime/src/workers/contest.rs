//! Contest worker that owns the authoritative [`VaultState`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), runs each
//! one through [`VaultEngine`] on a working copy, settles funds with custody,
//! and only then commits, persists and publishes events. A command that fails
//! at any step leaves the committed state untouched.
//!
//! Fulfillments are the exception: once randomness was requested the battle
//! always commits, and a custody refusal of the seizure is reported on
//! [`Topic::Battle`](crate::Topic::Battle) instead of failing the delivery.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};
use vault_core::{
    AccountId, Amount, AttackRequest, AttackRequested, AttacksBlocked, BattleResolved,
    ClanDissolved, ClanId, ClanVaultState, CombatantAssignment, CombatantRemoved,
    CombatantsAssigned, ContestError, FundsClaimed, FundsLocked, GameError, ItemId, PlayerId,
    RandomWord, RequestId, Timestamp, VaultConfig, VaultEngine, VaultEnv, VaultState,
};

use crate::api::{CustodyReason, FundsCustody, Result, RuntimeError};
use crate::clock::Clock;
use crate::events::{BattleEvent, EventBus, RandomnessEvent, VaultEvent};
use crate::oracle::{OracleManager, RandomnessBridge};
use crate::repository::{RepositoryError, StateRepository};

/// Commands that can be sent to the contest worker
pub enum Command {
    AttackVaults {
        request: AttackRequest,
        reply: oneshot::Sender<Result<AttackRequested>>,
    },
    AssignCombatants {
        assignment: CombatantAssignment,
        reply: oneshot::Sender<Result<CombatantsAssigned>>,
    },
    ClaimFunds {
        clan: ClanId,
        player: PlayerId,
        caller: AccountId,
        reply: oneshot::Sender<Result<FundsClaimed>>,
    },
    BlockAttacks {
        clan: ClanId,
        item: ItemId,
        leader: PlayerId,
        caller: AccountId,
        reply: oneshot::Sender<Result<AttacksBlocked>>,
    },
    LockFunds {
        clan: ClanId,
        amount: Amount,
        reply: oneshot::Sender<Result<FundsLocked>>,
    },
    PlayerLeftClan {
        clan: ClanId,
        player: PlayerId,
        reply: oneshot::Sender<Result<CombatantRemoved>>,
    },
    ClanDissolved {
        clan: ClanId,
        reply: oneshot::Sender<Result<ClanDissolved>>,
    },
    FulfillRandomness {
        request_id: RequestId,
        words: Vec<RandomWord>,
        unit_cost: Amount,
        reply: oneshot::Sender<Result<BattleResolved>>,
    },
    QueryAttackCost {
        reply: oneshot::Sender<Amount>,
    },
    QueryClan {
        clan: ClanId,
        reply: oneshot::Sender<ClanVaultState>,
    },
    QueryState {
        reply: oneshot::Sender<VaultState>,
    },
}

/// Collaborators the worker calls out to.
pub struct ContestServices {
    pub oracles: OracleManager,
    pub randomness: Arc<RandomnessBridge>,
    pub custody: Arc<dyn FundsCustody>,
    pub repository: Arc<dyn StateRepository>,
    pub clock: Arc<dyn Clock>,
}

/// Background task that processes vault commands one at a time.
pub struct ContestWorker {
    state: VaultState,
    revision: u64,
    config: VaultConfig,
    snapshot_retention: u64,
    services: ContestServices,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl ContestWorker {
    pub fn new(
        state: VaultState,
        revision: u64,
        config: VaultConfig,
        snapshot_retention: u64,
        services: ContestServices,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            target: "runtime::contest",
            revision,
            clans = state.clans().count(),
            pending = state.pending_attacks().count(),
            "ContestWorker initialized"
        );

        Self {
            state,
            revision,
            config,
            snapshot_retention: snapshot_retention.max(1),
            services,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd).await;
                }
                else => break,
            }
        }
        info!(target: "runtime::contest", revision = self.revision, "ContestWorker stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::AttackVaults { request, reply } => {
                let result = self.attack_vaults(request).await;
                respond(reply, result, "AttackVaults");
            }
            Command::AssignCombatants { assignment, reply } => {
                let result = self.assign_combatants(assignment);
                respond(reply, result, "AssignCombatants");
            }
            Command::ClaimFunds {
                clan,
                player,
                caller,
                reply,
            } => {
                let result = self.claim_funds(clan, player, caller).await;
                respond(reply, result, "ClaimFunds");
            }
            Command::BlockAttacks {
                clan,
                item,
                leader,
                caller,
                reply,
            } => {
                let result = self.block_attacks(clan, item, leader, caller);
                respond(reply, result, "BlockAttacks");
            }
            Command::LockFunds {
                clan,
                amount,
                reply,
            } => {
                let result = self.lock_funds(clan, amount).await;
                respond(reply, result, "LockFunds");
            }
            Command::PlayerLeftClan {
                clan,
                player,
                reply,
            } => {
                let result = self.player_left_clan(clan, player);
                respond(reply, result, "PlayerLeftClan");
            }
            Command::ClanDissolved { clan, reply } => {
                let result = self.clan_dissolved(clan);
                respond(reply, result, "ClanDissolved");
            }
            Command::FulfillRandomness {
                request_id,
                words,
                unit_cost,
                reply,
            } => {
                let result = self.fulfill_randomness(request_id, words, unit_cost).await;
                respond(reply, result, "FulfillRandomness");
            }
            Command::QueryAttackCost { reply } => {
                let cost = self
                    .state
                    .fee
                    .attack_cost(self.config.base_attack_cost, self.config.expected_work_units);
                respond(reply, cost, "QueryAttackCost");
            }
            Command::QueryClan { clan, reply } => {
                let record = self
                    .state
                    .clan_or_fresh(clan, self.config.initial_rating)
                    .into_owned();
                respond(reply, record, "QueryClan");
            }
            Command::QueryState { reply } => {
                respond(reply, self.state.clone(), "QueryState");
            }
        }
    }

    async fn attack_vaults(&mut self, request: AttackRequest) -> Result<AttackRequested> {
        let now = self.services.clock.now();
        let (outcome, working) = self
            .execute(|engine, env| engine.attack_vaults(env, &request, now))
            .map_err(|error| self.rejected("attack_vaults", error, now))?;

        if let Err(error) = self
            .services
            .custody
            .receive(
                request.attacker,
                outcome.prepayment,
                CustodyReason::AttackPrepayment,
            )
            .await
        {
            self.services.randomness.discard_staged();
            warn!(
                target: "runtime::contest",
                attacker = %request.attacker,
                defender = %request.defender,
                prepayment = %outcome.prepayment,
                error = %error,
                "attack prepayment refused"
            );
            return Err(self.custody_refused("attack_vaults", error, now));
        }

        self.commit(working);
        if let Some(item) = outcome.consumed_item {
            self.burn_item(request.leader, item);
        }

        for ticket in self.services.randomness.dispatch_staged() {
            self.event_bus.publish(RandomnessEvent::Requested {
                request_id: ticket.request_id,
                request: ticket.request,
            });
        }
        info!(
            target: "runtime::contest",
            attacker = %outcome.attacker,
            defender = %outcome.defender,
            request_id = outcome.request_id.0,
            extra_rolls = outcome.extra_rolls,
            "attack requested"
        );
        self.event_bus.publish(BattleEvent::AttackRequested {
            outcome: outcome.clone(),
            at: now,
        });

        Ok(outcome)
    }

    async fn fulfill_randomness(
        &mut self,
        request_id: RequestId,
        words: Vec<RandomWord>,
        unit_cost: Amount,
    ) -> Result<BattleResolved> {
        let now = self.services.clock.now();
        self.event_bus.publish(RandomnessEvent::Delivered {
            request_id,
            words: words.len(),
            unit_cost,
        });

        let executed = self.execute(|engine, env| {
            engine.fulfill_randomness(env, request_id, &words, unit_cost, now)
        });
        let (outcome, working) = match executed {
            Ok(executed) => executed,
            Err(error) => {
                warn!(
                    target: "runtime::contest",
                    request_id = request_id.0,
                    code = error.error_code(),
                    error = %error,
                    "fulfillment rejected"
                );
                self.event_bus.publish(BattleEvent::FulfillmentRejected {
                    request_id,
                    code: error.error_code().into(),
                    message: error.to_string(),
                });
                return Err(error.into());
            }
        };

        let settlement = if outcome.transferred > 0 {
            self.services
                .custody
                .transfer(outcome.defender, outcome.attacker, outcome.transferred)
                .await
        } else {
            Ok(())
        };

        self.commit(working);

        if let Err(error) = settlement {
            error!(
                target: "runtime::contest",
                request_id = request_id.0,
                attacker = %outcome.attacker,
                defender = %outcome.defender,
                amount = %outcome.transferred,
                error = %error,
                "custody refused the battle seizure"
            );
            self.event_bus.publish(BattleEvent::SettlementFailed {
                request_id,
                from: outcome.defender,
                to: outcome.attacker,
                amount: outcome.transferred,
                reason: error.to_string(),
            });
        }

        info!(
            target: "runtime::contest",
            request_id = request_id.0,
            attacker = %outcome.attacker,
            defender = %outcome.defender,
            attacker_won = outcome.attacker_won,
            transferred = %outcome.transferred,
            "battle resolved"
        );
        self.event_bus.publish(BattleEvent::BattleResolved {
            outcome: Box::new(outcome.clone()),
            state_root: hex::encode(self.state.state_root()),
            at: now,
        });

        Ok(outcome)
    }

    fn assign_combatants(&mut self, assignment: CombatantAssignment) -> Result<CombatantsAssigned> {
        let now = self.services.clock.now();
        let (outcome, working) = self
            .execute(|engine, env| engine.assign_combatants(env, &assignment, now))
            .map_err(|error| self.rejected("assign_combatants", error, now))?;

        self.commit(working);
        debug!(
            target: "runtime::contest",
            clan = %outcome.clan,
            combatants = outcome.combatants.len(),
            "combatants assigned"
        );
        self.event_bus
            .publish(VaultEvent::CombatantsAssigned(outcome.clone()));
        Ok(outcome)
    }

    async fn claim_funds(
        &mut self,
        clan: ClanId,
        player: PlayerId,
        caller: AccountId,
    ) -> Result<FundsClaimed> {
        let now = self.services.clock.now();
        let (outcome, working) = self
            .execute(|engine, env| engine.claim_funds(env, clan, player, caller, now))
            .map_err(|error| self.rejected("claim_funds", error, now))?;

        if let Err(error) = self
            .services
            .custody
            .release(clan, player, outcome.amount)
            .await
        {
            return Err(self.custody_refused("claim_funds", error, now));
        }

        self.commit(working);
        info!(
            target: "runtime::contest",
            clan = %clan,
            player = %player,
            amount = %outcome.amount,
            "funds claimed"
        );
        self.event_bus.publish(VaultEvent::FundsClaimed(outcome));
        Ok(outcome)
    }

    fn block_attacks(
        &mut self,
        clan: ClanId,
        item: ItemId,
        leader: PlayerId,
        caller: AccountId,
    ) -> Result<AttacksBlocked> {
        let now = self.services.clock.now();
        let (outcome, working) = self
            .execute(|engine, env| engine.block_attacks(env, clan, item, leader, caller, now))
            .map_err(|error| self.rejected("block_attacks", error, now))?;

        self.commit(working);
        self.burn_item(leader, item);
        info!(
            target: "runtime::contest",
            clan = %clan,
            until = outcome.blocking_until,
            "attacks blocked"
        );
        self.event_bus.publish(VaultEvent::AttacksBlocked(outcome));
        Ok(outcome)
    }

    async fn lock_funds(&mut self, clan: ClanId, amount: Amount) -> Result<FundsLocked> {
        let now = self.services.clock.now();
        let (outcome, working) = self
            .execute(|engine, _| engine.lock_funds(clan, amount, now))
            .map_err(|error| self.rejected("lock_funds", error, now))?;

        if let Err(error) = self
            .services
            .custody
            .receive(clan, amount, CustodyReason::Lock)
            .await
        {
            return Err(self.custody_refused("lock_funds", error, now));
        }

        self.commit(working);
        debug!(
            target: "runtime::contest",
            clan = %clan,
            amount = %amount,
            maturity = outcome.maturity,
            "funds locked"
        );
        self.event_bus.publish(VaultEvent::FundsLocked(outcome));
        Ok(outcome)
    }

    fn player_left_clan(&mut self, clan: ClanId, player: PlayerId) -> Result<CombatantRemoved> {
        let now = self.services.clock.now();
        let (outcome, working) = self
            .execute(|engine, _| Ok(engine.player_left_clan(clan, player)))
            .map_err(|error| self.rejected("player_left_clan", error, now))?;

        self.commit(working);
        self.event_bus
            .publish(VaultEvent::CombatantRemoved(outcome.clone()));
        Ok(outcome)
    }

    fn clan_dissolved(&mut self, clan: ClanId) -> Result<ClanDissolved> {
        let now = self.services.clock.now();
        let (outcome, working) = self
            .execute(|engine, _| Ok(engine.clan_dissolved(clan)))
            .map_err(|error| self.rejected("clan_dissolved", error, now))?;

        self.commit(working);
        info!(
            target: "runtime::contest",
            clan = %clan,
            removed = outcome.removed.len(),
            "clan dissolved"
        );
        self.event_bus
            .publish(VaultEvent::ClanDissolved(outcome.clone()));
        Ok(outcome)
    }

    /// Removes a spent item from the leader's inventory.
    fn burn_item(&self, player: PlayerId, item: ItemId) {
        if !self.services.oracles.players().take_item(player, item) {
            warn!(
                target: "runtime::contest",
                player = %player,
                item = %item,
                "spent item was already gone from the inventory"
            );
        }
    }

    /// Runs `op` against a copy of the state.
    ///
    /// On failure the copy and any randomness tickets it staged are dropped.
    fn execute<T>(
        &self,
        op: impl FnOnce(&mut VaultEngine<'_>, VaultEnv<'_>) -> std::result::Result<T, ContestError>,
    ) -> std::result::Result<(T, VaultState), ContestError> {
        let mut working = self.state.clone();
        let outcome = {
            let env = self.services.oracles.as_vault_env(&self.services.randomness);
            let mut engine = VaultEngine::new(&mut working, &self.config);
            op(&mut engine, env)
        };

        match outcome {
            Ok(outcome) => Ok((outcome, working)),
            Err(error) => {
                let discarded = self.services.randomness.discard_staged();
                if discarded > 0 {
                    debug!(target: "runtime::contest", discarded, "dropped staged randomness tickets");
                }
                Err(error)
            }
        }
    }

    fn rejected(&self, command: &'static str, error: ContestError, now: Timestamp) -> RuntimeError {
        debug!(
            target: "runtime::contest",
            command,
            code = error.error_code(),
            error = %error,
            "command rejected"
        );
        self.event_bus.publish(VaultEvent::CommandRejected {
            command: command.into(),
            code: error.error_code().into(),
            message: error.to_string(),
            at: now,
        });
        error.into()
    }

    /// Custody refused funds for an accepted command; nothing is committed.
    fn custody_refused(
        &self,
        command: &'static str,
        error: RuntimeError,
        now: Timestamp,
    ) -> RuntimeError {
        warn!(
            target: "runtime::contest",
            command,
            code = error.error_code(),
            error = %error,
            "custody refused command"
        );
        self.event_bus.publish(VaultEvent::CommandRejected {
            command: command.into(),
            code: error.error_code().into(),
            message: error.to_string(),
            at: now,
        });
        error
    }

    fn commit(&mut self, working: VaultState) {
        self.state = working;
        self.revision += 1;

        if let Err(error) = self.persist() {
            error!(
                target: "runtime::contest",
                revision = self.revision,
                error = %error,
                "failed to persist vault state"
            );
        }
    }

    fn persist(&self) -> std::result::Result<(), RepositoryError> {
        let repository = &self.services.repository;
        repository.save(self.revision, &self.state)?;

        let keep_from = self.revision.saturating_sub(self.snapshot_retention - 1);
        if keep_from > 0 {
            repository.prune_below(keep_from)?;
        }
        Ok(())
    }
}

fn respond<T>(reply: oneshot::Sender<T>, value: T, command: &'static str) {
    if reply.send(value).is_err() {
        debug!(target: "runtime::contest", command, "reply channel closed (caller dropped)");
    }
}
