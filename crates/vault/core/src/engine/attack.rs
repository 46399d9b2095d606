//! Two-phase vault attacks: request, then resolve on fulfillment.

use super::{
    AttackRequest, AttackRequested, BattleResolved, ContestError, RatingChange, VaultEngine, after,
};
use crate::combat::{BattleSetup, resolve};
use crate::config::VaultConfig;
use crate::env::{ItemEffect, RandomWord, RandomnessRequest, VaultEnv};
use crate::ledger::{LedgerError, LockLedger};
use crate::rating::adjust_ratings;
use crate::state::{Amount, ItemId, PendingAttack, PlayerId, RequestId, Roster, Timestamp};

impl VaultEngine<'_> {
    /// Starts an attack on `request.defender`'s vault.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// authorization, self-attack, attacker roster, item, same-clan cooldown
    /// (skipped by a reattack item), attack cooldown, defender block, defender
    /// ledger capacity, prepayment. Only then is randomness requested and the
    /// pending attack stored.
    ///
    /// # Errors
    ///
    /// Any of the precondition variants of [`ContestError`], or
    /// `RandomnessUnavailable` if the source refuses the request.
    pub fn attack_vaults(
        &mut self,
        env: VaultEnv<'_>,
        request: &AttackRequest,
        now: Timestamp,
    ) -> Result<AttackRequested, ContestError> {
        let AttackRequest {
            caller,
            leader,
            attacker,
            defender,
            item,
            payment,
        } = *request;

        Self::authorize_leader(&env, caller, leader, attacker)?;
        if attacker == defender {
            return Err(ContestError::CannotAttackSelf);
        }

        let attacker_state = self.clan(attacker);
        if !attacker_state.has_live_combatant() {
            return Err(ContestError::NoCombatants { clan: attacker });
        }

        let effect = match item {
            Some(item) => Some(Self::attack_item_effect(&env, leader, item)?),
            None => None,
        };
        let reattack = matches!(effect, Some(ItemEffect::Reattack));
        let extra_rolls = effect.map_or(0, |effect| effect.extra_rolls());

        if !reattack && attacker_state.is_same_clan_cooldown_active(defender, now) {
            return Err(ContestError::ClanAttackingSameClanCooldown {
                clan: defender,
                until: attacker_state.last_attacked_clan_cooldown_until,
            });
        }
        if attacker_state.is_attack_cooldown_active(now) {
            return Err(ContestError::ClanAttackingCooldown {
                until: attacker_state.attack_cooldown_until,
            });
        }

        let defender_state = self.clan(defender);
        if defender_state.is_blocking_attacks(now) {
            return Err(ContestError::ClanIsBlockingAttacks {
                clan: defender,
                until: defender_state.blocking_attacks_until,
            });
        }
        if defender_state.ledger.is_full() {
            return Err(LedgerError::MaxLockedVaultsReached.into());
        }

        let attack_cost = self.attack_cost();
        if payment < attack_cost {
            return Err(ContestError::InsufficientCost {
                required: attack_cost,
                supplied: payment,
            });
        }

        let attacker_players: Roster = attacker_state.combatants.clone();
        drop(attacker_state);
        drop(defender_state);

        let randomness = env.randomness().map_err(ContestError::RandomnessUnavailable)?;
        let request_id = randomness
            .request_randomness(RandomnessRequest {
                attacker,
                defender,
                num_words: VaultConfig::RANDOM_WORDS_PER_BATTLE,
            })
            .map_err(ContestError::RandomnessUnavailable)?;
        if request_id <= self.state.last_request_id() {
            return Err(ContestError::RequestIdReused { request_id });
        }

        self.state.insert_pending(PendingAttack {
            request_id,
            attacker,
            defender,
            attacker_players: attacker_players.clone(),
            item,
            extra_rolls,
            prepayment: payment,
            requested_at: now,
        });

        let attack_cooldown_until = after(now, self.config.attack_cooldown);
        let same_clan_until = after(now, self.config.same_clan_attack_cooldown);
        let attacker_state = self.clan_mut(attacker);
        attacker_state.attack_cooldown_until = attack_cooldown_until;
        attacker_state.arm_same_clan_cooldown(defender, same_clan_until);

        Ok(AttackRequested {
            request_id,
            attacker,
            defender,
            attacker_players: attacker_players.to_vec(),
            consumed_item: item,
            extra_rolls,
            prepayment: payment,
            attack_cost,
            attack_cooldown_until,
        })
    }

    /// Resolves the battle of a pending attack with the delivered words.
    ///
    /// The attacker fights with the roster captured at request time; the
    /// defender with its current roster. If the attacker wins it receives
    /// `transfer_percent` of the defender's locked total as a new lock.
    ///
    /// # Errors
    ///
    /// - `RequestIdNotKnown` if `request_id` is not pending (including a
    ///   request that was already fulfilled)
    /// - `NotEnoughRandomWords` if fewer than two words arrived; the attack
    ///   stays pending
    pub fn fulfill_randomness(
        &mut self,
        env: VaultEnv<'_>,
        request_id: RequestId,
        words: &[RandomWord],
        unit_cost: Amount,
        now: Timestamp,
    ) -> Result<BattleResolved, ContestError> {
        let pending = self
            .state
            .pending(request_id)
            .ok_or(ContestError::RequestIdNotKnown { request_id })?;
        let (attacker, defender) = (pending.attacker, pending.defender);

        let defender_roster = self.clan(defender).combatants.clone();
        let battle = resolve(
            &BattleSetup {
                roster_a: &pending.attacker_players,
                roster_b: &defender_roster,
                skills: &self.config.battle_skills,
                random_words: words,
                extra_rolls_a: pending.extra_rolls,
                extra_rolls_b: 0,
                roll_level_step: self.config.roll_level_step(),
            },
            env.players()?,
        )?;
        let attacker_won = battle.did_a_win;

        let config = self.config;
        let (attacker_state, defender_state) = self
            .state
            .clan_pair_mut(attacker, defender, config.initial_rating)
            .ok_or(ContestError::CannotAttackSelf)?;

        let (transferred, placement) = if attacker_won {
            LockLedger::transfer_on_loss(
                &mut defender_state.ledger,
                &mut attacker_state.ledger,
                config.transfer_percent(),
                after(now, config.battle_lock_duration),
                now,
            )?
        } else {
            (0, None)
        };

        let before_a = attacker_state.rating;
        let before_d = defender_state.rating;
        let (after_a, after_d) = adjust_ratings(
            config.attacker_k,
            config.defender_k,
            before_a,
            before_d,
            attacker_won,
        );
        attacker_state.rating = after_a;
        defender_state.rating = after_d;

        let same_clan_until = after(now, config.same_clan_attack_cooldown);
        attacker_state.arm_same_clan_cooldown(defender, same_clan_until);
        defender_state.arm_same_clan_cooldown(attacker, same_clan_until);

        self.state.fee.record_sample(unit_cost);
        self.state.take_pending(request_id);

        Ok(BattleResolved {
            request_id,
            attacker,
            defender,
            battle,
            attacker_won,
            attacker_rating: RatingChange {
                before: before_a,
                after: after_a,
            },
            defender_rating: RatingChange {
                before: before_d,
                after: after_d,
            },
            transferred,
            placement,
            unit_cost,
            next_attack_cost: self.attack_cost(),
        })
    }

    fn attack_item_effect(
        env: &VaultEnv<'_>,
        leader: PlayerId,
        item: ItemId,
    ) -> Result<ItemEffect, ContestError> {
        let effect = env
            .items()?
            .effect(item)
            .ok_or(ContestError::ItemNotFound { item })?;
        if !env.players()?.has_item(leader, item) {
            return Err(ContestError::ItemNotOwned {
                item,
                player: leader,
            });
        }
        if !effect.is_attack_effect() {
            return Err(ContestError::NotAnAttackItem { item });
        }
        Ok(effect)
    }
}
