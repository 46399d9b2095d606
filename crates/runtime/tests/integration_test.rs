use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use vault_core::{
    AccountId, Amount, AttackRequest, ClanId, CombatantAssignment, ContestError, ItemId, PlayerId,
    PlayerOracle, VaultConfig,
};
use vault_runtime::{
    BattleEvent, CustodyReason, Event, FundsCustody, InMemoryCustody, ManualClock,
    RandomnessEvent, Runtime, RuntimeConfig, RuntimeError, Scenario, SeededRandomness, Topic,
    VaultEvent,
};

const DAY: u64 = 24 * 60 * 60;
const START: u64 = 1_700_000_000;
const ATTACKER: ClanId = ClanId(1);
const DEFENDER: ClanId = ClanId(2);
const ATTACKER_LEADER: PlayerId = PlayerId(10);
const DEFENDER_LEADER: PlayerId = PlayerId(20);

/// Clan 1 fields one fighter; clan 2 holds 1000 in its vault and fields nobody,
/// so every battle it is dragged into is a walkover.
const SCENARIO: &str = r#"{
    "clans": [
        {
            "id": 1,
            "leader": 10,
            "members": [
                { "id": 10, "level": 40, "items": [1] },
                { "id": 11, "level": 60 }
            ],
            "combatants": [11]
        },
        {
            "id": 2,
            "leader": 20,
            "members": [
                { "id": 20, "level": 40, "items": [3] },
                { "id": 21, "level": 10 }
            ],
            "deposits": [1000]
        }
    ],
    "items": [
        { "id": 1, "effect": { "ExtraRolls": 2 } },
        { "id": 3, "effect": { "BlockAttacks": { "duration": 3600 } } }
    ]
}"#;

fn attack(payment: u128) -> AttackRequest {
    AttackRequest {
        caller: AccountId(ATTACKER_LEADER.0),
        leader: ATTACKER_LEADER,
        attacker: ATTACKER,
        defender: DEFENDER,
        item: None,
        payment,
    }
}

fn scenario() -> Scenario {
    Scenario::from_json(SCENARIO).expect("scenario should parse")
}

/// Custody whose bank is closed.
struct ClosedCustody;

#[async_trait]
impl FundsCustody for ClosedCustody {
    async fn receive(
        &self,
        _clan: ClanId,
        _amount: Amount,
        _reason: CustodyReason,
    ) -> vault_runtime::Result<()> {
        Err(closed("receive"))
    }

    async fn transfer(
        &self,
        _from: ClanId,
        _to: ClanId,
        _amount: Amount,
    ) -> vault_runtime::Result<()> {
        Err(closed("transfer"))
    }

    async fn release(
        &self,
        _clan: ClanId,
        _player: PlayerId,
        _amount: Amount,
    ) -> vault_runtime::Result<()> {
        Err(closed("release"))
    }
}

fn closed(operation: &'static str) -> RuntimeError {
    RuntimeError::Custody {
        operation,
        reason: "bank closed".into(),
    }
}

fn fee_after(unit_costs: &[u128]) -> u128 {
    let average = unit_costs.iter().sum::<u128>() / 4;
    VaultConfig::DEFAULT_BASE_ATTACK_COST + average * VaultConfig::DEFAULT_EXPECTED_WORK_UNITS
}

/// Full attack lifecycle with manually delivered randomness:
/// deposit, attack, fulfillment, seizure and claim, with custody following
/// every ledger movement.
#[tokio::test]
async fn walkover_battle_moves_funds_through_custody() {
    let scenario = scenario();
    let clock = Arc::new(ManualClock::new(START));
    let custody = Arc::new(InMemoryCustody::new());

    let runtime = Runtime::builder()
        .oracles(scenario.build_oracles())
        .clock(clock.clone())
        .custody(custody.clone())
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();
    let mut randomness = handle.subscribe(Topic::Randomness);
    let mut battles = handle.subscribe(Topic::Battle);

    scenario.seed(&handle).await.expect("seeding should succeed");
    assert_eq!(custody.vault_balance(DEFENDER), 1000);

    // Phase 1: attack
    let cost = handle.attack_cost().await.unwrap();
    assert_eq!(cost, VaultConfig::DEFAULT_BASE_ATTACK_COST);

    let requested = handle.attack_vaults(attack(cost)).await.unwrap();
    assert_eq!(requested.attacker_players, vec![PlayerId(11)]);
    assert_eq!(requested.attack_cooldown_until, START + 4 * 60 * 60);
    assert_eq!(custody.fees_collected(), cost);

    match randomness.recv().await.unwrap() {
        Event::Randomness(RandomnessEvent::Requested {
            request_id,
            request,
        }) => {
            assert_eq!(request_id, requested.request_id);
            assert_eq!(request.num_words, VaultConfig::RANDOM_WORDS_PER_BATTLE);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(matches!(
        battles.recv().await.unwrap(),
        Event::Battle(BattleEvent::AttackRequested { .. })
    ));

    // Phase 2: fulfillment
    clock.advance(60);
    let resolved = handle
        .fulfill_randomness(requested.request_id, vec![u64::MAX, 0], 1000)
        .await
        .unwrap();
    assert!(resolved.attacker_won);
    assert_eq!(resolved.transferred, 100);
    assert!(resolved.attacker_rating.after > resolved.attacker_rating.before);
    assert_eq!(resolved.next_attack_cost, fee_after(&[1000]));

    match battles.recv().await.unwrap() {
        Event::Battle(BattleEvent::BattleResolved {
            outcome,
            state_root,
            ..
        }) => {
            assert_eq!(outcome.request_id, requested.request_id);
            assert_eq!(state_root.len(), 64);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    assert_eq!(custody.vault_balance(DEFENDER), 900);
    assert_eq!(custody.vault_balance(ATTACKER), 100);
    let defender = handle.query_clan(DEFENDER).await.unwrap();
    let attacker = handle.query_clan(ATTACKER).await.unwrap();
    assert_eq!(defender.ledger.total_locked(), 900);
    assert_eq!(attacker.ledger.total_locked(), 100);
    assert_eq!(handle.attack_cost().await.unwrap(), fee_after(&[1000]));

    // A second delivery for the same request is refused.
    let replay = handle
        .fulfill_randomness(requested.request_id, vec![0, u64::MAX], 1000)
        .await
        .unwrap_err();
    assert!(matches!(
        replay.as_contest(),
        Some(ContestError::RequestIdNotKnown { .. })
    ));

    // Phase 3: claim the defender's matured remainder
    clock.set(START + 7 * DAY + 1);
    let claimed = handle
        .claim_funds(DEFENDER, DEFENDER_LEADER, AccountId(DEFENDER_LEADER.0))
        .await
        .unwrap();
    assert_eq!(claimed.amount, 900);
    assert_eq!(custody.paid_out(DEFENDER_LEADER), 900);
    assert_eq!(custody.vault_balance(DEFENDER), 0);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejected_commands_leave_state_and_custody_untouched() {
    let scenario = scenario();
    let custody = Arc::new(InMemoryCustody::new());
    let runtime = Runtime::builder()
        .oracles(scenario.build_oracles())
        .clock(Arc::new(ManualClock::new(START)))
        .custody(custody.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    scenario.seed(&handle).await.unwrap();

    let mut vault_events = handle.subscribe(Topic::Vault);
    let before = handle.query_state().await.unwrap();

    let cost = handle.attack_cost().await.unwrap();
    let error = handle.attack_vaults(attack(cost - 1)).await.unwrap_err();
    assert_eq!(error.error_code(), "CONTEST_INSUFFICIENT_COST");

    match vault_events.recv().await.unwrap() {
        Event::Vault(VaultEvent::CommandRejected {
            command, code, at, ..
        }) => {
            assert_eq!(command, "attack_vaults");
            assert_eq!(code, "CONTEST_INSUFFICIENT_COST");
            assert_eq!(at, START);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let mut self_attack = attack(cost);
    self_attack.defender = ATTACKER;
    let error = handle.attack_vaults(self_attack).await.unwrap_err();
    assert!(matches!(
        error,
        RuntimeError::Contest(ContestError::CannotAttackSelf)
    ));

    // Only the leader's controller may reshuffle the roster.
    let error = handle
        .assign_combatants(CombatantAssignment {
            caller: AccountId(11),
            leader: ATTACKER_LEADER,
            clan: ATTACKER,
            players: vec![PlayerId(10)],
        })
        .await
        .unwrap_err();
    assert!(error.as_contest().is_some());

    assert_eq!(handle.query_state().await.unwrap(), before);
    assert_eq!(custody.fees_collected(), 0);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

/// State survives a restart through the file repository; a pending attack
/// can still be fulfilled and request ids keep increasing.
#[tokio::test]
async fn pending_attack_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = RuntimeConfig {
        state_dir: Some(dir.path().to_path_buf()),
        ..RuntimeConfig::default()
    };
    let scenario = scenario();
    let clock = Arc::new(ManualClock::new(START));
    let custody = Arc::new(InMemoryCustody::new());

    let runtime = Runtime::builder()
        .config(config.clone())
        .oracles(scenario.build_oracles())
        .clock(clock.clone())
        .custody(custody.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    scenario.seed(&handle).await.unwrap();
    let cost = handle.attack_cost().await.unwrap();
    let first = handle.attack_vaults(attack(cost)).await.unwrap();
    let root_before = handle.query_state().await.unwrap().state_root();
    drop(handle);
    runtime.shutdown().await.unwrap();

    let runtime = Runtime::builder()
        .config(config)
        .oracles(scenario.build_oracles())
        .clock(clock.clone())
        .custody(custody.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    let restored = handle.query_state().await.unwrap();
    assert_eq!(restored.state_root(), root_before);
    assert_eq!(restored.pending_attacks().count(), 1);

    let resolved = handle
        .fulfill_randomness(first.request_id, vec![u64::MAX, 0], 0)
        .await
        .unwrap();
    assert_eq!(resolved.transferred, 100);

    clock.advance(DAY + 1);
    let second = handle.attack_vaults(attack(cost)).await.unwrap();
    assert_eq!(second.request_id.0, first.request_id.0 + 1);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

/// A request resolved before shutdown stays retired: the restored runtime
/// issues a fresh id and a late delivery for the old one is refused.
#[tokio::test]
async fn fulfilled_request_ids_are_not_reissued_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = RuntimeConfig {
        state_dir: Some(dir.path().to_path_buf()),
        ..RuntimeConfig::default()
    };
    let scenario = scenario();
    let clock = Arc::new(ManualClock::new(START));
    let custody = Arc::new(InMemoryCustody::new());

    let runtime = Runtime::builder()
        .config(config.clone())
        .oracles(scenario.build_oracles())
        .clock(clock.clone())
        .custody(custody.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    scenario.seed(&handle).await.unwrap();
    let cost = handle.attack_cost().await.unwrap();
    let first = handle.attack_vaults(attack(cost)).await.unwrap();
    handle
        .fulfill_randomness(first.request_id, vec![u64::MAX, 0], 0)
        .await
        .unwrap();
    drop(handle);
    runtime.shutdown().await.unwrap();

    let runtime = Runtime::builder()
        .config(config)
        .oracles(scenario.build_oracles())
        .clock(clock.clone())
        .custody(custody.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    let restored = handle.query_state().await.unwrap();
    assert_eq!(restored.pending_attacks().count(), 0);
    assert_eq!(restored.last_request_id(), first.request_id);

    clock.advance(2 * DAY);
    let cost = handle.attack_cost().await.unwrap();
    let second = handle.attack_vaults(attack(cost)).await.unwrap();
    assert_ne!(second.request_id, first.request_id);
    assert_eq!(second.request_id.0, first.request_id.0 + 1);

    let replay = handle
        .fulfill_randomness(first.request_id, vec![u64::MAX, 0], 0)
        .await
        .unwrap_err();
    assert!(matches!(
        replay.as_contest(),
        Some(ContestError::RequestIdNotKnown { .. })
    ));
    let state = handle.query_state().await.unwrap();
    assert!(state.pending(second.request_id).is_some());

    drop(handle);
    runtime.shutdown().await.unwrap();
}

/// Custody that lost track of the defender's balance cannot block a battle
/// whose randomness already arrived; the seizure failure is reported instead.
/// Later payouts it cannot cover are rejected like any other command.
#[tokio::test]
async fn custody_refusals_are_reported() {
    let scenario = scenario();
    let clock = Arc::new(ManualClock::new(START));
    let runtime = Runtime::builder()
        .oracles(scenario.build_oracles())
        .clock(clock.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    scenario.seed(&handle).await.unwrap();
    let seeded = handle.query_state().await.unwrap();
    drop(handle);
    runtime.shutdown().await.unwrap();

    let custody = Arc::new(InMemoryCustody::new());
    let runtime = Runtime::builder()
        .initial_state(seeded)
        .oracles(scenario.build_oracles())
        .clock(clock.clone())
        .custody(custody.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let mut battles = handle.subscribe(Topic::Battle);
    let mut vault_events = handle.subscribe(Topic::Vault);

    let cost = handle.attack_cost().await.unwrap();
    let requested = handle.attack_vaults(attack(cost)).await.unwrap();
    let resolved = handle
        .fulfill_randomness(requested.request_id, vec![u64::MAX, 0], 1000)
        .await
        .unwrap();
    assert_eq!(resolved.transferred, 100);

    let mut settlement_failed = false;
    loop {
        match battles.recv().await.unwrap() {
            Event::Battle(BattleEvent::SettlementFailed {
                request_id,
                from,
                to,
                amount,
                ..
            }) => {
                assert_eq!(request_id, requested.request_id);
                assert_eq!((from, to, amount), (DEFENDER, ATTACKER, 100));
                settlement_failed = true;
            }
            Event::Battle(BattleEvent::BattleResolved { .. }) => break,
            _ => {}
        }
    }
    assert!(settlement_failed);

    let state = handle.query_state().await.unwrap();
    assert!(state.pending(requested.request_id).is_none());
    assert_eq!(state.clan(DEFENDER).unwrap().ledger.total_locked(), 900);
    assert_eq!(state.clan(ATTACKER).unwrap().ledger.total_locked(), 100);
    assert_eq!(custody.vault_balance(DEFENDER), 0);

    clock.set(START + 7 * DAY + 1);
    let error = handle
        .claim_funds(DEFENDER, DEFENDER_LEADER, AccountId(DEFENDER_LEADER.0))
        .await
        .unwrap_err();
    assert_eq!(error.error_code(), "RUNTIME_CUSTODY");
    match vault_events.recv().await.unwrap() {
        Event::Vault(VaultEvent::CommandRejected { command, code, .. }) => {
            assert_eq!(command, "claim_funds");
            assert_eq!(code, "RUNTIME_CUSTODY");
        }
        other => panic!("unexpected event: {other:?}"),
    }
    let defender = handle.query_clan(DEFENDER).await.unwrap();
    assert_eq!(defender.ledger.total_locked(), 900);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

/// A refused prepayment or deposit rejects the command before any randomness
/// is requested.
#[tokio::test]
async fn refused_payments_reject_the_command() {
    let scenario = scenario();
    let runtime = Runtime::builder()
        .oracles(scenario.build_oracles())
        .clock(Arc::new(ManualClock::new(START)))
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    scenario.seed(&handle).await.unwrap();
    let seeded = handle.query_state().await.unwrap();
    drop(handle);
    runtime.shutdown().await.unwrap();

    let runtime = Runtime::builder()
        .initial_state(seeded.clone())
        .oracles(scenario.build_oracles())
        .clock(Arc::new(ManualClock::new(START)))
        .custody(Arc::new(ClosedCustody))
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let mut randomness = handle.subscribe(Topic::Randomness);
    let mut vault_events = handle.subscribe(Topic::Vault);

    let cost = handle.attack_cost().await.unwrap();
    let error = handle.attack_vaults(attack(cost)).await.unwrap_err();
    assert_eq!(error.error_code(), "RUNTIME_CUSTODY");

    let error = handle.lock_funds(DEFENDER, 50).await.unwrap_err();
    assert_eq!(error.error_code(), "RUNTIME_CUSTODY");

    for expected in ["attack_vaults", "lock_funds"] {
        match vault_events.recv().await.unwrap() {
            Event::Vault(VaultEvent::CommandRejected { command, code, .. }) => {
                assert_eq!(command, expected);
                assert_eq!(code, "RUNTIME_CUSTODY");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert!(randomness.try_recv().is_err());
    assert_eq!(handle.query_state().await.unwrap(), seeded);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn seeded_provider_resolves_attacks_in_background() {
    let scenario = scenario();
    let custody = Arc::new(InMemoryCustody::new());
    let runtime = Runtime::builder()
        .oracles(scenario.build_oracles())
        .clock(Arc::new(ManualClock::new(START)))
        .custody(custody.clone())
        .randomness_provider(SeededRandomness::new(7, 1000))
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    scenario.seed(&handle).await.unwrap();

    let mut battles = runtime.subscribe(Topic::Battle);
    let cost = handle.attack_cost().await.unwrap();
    let requested = handle.attack_vaults(attack(cost)).await.unwrap();

    let resolved = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Event::Battle(BattleEvent::BattleResolved { outcome, .. }) =
                battles.recv().await.unwrap()
            {
                return outcome;
            }
        }
    })
    .await
    .expect("provider should fulfill the attack");

    assert_eq!(resolved.request_id, requested.request_id);
    assert!(resolved.attacker_won);
    assert_eq!(custody.vault_balance(ATTACKER), 100);
    assert_eq!(handle.attack_cost().await.unwrap(), fee_after(&[1000]));
    assert_eq!(handle.query_state().await.unwrap().pending_attacks().count(), 0);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn spent_items_leave_the_inventory() {
    let scenario = scenario();
    let clock = Arc::new(ManualClock::new(START));
    let runtime = Runtime::builder()
        .oracles(scenario.build_oracles())
        .clock(clock.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    scenario.seed(&handle).await.unwrap();
    let players = runtime.oracles().players().clone();

    let blocked = handle
        .block_attacks(DEFENDER, ItemId(3), DEFENDER_LEADER, AccountId(DEFENDER_LEADER.0))
        .await
        .unwrap();
    assert_eq!(blocked.blocking_until, START + 3600);
    assert!(!players.has_item(DEFENDER_LEADER, ItemId(3)));

    let cost = handle.attack_cost().await.unwrap();
    let mut boosted = attack(cost);
    boosted.item = Some(ItemId(1));
    let error = handle.attack_vaults(boosted.clone()).await.unwrap_err();
    assert_eq!(error.error_code(), "CONTEST_CLAN_IS_BLOCKING_ATTACKS");
    assert!(players.has_item(ATTACKER_LEADER, ItemId(1)));

    clock.advance(3601);
    let requested = handle.attack_vaults(boosted).await.unwrap();
    assert_eq!(requested.consumed_item, Some(ItemId(1)));
    assert_eq!(requested.extra_rolls, 2);
    assert!(!players.has_item(ATTACKER_LEADER, ItemId(1)));

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn clan_notifications_reach_pending_attacks() {
    let scenario = scenario();
    let runtime = Runtime::builder()
        .oracles(scenario.build_oracles())
        .clock(Arc::new(ManualClock::new(START)))
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    scenario.seed(&handle).await.unwrap();

    let cost = handle.attack_cost().await.unwrap();
    let requested = handle.attack_vaults(attack(cost)).await.unwrap();

    runtime.oracles().clans().leave(PlayerId(11));
    let removed = handle.player_left_clan(ATTACKER, PlayerId(11)).await.unwrap();
    assert!(removed.was_combatant);
    assert_eq!(removed.affected_requests, vec![requested.request_id]);

    let attacker = handle.query_clan(ATTACKER).await.unwrap();
    assert!(!attacker.has_live_combatant());

    let dissolved = handle.clan_dissolved(ATTACKER).await.unwrap();
    assert!(dissolved.removed.is_empty());

    // A clan with nobody left cannot attack.
    let error = handle.attack_vaults(attack(cost)).await.unwrap_err();
    assert_eq!(error.error_code(), "CONTEST_NO_COMBATANTS");

    drop(handle);
    runtime.shutdown().await.unwrap();
}
