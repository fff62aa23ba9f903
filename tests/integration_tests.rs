//! Integration tests for holdable-ledger

use holdable_ledger::{
    parse_units, Address, HoldId, HoldStatus, Ledger, LedgerConfig, LedgerError, LedgerStorage,
    MemoryStorage,
};

fn accounts() -> (Address, Address, Address, Address) {
    (
        Address::from("owner"),
        Address::from("sender"),
        Address::from("recipient"),
        Address::from("spender"),
    )
}

async fn new_ledger() -> Ledger<MemoryStorage> {
    let config = LedgerConfig::new("Holdable Token", "htkn", Address::from("owner"), 0)
        .with_initial_supply_tokens("1000")
        .unwrap();
    Ledger::create(MemoryStorage::new(), config).await.unwrap()
}

/// Ledger where `sender` owns `amount` base units
async fn funded_sender(amount: u128) -> Ledger<MemoryStorage> {
    let (owner, sender, _, _) = accounts();
    let mut ledger = new_ledger().await;
    ledger.transfer(&owner, &sender, amount).await.unwrap();
    ledger
}

#[tokio::test]
async fn test_construction_metadata() {
    let ledger = new_ledger().await;
    let total = parse_units("1000").unwrap();

    assert_eq!(ledger.name().await.unwrap(), "Holdable Token");
    assert_eq!(ledger.symbol().await.unwrap(), "htkn");
    assert_eq!(ledger.decimals().await.unwrap(), 18);
    assert_eq!(ledger.total_supply().await.unwrap(), total);
    assert_eq!(ledger.balance_of(&Address::from("owner")).await.unwrap(), total);
}

#[tokio::test]
async fn test_owner_holds_without_transferring() {
    let (owner, _, recipient, _) = accounts();
    let mut ledger = new_ledger().await;

    ledger.hold(&owner, "h1", &recipient, 1000).await.unwrap();

    assert_eq!(ledger.held_balance_of(&owner).await.unwrap(), 1000);
    assert_eq!(ledger.balance_of(&recipient).await.unwrap(), 0);
}

#[tokio::test]
async fn test_held_funds_unavailable_for_transfer() {
    let (_, sender, recipient, _) = accounts();
    let mut ledger = funded_sender(1000).await;

    ledger.hold(&sender, "h1", &recipient, 1000).await.unwrap();

    let result = ledger.transfer(&sender, &recipient, 1000).await;
    assert_eq!(
        result,
        Err(LedgerError::InsufficientAvailableBalance {
            account: sender.clone(),
            available: 0,
            requested: 1000,
        })
    );
    assert_eq!(ledger.balance_of(&sender).await.unwrap(), 1000);
}

#[tokio::test]
async fn test_duplicate_hold_id_rejected() {
    let (_, sender, recipient, _) = accounts();
    let mut ledger = funded_sender(1000).await;

    ledger.hold(&sender, "h1", &recipient, 500).await.unwrap();
    assert_eq!(
        ledger.hold(&sender, "h1", &recipient, 500).await,
        Err(LedgerError::DuplicateHoldId("h1".into()))
    );
}

#[tokio::test]
async fn test_hold_without_available_balance_rejected() {
    let (_, sender, recipient, _) = accounts();
    let mut ledger = new_ledger().await;

    assert!(matches!(
        ledger.hold(&sender, "h1", &recipient, 1000).await,
        Err(LedgerError::InsufficientAvailableBalance { available: 0, .. })
    ));
}

#[tokio::test]
async fn test_empty_hold_id_rejected_regardless_of_balance() {
    let (owner, sender, recipient, _) = accounts();
    let mut ledger = funded_sender(1000).await;

    assert_eq!(
        ledger.hold(&sender, "", &recipient, 1000).await,
        Err(LedgerError::EmptyHoldId)
    );
    assert_eq!(
        ledger.hold(&owner, "", &recipient, 1).await,
        Err(LedgerError::EmptyHoldId)
    );
}

#[tokio::test]
async fn test_only_creator_executes_hold() {
    let (owner, sender, recipient, _) = accounts();
    let mut ledger = funded_sender(1000).await;
    ledger.hold(&sender, "h1", &recipient, 1000).await.unwrap();

    for intruder in [&recipient, &owner] {
        assert_eq!(
            ledger.execute_hold(intruder, &"h1".into()).await,
            Err(LedgerError::NotHoldCreator {
                id: "h1".into(),
                caller: intruder.clone(),
            })
        );
    }

    let hold = ledger.execute_hold(&sender, &"h1".into()).await.unwrap();
    assert_eq!(hold.status, HoldStatus::Executed);
    assert_eq!(ledger.held_balance_of(&sender).await.unwrap(), 0);
    assert_eq!(ledger.balance_of(&sender).await.unwrap(), 0);
    assert_eq!(ledger.balance_of(&recipient).await.unwrap(), 1000);
}

#[tokio::test]
async fn test_only_owner_removes_hold() {
    let (_, sender, recipient, _) = accounts();
    let mut ledger = funded_sender(1000).await;
    ledger.hold(&sender, "h1", &recipient, 1000).await.unwrap();

    assert_eq!(
        ledger.remove_hold(&sender, &"h1".into()).await,
        Err(LedgerError::NotAdmin(sender.clone()))
    );
    assert_eq!(ledger.held_balance_of(&sender).await.unwrap(), 1000);
}

#[tokio::test]
async fn test_removed_hold_frees_funds() {
    let (owner, sender, recipient, _) = accounts();
    let mut ledger = funded_sender(1000).await;
    ledger.hold(&sender, "h1", &recipient, 1000).await.unwrap();

    let hold = ledger.remove_hold(&owner, &"h1".into()).await.unwrap();
    assert_eq!(hold.status, HoldStatus::Removed);
    assert_eq!(ledger.held_balance_of(&sender).await.unwrap(), 0);

    ledger.transfer(&sender, &recipient, 1000).await.unwrap();
    assert_eq!(ledger.balance_of(&recipient).await.unwrap(), 1000);
    assert_eq!(ledger.balance_of(&sender).await.unwrap(), 0);
}

#[tokio::test]
async fn test_terminal_holds_fail_second_time() {
    let (owner, sender, recipient, _) = accounts();
    let mut ledger = funded_sender(1000).await;
    ledger.hold(&sender, "h1", &recipient, 100).await.unwrap();
    ledger.hold(&sender, "h2", &recipient, 100).await.unwrap();

    ledger.execute_hold(&sender, &"h1".into()).await.unwrap();
    assert!(matches!(
        ledger.execute_hold(&sender, &"h1".into()).await,
        Err(LedgerError::HoldNotActive { status: HoldStatus::Executed, .. })
    ));

    ledger.remove_hold(&owner, &"h2".into()).await.unwrap();
    assert!(matches!(
        ledger.remove_hold(&owner, &"h2".into()).await,
        Err(LedgerError::HoldNotActive { status: HoldStatus::Removed, .. })
    ));

    // ids stay taken after both kinds of terminal state
    for id in ["h1", "h2"] {
        assert_eq!(
            ledger.hold(&sender, id, &recipient, 1).await,
            Err(LedgerError::DuplicateHoldId(id.into()))
        );
    }
}

#[tokio::test]
async fn test_hold_from_requires_allowance() {
    let (_, sender, recipient, spender) = accounts();
    let mut ledger = funded_sender(700).await;

    assert!(matches!(
        ledger.hold_from(&spender, "h1", &sender, &recipient, 700).await,
        Err(LedgerError::AllowanceExceeded { allowance: 0, requested: 700, .. })
    ));
    assert_eq!(ledger.held_balance_of(&sender).await.unwrap(), 0);
}

#[tokio::test]
async fn test_hold_from_within_allowance() {
    let (_, sender, recipient, spender) = accounts();
    let mut ledger = funded_sender(1000).await;
    ledger.approve(&sender, &spender, 90).await.unwrap();

    let hold = ledger
        .hold_from(&spender, "h2", &sender, &recipient, 90)
        .await
        .unwrap();
    assert_eq!(hold.creator, spender);
    assert_eq!(hold.payer, sender);
    assert_eq!(ledger.held_balance_of(&sender).await.unwrap(), 90);

    assert!(matches!(
        ledger.hold_from(&spender, "h3", &sender, &recipient, 700).await,
        Err(LedgerError::AllowanceExceeded { .. })
    ));
}

#[tokio::test]
async fn test_hold_from_consumes_allowance_once() {
    let (_, sender, recipient, spender) = accounts();
    let mut ledger = funded_sender(1000).await;
    ledger.approve(&sender, &spender, 90).await.unwrap();

    ledger
        .hold_from(&spender, "h1", &sender, &recipient, 60)
        .await
        .unwrap();
    assert_eq!(ledger.allowance(&sender, &spender).await.unwrap(), 30);

    // the remaining 30 cannot back another 60
    assert!(matches!(
        ledger.hold_from(&spender, "h2", &sender, &recipient, 60).await,
        Err(LedgerError::AllowanceExceeded { allowance: 30, .. })
    ));

    // executing does not consume the allowance a second time
    ledger.execute_hold(&spender, &"h1".into()).await.unwrap();
    assert_eq!(ledger.allowance(&sender, &spender).await.unwrap(), 30);
    assert_eq!(ledger.balance_of(&recipient).await.unwrap(), 60);

    // nor can the payer execute a hold the spender created
    ledger
        .hold_from(&spender, "h3", &sender, &recipient, 30)
        .await
        .unwrap();
    assert!(matches!(
        ledger.execute_hold(&sender, &"h3".into()).await,
        Err(LedgerError::NotHoldCreator { .. })
    ));
}

#[tokio::test]
async fn test_removed_delegated_hold_does_not_restore_allowance() {
    let (owner, sender, recipient, spender) = accounts();
    let mut ledger = funded_sender(1000).await;
    ledger.approve(&sender, &spender, 90).await.unwrap();

    ledger
        .hold_from(&spender, "h1", &sender, &recipient, 90)
        .await
        .unwrap();
    let removed = ledger.remove_hold(&owner, &"h1".into()).await.unwrap();
    assert_eq!(removed.status, HoldStatus::Removed);

    assert_eq!(ledger.held_balance_of(&sender).await.unwrap(), 0);
    assert_eq!(ledger.allowance(&sender, &spender).await.unwrap(), 0);
    assert!(matches!(
        ledger.hold_from(&spender, "h2", &sender, &recipient, 1).await,
        Err(LedgerError::AllowanceExceeded { allowance: 0, requested: 1, .. })
    ));
}

#[tokio::test]
async fn test_hold_from_on_own_account_still_needs_allowance() {
    let (_, sender, recipient, _) = accounts();
    let mut ledger = funded_sender(1000).await;

    assert!(matches!(
        ledger.hold_from(&sender, "h1", &sender, &recipient, 100).await,
        Err(LedgerError::AllowanceExceeded { allowance: 0, requested: 100, .. })
    ));
    assert_eq!(ledger.get_hold(&"h1".into()).await.unwrap(), None);

    ledger.approve(&sender, &sender, 100).await.unwrap();
    ledger
        .hold_from(&sender, "h1", &sender, &recipient, 100)
        .await
        .unwrap();
    assert_eq!(ledger.allowance(&sender, &sender).await.unwrap(), 0);
    assert_eq!(ledger.held_balance_of(&sender).await.unwrap(), 100);
}

#[tokio::test]
async fn test_hold_listing() {
    let (owner, sender, recipient, _) = accounts();
    let mut ledger = funded_sender(1000).await;
    let generated = HoldId::generate();

    ledger.hold(&sender, "a", &recipient, 10).await.unwrap();
    ledger.hold(&sender, generated.clone(), &recipient, 20).await.unwrap();
    ledger.remove_hold(&owner, &"a".into()).await.unwrap();

    let all = ledger.holds_of(&sender).await.unwrap();
    assert_eq!(all.len(), 2);
    let active = ledger.active_holds_of(&sender).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, generated);
    assert_eq!(ledger.get_hold_required(&generated).await.unwrap().amount, 20);
}

#[tokio::test]
async fn test_concurrent_writers_stay_serializable() {
    let (owner, _, _, _) = accounts();
    let storage = MemoryStorage::new();
    let config = LedgerConfig::new("Holdable Token", "htkn", owner.clone(), 10_000)
        .with_max_commit_retries(1_000);
    let mut ledger = Ledger::create(storage.clone(), config).await.unwrap();

    let workers: Vec<Address> = (0..4).map(|i| Address::from(format!("worker-{}", i))).collect();
    for worker in &workers {
        ledger.transfer(&owner, worker, 1_000).await.unwrap();
    }

    let mut handles = Vec::new();
    for (index, worker) in workers.iter().cloned().enumerate() {
        let mut handle = Ledger::open(storage.clone()).with_max_commit_retries(1_000);
        let sink = Address::from("sink");
        handles.push(tokio::spawn(async move {
            for round in 0..25 {
                let id = format!("w{}-{}", index, round);
                handle.hold(&worker, id.as_str(), &sink, 10).await.unwrap();
                handle.execute_hold(&worker, &id.into()).await.unwrap();
                handle.transfer(&worker, &sink, 5).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // every worker moved 25 * (10 + 5) to the sink
    assert_eq!(ledger.balance_of(&Address::from("sink")).await.unwrap(), 4 * 375);
    for worker in &workers {
        assert_eq!(ledger.balance_of(worker).await.unwrap(), 1_000 - 375);
        assert_eq!(ledger.held_balance_of(worker).await.unwrap(), 0);
    }
    assert_eq!(ledger.total_supply().await.unwrap(), 10_000);

    // 4 funding transfers plus 4 workers * 25 rounds * 3 writes
    assert_eq!(storage.current_version().await.unwrap(), 4 + 300);
    assert!(ledger.validate_integrity().await.unwrap().is_valid);
}

#[tokio::test]
async fn test_config_from_json_file() {
    let path = std::env::temp_dir().join(format!("holdable-ledger-{}.json", HoldId::generate()));
    std::fs::write(
        &path,
        r#"{"name": "Holdable Token", "symbol": "htkn", "owner": "owner", "initial_supply": 500}"#,
    )
    .unwrap();

    let config = LedgerConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let ledger = Ledger::create(MemoryStorage::new(), config).await.unwrap();
    assert_eq!(ledger.balance_of(&Address::from("owner")).await.unwrap(), 500);
}
