use deepbook_ops::{
    coin::{MAX_MERGE_SOURCES, merge_all_coins, merge_owned_coins},
    testing::{self, MOCK_GAS, MockLedger},
    types::{Command, SUI_COIN_TYPE},
};

const USDC: &str = "0xa1ec7fc00a6f40db9693ad1415d0c193ad3906494428cf252621037bd7117e29::usdc::USDC";

#[tokio::test]
async fn test_merge_all_leaves_single_coin() {
    let ledger = MockLedger::new();
    let signer = testing::keypair(1);
    let owner = signer.address();
    let gas = ledger.add_coin(owner, SUI_COIN_TYPE, 5_000_000_000);
    for balance in [10, 20, 30, 40, 50] {
        ledger.add_coin(owner, USDC, balance);
    }

    merge_all_coins(&ledger, &signer, USDC, gas.object_id).await.unwrap();

    let coins = ledger.coins_of(owner, USDC);
    assert_eq!(coins.len(), 1);
    assert_eq!(coins[0].balance, 150);
    assert_eq!(ledger.calls("execute"), 1);
    assert_eq!(
        ledger.balance(owner, SUI_COIN_TYPE),
        5_000_000_000 - MOCK_GAS.net_gas_usage() as u64
    );
}

#[tokio::test]
async fn test_gas_coin_is_never_merged() {
    let ledger = MockLedger::new();
    let signer = testing::keypair(2);
    let owner = signer.address();
    let gas = ledger.add_coin(owner, SUI_COIN_TYPE, 5_000_000_000);
    for _ in 0..3 {
        ledger.add_coin(owner, SUI_COIN_TYPE, 1_000);
    }

    merge_all_coins(&ledger, &signer, SUI_COIN_TYPE, gas.object_id).await.unwrap();

    let coins = ledger.coins_of(owner, SUI_COIN_TYPE);
    assert_eq!(coins.len(), 2);
    assert!(coins.iter().any(|c| c.coin_object_id == gas.object_id));
    assert!(coins.iter().any(|c| c.balance == 3_000));
}

#[tokio::test]
async fn test_merges_across_pages() {
    let ledger = MockLedger::new();
    let signer = testing::keypair(3);
    let owner = signer.address();
    let gas = ledger.add_coin(owner, SUI_COIN_TYPE, 5_000_000_000);
    for _ in 0..120 {
        ledger.add_coin(owner, USDC, 1);
    }

    merge_all_coins(&ledger, &signer, USDC, gas.object_id).await.unwrap();

    let coins = ledger.coins_of(owner, USDC);
    assert_eq!(coins.len(), 1);
    assert_eq!(coins[0].balance, 120);
}

#[tokio::test]
async fn test_already_consolidated_is_a_no_op() {
    let ledger = MockLedger::new();
    let signer = testing::keypair(4);
    let owner = signer.address();
    let gas = ledger.add_coin(owner, SUI_COIN_TYPE, 5_000_000_000);
    ledger.add_coin(owner, USDC, 100);

    assert!(
        !merge_owned_coins(&ledger, &signer, owner, USDC, gas.object_id)
            .await
            .unwrap()
    );
    assert!(
        !merge_owned_coins(&ledger, &signer, owner, "0x2::missing::COIN", gas.object_id)
            .await
            .unwrap()
    );
    assert_eq!(ledger.calls("execute"), 0);
}

#[tokio::test]
async fn test_unapplied_merges_keep_reporting_work() {
    let ledger = MockLedger::new();
    let signer = testing::keypair(5);
    let owner = signer.address();
    let gas = ledger.add_coin(owner, SUI_COIN_TYPE, 5_000_000_000);
    ledger.add_coin(owner, USDC, 1);
    ledger.add_coin(owner, USDC, 2);
    ledger.set_inert_execution(true);

    // nothing changes on the ledger, so every round asks for another one
    for _ in 0..3 {
        assert!(
            merge_owned_coins(&ledger, &signer, owner, USDC, gas.object_id)
                .await
                .unwrap()
        );
    }
    assert_eq!(ledger.coins_of(owner, USDC).len(), 2);
    assert_eq!(ledger.calls("execute"), 3);
}

#[tokio::test]
async fn test_large_holdings_merge_in_bounded_batches() {
    let ledger = MockLedger::new();
    let signer = testing::keypair(6);
    let owner = signer.address();
    let gas = ledger.add_coin(owner, SUI_COIN_TYPE, 5_000_000_000);
    for _ in 0..1200 {
        ledger.add_coin(owner, USDC, 2);
    }

    merge_all_coins(&ledger, &signer, USDC, gas.object_id).await.unwrap();

    let coins = ledger.coins_of(owner, USDC);
    assert_eq!(coins.len(), 1);
    assert_eq!(coins[0].balance, 2_400);

    // 1200 -> 700 -> 200 -> 1
    let executed = ledger.executed();
    assert_eq!(executed.len(), 3);
    for tx in &executed {
        let ptb = tx.programmable();
        assert!(ptb.inputs.len() <= MAX_MERGE_SOURCES + 1);
        for command in &ptb.commands {
            let Command::MergeCoins(_, sources) = command else {
                panic!("unexpected command: {command:?}");
            };
            assert!(sources.len() <= MAX_MERGE_SOURCES);
        }
    }
}
