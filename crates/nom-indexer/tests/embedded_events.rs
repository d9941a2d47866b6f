//! Embedded-contract event scenarios: stake lifecycle, pillar registration,
//! reward classification.
//!
//! Skipped (early return) when `NOM_INDEXER_TEST_DATABASE_URL` is unset.

mod common;

use common::{momentum, test_pool, MockNode, DB_LOCK};
use nom_indexer::client::api::{AccountBlock, Amount};
use nom_indexer::models::{self, block_type, RewardType};
use nom_indexer::repository::Repositories;
use nom_indexer::Indexer;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use znn_abi::abi::Value;
use znn_abi::{constants, embedded, stake_cancel_id, types, Hash};

const USER: &str = "z1qqjnwjjpnue8xmmpanz6csze6tcmtzzdtfsww7";

fn hex_hash(byte: u8) -> String {
    Hash([byte; 32]).to_string()
}

fn contract_receive(
    hash: &str,
    contract: &'static str,
    paired: AccountBlock,
    descendants: Vec<AccountBlock>,
) -> AccountBlock {
    AccountBlock {
        hash: hash.to_string(),
        block_type: block_type::CONTRACT_RECEIVE,
        height: 1,
        address: contract.to_string(),
        paired_account_block: Some(Box::new(paired)),
        descendant_blocks: descendants,
        ..Default::default()
    }
}

fn user_send(hash: &str, to: &'static str, amount: i128, data: Vec<u8>) -> AccountBlock {
    AccountBlock {
        hash: hash.to_string(),
        block_type: block_type::USER_SEND,
        height: 1,
        address: USER.to_string(),
        to_address: to.to_string(),
        amount: Amount(amount),
        token_standard: constants::ZNN_TOKEN_STANDARD.to_string(),
        data,
        ..Default::default()
    }
}

#[tokio::test]
async fn stake_then_cancel() {
    let _guard = DB_LOCK.lock().await;
    let Some(pool) = test_pool().await else {
        eprintln!("skipping stake_then_cancel: no test database");
        return;
    };

    let stake_id = hex_hash(0xaa);
    let node = Arc::new(MockNode::new());

    let stake_data = embedded::STAKE
        .encode_call("Stake", &[Value::Number(3600)])
        .unwrap();
    let receive_hash = hex_hash(0xb1);
    node.put_block(contract_receive(
        &receive_hash,
        constants::STAKE_ADDRESS,
        user_send(&stake_id, constants::STAKE_ADDRESS, 1000, stake_data),
        Vec::new(),
    ));
    node.push_momentum(momentum(100, 1_700_000_100, &[&receive_hash]));

    let cancel_data = embedded::STAKE
        .encode_call("Cancel", &[Value::Hash(stake_id.parse().unwrap())])
        .unwrap();
    let cancel_send = hex_hash(0xcc);
    let cancel_receive = hex_hash(0xc1);
    node.put_block(contract_receive(
        &cancel_receive,
        constants::STAKE_ADDRESS,
        user_send(&cancel_send, constants::STAKE_ADDRESS, 0, cancel_data),
        Vec::new(),
    ));
    node.push_momentum(momentum(200, 1_700_000_200, &[&cancel_receive]));

    let indexer = Indexer::new(node, pool.clone(), CancellationToken::new());
    indexer.catch_up().await.expect("catch-up");

    let repos = Repositories::new(pool);
    let stake = repos
        .stake
        .get_by_id(&stake_id)
        .await
        .unwrap()
        .expect("stake row");
    assert!(!stake.is_active);
    assert_eq!(stake.cancel_id, stake_cancel_id(&stake_id));
    assert_eq!(stake.duration_in_sec, 3600);
    assert_eq!(stake.start_timestamp, 1_700_000_100);
    assert_eq!(stake.expiration_timestamp, 1_700_000_100 + 3600);
    assert_eq!(stake.znn_amount, 1000);
    assert_eq!(stake.address, USER);
}

#[tokio::test]
async fn pillar_register_records_update_and_spawn_burn() {
    let _guard = DB_LOCK.lock().await;
    let Some(pool) = test_pool().await else {
        eprintln!("skipping pillar_register_records_update_and_spawn_burn: no test database");
        return;
    };

    let repos = Repositories::new(pool.clone());
    // The pillar row appears via the cached-state sync before its
    // registration momentum is processed.
    repos
        .pillar
        .upsert(&models::Pillar {
            owner_address: USER.to_string(),
            name: "X".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let producer = types::encode_address(&[2u8; 20]);
    let reward = types::encode_address(&[3u8; 20]);
    let register_data = embedded::PILLAR
        .encode_call(
            "Register",
            &[
                Value::String("X".into()),
                Value::Address(producer.clone()),
                Value::Address(reward.clone()),
                Value::Number(0),
                Value::Number(0),
            ],
        )
        .unwrap();

    let burn = AccountBlock {
        hash: hex_hash(0xd2),
        block_type: block_type::CONTRACT_SEND,
        address: constants::PILLAR_ADDRESS.to_string(),
        to_address: constants::TOKEN_ADDRESS.to_string(),
        amount: Amount(15_000),
        ..Default::default()
    };
    let receive_hash = hex_hash(0xd1);
    let node = Arc::new(MockNode::new());
    node.put_block(contract_receive(
        &receive_hash,
        constants::PILLAR_ADDRESS,
        user_send(&hex_hash(0xd0), constants::PILLAR_ADDRESS, 0, register_data),
        vec![burn],
    ));
    node.push_momentum(momentum(300, 1_700_000_300, &[&receive_hash]));

    let indexer = Indexer::new(node, pool.clone(), CancellationToken::new());
    indexer.catch_up().await.expect("catch-up");

    let pillar = repos
        .pillar
        .get_by_owner(USER)
        .await
        .unwrap()
        .expect("pillar row");
    assert_eq!(pillar.slot_cost_qsr, 15_000);
    assert_eq!(pillar.spawn_timestamp, 1_700_000_300);

    let updates: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pillar_updates WHERE name = 'X'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(updates, 1);
    let (owner, producer_col): (String, String) = sqlx::query_as(
        "SELECT owner_address, producer_address FROM pillar_updates WHERE name = 'X'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(owner, USER);
    assert_eq!(producer_col, producer);
}

#[tokio::test]
async fn stake_reward_accumulates_once() {
    let _guard = DB_LOCK.lock().await;
    let Some(pool) = test_pool().await else {
        eprintln!("skipping stake_reward_accumulates_once: no test database");
        return;
    };

    let node = Arc::new(MockNode::new());
    let reward_send = AccountBlock {
        hash: hex_hash(0xe0),
        block_type: block_type::CONTRACT_SEND,
        address: constants::STAKE_ADDRESS.to_string(),
        to_address: USER.to_string(),
        amount: Amount(50),
        token_standard: constants::ZNN_TOKEN_STANDARD.to_string(),
        ..Default::default()
    };
    let receive_hash = hex_hash(0xe1);
    node.put_block(AccountBlock {
        hash: receive_hash.clone(),
        block_type: block_type::USER_RECEIVE,
        height: 9,
        address: USER.to_string(),
        to_address: constants::EMPTY_ADDRESS.to_string(),
        token_standard: constants::EMPTY_TOKEN_STANDARD.to_string(),
        paired_account_block: Some(Box::new(reward_send)),
        ..Default::default()
    });
    node.push_momentum(momentum(400, 1_700_000_400, &[&receive_hash]));

    let indexer = Indexer::new(Arc::clone(&node) as _, pool.clone(), CancellationToken::new());
    indexer.catch_up().await.expect("catch-up");
    // Apply the same momentum a second time.
    let m = node.momentums.lock().unwrap()[0].clone();
    indexer.process_momentum(&m).await.expect("replay");

    let repos = Repositories::new(pool.clone());
    let rewards: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reward_transactions WHERE address = $1")
            .bind(USER)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(rewards, 1);

    let reward_type: i16 =
        sqlx::query_scalar("SELECT reward_type FROM reward_transactions WHERE address = $1")
            .bind(USER)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(reward_type, RewardType::Stake.as_i16());

    let cumulative = repos
        .reward
        .cumulative_amount(USER, RewardType::Stake.as_i16(), constants::ZNN_TOKEN_STANDARD)
        .await
        .unwrap();
    assert_eq!(cumulative, Some(50));
}

#[tokio::test]
async fn reward_details_join_walks_descendant_chain() {
    let _guard = DB_LOCK.lock().await;
    let Some(pool) = test_pool().await else {
        eprintln!("skipping reward_details_join_walks_descendant_chain: no test database");
        return;
    };

    let repos = Repositories::new(pool);
    let receive = models::AccountBlock {
        hash: hex_hash(0xf1),
        token_standard: constants::ZNN_TOKEN_STANDARD.to_string(),
        amount: 10,
        momentum_height: 5,
        ..Default::default()
    };
    let mint = models::AccountBlock {
        hash: hex_hash(0xf2),
        address: constants::STAKE_ADDRESS.to_string(),
        paired_account_block: "link-1".to_string(),
        ..Default::default()
    };
    let collect = models::AccountBlock {
        hash: hex_hash(0xf3),
        paired_account_block: "link-2".to_string(),
        ..Default::default()
    };
    repos
        .account_block
        .insert(&receive, None)
        .await
        .unwrap();
    repos
        .account_block
        .insert(
            &mint,
            Some(&models::TxData {
                method: "Mint".into(),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
    repos
        .account_block
        .insert(
            &collect,
            Some(&models::TxData {
                method: "CollectReward".into(),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
    // descendant_of is carried by a separate update on the real path.
    repos
        .account_block
        .update_descendant_of(&receive.hash, "link-1")
        .await
        .unwrap();
    repos
        .account_block
        .update_descendant_of(&mint.hash, "link-2")
        .await
        .unwrap();

    let details = repos
        .account_block
        .reward_details(&receive.hash, znn_abi::reward_contract_addresses())
        .await
        .unwrap()
        .expect("reward details");
    assert_eq!(details.reward_amount, 10);
    assert_eq!(details.source, constants::STAKE_ADDRESS);
    assert_eq!(details.token_standard, constants::ZNN_TOKEN_STANDARD);
}
