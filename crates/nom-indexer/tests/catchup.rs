//! Catch-up sync against a scripted node and a live PostgreSQL.
//!
//! Skipped (early return) when `NOM_INDEXER_TEST_DATABASE_URL` is unset.

mod common;

use common::{momentum, test_pool, MockNode, DB_LOCK};
use nom_indexer::Indexer;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn catch_up_from_empty_database() {
    let _guard = DB_LOCK.lock().await;
    let Some(pool) = test_pool().await else {
        eprintln!("skipping catch_up_from_empty_database: no test database");
        return;
    };

    let node = Arc::new(MockNode::new());
    for height in 1..=5 {
        node.push_momentum(momentum(height, 1_700_000_000 + height as i64, &[]));
    }

    let indexer = Indexer::new(node, pool.clone(), CancellationToken::new());
    indexer.catch_up().await.expect("catch-up");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM momentums")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 5);
    let max_height: Option<i64> = sqlx::query_scalar("SELECT MAX(height) FROM momentums")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(max_height, Some(5));
    let blocks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account_blocks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(blocks, 0);
}

#[tokio::test]
async fn replaying_momentums_is_idempotent() {
    let _guard = DB_LOCK.lock().await;
    let Some(pool) = test_pool().await else {
        eprintln!("skipping replaying_momentums_is_idempotent: no test database");
        return;
    };

    let node = Arc::new(MockNode::new());
    for height in 1..=3 {
        node.push_momentum(momentum(height, 1_700_000_000 + height as i64, &[]));
    }

    let indexer = Indexer::new(Arc::clone(&node) as _, pool.clone(), CancellationToken::new());
    indexer.catch_up().await.expect("first catch-up");

    // A second catch-up is a no-op, and reprocessing a momentum directly
    // must not duplicate anything.
    indexer.catch_up().await.expect("second catch-up");
    let m2 = node.momentums.lock().unwrap()[1].clone();
    indexer.process_momentum(&m2).await.expect("replay");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM momentums")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 3);
}
