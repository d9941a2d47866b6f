//! Watchdog-driven reconnection with shortened timings.
//!
//! Skipped (early return) when `NOM_INDEXER_TEST_DATABASE_URL` is unset.

mod common;

use common::{momentum, test_pool, MockNode, DB_LOCK};
use nom_indexer::{CronIntervals, Indexer, SubscriptionTimings};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn stalled_stream_triggers_reconnect_and_resubscribe() {
    let _guard = DB_LOCK.lock().await;
    let Some(pool) = test_pool().await else {
        eprintln!("skipping stalled_stream_triggers_reconnect_and_resubscribe: no test database");
        return;
    };

    let node = Arc::new(MockNode::new());
    node.push_momentum(momentum(1, 1_700_000_001, &[]));

    let timings = SubscriptionTimings {
        watchdog_interval: Duration::from_millis(50),
        stall_after: Duration::from_millis(100),
        initial_backoff: Duration::from_millis(20),
        max_backoff: Duration::from_millis(100),
        backoff_jitter: Duration::from_millis(1),
    };
    let cancel = CancellationToken::new();
    let indexer = Indexer::with_timings(
        Arc::clone(&node) as _,
        pool.clone(),
        cancel.clone(),
        timings,
        CronIntervals::default(),
    );

    let handle = tokio::spawn(indexer.run());

    // First session comes up and processes one live notification.
    timeout(Duration::from_secs(10), async {
        while node.subscribe_count() < 1 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("first subscription");
    node.notify(json!([{"hash": format!("{:064x}", 1), "height": 1, "timestamp": 1_700_000_001}]));

    // Then the stream goes quiet; the watchdog must force a new session.
    timeout(Duration::from_secs(10), async {
        while node.subscribe_count() < 2 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("watchdog reconnect");

    cancel.cancel();
    timeout(Duration::from_secs(10), handle)
        .await
        .expect("shutdown")
        .expect("join")
        .expect("run result");

    assert!(node.subscribe_count() >= 2);
    let height: Option<i64> = sqlx::query_scalar("SELECT MAX(height) FROM momentums")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(height, Some(1));
}
