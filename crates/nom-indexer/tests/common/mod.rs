//! Common helpers for integration tests: a scripted node and a PostgreSQL
//! fixture.
//!
//! Database-backed tests need a live PostgreSQL pointed to by
//! `NOM_INDEXER_TEST_DATABASE_URL`; they return early when it is unset so
//! the suite passes on machines without one.

#![allow(dead_code)]

use async_trait::async_trait;
use nom_indexer::client::api::{
    AccountBlock, AccountInfo, Momentum, MomentumList, PillarInfoList, ProjectList,
    SentinelInfoList, UnwrapTokenRequestInfo, UnwrapTokenRequestList, WrapTokenRequestInfo,
    WrapTokenRequestList,
};
use nom_indexer::client::ws::RpcError;
use nom_indexer::client::{MomentumSubscription, NodeApi};
use once_cell::sync::Lazy;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Serializes database-backed tests; they share one database.
pub static DB_LOCK: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

const TABLES: &[&str] = &[
    "momentums",
    "accounts",
    "account_blocks",
    "balances",
    "tokens",
    "pillars",
    "pillar_updates",
    "sentinels",
    "stakes",
    "fusions",
    "projects",
    "project_phases",
    "votes",
    "cumulative_rewards",
    "reward_transactions",
    "wrap_token_requests",
    "unwrap_token_requests",
];

/// Connect to the test database, run migrations and truncate all tables.
/// `None` when `NOM_INDEXER_TEST_DATABASE_URL` is unset.
pub async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("NOM_INDEXER_TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database");
    let migrations = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    sqlx::migrate::Migrator::new(migrations.as_path())
        .await
        .expect("load migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    for table in TABLES {
        sqlx::query(&format!("TRUNCATE {table} CASCADE"))
            .execute(&pool)
            .await
            .expect("truncate");
    }
    Some(pool)
}

/// A scripted node. Fields are plain data; tests fill in what a scenario
/// needs and the trait impl serves it back.
#[derive(Default)]
pub struct MockNode {
    pub momentums: Mutex<Vec<Momentum>>,
    pub blocks: Mutex<HashMap<String, AccountBlock>>,
    pub pillars: Mutex<PillarInfoList>,
    /// Newest-first, as the bridge API returns them.
    pub wraps: Mutex<Vec<WrapTokenRequestInfo>>,
    pub unwraps: Mutex<Vec<UnwrapTokenRequestInfo>>,
    pub wrap_pages_fetched: AtomicUsize,
    pub unwrap_pages_fetched: AtomicUsize,
    pub subscribe_count: AtomicUsize,
    sub_tx: Mutex<Option<mpsc::Sender<serde_json::Value>>>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_momentum(&self, m: Momentum) {
        self.momentums.lock().unwrap().push(m);
    }

    pub fn put_block(&self, block: AccountBlock) {
        self.blocks.lock().unwrap().insert(block.hash.clone(), block);
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscribe_count.load(Ordering::SeqCst)
    }

    /// Push one notification batch into the live subscription, if any.
    pub fn notify(&self, value: serde_json::Value) {
        if let Some(tx) = self.sub_tx.lock().unwrap().as_ref() {
            let _ = tx.try_send(value);
        }
    }

    fn page<T: Clone>(list: &[T], page: u32, per_page: u32) -> Vec<T> {
        let start = (page as usize) * (per_page as usize);
        if start >= list.len() {
            return Vec::new();
        }
        let end = (start + per_page as usize).min(list.len());
        list[start..end].to_vec()
    }
}

#[async_trait]
impl NodeApi for MockNode {
    async fn frontier_momentum(&self) -> Result<Momentum, RpcError> {
        self.momentums
            .lock()
            .unwrap()
            .last()
            .cloned()
            .ok_or_else(|| RpcError::Rpc("empty chain".into()))
    }

    async fn momentums_by_height(
        &self,
        height: u64,
        count: u64,
    ) -> Result<MomentumList, RpcError> {
        let list: Vec<Momentum> = self
            .momentums
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.height >= height && m.height < height + count)
            .cloned()
            .collect();
        Ok(MomentumList {
            count: list.len() as u64,
            list,
        })
    }

    async fn account_block_by_hash(&self, hash: &str) -> Result<Option<AccountBlock>, RpcError> {
        Ok(self.blocks.lock().unwrap().get(hash).cloned())
    }

    async fn account_info_by_address(&self, address: &str) -> Result<AccountInfo, RpcError> {
        Ok(AccountInfo {
            address: address.to_string(),
            ..Default::default()
        })
    }

    async fn pillars(&self, page: u32, _per_page: u32) -> Result<PillarInfoList, RpcError> {
        if page > 0 {
            return Ok(PillarInfoList::default());
        }
        let pillars = self.pillars.lock().unwrap();
        Ok(PillarInfoList {
            count: pillars.list.len() as u64,
            list: pillars.list.clone(),
        })
    }

    async fn active_sentinels(
        &self,
        _page: u32,
        _per_page: u32,
    ) -> Result<SentinelInfoList, RpcError> {
        Ok(SentinelInfoList::default())
    }

    async fn projects(&self, _page: u32, _per_page: u32) -> Result<ProjectList, RpcError> {
        Ok(ProjectList::default())
    }

    async fn wrap_token_requests(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<WrapTokenRequestList, RpcError> {
        self.wrap_pages_fetched.fetch_add(1, Ordering::SeqCst);
        let list = Self::page(&self.wraps.lock().unwrap(), page, per_page);
        Ok(WrapTokenRequestList {
            count: list.len() as u64,
            list,
        })
    }

    async fn unwrap_token_requests(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<UnwrapTokenRequestList, RpcError> {
        self.unwrap_pages_fetched.fetch_add(1, Ordering::SeqCst);
        let list = Self::page(&self.unwraps.lock().unwrap(), page, per_page);
        Ok(UnwrapTokenRequestList {
            count: list.len() as u64,
            list,
        })
    }

    async fn subscribe_momentums(&self) -> Result<MomentumSubscription, RpcError> {
        let (tx, rx) = mpsc::channel(16);
        *self.sub_tx.lock().unwrap() = Some(tx);
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);
        Ok(MomentumSubscription::from_channel(rx))
    }

    async fn reconnect(&self) -> Result<(), RpcError> {
        Ok(())
    }
}

/// A height-`h` momentum with the given content hashes.
pub fn momentum(height: u64, timestamp: i64, content_hashes: &[&str]) -> Momentum {
    Momentum {
        hash: format!("{height:064x}"),
        height,
        timestamp_unix: timestamp,
        timestamp,
        producer: "z1producer".to_string(),
        content: content_hashes
            .iter()
            .map(|h| nom_indexer::client::api::AccountHeader {
                address: "z1someaddress".to_string(),
                hash: h.to_string(),
                height: 1,
            })
            .collect(),
    }
}
