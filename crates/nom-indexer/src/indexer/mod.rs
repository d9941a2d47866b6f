//! The ingestion engine.
//!
//! One [`Indexer`] owns the node client, the repositories and the pillar
//! cache. [`Indexer::run`] launches the periodic syncers, performs the
//! initial catch-up and then hands control to the watchdog-driven
//! subscription loop. Everything stops cooperatively when the cancellation
//! root fires.

pub mod bridge;
pub mod cache;
pub mod cached;
pub mod cron;
pub mod decoder;
pub mod embedded;
pub mod processor;
pub mod rewards;
pub mod subscription;
pub mod sync;

use crate::client::NodeApi;
use crate::config::{parse_interval, CronConfig};
use crate::repository::Repositories;
use anyhow::Result;
use cache::PillarCache;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use subscription::SubscriptionTimings;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const CACHED_SYNC_INTERVAL: Duration = Duration::from_secs(300);
const BRIDGE_SYNC_INTERVAL: Duration = Duration::from_secs(60);

/// Intervals for the auxiliary cron loops.
#[derive(Debug, Clone, Copy)]
pub struct CronIntervals {
    pub voting_activity: Duration,
    pub token_holders: Duration,
}

impl CronIntervals {
    pub fn from_config(cfg: &CronConfig) -> Self {
        let parse = |name: &str, value: &str| {
            parse_interval(value).unwrap_or_else(|e| {
                warn!(interval = name, value, error = %e, "invalid cron interval, using 10m");
                Duration::from_secs(600)
            })
        };
        Self {
            voting_activity: parse("voting_activity_interval", &cfg.voting_activity_interval),
            token_holders: parse("token_holders_interval", &cfg.token_holders_interval),
        }
    }
}

impl Default for CronIntervals {
    fn default() -> Self {
        Self {
            voting_activity: Duration::from_secs(600),
            token_holders: Duration::from_secs(600),
        }
    }
}

pub struct Indexer {
    pub(crate) node: Arc<dyn NodeApi>,
    pub(crate) pool: PgPool,
    pub(crate) repos: Repositories,
    pub(crate) cache: RwLock<PillarCache>,
    pub(crate) heartbeat: Mutex<Instant>,
    pub(crate) timings: SubscriptionTimings,
    pub(crate) cron: CronIntervals,
    pub(crate) cancel: CancellationToken,
}

impl Indexer {
    pub fn new(node: Arc<dyn NodeApi>, pool: PgPool, cancel: CancellationToken) -> Arc<Self> {
        Self::with_timings(
            node,
            pool,
            cancel,
            SubscriptionTimings::default(),
            CronIntervals::default(),
        )
    }

    pub fn with_timings(
        node: Arc<dyn NodeApi>,
        pool: PgPool,
        cancel: CancellationToken,
        timings: SubscriptionTimings,
        cron: CronIntervals,
    ) -> Arc<Self> {
        Arc::new(Self {
            node,
            repos: Repositories::new(pool.clone()),
            pool,
            cache: RwLock::new(PillarCache::default()),
            heartbeat: Mutex::new(Instant::now()),
            timings,
            cron,
            cancel,
        })
    }

    /// Run to completion: periodic syncers, initial catch-up, then the
    /// reconnecting subscription loop. Returns once the cancellation root
    /// fires (or on a fatal initial-sync error).
    pub async fn run(self: Arc<Self>) -> Result<()> {
        info!("starting indexer");
        let bridge = tokio::spawn(Arc::clone(&self).run_bridge_sync_loop(BRIDGE_SYNC_INTERVAL));
        let cached = tokio::spawn(Arc::clone(&self).run_cached_state_loop(CACHED_SYNC_INTERVAL));
        let holders =
            tokio::spawn(Arc::clone(&self).run_token_holders_loop(self.cron.token_holders));
        let voting =
            tokio::spawn(Arc::clone(&self).run_voting_activity_loop(self.cron.voting_activity));

        let result = match self.catch_up().await {
            Err(e) if !self.cancel.is_cancelled() => Err(e.context("initial sync failed")),
            _ => {
                info!("initial sync complete, starting real-time subscription");
                let (reconnect_tx, reconnect_rx) = mpsc::channel(1);
                let watchdog = tokio::spawn(Arc::clone(&self).run_watchdog(reconnect_tx));
                let res = Arc::clone(&self).run_subscription_loop(reconnect_rx).await;
                let _ = watchdog.await;
                res
            }
        };
        // Every exit path stops the periodic loops.
        self.cancel.cancel();
        let _ = tokio::join!(bridge, cached, holders, voting);
        result
    }

    pub(crate) fn touch_heartbeat(&self) {
        *self.heartbeat.lock().expect("heartbeat lock") = Instant::now();
    }

    pub(crate) fn heartbeat_elapsed(&self) -> Duration {
        self.heartbeat.lock().expect("heartbeat lock").elapsed()
    }

    /// Owner address for a pillar name from the cache, empty when unknown.
    pub(crate) async fn pillar_owner(&self, name: &str) -> String {
        self.cache.read().await.owner_of(name)
    }

    /// Current cached pillar list.
    pub async fn pillar_snapshot(&self) -> Vec<crate::models::Pillar> {
        self.cache.read().await.snapshot()
    }
}
