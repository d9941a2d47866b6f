//! PostgreSQL indexer for the Network of Momentum dual-ledger chain.
//!
//! The indexer tails a node over WebSocket JSON-RPC: an initial catch-up
//! sync from the store's watermark to the chain frontier, then a live
//! momentum subscription guarded by a stall watchdog and exponential-backoff
//! reconnection. Each momentum becomes one idempotent batched write;
//! auxiliary loops keep cached state (pillars, sentinels, projects) and
//! bridge wrap/unwrap requests fresh under the same cancellation root.

pub mod client;
pub mod config;
pub mod db;
pub mod indexer;
pub mod models;
pub mod repository;

pub use client::{MomentumSubscription, NodeApi, NodeClient};
pub use config::Config;
pub use indexer::subscription::SubscriptionTimings;
pub use indexer::{CronIntervals, Indexer};
