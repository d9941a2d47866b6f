//! Live subscription session, stall watchdog and reconnect loop.
//!
//! The watchdog trips when no momentum (or successful subscribe) has touched
//! the heartbeat within the stall window and pokes the single-slot reconnect
//! channel. The reconnect loop wraps sessions in exponential backoff and
//! catches up any momentums missed during the gap before resubscribing.

use super::Indexer;
use anyhow::{anyhow, Result};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep};
use tracing::{error, info, warn};

/// Watchdog and backoff timings; tests shrink these to milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionTimings {
    pub watchdog_interval: Duration,
    pub stall_after: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_jitter: Duration,
}

impl Default for SubscriptionTimings {
    fn default() -> Self {
        Self {
            watchdog_interval: Duration::from_secs(30),
            stall_after: Duration::from_secs(60),
            initial_backoff: Duration::from_secs(5),
            max_backoff: Duration::from_secs(300),
            backoff_jitter: Duration::from_millis(500),
        }
    }
}

/// How a subscription session came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Cancelled,
    Reconnect,
}

impl Indexer {
    /// One subscription session: subscribe, then consume header batches
    /// until cancellation, a watchdog reconnect signal, or channel close.
    /// Per-momentum processing errors are logged and skipped.
    pub(crate) async fn run_session(
        &self,
        reconnect_rx: &mut mpsc::Receiver<()>,
    ) -> Result<SessionEnd> {
        // Drop any stale watchdog signal raised before this session existed.
        while reconnect_rx.try_recv().is_ok() {}

        let mut subscription = self
            .node
            .subscribe_momentums()
            .await
            .map_err(|e| anyhow!("failed to subscribe to momentums: {e}"))?;
        self.touch_heartbeat();
        info!("subscribed to momentums");

        let end = loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break Ok(SessionEnd::Cancelled),
                signal = reconnect_rx.recv() => {
                    if signal.is_none() {
                        break Err(anyhow!("reconnect channel closed"));
                    }
                    info!("watchdog requested reconnect");
                    break Ok(SessionEnd::Reconnect);
                }
                headers = subscription.next() => {
                    let Some(headers) = headers else {
                        break Err(anyhow!("momentum subscription closed"));
                    };
                    for header in headers {
                        self.touch_heartbeat();
                        self.process_subscribed_momentum(header.height).await;
                    }
                }
            }
        };
        subscription.unsubscribe().await;
        end
    }

    /// Fetch the full momentum behind a subscription header and process it.
    async fn process_subscribed_momentum(&self, height: u64) {
        info!(height, "received new momentum");
        let full = match self.node.momentums_by_height(height, 1).await {
            Ok(list) => list.list.into_iter().next(),
            Err(e) => {
                error!(height, error = %e, "failed to get momentum details");
                return;
            }
        };
        let Some(momentum) = full else {
            error!(height, "momentum not found");
            return;
        };
        if let Err(e) = self.process_momentum(&momentum).await {
            error!(height, error = %e, "failed to process momentum");
        }
    }

    /// Watchdog: periodically compare the heartbeat against the stall
    /// window; on a stall, poke the reconnect channel (dropped if a signal
    /// is already pending).
    pub(crate) async fn run_watchdog(self: Arc<Self>, reconnect_tx: mpsc::Sender<()>) {
        let mut ticker = interval(self.timings.watchdog_interval);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = ticker.tick() => {
                    let elapsed = self.heartbeat_elapsed();
                    if elapsed > self.timings.stall_after {
                        warn!(?elapsed, "momentum stream stalled, requesting reconnect");
                        let _ = reconnect_tx.try_send(());
                    }
                }
            }
        }
    }

    /// Reconnect loop: run sessions forever, sleeping an exponentially
    /// increasing backoff between them and catching up missed momentums
    /// before each resubscribe.
    pub(crate) async fn run_subscription_loop(
        self: Arc<Self>,
        mut reconnect_rx: mpsc::Receiver<()>,
    ) -> Result<()> {
        let mut backoff = self.timings.initial_backoff;
        loop {
            match self.run_session(&mut reconnect_rx).await {
                Ok(SessionEnd::Cancelled) => return Ok(()),
                Ok(SessionEnd::Reconnect) => {}
                Err(e) => warn!(error = %e, "subscription session ended"),
            }
            if self.cancel.is_cancelled() {
                return Ok(());
            }

            let jitter_max = self.timings.backoff_jitter.as_millis().max(1) as u64;
            let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..jitter_max));
            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(()),
                _ = sleep(backoff + jitter) => {}
            }

            if let Err(e) = self.node.reconnect().await {
                warn!(error = %e, "node reconnect failed");
            }
            if let Err(e) = self.catch_up().await {
                warn!(error = %e, "catch-up after reconnect failed");
            }

            backoff = (backoff * 2).min(self.timings.max_backoff);
        }
    }
}
