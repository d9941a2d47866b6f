//! Bridge syncers: stop-height page-back over the newest-first wrap and
//! unwrap request listings.
//!
//! Pagination continues until a page contains a row at or below the stop
//! height (so every unfinalized record is re-observed each tick) or the
//! listing runs out. A stop height of 0 means a full scan.

use super::Indexer;
use crate::models::{UnwrapTokenRequest, WrapTokenRequest};
use crate::models::saturating_i64;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

const BRIDGE_PAGE_SIZE: u32 = 100;

/// True when any row height in the page reaches back to the stop height.
pub(crate) fn reached_stop_height(
    stop_height: i64,
    page_heights: impl IntoIterator<Item = i64>,
) -> bool {
    stop_height > 0 && page_heights.into_iter().any(|h| h <= stop_height)
}

impl Indexer {
    pub(crate) async fn run_bridge_sync_loop(self: Arc<Self>, every: Duration) {
        info!(interval = ?every, "starting bridge sync loop");
        let mut ticker = interval(every);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("bridge sync loop stopped");
                    return;
                }
                _ = ticker.tick() => self.sync_bridge_data().await,
            }
        }
    }

    pub async fn sync_bridge_data(&self) {
        debug!("bridge sync: starting");
        if let Err(e) = self.update_bridge_wrap_requests().await {
            warn!(error = %e, "bridge sync: failed to update wrap requests");
        }
        if let Err(e) = self.update_bridge_unwrap_requests().await {
            warn!(error = %e, "bridge sync: failed to update unwrap requests");
        }
        debug!("bridge sync: complete");
    }

    async fn update_bridge_wrap_requests(&self) -> Result<()> {
        let stop_height = self
            .repos
            .bridge
            .wrap_sync_stop_height()
            .await
            .context("failed to get wrap sync stop height")?;
        debug!(stop_height, "wrap sync starting");

        let mut page_index = 0u32;
        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }
            let page = self
                .node
                .wrap_token_requests(page_index, BRIDGE_PAGE_SIZE)
                .await?;
            if page.list.is_empty() {
                break;
            }

            for w in &page.list {
                let request = WrapTokenRequest {
                    id: w.id.clone(),
                    network_class: w.network_class,
                    chain_id: w.chain_id,
                    to_address: w.to_address.clone(),
                    token_standard: w.token_standard.clone(),
                    token_address: w.token_address.clone(),
                    amount: saturating_i64(w.amount.0, "wrap_amount", &w.id),
                    fee: saturating_i64(w.fee.0, "wrap_fee", &w.id),
                    signature: w.signature.clone(),
                    creation_momentum_height: w.creation_momentum_height as i64,
                    confirmations_to_finality: w.confirmations_to_finality as i32,
                };
                if let Err(e) = self.repos.bridge.upsert_wrap_request(&request).await {
                    warn!(id = %w.id, error = %e, "failed to upsert wrap request");
                }
            }

            if reached_stop_height(
                stop_height,
                page.list.iter().map(|w| w.creation_momentum_height as i64),
            ) {
                debug!(page_index, stop_height, "wrap sync reached stop height");
                break;
            }
            if page.list.len() < BRIDGE_PAGE_SIZE as usize {
                break;
            }
            page_index += 1;
        }

        info!(pages_processed = page_index + 1, stop_height, "bridge sync: wrap requests done");
        Ok(())
    }

    async fn update_bridge_unwrap_requests(&self) -> Result<()> {
        let stop_height = self
            .repos
            .bridge
            .unwrap_sync_stop_height()
            .await
            .context("failed to get unwrap sync stop height")?;
        debug!(stop_height, "unwrap sync starting");

        let mut page_index = 0u32;
        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }
            let page = self
                .node
                .unwrap_token_requests(page_index, BRIDGE_PAGE_SIZE)
                .await?;
            if page.list.is_empty() {
                break;
            }

            for u in &page.list {
                let request = UnwrapTokenRequest {
                    transaction_hash: u.transaction_hash.clone(),
                    log_index: u.log_index,
                    network_class: u.network_class,
                    chain_id: u.chain_id,
                    to_address: u.to_address.clone(),
                    token_standard: u.token_standard.clone(),
                    token_address: u.token_address.clone(),
                    amount: saturating_i64(u.amount.0, "unwrap_amount", &u.transaction_hash),
                    signature: u.signature.clone(),
                    registration_momentum_height: u.registration_momentum_height as i64,
                    redeemed: u.redeemed > 0,
                    revoked: u.revoked > 0,
                    redeemable_in: u.redeemable_in,
                };
                if let Err(e) = self.repos.bridge.upsert_unwrap_request(&request).await {
                    warn!(
                        tx_hash = %u.transaction_hash,
                        log_index = u.log_index,
                        error = %e,
                        "failed to upsert unwrap request"
                    );
                }
            }

            if reached_stop_height(
                stop_height,
                page.list
                    .iter()
                    .map(|u| u.registration_momentum_height as i64),
            ) {
                debug!(page_index, stop_height, "unwrap sync reached stop height");
                break;
            }
            if page.list.len() < BRIDGE_PAGE_SIZE as usize {
                break;
            }
            page_index += 1;
        }

        info!(pages_processed = page_index + 1, stop_height, "bridge sync: unwrap requests done");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_height_zero_never_stops() {
        assert!(!reached_stop_height(0, vec![1, 2, 3]));
        assert!(!reached_stop_height(0, Vec::new()));
    }

    #[test]
    fn stops_when_page_reaches_back_to_stop_height() {
        assert!(reached_stop_height(1000, vec![1500, 1200, 1000]));
        assert!(reached_stop_height(1000, vec![1500, 999]));
        assert!(!reached_stop_height(1000, vec![1500, 1200, 1001]));
    }
}
