//! Catch-up sync: drive momentum processing from the store's watermark to
//! the node's frontier in fixed-size pages.

use super::Indexer;
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const SYNC_BATCH_SIZE: u64 = 100;
const EMPTY_PAGE_RETRY: Duration = Duration::from_secs(1);

impl Indexer {
    /// Sync from `max(momentums.height)` to the frontier. Returns early
    /// (`Ok`) on cancellation; any processing error aborts the whole run.
    pub async fn catch_up(&self) -> Result<()> {
        if let Err(e) = self.update_cached_data().await {
            warn!(error = %e, "failed to update cached data");
        }
        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }

            let db_height = self
                .repos
                .momentum
                .latest_height()
                .await
                .context("failed to get latest height")?;
            let frontier = self
                .node
                .frontier_momentum()
                .await
                .context("failed to get frontier momentum")?
                .height;

            if db_height >= frontier {
                info!(height = db_height, "sync complete");
                return Ok(());
            }

            // Genesis momentum is at height 1.
            let start_height = if db_height == 0 { 1 } else { db_height + 1 };

            let momentums = self
                .node
                .momentums_by_height(start_height, SYNC_BATCH_SIZE)
                .await
                .with_context(|| format!("failed to get momentums at height {start_height}"))?;

            if momentums.list.is_empty() {
                debug!(start_height, "no momentums returned");
                tokio::select! {
                    _ = self.cancel.cancelled() => return Ok(()),
                    _ = sleep(EMPTY_PAGE_RETRY) => {}
                }
                continue;
            }

            for m in &momentums.list {
                if self.cancel.is_cancelled() {
                    return Ok(());
                }
                info!(height = m.height, tx_count = m.content.len(), "processing momentum");
                self.process_momentum(m)
                    .await
                    .with_context(|| format!("failed to process momentum {}", m.height))?;
            }

            if start_height % 1000 == 0 {
                if let Err(e) = self.update_cached_data().await {
                    warn!(error = %e, "failed to update cached data");
                }
            }
        }
    }
}
