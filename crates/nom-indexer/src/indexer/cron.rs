//! Auxiliary cron loops: token holder counts and pillar voting activity.

use super::Indexer;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

impl Indexer {
    pub(crate) async fn run_token_holders_loop(self: Arc<Self>, every: Duration) {
        info!(interval = ?every, "starting token holders loop");
        let mut ticker = interval(every);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("token holders loop stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.update_token_holder_counts().await {
                        warn!(error = %e, "token holder count update failed");
                    }
                }
            }
        }
    }

    /// Recount holders with a positive balance for every known token.
    pub async fn update_token_holder_counts(&self) -> Result<()> {
        let tokens = self.repos.token.get_all().await?;
        for token in &tokens {
            let count = self
                .repos
                .balance
                .holder_count(&token.token_standard)
                .await?;
            self.repos
                .token
                .update_holder_count(&token.token_standard, count)
                .await?;
        }
        debug!(tokens = tokens.len(), "token holder counts updated");
        Ok(())
    }

    pub(crate) async fn run_voting_activity_loop(self: Arc<Self>, every: Duration) {
        info!(interval = ?every, "starting voting activity loop");
        let mut ticker = interval(every);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("voting activity loop stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.update_voting_activity().await {
                        warn!(error = %e, "voting activity update failed");
                    }
                }
            }
        }
    }

    /// Voting activity per pillar: the share of projects and phases created
    /// since the pillar spawned that its owner has voted on. Pillars with
    /// nothing eligible count as fully active.
    pub async fn update_voting_activity(&self) -> Result<()> {
        let pillars = self.repos.pillar.get_all().await?;
        for pillar in &pillars {
            let project_ids = self
                .repos
                .project
                .ids_created_since(pillar.spawn_timestamp)
                .await?;
            let phase_ids = self
                .repos
                .project_phase
                .ids_created_since(pillar.spawn_timestamp)
                .await?;
            let eligible = project_ids.len() + phase_ids.len();

            let activity = if eligible == 0 {
                1.0
            } else {
                let voted_projects = self
                    .repos
                    .vote
                    .count_projects_voted(&pillar.owner_address, &project_ids)
                    .await?;
                let voted_phases = self
                    .repos
                    .vote
                    .count_phases_voted(&pillar.owner_address, &phase_ids)
                    .await?;
                ((voted_projects + voted_phases) as f32 / eligible as f32).min(1.0)
            };

            self.repos
                .pillar
                .update_voting_activity(&pillar.owner_address, activity)
                .await?;
        }
        debug!(pillars = pillars.len(), "voting activity updated");
        Ok(())
    }
}
