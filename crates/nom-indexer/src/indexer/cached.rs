//! Cached-state sync: pillars, sentinels, projects and phases.

use super::cache::PillarCache;
use super::Indexer;
use crate::client::api;
use crate::models::{self, saturating_i64};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};
use znn_abi::voting_id;

/// The source API caps pillar listings at one page.
const PILLAR_PAGE_SIZE: u32 = 200;
const SENTINEL_PAGE_SIZE: u32 = 10;
const PROJECT_PAGE_SIZE: u32 = 10;

impl Indexer {
    pub(crate) async fn run_cached_state_loop(self: Arc<Self>, every: Duration) {
        info!(interval = ?every, "starting cached data sync loop");
        let mut ticker = interval(every);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("cached data sync loop stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.update_cached_data().await {
                        warn!(error = %e, "cached data sync failed");
                    }
                }
            }
        }
    }

    /// Rebuild the pillar cache from the node and refresh pillar, sentinel,
    /// project and phase rows.
    pub async fn update_cached_data(&self) -> Result<()> {
        debug!("updating cached data");

        let pillar_list = self
            .node
            .pillars(0, PILLAR_PAGE_SIZE)
            .await
            .context("failed to get pillars")?;
        let pillars: Vec<models::Pillar> =
            pillar_list.list.iter().map(pillar_from_info).collect();
        *self.cache.write().await = PillarCache::new(pillars.clone());
        for pillar in &pillars {
            if let Err(e) = self.repos.pillar.upsert(pillar).await {
                warn!(name = %pillar.name, error = %e, "failed to upsert pillar");
            }
        }
        debug!(count = pillars.len(), "pillars updated");

        self.update_sentinels().await;
        self.update_projects().await;

        debug!("cached data update complete");
        Ok(())
    }

    async fn update_sentinels(&self) {
        let mut count = 0usize;
        let mut page_index = 0u32;
        loop {
            let page = match self
                .node
                .active_sentinels(page_index, SENTINEL_PAGE_SIZE)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(error = %e, "failed to get sentinels");
                    break;
                }
            };
            if page.list.is_empty() {
                break;
            }
            for s in &page.list {
                let sentinel = models::Sentinel {
                    owner: s.owner.clone(),
                    registration_timestamp: s.registration_timestamp,
                    is_revocable: s.is_revocable,
                    revoke_cooldown: s.revoke_cooldown.to_string(),
                    active: s.active,
                };
                if let Err(e) = self.repos.sentinel.upsert(&sentinel).await {
                    warn!(owner = %s.owner, error = %e, "failed to upsert sentinel");
                }
                count += 1;
            }
            if page.list.len() < SENTINEL_PAGE_SIZE as usize {
                break;
            }
            page_index += 1;
        }
        debug!(count, "sentinels updated");
    }

    async fn update_projects(&self) {
        let mut project_count = 0usize;
        let mut phase_count = 0usize;
        let mut page_index = 0u32;
        loop {
            let page = match self.node.projects(page_index, PROJECT_PAGE_SIZE).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(error = %e, "failed to get projects");
                    break;
                }
            };
            if page.list.is_empty() {
                break;
            }
            for p in &page.list {
                if let Err(e) = self.repos.project.upsert(&project_from_info(p)).await {
                    warn!(id = %p.id, error = %e, "failed to upsert project");
                }
                project_count += 1;

                for entry in &p.phases {
                    let Some(phase) = entry.phase.as_ref() else {
                        continue;
                    };
                    let model = phase_from_info(&p.id, phase, entry.votes.as_ref());
                    if let Err(e) = self.repos.project_phase.upsert(&model).await {
                        warn!(id = %phase.id, error = %e, "failed to upsert project phase");
                    }
                    phase_count += 1;
                }
            }
            if page.list.len() < PROJECT_PAGE_SIZE as usize {
                break;
            }
            page_index += 1;
        }
        debug!(projects = project_count, phases = phase_count, "projects updated");
    }
}

fn pillar_from_info(p: &api::PillarInfo) -> models::Pillar {
    models::Pillar {
        owner_address: p.owner_address.clone(),
        producer_address: p.producer_address.clone(),
        withdraw_address: p.withdraw_address.clone(),
        name: p.name.clone(),
        rank: p.rank,
        give_momentum_reward_percentage: p.give_momentum_reward_percentage,
        give_delegate_reward_percentage: p.give_delegate_reward_percentage,
        is_revocable: p.is_revocable,
        revoke_cooldown: p.revoke_cooldown as i32,
        revoke_timestamp: p.revoke_timestamp,
        weight: saturating_i64(p.weight.0, "pillar_weight", &p.name),
        epoch_produced_momentums: p.current_stats.produced_momentums,
        epoch_expected_momentums: p.current_stats.expected_momentums,
        ..Default::default()
    }
}

fn project_from_info(p: &api::Project) -> models::Project {
    let votes = p.votes.clone().unwrap_or_default();
    models::Project {
        id: p.id.clone(),
        voting_id: voting_id(&p.id),
        owner: p.owner.clone(),
        name: p.name.clone(),
        description: p.description.clone(),
        url: p.url.clone(),
        znn_funds_needed: saturating_i64(p.znn_funds_needed.0, "znn_funds_needed", &p.id),
        qsr_funds_needed: saturating_i64(p.qsr_funds_needed.0, "qsr_funds_needed", &p.id),
        creation_timestamp: p.creation_timestamp,
        last_update_timestamp: p.last_update_timestamp,
        status: p.status,
        yes_votes: votes.yes as i16,
        no_votes: votes.no as i16,
        total_votes: votes.total as i16,
    }
}

fn phase_from_info(
    project_id: &str,
    phase: &api::Phase,
    votes: Option<&api::VoteBreakdown>,
) -> models::ProjectPhase {
    let votes = votes.cloned().unwrap_or_default();
    models::ProjectPhase {
        id: phase.id.clone(),
        project_id: project_id.to_string(),
        voting_id: voting_id(&phase.id),
        name: phase.name.clone(),
        description: phase.description.clone(),
        url: phase.url.clone(),
        znn_funds_needed: saturating_i64(phase.znn_funds_needed.0, "znn_funds_needed", &phase.id),
        qsr_funds_needed: saturating_i64(phase.qsr_funds_needed.0, "qsr_funds_needed", &phase.id),
        creation_timestamp: phase.creation_timestamp,
        accepted_timestamp: phase.accepted_timestamp,
        status: phase.status,
        yes_votes: votes.yes as i16,
        no_votes: votes.no as i16,
        total_votes: votes.total as i16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_mapping_derives_voting_id() {
        let id = "f60e5a124d3bbdd25aff14fed3b7e7aa9dbf522f9d9efd50db77a81ec01c3d9d";
        let p = api::Project {
            id: id.to_string(),
            name: "project".into(),
            votes: Some(api::VoteBreakdown {
                total: 5,
                yes: 3,
                no: 2,
            }),
            ..Default::default()
        };
        let model = project_from_info(&p);
        assert_eq!(model.voting_id, voting_id(id));
        assert_eq!(model.yes_votes, 3);
        assert_eq!(model.no_votes, 2);
        assert_eq!(model.total_votes, 5);
    }

    #[test]
    fn phase_mapping_links_project() {
        let phase = api::Phase {
            id: "ab".repeat(32),
            name: "phase 1".into(),
            ..Default::default()
        };
        let model = phase_from_info("project-id", &phase, None);
        assert_eq!(model.project_id, "project-id");
        assert_eq!(model.total_votes, 0);
    }
}
