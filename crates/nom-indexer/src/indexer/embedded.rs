//! Embedded-contract event indexing.
//!
//! Dispatch is keyed on the *receiving* contract (the contract-receive
//! block's own address); the decoded call always comes from the paired send
//! block.

use super::processor::parse_numeric_input;
use super::Indexer;
use crate::client::api;
use crate::models::{self, saturating_i64, TxData};
use crate::repository::{
    AccountRepository, FusionRepository, PillarRepository, PillarUpdateRepository,
    SentinelRepository, StakeRepository, VoteRepository,
};
use crate::repository::Batch;
use tracing::{debug, warn};
use znn_abi::{constants, fusion_cancel_id, stake_cancel_id};

impl Indexer {
    pub(crate) async fn index_embedded_contracts(
        &self,
        batch: &mut Batch,
        block: &api::AccountBlock,
        tx_data: &TxData,
        m: &api::Momentum,
    ) {
        match block.address.as_str() {
            constants::PILLAR_ADDRESS => self.index_pillar_contract(batch, block, tx_data, m).await,
            constants::STAKE_ADDRESS => self.index_stake_contract(batch, block, tx_data, m),
            constants::SENTINEL_ADDRESS => self.index_sentinel_contract(batch, block, tx_data),
            constants::PLASMA_ADDRESS => self.index_plasma_contract(batch, block, tx_data, m),
            constants::ACCELERATOR_ADDRESS => {
                self.index_accelerator_contract(batch, block, tx_data, m).await
            }
            constants::TOKEN_ADDRESS => self.index_token_contract(batch, block, tx_data, m),
            _ => {}
        }
    }

    async fn index_pillar_contract(
        &self,
        batch: &mut Batch,
        block: &api::AccountBlock,
        tx_data: &TxData,
        m: &api::Momentum,
    ) {
        let Some(paired) = block.paired_account_block.as_deref() else {
            return;
        };
        match tx_data.method.as_str() {
            "Register" | "RegisterLegacy" => {
                let name = tx_data.input("name");
                if name.is_empty() {
                    return;
                }
                let owner_address = paired.address.clone();
                PillarUpdateRepository::insert_batch(
                    batch,
                    &models::PillarUpdate {
                        name: name.to_string(),
                        owner_address: owner_address.clone(),
                        producer_address: tx_data.input("producerAddress").to_string(),
                        withdraw_address: tx_data.input("rewardAddress").to_string(),
                        momentum_height: m.height as i64,
                        momentum_timestamp: m.unix_timestamp(),
                        momentum_hash: m.hash.clone(),
                        ..Default::default()
                    },
                );
                // The first descendant burning into the token contract is the
                // registration slot cost.
                if let Some(descendant) = block.descendant_blocks.first() {
                    if descendant.to_address == constants::TOKEN_ADDRESS {
                        let slot_cost_qsr =
                            saturating_i64(descendant.amount.0, "slot_cost_qsr", name);
                        PillarRepository::update_spawn_info_batch(
                            batch,
                            &owner_address,
                            m.unix_timestamp(),
                            slot_cost_qsr,
                        );
                        debug!(name, owner = %owner_address, slot_cost_qsr, "pillar registered with spawn info");
                    }
                }
            }
            "UpdatePillar" => {
                let name = tx_data.input("name");
                let pillar_owner = tx_data.input("pillarOwner");
                if name.is_empty() || pillar_owner.is_empty() {
                    return;
                }
                PillarUpdateRepository::insert_batch(
                    batch,
                    &models::PillarUpdate {
                        name: name.to_string(),
                        owner_address: pillar_owner.to_string(),
                        producer_address: tx_data.input("producerAddress").to_string(),
                        withdraw_address: tx_data.input("rewardAddress").to_string(),
                        momentum_height: m.height as i64,
                        momentum_timestamp: m.unix_timestamp(),
                        momentum_hash: m.hash.clone(),
                        ..Default::default()
                    },
                );
            }
            "Delegate" => {
                let pillar_name = tx_data.input("name");
                if pillar_name.is_empty() {
                    return;
                }
                let pillar_owner = self.pillar_owner(pillar_name).await;
                if pillar_owner.is_empty() {
                    return;
                }
                AccountRepository::update_delegate_batch(
                    batch,
                    &paired.address,
                    &pillar_owner,
                    m.unix_timestamp(),
                );
                debug!(delegator = %paired.address, pillar = pillar_name, "delegation recorded");
            }
            "Undelegate" => {
                AccountRepository::update_delegate_batch(batch, &paired.address, "", 0);
                debug!(delegator = %paired.address, "undelegation recorded");
            }
            "Revoke" => {
                let pillar_name = tx_data.input("name");
                if pillar_name.is_empty() {
                    return;
                }
                PillarRepository::set_as_revoked_batch(
                    batch,
                    &paired.address,
                    pillar_name,
                    m.unix_timestamp(),
                );
                debug!(name = pillar_name, owner = %paired.address, "pillar revoked");
            }
            _ => {}
        }
    }

    fn index_stake_contract(
        &self,
        batch: &mut Batch,
        block: &api::AccountBlock,
        tx_data: &TxData,
        m: &api::Momentum,
    ) {
        let Some(paired) = block.paired_account_block.as_deref() else {
            return;
        };
        match tx_data.method.as_str() {
            "Stake" => {
                let duration: i32 = parse_numeric_input(tx_data, "durationInSec");
                let stake_id = paired.hash.clone();
                StakeRepository::insert_batch(
                    batch,
                    &models::Stake {
                        cancel_id: stake_cancel_id(&stake_id),
                        id: stake_id,
                        address: paired.address.clone(),
                        znn_amount: saturating_i64(paired.amount.0, "znn_amount", &paired.hash),
                        start_timestamp: m.unix_timestamp(),
                        duration_in_sec: duration,
                        expiration_timestamp: m.unix_timestamp() + i64::from(duration),
                        is_active: true,
                    },
                );
            }
            "Cancel" => {
                let stake_id = tx_data.input("id");
                if stake_id.is_empty() {
                    return;
                }
                StakeRepository::set_inactive_batch(
                    batch,
                    &stake_cancel_id(stake_id),
                    &paired.address,
                );
            }
            _ => {}
        }
    }

    fn index_sentinel_contract(
        &self,
        batch: &mut Batch,
        block: &api::AccountBlock,
        tx_data: &TxData,
    ) {
        match tx_data.method.as_str() {
            "Revoke" => {
                if let Some(paired) = block.paired_account_block.as_deref() {
                    SentinelRepository::set_inactive_batch(batch, &paired.address);
                    debug!(owner = %paired.address, "sentinel revoked");
                }
            }
            method => debug!(method, "sentinel contract event"),
        }
    }

    fn index_plasma_contract(
        &self,
        batch: &mut Batch,
        block: &api::AccountBlock,
        tx_data: &TxData,
        m: &api::Momentum,
    ) {
        let Some(paired) = block.paired_account_block.as_deref() else {
            return;
        };
        match tx_data.method.as_str() {
            "Fuse" => {
                let mut beneficiary = tx_data.input("address").to_string();
                if beneficiary.is_empty() {
                    beneficiary = paired.address.clone();
                }
                let fusion_id = paired.hash.clone();
                FusionRepository::insert_batch(
                    batch,
                    &models::Fusion {
                        cancel_id: fusion_cancel_id(&fusion_id),
                        id: fusion_id,
                        address: paired.address.clone(),
                        beneficiary,
                        qsr_amount: saturating_i64(paired.amount.0, "qsr_amount", &paired.hash),
                        momentum_hash: m.hash.clone(),
                        momentum_timestamp: m.unix_timestamp(),
                        momentum_height: m.height as i64,
                        // Approximate blocks until expiration.
                        expiration_height: m.height as i64
                            + constants::FUSION_EXPIRATION_SECS / 10,
                        is_active: true,
                    },
                );
            }
            "CancelFuse" => {
                let fusion_id = tx_data.input("id");
                if fusion_id.is_empty() {
                    return;
                }
                FusionRepository::set_inactive_batch(
                    batch,
                    &fusion_cancel_id(fusion_id),
                    &paired.address,
                );
            }
            _ => {}
        }
    }

    async fn index_accelerator_contract(
        &self,
        batch: &mut Batch,
        block: &api::AccountBlock,
        tx_data: &TxData,
        m: &api::Momentum,
    ) {
        match tx_data.method.as_str() {
            "VoteByName" | "VoteByProdAddress" => {
                let voting_id = tx_data.input("id");
                let Some(paired) = block.paired_account_block.as_deref() else {
                    return;
                };
                if voting_id.is_empty() {
                    return;
                }
                let vote_value: i16 = parse_numeric_input(tx_data, "vote");

                // Resolve the target: a project first, then a phase.
                let (project_id, phase_id) = self.resolve_voting_target(voting_id).await;

                let mut voter_address = paired.address.clone();
                if tx_data.method == "VoteByName" {
                    let pillar_name = tx_data.input("name");
                    if !pillar_name.is_empty() {
                        let owner = self.pillar_owner(pillar_name).await;
                        if !owner.is_empty() {
                            voter_address = owner;
                        }
                    }
                }

                VoteRepository::insert_batch(
                    batch,
                    &models::Vote {
                        voting_id: voting_id.to_string(),
                        voter_address: voter_address.clone(),
                        project_id: project_id.clone(),
                        phase_id: phase_id.clone(),
                        vote: vote_value,
                        momentum_hash: m.hash.clone(),
                        momentum_timestamp: m.unix_timestamp(),
                        momentum_height: m.height as i64,
                    },
                );
                debug!(voting_id, project_id = %project_id, phase_id = %phase_id, voter = %voter_address, "vote recorded");
            }
            "CreateProject" => debug!(method = %tx_data.method, "project created"),
            "AddPhase" | "UpdatePhase" => debug!(method = %tx_data.method, "phase updated"),
            _ => {}
        }
    }

    async fn resolve_voting_target(&self, voting_id: &str) -> (String, String) {
        match self.repos.project.id_from_voting_id(voting_id).await {
            Ok(Some(project_id)) if !project_id.is_empty() => (project_id, String::new()),
            Ok(_) => self.resolve_phase_voting_target(voting_id).await,
            Err(e) => {
                warn!(voting_id, error = %e, "project voting id lookup failed");
                self.resolve_phase_voting_target(voting_id).await
            }
        }
    }

    async fn resolve_phase_voting_target(&self, voting_id: &str) -> (String, String) {
        match self
            .repos
            .project_phase
            .project_and_phase_from_voting_id(voting_id)
            .await
        {
            Ok(Some((project_id, phase_id))) => (project_id, phase_id),
            Ok(None) => (String::new(), String::new()),
            Err(e) => {
                warn!(voting_id, error = %e, "phase voting id lookup failed");
                (String::new(), String::new())
            }
        }
    }

    fn index_token_contract(
        &self,
        batch: &mut Batch,
        block: &api::AccountBlock,
        tx_data: &TxData,
        m: &api::Momentum,
    ) {
        match tx_data.method.as_str() {
            "Burn" => {
                if let Some(paired) = block.paired_account_block.as_deref() {
                    let burn_amount =
                        saturating_i64(paired.amount.0, "burn_amount", &paired.hash);
                    crate::repository::TokenRepository::update_burn_amount_batch(
                        batch,
                        &paired.token_standard,
                        burn_amount,
                        m.height as i64,
                    );
                    debug!(token = %paired.token_standard, burn_amount, "token burn recorded");
                }
            }
            "UpdateToken" => {
                let token_standard = tx_data.input("tokenStandard");
                if !token_standard.is_empty() {
                    crate::repository::TokenRepository::update_last_update_timestamp_batch(
                        batch,
                        token_standard,
                        m.unix_timestamp(),
                    );
                    debug!(token = token_standard, timestamp = m.unix_timestamp(), "token update recorded");
                }
            }
            _ => {}
        }
    }
}
