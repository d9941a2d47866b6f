//! Reward classification for user-receive blocks.

use super::Indexer;
use crate::client::api;
use crate::models::{saturating_i64, RewardTransaction, RewardType};
use crate::repository::{Batch, RewardRepository};
use tracing::debug;
use znn_abi::constants;

impl Indexer {
    /// A receive whose pair was sent by the liquidity treasury is a
    /// liquidity reward regardless of shape.
    pub(crate) fn index_liquidity_reward(
        &self,
        batch: &mut Batch,
        block: &api::AccountBlock,
        m: &api::Momentum,
    ) {
        let Some(paired) = block.paired_account_block.as_deref() else {
            return;
        };
        let rt = reward_transaction(block, paired, RewardType::Liquidity, m);
        RewardRepository::record_batch(batch, &rt);
        debug!(address = %rt.address, amount = rt.amount, "indexed liquidity reward");
    }

    /// Classify a contract-send reward by its distributing contract; drops
    /// unattributable transfers.
    pub(crate) fn index_received_reward(
        &self,
        batch: &mut Batch,
        block: &api::AccountBlock,
        m: &api::Momentum,
    ) {
        let Some(paired) = block.paired_account_block.as_deref() else {
            return;
        };
        let reward_type = determine_reward_type(&paired.address);
        if reward_type == RewardType::Unknown {
            return;
        }
        let rt = reward_transaction(block, paired, reward_type, m);
        RewardRepository::record_batch(batch, &rt);
        debug!(
            reward_type = %rt.reward_type,
            address = %rt.address,
            amount = rt.amount,
            "indexed reward"
        );
    }
}

fn reward_transaction(
    block: &api::AccountBlock,
    paired: &api::AccountBlock,
    reward_type: RewardType,
    m: &api::Momentum,
) -> RewardTransaction {
    RewardTransaction {
        hash: block.hash.clone(),
        address: block.address.clone(),
        reward_type,
        momentum_timestamp: m.unix_timestamp(),
        momentum_height: m.height as i64,
        account_height: block.height as i64,
        amount: saturating_i64(paired.amount.0, "reward_amount", &block.hash),
        token_standard: paired.token_standard.clone(),
        source_address: paired.address.clone(),
    }
}

pub(crate) fn determine_reward_type(source_address: &str) -> RewardType {
    match source_address {
        constants::PILLAR_ADDRESS => RewardType::Pillar,
        constants::SENTINEL_ADDRESS => RewardType::Sentinel,
        constants::STAKE_ADDRESS => RewardType::Stake,
        constants::LIQUIDITY_ADDRESS => RewardType::Liquidity,
        _ => RewardType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_types_by_source() {
        assert_eq!(
            determine_reward_type(constants::PILLAR_ADDRESS),
            RewardType::Pillar
        );
        assert_eq!(
            determine_reward_type(constants::SENTINEL_ADDRESS),
            RewardType::Sentinel
        );
        assert_eq!(
            determine_reward_type(constants::STAKE_ADDRESS),
            RewardType::Stake
        );
        assert_eq!(
            determine_reward_type(constants::LIQUIDITY_ADDRESS),
            RewardType::Liquidity
        );
        assert_eq!(
            determine_reward_type(constants::PLASMA_ADDRESS),
            RewardType::Unknown
        );
        assert_eq!(determine_reward_type("z1random"), RewardType::Unknown);
    }
}
