//! Database row models.
//!
//! Amounts are chain-native big integers; the store keeps signed 64-bit
//! columns, so values are clamped through [`saturating_i64`] at the write
//! boundary.

use serde::Serialize;
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Account block types as they appear on chain.
pub mod block_type {
    pub const USER_SEND: i16 = 3;
    pub const USER_RECEIVE: i16 = 4;
    pub const CONTRACT_RECEIVE: i16 = 5;
    pub const CONTRACT_SEND: i16 = 6;
}

/// Classified reward payout kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardType {
    Unknown = 0,
    Stake = 1,
    Delegation = 2,
    Liquidity = 3,
    Sentinel = 4,
    Pillar = 5,
}

impl RewardType {
    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RewardType::Stake => "Stake",
            RewardType::Delegation => "Delegation",
            RewardType::Liquidity => "Liquidity",
            RewardType::Sentinel => "Sentinel",
            RewardType::Pillar => "Pillar",
            RewardType::Unknown => "Unknown",
        })
    }
}

/// Clamp a chain-native amount into a signed 64-bit column, warning when
/// precision is lost.
pub fn saturating_i64(value: i128, what: &str, id: &str) -> i64 {
    if value > i128::from(i64::MAX) {
        warn!(what, id, "amount exceeds int64 max, capping value");
        i64::MAX
    } else if value < i128::from(i64::MIN) {
        warn!(what, id, "amount below int64 min, capping value");
        i64::MIN
    } else {
        value as i64
    }
}

/// Decoded transaction data attached to an account block.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TxData {
    pub method: String,
    pub inputs: BTreeMap<String, String>,
}

impl TxData {
    pub fn input(&self, name: &str) -> &str {
        self.inputs.get(name).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct Momentum {
    pub height: i64,
    pub hash: String,
    pub timestamp: i64,
    pub tx_count: i32,
    pub producer: String,
    pub producer_owner: String,
    pub producer_name: String,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct Account {
    pub address: String,
    pub block_count: i64,
    pub public_key: String,
    pub delegate: String,
    pub delegation_start_timestamp: i64,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct Balance {
    pub address: String,
    pub token_standard: String,
    pub balance: i64,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct AccountBlock {
    pub hash: String,
    pub momentum_hash: String,
    pub momentum_timestamp: i64,
    pub momentum_height: i64,
    pub block_type: i16,
    pub height: i64,
    pub address: String,
    pub to_address: String,
    pub amount: i64,
    pub token_standard: String,
    pub data: String,
    pub method: String,
    pub input: serde_json::Value,
    pub paired_account_block: String,
    pub descendant_of: String,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct Token {
    pub token_standard: String,
    pub name: String,
    pub symbol: String,
    pub domain: String,
    pub decimals: i32,
    pub owner: String,
    pub total_supply: i64,
    pub max_supply: i64,
    pub is_burnable: bool,
    pub is_mintable: bool,
    pub is_utility: bool,
    pub total_burned: i64,
    pub last_update_timestamp: i64,
    pub holder_count: i64,
    pub transaction_count: i64,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct Pillar {
    pub owner_address: String,
    pub producer_address: String,
    pub withdraw_address: String,
    pub name: String,
    pub rank: i32,
    pub give_momentum_reward_percentage: i16,
    pub give_delegate_reward_percentage: i16,
    pub is_revocable: bool,
    pub revoke_cooldown: i32,
    pub revoke_timestamp: i64,
    pub weight: i64,
    pub epoch_produced_momentums: i16,
    pub epoch_expected_momentums: i16,
    pub slot_cost_qsr: i64,
    pub spawn_timestamp: i64,
    pub voting_activity: f32,
    pub produced_momentum_count: i64,
    pub is_revoked: bool,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct PillarUpdate {
    pub id: i32,
    pub name: String,
    pub owner_address: String,
    pub producer_address: String,
    pub withdraw_address: String,
    pub momentum_timestamp: i64,
    pub momentum_height: i64,
    pub momentum_hash: String,
    pub give_momentum_reward_percentage: i16,
    pub give_delegate_reward_percentage: i16,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct Sentinel {
    pub owner: String,
    pub registration_timestamp: i64,
    pub is_revocable: bool,
    pub revoke_cooldown: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct Stake {
    pub id: String,
    pub address: String,
    pub start_timestamp: i64,
    pub expiration_timestamp: i64,
    pub znn_amount: i64,
    pub duration_in_sec: i32,
    pub is_active: bool,
    pub cancel_id: String,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct Fusion {
    pub id: String,
    pub address: String,
    pub beneficiary: String,
    pub momentum_hash: String,
    pub momentum_timestamp: i64,
    pub momentum_height: i64,
    pub qsr_amount: i64,
    pub expiration_height: i64,
    pub is_active: bool,
    pub cancel_id: String,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct Project {
    pub id: String,
    pub voting_id: String,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub znn_funds_needed: i64,
    pub qsr_funds_needed: i64,
    pub creation_timestamp: i64,
    pub last_update_timestamp: i64,
    pub status: i16,
    pub yes_votes: i16,
    pub no_votes: i16,
    pub total_votes: i16,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct ProjectPhase {
    pub id: String,
    pub project_id: String,
    pub voting_id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub znn_funds_needed: i64,
    pub qsr_funds_needed: i64,
    pub creation_timestamp: i64,
    pub accepted_timestamp: i64,
    pub status: i16,
    pub yes_votes: i16,
    pub no_votes: i16,
    pub total_votes: i16,
}

#[derive(Debug, Clone, Default)]
pub struct Vote {
    pub momentum_hash: String,
    pub momentum_timestamp: i64,
    pub momentum_height: i64,
    pub voter_address: String,
    pub project_id: String,
    pub phase_id: String,
    pub voting_id: String,
    pub vote: i16,
}

#[derive(Debug, Clone)]
pub struct RewardTransaction {
    pub hash: String,
    pub address: String,
    pub reward_type: RewardType,
    pub momentum_timestamp: i64,
    pub momentum_height: i64,
    pub account_height: i64,
    pub amount: i64,
    pub token_standard: String,
    pub source_address: String,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct WrapTokenRequest {
    pub id: String,
    pub network_class: i32,
    pub chain_id: i32,
    pub to_address: String,
    pub token_standard: String,
    pub token_address: String,
    pub amount: i64,
    pub fee: i64,
    pub signature: String,
    pub creation_momentum_height: i64,
    pub confirmations_to_finality: i32,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct UnwrapTokenRequest {
    pub transaction_hash: String,
    pub log_index: i64,
    pub network_class: i32,
    pub chain_id: i32,
    pub to_address: String,
    pub token_standard: String,
    pub token_address: String,
    pub amount: i64,
    pub signature: String,
    pub registration_momentum_height: i64,
    pub redeemed: bool,
    pub revoked: bool,
    pub redeemable_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_i64_passes_in_range_values() {
        assert_eq!(saturating_i64(0, "amount", "x"), 0);
        assert_eq!(saturating_i64(1000, "amount", "x"), 1000);
        assert_eq!(saturating_i64(-5, "amount", "x"), -5);
        assert_eq!(saturating_i64(i128::from(i64::MAX), "amount", "x"), i64::MAX);
    }

    #[test]
    fn saturating_i64_caps_overflow() {
        assert_eq!(
            saturating_i64(i128::from(i64::MAX) + 1, "amount", "x"),
            i64::MAX
        );
        assert_eq!(saturating_i64(i128::MAX, "amount", "x"), i64::MAX);
        assert_eq!(saturating_i64(i128::MIN, "amount", "x"), i64::MIN);
    }

    #[test]
    fn reward_type_names() {
        assert_eq!(RewardType::Stake.to_string(), "Stake");
        assert_eq!(RewardType::Unknown.to_string(), "Unknown");
        assert_eq!(RewardType::Pillar.as_i16(), 5);
        assert_eq!(RewardType::Unknown.as_i16(), 0);
    }

    #[test]
    fn tx_data_missing_input_is_empty() {
        let tx = TxData::default();
        assert_eq!(tx.input("name"), "");
    }
}
