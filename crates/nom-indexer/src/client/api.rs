//! Wire types for the node's JSON-RPC API.
//!
//! Shapes follow the node's JSON: camelCase keys, amounts as decimal strings
//! (older nodes send numbers), byte fields base64-encoded.

use base64::Engine;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::collections::HashMap;

/// A chain-native amount. Parsed into 128 bits; values beyond that clamp to
/// the maximum so a single absurd amount cannot poison a whole momentum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(pub i128);

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Null => Ok(Amount(0)),
            serde_json::Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Ok(Amount(i128::from(v)))
                } else if let Some(v) = n.as_u64() {
                    Ok(Amount(i128::from(v)))
                } else {
                    Err(de::Error::custom(format!("non-integer amount {n}")))
                }
            }
            serde_json::Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(Amount(0));
                }
                if let Some(rest) = s.strip_prefix('-') {
                    match rest.parse::<u128>() {
                        Ok(v) if v <= i128::MAX as u128 + 1 => Ok(Amount((v as i128).wrapping_neg())),
                        Ok(_) => Ok(Amount(i128::MIN)),
                        Err(e) => Err(de::Error::custom(format!("bad amount {s:?}: {e}"))),
                    }
                } else {
                    match s.parse::<u128>() {
                        Ok(v) => Ok(Amount(v.min(i128::MAX as u128) as i128)),
                        // Overflowing decimals clamp; anything else is malformed.
                        Err(_) if s.bytes().all(|b| b.is_ascii_digit()) => Ok(Amount(i128::MAX)),
                        Err(e) => Err(de::Error::custom(format!("bad amount {s:?}: {e}"))),
                    }
                }
            }
            other => Err(de::Error::custom(format!("bad amount {other}"))),
        }
    }
}

fn de_base64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        None => Ok(Vec::new()),
        Some(s) if s.is_empty() => Ok(Vec::new()),
        Some(s) => base64::engine::general_purpose::STANDARD
            .decode(s.as_bytes())
            .map_err(de::Error::custom),
    }
}

/// Header-like momentum summary delivered by the subscription stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumHeader {
    pub hash: String,
    pub height: u64,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountHeader {
    pub address: String,
    pub hash: String,
    #[serde(default)]
    pub height: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Momentum {
    pub hash: String,
    pub height: u64,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub timestamp_unix: i64,
    #[serde(default)]
    pub producer: String,
    #[serde(default)]
    pub content: Vec<AccountHeader>,
}

impl Momentum {
    /// Unix timestamp; prefers the explicit `timestampUnix` field, which
    /// newer nodes send alongside `timestamp`.
    pub fn unix_timestamp(&self) -> i64 {
        if self.timestamp_unix != 0 {
            self.timestamp_unix
        } else {
            self.timestamp
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MomentumList {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub list: Vec<Momentum>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub total_supply: Amount,
    #[serde(default)]
    pub max_supply: Amount,
    #[serde(default)]
    pub decimals: i32,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub token_standard: String,
    #[serde(default)]
    pub is_burnable: bool,
    #[serde(default)]
    pub is_mintable: bool,
    #[serde(default)]
    pub is_utility: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBlock {
    #[serde(default)]
    pub block_type: i16,
    pub hash: String,
    #[serde(default)]
    pub height: u64,
    pub address: String,
    #[serde(default)]
    pub to_address: String,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub token_standard: String,
    #[serde(default, deserialize_with = "de_base64")]
    pub data: Vec<u8>,
    #[serde(default, deserialize_with = "de_base64")]
    pub public_key: Vec<u8>,
    #[serde(default, rename = "token")]
    pub token_info: Option<TokenInfo>,
    #[serde(default)]
    pub paired_account_block: Option<Box<AccountBlock>>,
    #[serde(default)]
    pub descendant_blocks: Vec<AccountBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceInfo {
    #[serde(default)]
    pub balance: Amount,
    #[serde(default)]
    pub token: Option<TokenInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub account_height: u64,
    #[serde(default)]
    pub balance_info_map: HashMap<String, BalanceInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PillarStats {
    #[serde(default)]
    pub produced_momentums: i16,
    #[serde(default)]
    pub expected_momentums: i16,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PillarInfo {
    pub name: String,
    #[serde(default)]
    pub rank: i32,
    pub owner_address: String,
    #[serde(default)]
    pub producer_address: String,
    #[serde(default)]
    pub withdraw_address: String,
    #[serde(default)]
    pub give_momentum_reward_percentage: i16,
    #[serde(default)]
    pub give_delegate_reward_percentage: i16,
    #[serde(default)]
    pub is_revocable: bool,
    #[serde(default)]
    pub revoke_cooldown: i64,
    #[serde(default)]
    pub revoke_timestamp: i64,
    #[serde(default)]
    pub weight: Amount,
    #[serde(default)]
    pub current_stats: PillarStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PillarInfoList {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub list: Vec<PillarInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentinelInfo {
    pub owner: String,
    #[serde(default)]
    pub registration_timestamp: i64,
    #[serde(default)]
    pub is_revocable: bool,
    #[serde(default)]
    pub revoke_cooldown: i64,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentinelInfoList {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub list: Vec<SentinelInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteBreakdown {
    #[serde(default)]
    pub total: i32,
    #[serde(default)]
    pub yes: i32,
    #[serde(default)]
    pub no: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub znn_funds_needed: Amount,
    #[serde(default)]
    pub qsr_funds_needed: Amount,
    #[serde(default)]
    pub creation_timestamp: i64,
    #[serde(default)]
    pub accepted_timestamp: i64,
    #[serde(default)]
    pub status: i16,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseEntry {
    #[serde(default)]
    pub phase: Option<Phase>,
    #[serde(default)]
    pub votes: Option<VoteBreakdown>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub znn_funds_needed: Amount,
    #[serde(default)]
    pub qsr_funds_needed: Amount,
    #[serde(default)]
    pub creation_timestamp: i64,
    #[serde(default)]
    pub last_update_timestamp: i64,
    #[serde(default)]
    pub status: i16,
    #[serde(default)]
    pub votes: Option<VoteBreakdown>,
    #[serde(default)]
    pub phases: Vec<PhaseEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectList {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub list: Vec<Project>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapTokenRequestInfo {
    pub id: String,
    #[serde(default)]
    pub network_class: i32,
    #[serde(default)]
    pub chain_id: i32,
    #[serde(default)]
    pub to_address: String,
    #[serde(default)]
    pub token_standard: String,
    #[serde(default)]
    pub token_address: String,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub fee: Amount,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub creation_momentum_height: u64,
    #[serde(default)]
    pub confirmations_to_finality: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WrapTokenRequestList {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub list: Vec<WrapTokenRequestInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnwrapTokenRequestInfo {
    pub transaction_hash: String,
    #[serde(default)]
    pub log_index: i64,
    #[serde(default)]
    pub network_class: i32,
    #[serde(default)]
    pub chain_id: i32,
    #[serde(default)]
    pub to_address: String,
    #[serde(default)]
    pub token_standard: String,
    #[serde(default)]
    pub token_address: String,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub registration_momentum_height: u64,
    /// The node reports these as integers; non-zero means set.
    #[serde(default)]
    pub redeemed: i64,
    #[serde(default)]
    pub revoked: i64,
    #[serde(default)]
    pub redeemable_in: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnwrapTokenRequestList {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub list: Vec<UnwrapTokenRequestInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_accepts_numbers_and_strings() {
        let a: Amount = serde_json::from_str("1000").unwrap();
        assert_eq!(a, Amount(1000));
        let a: Amount = serde_json::from_str("\"1000\"").unwrap();
        assert_eq!(a, Amount(1000));
        let a: Amount = serde_json::from_str("null").unwrap();
        assert_eq!(a, Amount(0));
        let a: Amount = serde_json::from_str("\"-25\"").unwrap();
        assert_eq!(a, Amount(-25));
    }

    #[test]
    fn amount_clamps_beyond_i128() {
        // 2^130, far beyond anything a signed 128-bit value can hold.
        let a: Amount =
            serde_json::from_str("\"1361129467683753853853498429727072845824\"").unwrap();
        assert_eq!(a, Amount(i128::MAX));
    }

    #[test]
    fn amount_rejects_garbage() {
        assert!(serde_json::from_str::<Amount>("\"12abc\"").is_err());
        assert!(serde_json::from_str::<Amount>("true").is_err());
    }

    #[test]
    fn momentum_timestamp_prefers_unix_field() {
        let m: Momentum = serde_json::from_str(
            r#"{"hash":"aa","height":7,"timestamp":100,"timestampUnix":200,"producer":"z1x"}"#,
        )
        .unwrap();
        assert_eq!(m.unix_timestamp(), 200);
        let m: Momentum =
            serde_json::from_str(r#"{"hash":"aa","height":7,"timestamp":100}"#).unwrap();
        assert_eq!(m.unix_timestamp(), 100);
    }

    #[test]
    fn account_block_decodes_base64_bytes() {
        let block: AccountBlock = serde_json::from_str(
            r#"{
                "blockType": 3,
                "hash": "aa",
                "height": 1,
                "address": "z1sender",
                "toAddress": "z1dest",
                "amount": "150",
                "tokenStandard": "zts1znnxxxxxxxxxxxxx9z4ulx",
                "data": "aGVsbG8=",
                "publicKey": "cGs="
            }"#,
        )
        .unwrap();
        assert_eq!(block.data, b"hello");
        assert_eq!(block.public_key, b"pk");
        assert_eq!(block.amount, Amount(150));
        assert!(block.paired_account_block.is_none());
        assert!(block.descendant_blocks.is_empty());
    }

    #[test]
    fn unwrap_request_flags_are_integers() {
        let u: UnwrapTokenRequestInfo = serde_json::from_str(
            r#"{"transactionHash":"ab","logIndex":3,"redeemed":1,"revoked":0,"amount":"5"}"#,
        )
        .unwrap();
        assert!(u.redeemed > 0);
        assert_eq!(u.revoked, 0);
    }
}
