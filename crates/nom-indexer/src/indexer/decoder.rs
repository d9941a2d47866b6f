//! Account-block call decoding against the embedded ABI registry.

use crate::client::api::AccountBlock;
use crate::models::TxData;
use tracing::debug;
use znn_abi::abi::Abi;
use znn_abi::{constants, embedded};

/// Decode an account block's call data. Returns `None` for empty data,
/// non-embedded destinations and unrecognized selectors. The common ABI is
/// consulted before the contract-specific one.
pub fn try_decode_tx_data(block: &AccountBlock) -> Option<TxData> {
    if block.data.is_empty() {
        return None;
    }
    let to_address = block.to_address.as_str();
    if !constants::is_embedded_contract(to_address) {
        return None;
    }
    if let Some(tx_data) = decode_with(&embedded::COMMON, &block.data) {
        return Some(tx_data);
    }
    let contract_abi = embedded::abi_for_address(to_address)?;
    match decode_with(contract_abi, &block.data) {
        Some(tx_data) => {
            debug!(method = %tx_data.method, hash = %block.hash, "decoded transaction");
            Some(tx_data)
        }
        None => {
            debug!(hash = %block.hash, to_address, "unable to decode transaction data");
            None
        }
    }
}

/// Selector match against one ABI. A matched selector whose arguments fail
/// to decode still yields the method name with empty inputs; the row is
/// written either way.
fn decode_with(abi: &Abi, data: &[u8]) -> Option<TxData> {
    if data.len() < 4 {
        return None;
    }
    let function = abi.function_by_selector(&data[..4])?;
    match abi.decode_call(data) {
        Ok(call) => Some(TxData {
            method: call.method,
            inputs: call
                .inputs
                .into_iter()
                .map(|(name, value)| (name, value.to_string()))
                .collect(),
        }),
        Err(e) => {
            debug!(method = %function.name, error = %e, "failed to decode inputs");
            Some(TxData {
                method: function.name.clone(),
                inputs: Default::default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use znn_abi::abi::Value;
    use znn_abi::Hash;

    fn block(to_address: &str, data: Vec<u8>) -> AccountBlock {
        AccountBlock {
            hash: "ab".into(),
            address: "z1sender".into(),
            to_address: to_address.into(),
            data,
            ..Default::default()
        }
    }

    fn stake_call(duration: i64) -> Vec<u8> {
        embedded::STAKE
            .encode_call("Stake", &[Value::Number(i128::from(duration))])
            .unwrap()
    }

    #[test]
    fn decodes_stake_call() {
        let tx = try_decode_tx_data(&block(constants::STAKE_ADDRESS, stake_call(3600))).unwrap();
        assert_eq!(tx.method, "Stake");
        assert_eq!(tx.input("durationInSec"), "3600");
    }

    #[test]
    fn decodes_vote_by_name() {
        let id = Hash([0x11; 32]);
        let data = embedded::ACCELERATOR
            .encode_call(
                "VoteByName",
                &[
                    Value::Hash(id),
                    Value::String("pillar-x".into()),
                    Value::Number(1),
                ],
            )
            .unwrap();
        let tx = try_decode_tx_data(&block(constants::ACCELERATOR_ADDRESS, data)).unwrap();
        assert_eq!(tx.method, "VoteByName");
        assert_eq!(tx.input("id"), id.to_string());
        assert_eq!(tx.input("name"), "pillar-x");
        assert_eq!(tx.input("vote"), "1");
    }

    #[test]
    fn common_methods_decode_for_any_embedded_contract() {
        let data = embedded::COMMON.encode_call("CollectReward", &[]).unwrap();
        let tx = try_decode_tx_data(&block(constants::PILLAR_ADDRESS, data)).unwrap();
        assert_eq!(tx.method, "CollectReward");
        assert!(tx.inputs.is_empty());
    }

    #[test]
    fn ignores_non_embedded_destination() {
        let data = stake_call(60);
        assert!(try_decode_tx_data(&block("z1qqjnwjjpnue8xmmpanz6csze6tcmtzzdtfsww7", data)).is_none());
    }

    #[test]
    fn ignores_empty_and_short_data() {
        assert!(try_decode_tx_data(&block(constants::STAKE_ADDRESS, Vec::new())).is_none());
        assert!(try_decode_tx_data(&block(constants::STAKE_ADDRESS, vec![1, 2])).is_none());
    }

    #[test]
    fn unknown_selector_is_none() {
        let data = vec![0xde, 0xad, 0xbe, 0xef, 0, 0];
        assert!(try_decode_tx_data(&block(constants::STAKE_ADDRESS, data)).is_none());
    }

    #[test]
    fn matched_selector_with_bad_args_keeps_method() {
        let mut data = stake_call(3600);
        data.truncate(8);
        let tx = try_decode_tx_data(&block(constants::STAKE_ADDRESS, data)).unwrap();
        assert_eq!(tx.method, "Stake");
        assert!(tx.inputs.is_empty());
    }
}
