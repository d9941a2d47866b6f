//! Static ABI registry for the embedded contracts.
//!
//! Definitions are kept as JSON and parsed once at first use. The common
//! ABI holds methods shared by several contracts and is always consulted
//! before the contract-specific one.

use crate::abi::Abi;
use crate::constants;
use once_cell::sync::Lazy;

const COMMON_JSON: &str = r#"[
    {"type":"function","name":"Update","inputs":[]},
    {"type":"function","name":"CollectReward","inputs":[]},
    {"type":"function","name":"DepositQsr","inputs":[]},
    {"type":"function","name":"WithdrawQsr","inputs":[]},
    {"type":"function","name":"Donate","inputs":[]}
]"#;

const PLASMA_JSON: &str = r#"[
    {"type":"function","name":"Fuse","inputs":[
        {"name":"address","type":"address"}
    ]},
    {"type":"function","name":"CancelFuse","inputs":[
        {"name":"id","type":"hash"}
    ]}
]"#;

const PILLAR_JSON: &str = r#"[
    {"type":"function","name":"Register","inputs":[
        {"name":"name","type":"string"},
        {"name":"producerAddress","type":"address"},
        {"name":"rewardAddress","type":"address"},
        {"name":"giveBlockRewardPercentage","type":"uint8"},
        {"name":"giveDelegateRewardPercentage","type":"uint8"}
    ]},
    {"type":"function","name":"RegisterLegacy","inputs":[
        {"name":"name","type":"string"},
        {"name":"producerAddress","type":"address"},
        {"name":"rewardAddress","type":"address"},
        {"name":"giveBlockRewardPercentage","type":"uint8"},
        {"name":"giveDelegateRewardPercentage","type":"uint8"},
        {"name":"publicKey","type":"string"},
        {"name":"signature","type":"string"}
    ]},
    {"type":"function","name":"UpdatePillar","inputs":[
        {"name":"name","type":"string"},
        {"name":"producerAddress","type":"address"},
        {"name":"rewardAddress","type":"address"},
        {"name":"giveBlockRewardPercentage","type":"uint8"},
        {"name":"giveDelegateRewardPercentage","type":"uint8"}
    ]},
    {"type":"function","name":"Revoke","inputs":[
        {"name":"name","type":"string"}
    ]},
    {"type":"function","name":"Delegate","inputs":[
        {"name":"name","type":"string"}
    ]},
    {"type":"function","name":"Undelegate","inputs":[]}
]"#;

const TOKEN_JSON: &str = r#"[
    {"type":"function","name":"IssueToken","inputs":[
        {"name":"tokenName","type":"string"},
        {"name":"tokenSymbol","type":"string"},
        {"name":"tokenDomain","type":"string"},
        {"name":"totalSupply","type":"uint256"},
        {"name":"maxSupply","type":"uint256"},
        {"name":"decimals","type":"uint8"},
        {"name":"isMintable","type":"bool"},
        {"name":"isBurnable","type":"bool"},
        {"name":"isUtility","type":"bool"}
    ]},
    {"type":"function","name":"Mint","inputs":[
        {"name":"tokenStandard","type":"tokenStandard"},
        {"name":"amount","type":"uint256"},
        {"name":"receiveAddress","type":"address"}
    ]},
    {"type":"function","name":"Burn","inputs":[]},
    {"type":"function","name":"UpdateToken","inputs":[
        {"name":"tokenStandard","type":"tokenStandard"},
        {"name":"owner","type":"address"},
        {"name":"isMintable","type":"bool"},
        {"name":"isBurnable","type":"bool"}
    ]}
]"#;

const SENTINEL_JSON: &str = r#"[
    {"type":"function","name":"Register","inputs":[]},
    {"type":"function","name":"Revoke","inputs":[]}
]"#;

const STAKE_JSON: &str = r#"[
    {"type":"function","name":"Stake","inputs":[
        {"name":"durationInSec","type":"int64"}
    ]},
    {"type":"function","name":"Cancel","inputs":[
        {"name":"id","type":"hash"}
    ]}
]"#;

const ACCELERATOR_JSON: &str = r#"[
    {"type":"function","name":"CreateProject","inputs":[
        {"name":"name","type":"string"},
        {"name":"description","type":"string"},
        {"name":"url","type":"string"},
        {"name":"znnFundsNeeded","type":"uint256"},
        {"name":"qsrFundsNeeded","type":"uint256"}
    ]},
    {"type":"function","name":"AddPhase","inputs":[
        {"name":"id","type":"hash"},
        {"name":"name","type":"string"},
        {"name":"description","type":"string"},
        {"name":"url","type":"string"},
        {"name":"znnFundsNeeded","type":"uint256"},
        {"name":"qsrFundsNeeded","type":"uint256"}
    ]},
    {"type":"function","name":"UpdatePhase","inputs":[
        {"name":"id","type":"hash"},
        {"name":"name","type":"string"},
        {"name":"description","type":"string"},
        {"name":"url","type":"string"},
        {"name":"znnFundsNeeded","type":"uint256"},
        {"name":"qsrFundsNeeded","type":"uint256"}
    ]},
    {"type":"function","name":"VoteByName","inputs":[
        {"name":"id","type":"hash"},
        {"name":"name","type":"string"},
        {"name":"vote","type":"uint8"}
    ]},
    {"type":"function","name":"VoteByProdAddress","inputs":[
        {"name":"id","type":"hash"},
        {"name":"vote","type":"uint8"}
    ]}
]"#;

const SWAP_JSON: &str = r#"[
    {"type":"function","name":"RetrieveAssets","inputs":[
        {"name":"publicKey","type":"string"},
        {"name":"signature","type":"string"}
    ]}
]"#;

const LIQUIDITY_JSON: &str = r#"[
    {"type":"function","name":"Fund","inputs":[
        {"name":"znnReward","type":"uint256"},
        {"name":"qsrReward","type":"uint256"}
    ]},
    {"type":"function","name":"BurnZnn","inputs":[
        {"name":"burnAmount","type":"uint256"}
    ]},
    {"type":"function","name":"LiquidityStake","inputs":[
        {"name":"durationInSec","type":"int64"}
    ]},
    {"type":"function","name":"CancelLiquidityStake","inputs":[
        {"name":"id","type":"hash"}
    ]},
    {"type":"function","name":"UnlockLiquidityStakeEntries","inputs":[]},
    {"type":"function","name":"SetIsHalted","inputs":[
        {"name":"isHalted","type":"bool"}
    ]}
]"#;

const BRIDGE_JSON: &str = r#"[
    {"type":"function","name":"WrapToken","inputs":[
        {"name":"networkClass","type":"uint32"},
        {"name":"chainId","type":"uint32"},
        {"name":"toAddress","type":"string"}
    ]},
    {"type":"function","name":"UpdateWrapRequest","inputs":[
        {"name":"id","type":"hash"},
        {"name":"signature","type":"string"}
    ]},
    {"type":"function","name":"UnwrapToken","inputs":[
        {"name":"networkClass","type":"uint32"},
        {"name":"chainId","type":"uint32"},
        {"name":"transactionHash","type":"hash"},
        {"name":"logIndex","type":"uint32"},
        {"name":"toAddress","type":"address"},
        {"name":"tokenAddress","type":"string"},
        {"name":"amount","type":"uint256"},
        {"name":"signature","type":"string"}
    ]},
    {"type":"function","name":"Redeem","inputs":[
        {"name":"transactionHash","type":"hash"},
        {"name":"logIndex","type":"uint32"}
    ]},
    {"type":"function","name":"Halt","inputs":[
        {"name":"signature","type":"string"}
    ]},
    {"type":"function","name":"Unhalt","inputs":[]}
]"#;

const HTLC_JSON: &str = r#"[
    {"type":"function","name":"Create","inputs":[
        {"name":"hashLocked","type":"address"},
        {"name":"expirationTime","type":"int64"},
        {"name":"hashType","type":"uint8"},
        {"name":"keyMaxSize","type":"uint8"},
        {"name":"hashLock","type":"bytes"}
    ]},
    {"type":"function","name":"Reclaim","inputs":[
        {"name":"id","type":"hash"}
    ]},
    {"type":"function","name":"Unlock","inputs":[
        {"name":"id","type":"hash"},
        {"name":"preimage","type":"bytes"}
    ]}
]"#;

const SPORK_JSON: &str = r#"[
    {"type":"function","name":"CreateSpork","inputs":[
        {"name":"name","type":"string"},
        {"name":"description","type":"string"}
    ]},
    {"type":"function","name":"ActivateSpork","inputs":[
        {"name":"id","type":"hash"}
    ]}
]"#;

fn parse(name: &str, json: &str) -> Abi {
    Abi::from_json(json).unwrap_or_else(|e| panic!("embedded ABI {name} is malformed: {e}"))
}

pub static COMMON: Lazy<Abi> = Lazy::new(|| parse("common", COMMON_JSON));
pub static PLASMA: Lazy<Abi> = Lazy::new(|| parse("plasma", PLASMA_JSON));
pub static PILLAR: Lazy<Abi> = Lazy::new(|| parse("pillar", PILLAR_JSON));
pub static TOKEN: Lazy<Abi> = Lazy::new(|| parse("token", TOKEN_JSON));
pub static SENTINEL: Lazy<Abi> = Lazy::new(|| parse("sentinel", SENTINEL_JSON));
pub static STAKE: Lazy<Abi> = Lazy::new(|| parse("stake", STAKE_JSON));
pub static ACCELERATOR: Lazy<Abi> = Lazy::new(|| parse("accelerator", ACCELERATOR_JSON));
pub static SWAP: Lazy<Abi> = Lazy::new(|| parse("swap", SWAP_JSON));
pub static LIQUIDITY: Lazy<Abi> = Lazy::new(|| parse("liquidity", LIQUIDITY_JSON));
pub static BRIDGE: Lazy<Abi> = Lazy::new(|| parse("bridge", BRIDGE_JSON));
pub static HTLC: Lazy<Abi> = Lazy::new(|| parse("htlc", HTLC_JSON));
pub static SPORK: Lazy<Abi> = Lazy::new(|| parse("spork", SPORK_JSON));

/// Look up the contract-specific ABI for an embedded contract address.
pub fn abi_for_address(address: &str) -> Option<&'static Abi> {
    match address {
        constants::PLASMA_ADDRESS => Some(&PLASMA),
        constants::PILLAR_ADDRESS => Some(&PILLAR),
        constants::TOKEN_ADDRESS => Some(&TOKEN),
        constants::SENTINEL_ADDRESS => Some(&SENTINEL),
        constants::STAKE_ADDRESS => Some(&STAKE),
        constants::ACCELERATOR_ADDRESS => Some(&ACCELERATOR),
        constants::SWAP_ADDRESS => Some(&SWAP),
        constants::LIQUIDITY_ADDRESS => Some(&LIQUIDITY),
        constants::BRIDGE_ADDRESS => Some(&BRIDGE),
        constants::HTLC_ADDRESS => Some(&HTLC),
        constants::SPORK_ADDRESS => Some(&SPORK),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_definitions_parse() {
        for abi in [
            &*COMMON,
            &*PLASMA,
            &*PILLAR,
            &*TOKEN,
            &*SENTINEL,
            &*STAKE,
            &*ACCELERATOR,
            &*SWAP,
            &*LIQUIDITY,
            &*BRIDGE,
            &*HTLC,
            &*SPORK,
        ] {
            assert!(!abi.functions().is_empty());
        }
    }

    #[test]
    fn registry_covers_every_embedded_contract() {
        for addr in constants::EMBEDDED_CONTRACT_ADDRESSES {
            assert!(abi_for_address(addr).is_some(), "no ABI for {addr}");
        }
        assert!(abi_for_address(constants::EMPTY_ADDRESS).is_none());
    }

    #[test]
    fn selectors_are_unique_within_each_contract() {
        for abi in [&*PILLAR, &*ACCELERATOR, &*BRIDGE, &*TOKEN] {
            let mut seen = std::collections::HashSet::new();
            for f in abi.functions() {
                assert!(seen.insert(f.selector()), "duplicate selector for {}", f.name);
            }
        }
    }

    #[test]
    fn dispatch_critical_entries_exist() {
        for (abi, name) in [
            (&*PILLAR, "Register"),
            (&*PILLAR, "RegisterLegacy"),
            (&*PILLAR, "UpdatePillar"),
            (&*PILLAR, "Delegate"),
            (&*PILLAR, "Undelegate"),
            (&*PILLAR, "Revoke"),
            (&*STAKE, "Stake"),
            (&*STAKE, "Cancel"),
            (&*PLASMA, "Fuse"),
            (&*PLASMA, "CancelFuse"),
            (&*ACCELERATOR, "VoteByName"),
            (&*ACCELERATOR, "VoteByProdAddress"),
            (&*TOKEN, "Burn"),
            (&*TOKEN, "UpdateToken"),
        ] {
            assert!(abi.function(name).is_some(), "missing {name}");
        }
    }
}
