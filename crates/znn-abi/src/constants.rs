//! Protocol constants baked into the chain. These must not change across
//! restarts; rows written under one set of constants are unreadable under
//! another.

/// Embedded contract addresses.
pub const PLASMA_ADDRESS: &str = "z1qxemdeddedxplasmaxxxxxxxxxxxxxxxxsctrp";
pub const PILLAR_ADDRESS: &str = "z1qxemdeddedxpyllarxxxxxxxxxxxxxxxsy3fmg";
pub const TOKEN_ADDRESS: &str = "z1qxemdeddedxt0kenxxxxxxxxxxxxxxxxh9amk0";
pub const SENTINEL_ADDRESS: &str = "z1qxemdeddedxsentynelxxxxxxxxxxxxxwy0r2r";
pub const STAKE_ADDRESS: &str = "z1qxemdeddedxstakexxxxxxxxxxxxxxxxjv8v62";
pub const ACCELERATOR_ADDRESS: &str = "z1qxemdeddedxaccelerat0rxxxxxxxxxxp4tk22";
pub const SWAP_ADDRESS: &str = "z1qxemdeddedxswapxxxxxxxxxxxxxxxxxxl4yww";
pub const LIQUIDITY_ADDRESS: &str = "z1qxemdeddedxlyquydytyxxxxxxxxxxxxflaaae";
pub const BRIDGE_ADDRESS: &str = "z1qxemdeddedxdrydgexxxxxxxxxxxxxxxmqgr0d";
pub const HTLC_ADDRESS: &str = "z1qxemdeddedxhtlcxxxxxxxxxxxxxxxxxygecvw";
pub const SPORK_ADDRESS: &str = "z1qxemdeddedxsp0rkxxxxxxxxxxxxxxxx956u48";

/// Special addresses.
pub const EMPTY_ADDRESS: &str = "z1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqsggv2f";
pub const LIQUIDITY_TREASURY_ADDRESS: &str = "z1qqw8f3qxx9zg92xgckqdpfws3dw07d26afsj74";

/// Token standards.
pub const EMPTY_TOKEN_STANDARD: &str = "zts1qqqqqqqqqqqqqqqqtq587y";
pub const ZNN_TOKEN_STANDARD: &str = "zts1znnxxxxxxxxxxxxx9z4ulx";
pub const QSR_TOKEN_STANDARD: &str = "zts1qsrxxxxxxxxxxxxxmrhjll";

/// Genesis momentum timestamp (unix seconds).
pub const GENESIS_MOMENTUM_TIMESTAMP: i64 = 1637755210;

/// Fusion expiration time in seconds (1 hour).
pub const FUSION_EXPIRATION_SECS: i64 = 3600;

/// All embedded contract addresses.
pub const EMBEDDED_CONTRACT_ADDRESSES: &[&str] = &[
    PLASMA_ADDRESS,
    PILLAR_ADDRESS,
    TOKEN_ADDRESS,
    SENTINEL_ADDRESS,
    STAKE_ADDRESS,
    ACCELERATOR_ADDRESS,
    SWAP_ADDRESS,
    LIQUIDITY_ADDRESS,
    BRIDGE_ADDRESS,
    HTLC_ADDRESS,
    SPORK_ADDRESS,
];

/// True if `address` is one of the embedded contracts.
pub fn is_embedded_contract(address: &str) -> bool {
    EMBEDDED_CONTRACT_ADDRESSES.contains(&address)
}

/// Contract addresses that distribute rewards.
pub fn reward_contract_addresses() -> &'static [&'static str] {
    &[
        PILLAR_ADDRESS,
        SENTINEL_ADDRESS,
        STAKE_ADDRESS,
        LIQUIDITY_ADDRESS,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_contract_predicate() {
        for addr in EMBEDDED_CONTRACT_ADDRESSES {
            assert!(is_embedded_contract(addr));
        }
        assert!(!is_embedded_contract(EMPTY_ADDRESS));
        assert!(!is_embedded_contract(LIQUIDITY_TREASURY_ADDRESS));
        assert!(!is_embedded_contract("z1qqjnwjjpnue8xmmpanz6csze6tcmtzzdtfsww7"));
        assert!(!is_embedded_contract(""));
    }

    #[test]
    fn eleven_embedded_contracts() {
        assert_eq!(EMBEDDED_CONTRACT_ADDRESSES.len(), 11);
    }

    #[test]
    fn reward_contracts_are_embedded() {
        for addr in reward_contract_addresses() {
            assert!(is_embedded_contract(addr));
        }
    }
}
