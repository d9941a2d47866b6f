//! Core on-chain value types shared by the ABI codec and its callers.

use crate::bech32;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hash: {0}")]
    InvalidHash(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("invalid token standard: {0}")]
    InvalidTokenStandard(String),
}

/// A 32-byte chain hash, displayed as lowercase hex without a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash(pub [u8; 32]);

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Hash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| TypeError::InvalidHash(s.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| TypeError::InvalidHash(s.to_string()))?;
        Ok(Hash(bytes))
    }
}

/// Encode a 20-byte address core as a `z1...` bech32 string.
pub fn encode_address(core: &[u8; 20]) -> String {
    bech32::encode("z", core)
}

/// Decode a `z1...` bech32 address to its 20-byte core.
pub fn decode_address(s: &str) -> Result<[u8; 20], TypeError> {
    let (hrp, data) = bech32::decode(s).map_err(|_| TypeError::InvalidAddress(s.to_string()))?;
    if hrp != "z" {
        return Err(TypeError::InvalidAddress(s.to_string()));
    }
    data.try_into()
        .map_err(|_| TypeError::InvalidAddress(s.to_string()))
}

/// Encode a 10-byte ZTS core as a `zts1...` bech32 string.
pub fn encode_token_standard(core: &[u8; 10]) -> String {
    bech32::encode("zts", core)
}

/// Decode a `zts1...` bech32 token standard to its 10-byte core.
pub fn decode_token_standard(s: &str) -> Result<[u8; 10], TypeError> {
    let (hrp, data) =
        bech32::decode(s).map_err(|_| TypeError::InvalidTokenStandard(s.to_string()))?;
    if hrp != "zts" {
        return Err(TypeError::InvalidTokenStandard(s.to_string()));
    }
    data.try_into()
        .map_err(|_| TypeError::InvalidTokenStandard(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;

    #[test]
    fn hash_round_trip() {
        let h: Hash = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff"
            .parse()
            .unwrap();
        assert_eq!(
            h.to_string(),
            "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff"
        );
    }

    #[test]
    fn hash_rejects_bad_input() {
        assert!("xyz".parse::<Hash>().is_err());
        assert!("0011".parse::<Hash>().is_err());
    }

    #[test]
    fn address_round_trip() {
        let core = decode_address(constants::PILLAR_ADDRESS).unwrap();
        assert_eq!(encode_address(&core), constants::PILLAR_ADDRESS);
    }

    #[test]
    fn token_standard_round_trip() {
        let core = decode_token_standard(constants::ZNN_TOKEN_STANDARD).unwrap();
        assert_eq!(encode_token_standard(&core), constants::ZNN_TOKEN_STANDARD);
    }

    #[test]
    fn address_rejects_wrong_hrp() {
        assert!(decode_address(constants::ZNN_TOKEN_STANDARD).is_err());
    }
}
