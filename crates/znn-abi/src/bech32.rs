//! Minimal bech32 (BIP-173) codec.
//!
//! NoM addresses (`z1...`) and token standards (`zts1...`) are plain bech32
//! strings. Only the pieces the ABI layer needs are implemented: byte-level
//! encode and checksum-verifying decode.

use thiserror::Error;

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const GENERATOR: [u32; 5] = [0x3b6a_57b2, 0x2650_8e6d, 0x1ea1_19fa, 0x3d42_33dd, 0x2a14_62b3];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Bech32Error {
    #[error("missing separator")]
    MissingSeparator,
    #[error("invalid character {0:?}")]
    InvalidChar(char),
    #[error("checksum mismatch")]
    InvalidChecksum,
    #[error("invalid data length")]
    InvalidLength,
}

fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &v in values {
        let b = (chk >> 25) as u8;
        chk = ((chk & 0x01ff_ffff) << 5) ^ u32::from(v);
        for (i, g) in GENERATOR.iter().enumerate() {
            if (b >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(hrp.len() * 2 + 1);
    for b in hrp.bytes() {
        out.push(b >> 5);
    }
    out.push(0);
    for b in hrp.bytes() {
        out.push(b & 0x1f);
    }
    out
}

fn create_checksum(hrp: &str, data5: &[u8]) -> [u8; 6] {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data5);
    values.extend_from_slice(&[0; 6]);
    let m = polymod(&values) ^ 1;
    let mut out = [0u8; 6];
    for (i, o) in out.iter_mut().enumerate() {
        *o = ((m >> (5 * (5 - i))) & 0x1f) as u8;
    }
    out
}

fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, Bech32Error> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::new();
    let maxv: u32 = (1 << to) - 1;
    for &b in data {
        acc = (acc << from) | u32::from(b);
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & maxv) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & maxv) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return Err(Bech32Error::InvalidLength);
    }
    Ok(out)
}

/// Encode raw bytes under the given human-readable part.
pub fn encode(hrp: &str, data: &[u8]) -> String {
    let data5 = convert_bits(data, 8, 5, true).expect("8-to-5 with padding cannot fail");
    let checksum = create_checksum(hrp, &data5);
    let mut s = String::with_capacity(hrp.len() + 1 + data5.len() + 6);
    s.push_str(hrp);
    s.push('1');
    for &v in data5.iter().chain(checksum.iter()) {
        s.push(CHARSET[v as usize] as char);
    }
    s
}

/// Decode a bech32 string into its human-readable part and raw bytes.
pub fn decode(s: &str) -> Result<(String, Vec<u8>), Bech32Error> {
    let pos = s.rfind('1').ok_or(Bech32Error::MissingSeparator)?;
    if pos == 0 || pos + 7 > s.len() {
        return Err(Bech32Error::MissingSeparator);
    }
    let hrp = &s[..pos];
    let mut data5 = Vec::with_capacity(s.len() - pos - 1);
    for c in s[pos + 1..].chars() {
        let idx = CHARSET
            .iter()
            .position(|&b| b as char == c)
            .ok_or(Bech32Error::InvalidChar(c))?;
        data5.push(idx as u8);
    }
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(&data5);
    if polymod(&values) != 1 {
        return Err(Bech32Error::InvalidChecksum);
    }
    let data = convert_bits(&data5[..data5.len() - 6], 5, 8, false)?;
    Ok((hrp.to_string(), data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;

    #[test]
    fn round_trip_20_bytes() {
        let payload: Vec<u8> = (0u8..20).collect();
        let s = encode("z", &payload);
        let (hrp, data) = decode(&s).unwrap();
        assert_eq!(hrp, "z");
        assert_eq!(data, payload);
    }

    #[test]
    fn embedded_addresses_decode() {
        for addr in constants::EMBEDDED_CONTRACT_ADDRESSES {
            let (hrp, data) = decode(addr).unwrap();
            assert_eq!(hrp, "z");
            assert_eq!(data.len(), 20, "address {addr}");
            assert_eq!(encode("z", &data), *addr);
        }
    }

    #[test]
    fn token_standards_decode() {
        for zts in [
            constants::ZNN_TOKEN_STANDARD,
            constants::QSR_TOKEN_STANDARD,
            constants::EMPTY_TOKEN_STANDARD,
        ] {
            let (hrp, data) = decode(zts).unwrap();
            assert_eq!(hrp, "zts");
            assert_eq!(data.len(), 10, "token standard {zts}");
            assert_eq!(encode("zts", &data), zts);
        }
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let s = encode("z", &[7u8; 20]);
        let mut corrupted = s.into_bytes();
        let last = corrupted.len() - 1;
        corrupted[last] = if corrupted[last] == b'q' { b'p' } else { b'q' };
        let corrupted = String::from_utf8(corrupted).unwrap();
        assert_eq!(decode(&corrupted), Err(Bech32Error::InvalidChecksum));
    }
}
