//! ABI type model and call codec.
//!
//! NoM's embedded-contract ABI is the Ethereum scheme with two extra static
//! types (`hash`, `tokenStandard`): 32-byte words, head/tail layout for
//! dynamic arguments, and a 4-byte method selector. Selectors are the first
//! four bytes of SHA3-256 over the canonical signature `Name(type1,type2)`.

use crate::types::{self, Hash};
use serde::Deserialize;
use sha3::{Digest, Sha3_256};
use std::fmt;
use thiserror::Error;

const WORD: usize = 32;

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("unknown function {0}")]
    UnknownFunction(String),
    #[error("no function matches selector")]
    UnknownSelector,
    #[error("{method} expects {expected} arguments, got {got}")]
    ArityMismatch {
        method: String,
        expected: usize,
        got: usize,
    },
    #[error("argument {param} is not a {expected}")]
    TypeMismatch {
        param: String,
        expected: &'static str,
    },
    #[error("call data truncated")]
    Truncated,
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("unsupported ABI type {0}")]
    UnsupportedType(String),
    #[error("malformed ABI definition: {0}")]
    Definition(#[from] serde_json::Error),
}

/// Canonical ABI parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Hash,
    Address,
    TokenStandard,
    String,
    Bytes,
    Bool,
    Uint(usize),
    Int(usize),
}

impl ParamType {
    pub fn canonical_name(&self) -> String {
        match self {
            ParamType::Hash => "hash".into(),
            ParamType::Address => "address".into(),
            ParamType::TokenStandard => "tokenStandard".into(),
            ParamType::String => "string".into(),
            ParamType::Bytes => "bytes".into(),
            ParamType::Bool => "bool".into(),
            ParamType::Uint(bits) => format!("uint{bits}"),
            ParamType::Int(bits) => format!("int{bits}"),
        }
    }

    pub fn from_name(name: &str) -> Result<Self, AbiError> {
        Ok(match name {
            "hash" => ParamType::Hash,
            "address" => ParamType::Address,
            "tokenStandard" => ParamType::TokenStandard,
            "string" => ParamType::String,
            "bytes" => ParamType::Bytes,
            "bool" => ParamType::Bool,
            "uint8" => ParamType::Uint(8),
            "uint16" => ParamType::Uint(16),
            "uint32" => ParamType::Uint(32),
            "uint64" => ParamType::Uint(64),
            "uint256" => ParamType::Uint(256),
            "int32" => ParamType::Int(32),
            "int64" => ParamType::Int(64),
            other => return Err(AbiError::UnsupportedType(other.to_string())),
        })
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, ParamType::String | ParamType::Bytes)
    }
}

/// A decoded (or to-be-encoded) argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Hash(Hash),
    Address(String),
    TokenStandard(String),
    String(String),
    Bytes(Vec<u8>),
    Bool(bool),
    Number(i128),
    BigUint([u8; 32]),
    Nil,
}

impl fmt::Display for Value {
    /// Stringification used for decoded inputs: byte strings render as their
    /// raw UTF-8, strings pass through, everything else uses a canonical
    /// decimal/boolean form, `<nil>` for absent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Hash(h) => write!(f, "{h}"),
            Value::Address(s) | Value::TokenStandard(s) | Value::String(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::Number(n) => write!(f, "{n}"),
            Value::BigUint(word) => f.write_str(&u256_to_decimal(word)),
            Value::Nil => f.write_str("<nil>"),
        }
    }
}

fn u256_to_decimal(word: &[u8; 32]) -> String {
    let mut n = *word;
    let mut digits = Vec::new();
    loop {
        let mut rem: u32 = 0;
        let mut all_zero = true;
        for b in n.iter_mut() {
            let cur = rem * 256 + u32::from(*b);
            *b = (cur / 10) as u8;
            rem = cur % 10;
            if *b != 0 {
                all_zero = false;
            }
        }
        digits.push(b'0' + rem as u8);
        if all_zero {
            break;
        }
    }
    digits.reverse();
    String::from_utf8(digits).expect("decimal digits")
}

/// A named function input.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub kind: ParamType,
}

/// One ABI function entry.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<Param>,
}

impl Function {
    /// Canonical signature, e.g. `VoteByName(hash,string,uint8)`.
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(|p| p.kind.canonical_name()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// 4-byte method selector.
    pub fn selector(&self) -> [u8; 4] {
        let digest = Sha3_256::digest(self.signature().as_bytes());
        [digest[0], digest[1], digest[2], digest[3]]
    }
}

/// A decoded embedded-contract call: method name plus named inputs in
/// declaration order.
#[derive(Debug, Clone)]
pub struct DecodedCall {
    pub method: String,
    pub inputs: Vec<(String, Value)>,
}

impl DecodedCall {
    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

#[derive(Deserialize)]
struct RawEntry {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    #[serde(default)]
    inputs: Vec<RawParam>,
}

#[derive(Deserialize)]
struct RawParam {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

/// A contract ABI: the function entries of one embedded contract.
#[derive(Debug, Clone)]
pub struct Abi {
    functions: Vec<Function>,
}

impl Abi {
    /// Parse a JSON ABI definition, keeping only `function` entries.
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let entries: Vec<RawEntry> = serde_json::from_str(json)?;
        let mut functions = Vec::new();
        for entry in entries {
            if entry.kind != "function" {
                continue;
            }
            let mut inputs = Vec::with_capacity(entry.inputs.len());
            for p in entry.inputs {
                inputs.push(Param {
                    name: p.name,
                    kind: ParamType::from_name(&p.kind)?,
                });
            }
            functions.push(Function {
                name: entry.name,
                inputs,
            });
        }
        Ok(Abi { functions })
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn function_by_selector(&self, selector: &[u8]) -> Option<&Function> {
        self.functions.iter().find(|f| f.selector() == selector)
    }

    /// Encode a call to `name` with positional arguments.
    pub fn encode_call(&self, name: &str, args: &[Value]) -> Result<Vec<u8>, AbiError> {
        let func = self
            .function(name)
            .ok_or_else(|| AbiError::UnknownFunction(name.to_string()))?;
        if args.len() != func.inputs.len() {
            return Err(AbiError::ArityMismatch {
                method: func.name.clone(),
                expected: func.inputs.len(),
                got: args.len(),
            });
        }
        let head_len = WORD * func.inputs.len();
        let mut head = Vec::with_capacity(head_len);
        let mut tail = Vec::new();
        for (param, value) in func.inputs.iter().zip(args) {
            if param.kind.is_dynamic() {
                head.extend_from_slice(&usize_word(head_len + tail.len()));
                let bytes = dynamic_bytes(param, value)?;
                tail.extend_from_slice(&usize_word(bytes.len()));
                tail.extend_from_slice(&bytes);
                let pad = (WORD - bytes.len() % WORD) % WORD;
                tail.extend(std::iter::repeat(0u8).take(pad));
            } else {
                head.extend_from_slice(&encode_static(param, value)?);
            }
        }
        let mut out = Vec::with_capacity(4 + head.len() + tail.len());
        out.extend_from_slice(&func.selector());
        out.extend_from_slice(&head);
        out.extend_from_slice(&tail);
        Ok(out)
    }

    /// Decode call data against this ABI's entries by selector.
    pub fn decode_call(&self, data: &[u8]) -> Result<DecodedCall, AbiError> {
        if data.len() < 4 {
            return Err(AbiError::Truncated);
        }
        let func = self
            .function_by_selector(&data[..4])
            .ok_or(AbiError::UnknownSelector)?;
        let args = &data[4..];
        let mut inputs = Vec::with_capacity(func.inputs.len());
        for (i, param) in func.inputs.iter().enumerate() {
            let word = word_at(args, i * WORD)?;
            let value = if param.kind.is_dynamic() {
                let offset = word_to_usize(word)?;
                let len = word_to_usize(word_at(args, offset)?)?;
                let start = offset + WORD;
                if args.len() < start + len {
                    return Err(AbiError::Truncated);
                }
                let bytes = &args[start..start + len];
                match param.kind {
                    ParamType::String => {
                        Value::String(String::from_utf8_lossy(bytes).into_owned())
                    }
                    _ => Value::Bytes(bytes.to_vec()),
                }
            } else {
                decode_static(param.kind, word)
            };
            inputs.push((param.name.clone(), value));
        }
        Ok(DecodedCall {
            method: func.name.clone(),
            inputs,
        })
    }
}

fn usize_word(n: usize) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&(n as u64).to_be_bytes());
    word
}

fn word_at(args: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    args.get(offset..offset + WORD).ok_or(AbiError::Truncated)
}

fn word_to_usize(word: &[u8]) -> Result<usize, AbiError> {
    if word[..24].iter().any(|&b| b != 0) {
        return Err(AbiError::InvalidValue("offset", hex::encode(word)));
    }
    let mut be = [0u8; 8];
    be.copy_from_slice(&word[24..]);
    Ok(u64::from_be_bytes(be) as usize)
}

fn dynamic_bytes(param: &Param, value: &Value) -> Result<Vec<u8>, AbiError> {
    match (param.kind, value) {
        (ParamType::String, Value::String(s)) => Ok(s.as_bytes().to_vec()),
        (ParamType::Bytes, Value::Bytes(b)) => Ok(b.clone()),
        (kind, _) => Err(AbiError::TypeMismatch {
            param: param.name.clone(),
            expected: match kind {
                ParamType::String => "string",
                _ => "bytes",
            },
        }),
    }
}

fn encode_static(param: &Param, value: &Value) -> Result<[u8; 32], AbiError> {
    let mut word = [0u8; 32];
    match (param.kind, value) {
        (ParamType::Hash, Value::Hash(h)) => word.copy_from_slice(&h.0),
        (ParamType::Address, Value::Address(s)) => {
            let core = types::decode_address(s)
                .map_err(|e| AbiError::InvalidValue("address", e.to_string()))?;
            word[12..].copy_from_slice(&core);
        }
        (ParamType::TokenStandard, Value::TokenStandard(s)) => {
            let core = types::decode_token_standard(s)
                .map_err(|e| AbiError::InvalidValue("tokenStandard", e.to_string()))?;
            word[22..].copy_from_slice(&core);
        }
        (ParamType::Bool, Value::Bool(b)) => word[31] = u8::from(*b),
        (ParamType::Uint(256), Value::BigUint(w)) => word.copy_from_slice(w),
        (ParamType::Uint(bits), Value::Number(n)) => {
            if *n < 0 || (bits < 128 && *n >= 1i128 << bits) {
                return Err(AbiError::InvalidValue("uint", n.to_string()));
            }
            word[16..].copy_from_slice(&(*n as u128).to_be_bytes());
        }
        (ParamType::Int(_), Value::Number(n)) => {
            word[16..].copy_from_slice(&n.to_be_bytes());
            if *n < 0 {
                word[..16].fill(0xff);
            }
        }
        (kind, _) => {
            return Err(AbiError::TypeMismatch {
                param: param.name.clone(),
                expected: match kind {
                    ParamType::Hash => "hash",
                    ParamType::Address => "address",
                    ParamType::TokenStandard => "tokenStandard",
                    ParamType::Bool => "bool",
                    _ => "number",
                },
            })
        }
    }
    Ok(word)
}

fn decode_static(kind: ParamType, word: &[u8]) -> Value {
    match kind {
        ParamType::Hash => {
            let mut h = [0u8; 32];
            h.copy_from_slice(word);
            Value::Hash(Hash(h))
        }
        ParamType::Address => {
            let mut core = [0u8; 20];
            core.copy_from_slice(&word[12..]);
            Value::Address(types::encode_address(&core))
        }
        ParamType::TokenStandard => {
            let mut core = [0u8; 10];
            core.copy_from_slice(&word[22..]);
            Value::TokenStandard(types::encode_token_standard(&core))
        }
        ParamType::Bool => Value::Bool(word[31] != 0),
        ParamType::Uint(256) => {
            let mut w = [0u8; 32];
            w.copy_from_slice(word);
            Value::BigUint(w)
        }
        ParamType::Uint(_) => {
            let mut be = [0u8; 8];
            be.copy_from_slice(&word[24..]);
            Value::Number(i128::from(u64::from_be_bytes(be)))
        }
        ParamType::Int(_) => {
            let mut be = [0u8; 8];
            be.copy_from_slice(&word[24..]);
            Value::Number(i128::from(i64::from_be_bytes(be)))
        }
        ParamType::String | ParamType::Bytes => Value::Nil,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;

    fn test_abi() -> Abi {
        Abi::from_json(
            r#"[
                {"type":"function","name":"VoteByName","inputs":[
                    {"name":"id","type":"hash"},
                    {"name":"name","type":"string"},
                    {"name":"vote","type":"uint8"}
                ]},
                {"type":"function","name":"Stake","inputs":[
                    {"name":"durationInSec","type":"int64"}
                ]},
                {"type":"function","name":"Transfer","inputs":[
                    {"name":"to","type":"address"},
                    {"name":"zts","type":"tokenStandard"},
                    {"name":"amount","type":"uint256"},
                    {"name":"memo","type":"bytes"},
                    {"name":"instant","type":"bool"}
                ]},
                {"type":"variable","name":"ignored","inputs":[]}
            ]"#,
        )
        .unwrap()
    }

    fn hash(byte: u8) -> Hash {
        Hash([byte; 32])
    }

    #[test]
    fn signatures_and_selectors_are_stable() {
        let abi = test_abi();
        let f = abi.function("VoteByName").unwrap();
        assert_eq!(f.signature(), "VoteByName(hash,string,uint8)");
        assert_eq!(f.selector(), f.selector());
        assert_ne!(f.selector(), abi.function("Stake").unwrap().selector());
    }

    #[test]
    fn variable_entries_are_skipped() {
        assert!(test_abi().function("ignored").is_none());
    }

    #[test]
    fn round_trip_mixed_static_dynamic() {
        let abi = test_abi();
        let encoded = abi
            .encode_call(
                "VoteByName",
                &[
                    Value::Hash(hash(0xab)),
                    Value::String("pillar-one".into()),
                    Value::Number(1),
                ],
            )
            .unwrap();
        let call = abi.decode_call(&encoded).unwrap();
        assert_eq!(call.method, "VoteByName");
        assert_eq!(call.input("id"), Some(&Value::Hash(hash(0xab))));
        assert_eq!(call.input("name"), Some(&Value::String("pillar-one".into())));
        assert_eq!(call.input("vote"), Some(&Value::Number(1)));
    }

    #[test]
    fn round_trip_negative_int64() {
        let abi = test_abi();
        let encoded = abi.encode_call("Stake", &[Value::Number(-42)]).unwrap();
        let call = abi.decode_call(&encoded).unwrap();
        assert_eq!(call.input("durationInSec"), Some(&Value::Number(-42)));
    }

    #[test]
    fn round_trip_address_zts_u256_bytes_bool() {
        let abi = test_abi();
        let mut amount = [0u8; 32];
        amount[16..].copy_from_slice(&u128::MAX.to_be_bytes());
        let encoded = abi
            .encode_call(
                "Transfer",
                &[
                    Value::Address(constants::STAKE_ADDRESS.into()),
                    Value::TokenStandard(constants::ZNN_TOKEN_STANDARD.into()),
                    Value::BigUint(amount),
                    Value::Bytes(b"hello".to_vec()),
                    Value::Bool(true),
                ],
            )
            .unwrap();
        let call = abi.decode_call(&encoded).unwrap();
        assert_eq!(
            call.input("to"),
            Some(&Value::Address(constants::STAKE_ADDRESS.into()))
        );
        assert_eq!(
            call.input("zts"),
            Some(&Value::TokenStandard(constants::ZNN_TOKEN_STANDARD.into()))
        );
        assert_eq!(call.input("amount").unwrap().to_string(), u128::MAX.to_string());
        assert_eq!(call.input("memo").unwrap().to_string(), "hello");
        assert_eq!(call.input("instant").unwrap().to_string(), "true");
    }

    #[test]
    fn display_rules() {
        assert_eq!(Value::String("s".into()).to_string(), "s");
        assert_eq!(Value::Bytes(b"raw".to_vec()).to_string(), "raw");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Number(-7).to_string(), "-7");
        assert_eq!(Value::Nil.to_string(), "<nil>");
        assert_eq!(Value::BigUint([0u8; 32]).to_string(), "0");
        let mut one = [0u8; 32];
        one[31] = 1;
        assert_eq!(Value::BigUint(one).to_string(), "1");
    }

    #[test]
    fn short_data_is_rejected() {
        let abi = test_abi();
        assert!(matches!(abi.decode_call(&[]), Err(AbiError::Truncated)));
        assert!(matches!(abi.decode_call(&[1, 2, 3]), Err(AbiError::Truncated)));
        let sel = abi.function("Stake").unwrap().selector();
        assert!(matches!(abi.decode_call(&sel), Err(AbiError::Truncated)));
    }

    #[test]
    fn unknown_selector_is_rejected() {
        let abi = test_abi();
        assert!(matches!(
            abi.decode_call(&[0xde, 0xad, 0xbe, 0xef]),
            Err(AbiError::UnknownSelector)
        ));
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let abi = test_abi();
        assert!(matches!(
            abi.encode_call("Stake", &[]),
            Err(AbiError::ArityMismatch { .. })
        ));
    }
}
