//! Embedded-contract ABI layer for the Network of Momentum.
//!
//! This crate carries everything the indexer needs to understand calls into
//! the protocol's embedded contracts: the bech32 address/token-standard
//! codec, the ABI type model with selector computation and call
//! encode/decode, the static ABI registry for the eleven embedded contracts,
//! protocol constants, and the deterministic secondary-ID derivations
//! (voting id, stake/fusion cancel ids).

pub mod abi;
pub mod bech32;
pub mod constants;
pub mod derive;
pub mod embedded;
pub mod types;

pub use abi::{Abi, AbiError, DecodedCall, Function, Param, ParamType, Value};
pub use constants::{is_embedded_contract, reward_contract_addresses};
pub use derive::{fusion_cancel_id, stake_cancel_id, voting_id};
pub use embedded::abi_for_address;
pub use types::Hash;
