//! Ethereum/EVM chain support for the wallet engine.
//!
//! This crate provides:
//! - RLP encoding and strict decoding
//! - Legacy transactions with EIP-155 signing, raw encoding and decoding
//! - Addresses from secp256k1 public keys (with EIP-55 checksums)
//! - ERC-20 calldata and minimal ABI encoding
//! - Unit conversions, including Amber denominations
//! - EVM network definitions (Ethereum, Ambrosus)
//! - The `Provider` collaborator with JSON-RPC, fallback and round-robin
//!   implementations

pub mod abi;
pub mod address;
pub mod chains;
pub mod erc20;
pub mod error;
pub mod jsonrpc;
pub mod provider;
pub mod rlp;
pub mod transaction;
pub mod units;

pub use address::Address;
pub use error::EthError;
pub use provider::Provider;
pub use transaction::{SignedEthTransaction, Transaction};
