//! # crypto-utils
//!
//! Arbitrary-precision integers, secp256k1 curve arithmetic, hash
//! primitives, and deterministic ECDSA for the wallet engine.

pub mod bigint;
pub mod curve;
pub mod ecdsa;
pub mod error;
pub mod hash;
pub mod random;

pub use bigint::{BigInt, Modulus, Sign};
pub use curve::{secp256k1, Point};
pub use ecdsa::{PrivateKey, PublicKey, Signature};
pub use error::CryptoError;
