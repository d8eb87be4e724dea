use std::fmt;
use std::str::FromStr;

use crypto_utils::hash::keccak256;
use crypto_utils::PublicKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EthError;

/// A 20-byte account address. Displays with the EIP-55 checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, EthError> {
        let bytes: [u8; 20] = bytes.try_into().map_err(|_| {
            EthError::InvalidAddress(format!("expected 20 bytes, got {}", bytes.len()))
        })?;
        Ok(Address(bytes))
    }

    /// Last 20 bytes of Keccak-256 over the 64-byte uncompressed key body.
    pub fn from_public_key(key: &PublicKey) -> Self {
        let uncompressed = key.to_uncompressed();
        let hash = keccak256(&uncompressed[1..]);
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash[12..]);
        Address(out)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_checksum(&self) -> String {
        eip55(&hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = EthError;

    /// Accepts `0x` + 40 hex digits. Mixed-case input must carry a valid
    /// EIP-55 checksum.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !validate_address(s)? {
            return Err(EthError::InvalidAddress(format!("checksum mismatch for {s}")));
        }
        let mut out = [0u8; 20];
        hex::decode_to_slice(&s[2..], &mut out)
            .map_err(|e| EthError::InvalidAddress(e.to_string()))?;
        Ok(Address(out))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Derives an EIP-55 checksummed address string from a 65-byte uncompressed
/// secp256k1 public key.
pub fn pubkey_to_eth_address(uncompressed_pubkey: &[u8; 65]) -> Result<String, EthError> {
    if uncompressed_pubkey[0] != 0x04 {
        return Err(EthError::InvalidPublicKey(
            "uncompressed key must start with 0x04".into(),
        ));
    }
    let key = PublicKey::from_bytes(uncompressed_pubkey)
        .map_err(|e| EthError::InvalidPublicKey(e.to_string()))?;
    Ok(Address::from_public_key(&key).to_checksum())
}

/// Same as [`pubkey_to_eth_address`] for a 33-byte compressed key.
pub fn pubkey_bytes_to_eth_address(pubkey_33_bytes: &[u8; 33]) -> Result<String, EthError> {
    let key = PublicKey::from_bytes(pubkey_33_bytes)
        .map_err(|e| EthError::InvalidPublicKey(e.to_string()))?;
    Ok(Address::from_public_key(&key).to_checksum())
}

/// Validates an address string.
///
/// Format errors (missing `0x`, wrong length, non-hex) are `Err`. A
/// well-formed address returns `Ok(false)` only when it is mixed-case and
/// the EIP-55 checksum does not match.
pub fn validate_address(address: &str) -> Result<bool, EthError> {
    let hex_part = strip_and_check(address)?;

    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());
    if is_all_lower || is_all_upper {
        return Ok(true);
    }

    Ok(eip55(&hex_part.to_lowercase()) == address)
}

/// Applies EIP-55 mixed-case checksum encoding to a `0x`-prefixed address.
pub fn checksum_address(address: &str) -> Result<String, EthError> {
    let hex_part = strip_and_check(address)?;
    Ok(eip55(&hex_part.to_lowercase()))
}

fn strip_and_check(address: &str) -> Result<&str, EthError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }
    Ok(hex_part)
}

/// `lower_hex` must be 40 lowercase hex digits.
fn eip55(lower_hex: &str) -> String {
    let hash = keccak256(lower_hex.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");
    for (i, c) in lower_hex.chars().enumerate() {
        // Uppercase a letter when its hash nibble is >= 8.
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }
    checksummed
}
