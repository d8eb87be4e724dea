//! Minimal ABI encoding for EVM function calls.
//!
//! Only static 32-byte words are supported, which covers ERC-20 style
//! calls without pulling in a full ABI parser.

use crypto_utils::hash::keccak256;
use crypto_utils::BigInt;

use crate::address::Address;
use crate::error::EthError;

/// A single ABI-encoded parameter.
#[derive(Debug, Clone)]
pub enum AbiParam {
    /// Left-padded to 32 bytes.
    Address(Address),
    /// Unsigned, at most 256 bits.
    Uint256(BigInt),
    /// Right-padded static word; input beyond 32 bytes is truncated.
    Bytes(Vec<u8>),
}

/// First four bytes of Keccak-256 over a canonical signature such as
/// `"transfer(address,uint256)"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encodes `selector || word(params[0]) || word(params[1]) || ...`.
pub fn encode_function_call(selector: [u8; 4], params: &[AbiParam]) -> Result<Vec<u8>, EthError> {
    let mut data = Vec::with_capacity(4 + params.len() * 32);
    data.extend_from_slice(&selector);

    for param in params {
        data.extend_from_slice(&encode_param(param)?);
    }

    Ok(data)
}

fn encode_param(param: &AbiParam) -> Result<[u8; 32], EthError> {
    match param {
        AbiParam::Address(addr) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(addr.as_bytes());
            Ok(word)
        }
        AbiParam::Uint256(value) => Ok(value.to_fixed_bytes::<32>()?),
        AbiParam::Bytes(bytes) => {
            let mut word = [0u8; 32];
            let len = bytes.len().min(32);
            word[..len].copy_from_slice(&bytes[..len]);
            Ok(word)
        }
    }
}

/// Decodes the first 32-byte word of return data as a uint256.
pub fn decode_uint256(data: &[u8]) -> Result<BigInt, EthError> {
    let word = data.get(..32).ok_or_else(|| {
        EthError::InvalidAmount(format!(
            "expected at least 32 bytes for uint256, got {}",
            data.len()
        ))
    })?;
    Ok(BigInt::from_bytes_be(word))
}
