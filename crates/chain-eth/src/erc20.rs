use crypto_utils::BigInt;

use crate::abi::{encode_function_call, selector, AbiParam};
use crate::address::Address;
use crate::error::EthError;

const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";
const BALANCE_OF_SIGNATURE: &str = "balanceOf(address)";
const APPROVE_SIGNATURE: &str = "approve(address,uint256)";

/// Encodes an ERC-20 `transfer(address,uint256)` call.
///
/// Returns the complete calldata: 4-byte selector + 64 bytes of params.
pub fn encode_transfer(to: &Address, amount: &BigInt) -> Result<Vec<u8>, EthError> {
    let params = [AbiParam::Address(*to), AbiParam::Uint256(amount.clone())];
    encode_function_call(selector(TRANSFER_SIGNATURE), &params)
}

/// Encodes an ERC-20 `balanceOf(address)` call.
pub fn encode_balance_of(owner: &Address) -> Result<Vec<u8>, EthError> {
    let params = [AbiParam::Address(*owner)];
    encode_function_call(selector(BALANCE_OF_SIGNATURE), &params)
}

/// Encodes an ERC-20 `approve(address,uint256)` call.
pub fn encode_approve(spender: &Address, amount: &BigInt) -> Result<Vec<u8>, EthError> {
    let params = [AbiParam::Address(*spender), AbiParam::Uint256(amount.clone())];
    encode_function_call(selector(APPROVE_SIGNATURE), &params)
}
