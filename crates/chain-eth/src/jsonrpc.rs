//! [`Provider`] over Ethereum JSON-RPC 2.0.
//!
//! Request and response bodies are built here; moving the bytes to a node
//! is left to a host-supplied [`Transport`] (an HTTP client, a socket, a
//! test double).

use std::sync::atomic::{AtomicU64, Ordering};

use crypto_utils::BigInt;
use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::address::Address;
use crate::error::EthError;
use crate::provider::Provider;

/// Sends one request body to a node and returns the response body.
pub trait Transport: Send + Sync {
    fn post(&self, body: &[u8]) -> Result<Vec<u8>, EthError>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

pub struct JsonRpcProvider<T> {
    transport: T,
    next_id: AtomicU64,
}

impl<T: Transport> JsonRpcProvider<T> {
    pub fn new(transport: T) -> Self {
        JsonRpcProvider {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Performs one call and returns its `result` member.
    pub fn request(&self, method: &str, params: Value) -> Result<Value, EthError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let body = serde_json::to_vec(&payload)
            .map_err(|e| EthError::Provider(format!("{method}: cannot encode request: {e}")))?;

        debug!("rpc request id={id} method={method}");
        let response = self.transport.post(&body)?;
        let response: RpcResponse = serde_json::from_slice(&response)
            .map_err(|e| EthError::Provider(format!("{method}: malformed response: {e}")))?;

        if let Some(error) = response.error {
            return Err(EthError::Provider(format!(
                "{method}: rpc error {}: {}",
                error.code, error.message
            )));
        }
        if response.id != Some(id) {
            return Err(EthError::Provider(format!(
                "{method}: response id {:?} does not match request id {id}",
                response.id
            )));
        }
        response
            .result
            .ok_or_else(|| EthError::Provider(format!("{method}: response has no result")))
    }

    fn request_quantity(&self, method: &str, params: Value) -> Result<BigInt, EthError> {
        let result = self.request(method, params)?;
        let text = result
            .as_str()
            .ok_or_else(|| EthError::Provider(format!("{method}: expected a hex string, got {result}")))?;
        parse_quantity(text)
    }
}

impl<T: Transport> Provider for JsonRpcProvider<T> {
    fn get_transaction_count(&self, address: &Address) -> Result<u64, EthError> {
        // "pending" counts transactions still in the mempool.
        let count = self.request_quantity(
            "eth_getTransactionCount",
            json!([address.to_checksum(), "pending"]),
        )?;
        count
            .to_u64()
            .ok_or_else(|| EthError::Provider(format!("nonce {count} does not fit in u64")))
    }

    fn get_gas_price(&self) -> Result<BigInt, EthError> {
        self.request_quantity("eth_gasPrice", json!([]))
    }

    fn get_balance(&self, address: &Address) -> Result<BigInt, EthError> {
        self.request_quantity("eth_getBalance", json!([address.to_checksum(), "latest"]))
    }

    fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String, EthError> {
        let result = self.request(
            "eth_sendRawTransaction",
            json!([format!("0x{}", hex::encode(raw_tx))]),
        )?;
        let hash = result.as_str().ok_or_else(|| {
            EthError::Provider(format!("eth_sendRawTransaction: expected a hash, got {result}"))
        })?;
        debug!("broadcast accepted tx_hash={hash}");
        Ok(hash.to_string())
    }
}

/// Parses a JSON-RPC quantity such as `"0x1a"`.
pub fn parse_quantity(text: &str) -> Result<BigInt, EthError> {
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| EthError::Provider(format!("quantity {text:?} lacks 0x prefix")))?;
    if digits.is_empty() || digits.starts_with('-') {
        return Err(EthError::Provider(format!("invalid quantity {text:?}")));
    }
    BigInt::from_str_radix(digits, 16)
        .map_err(|e| EthError::Provider(format!("invalid quantity {text:?}: {e}")))
}
