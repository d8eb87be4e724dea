//! The network collaborator that supplies chain state and broadcasts
//! signed transactions.
//!
//! Implementations form a closed set: [`crate::jsonrpc::JsonRpcProvider`]
//! talks to a node, while [`FallbackProvider`] and [`RoundRobinProvider`]
//! compose other providers. None of them retries a failed call on the same
//! backend; retry policy belongs to the caller.

use std::sync::atomic::{AtomicUsize, Ordering};

use crypto_utils::BigInt;
use log::{debug, warn};

use crate::address::Address;
use crate::error::EthError;

pub trait Provider: Send + Sync {
    /// Nonce for the next transaction sent from `address`.
    fn get_transaction_count(&self, address: &Address) -> Result<u64, EthError>;

    /// Current gas price in wei.
    fn get_gas_price(&self) -> Result<BigInt, EthError>;

    /// Balance of `address` in wei.
    fn get_balance(&self, address: &Address) -> Result<BigInt, EthError>;

    /// Broadcasts raw signed bytes and returns the 0x-prefixed tx hash.
    fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String, EthError>;
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn get_transaction_count(&self, address: &Address) -> Result<u64, EthError> {
        (**self).get_transaction_count(address)
    }

    fn get_gas_price(&self) -> Result<BigInt, EthError> {
        (**self).get_gas_price()
    }

    fn get_balance(&self, address: &Address) -> Result<BigInt, EthError> {
        (**self).get_balance(address)
    }

    fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String, EthError> {
        (**self).send_raw_transaction(raw_tx)
    }
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// Asks each provider in order and returns the first success.
pub struct FallbackProvider {
    providers: Vec<Box<dyn Provider>>,
}

impl FallbackProvider {
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Result<Self, EthError> {
        if providers.is_empty() {
            return Err(EthError::Provider("fallback provider needs at least one backend".into()));
        }
        Ok(FallbackProvider { providers })
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn first_success<R>(
        &self,
        call: &str,
        f: impl Fn(&dyn Provider) -> Result<R, EthError>,
    ) -> Result<R, EthError> {
        try_in_order(&self.providers, 0, call, f)
    }
}

impl Provider for FallbackProvider {
    fn get_transaction_count(&self, address: &Address) -> Result<u64, EthError> {
        self.first_success("get_transaction_count", |p| p.get_transaction_count(address))
    }

    fn get_gas_price(&self) -> Result<BigInt, EthError> {
        self.first_success("get_gas_price", |p| p.get_gas_price())
    }

    fn get_balance(&self, address: &Address) -> Result<BigInt, EthError> {
        self.first_success("get_balance", |p| p.get_balance(address))
    }

    fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String, EthError> {
        self.first_success("send_raw_transaction", |p| p.send_raw_transaction(raw_tx))
    }
}

// ---------------------------------------------------------------------------
// Round robin
// ---------------------------------------------------------------------------

/// Spreads calls across providers. Each call starts at the next provider
/// in rotation and falls through the rest on failure.
pub struct RoundRobinProvider {
    providers: Vec<Box<dyn Provider>>,
    cursor: AtomicUsize,
}

impl RoundRobinProvider {
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Result<Self, EthError> {
        if providers.is_empty() {
            return Err(EthError::Provider(
                "round-robin provider needs at least one backend".into(),
            ));
        }
        Ok(RoundRobinProvider {
            providers,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn rotate<R>(
        &self,
        call: &str,
        f: impl Fn(&dyn Provider) -> Result<R, EthError>,
    ) -> Result<R, EthError> {
        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % self.providers.len();
        debug!("{call}: round-robin selected backend {start}");
        try_in_order(&self.providers, start, call, f)
    }
}

impl Provider for RoundRobinProvider {
    fn get_transaction_count(&self, address: &Address) -> Result<u64, EthError> {
        self.rotate("get_transaction_count", |p| p.get_transaction_count(address))
    }

    fn get_gas_price(&self) -> Result<BigInt, EthError> {
        self.rotate("get_gas_price", |p| p.get_gas_price())
    }

    fn get_balance(&self, address: &Address) -> Result<BigInt, EthError> {
        self.rotate("get_balance", |p| p.get_balance(address))
    }

    fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String, EthError> {
        self.rotate("send_raw_transaction", |p| p.send_raw_transaction(raw_tx))
    }
}

/// Tries every provider once, starting at `start` and wrapping around.
/// Returns the last error when all of them fail.
fn try_in_order<R>(
    providers: &[Box<dyn Provider>],
    start: usize,
    call: &str,
    f: impl Fn(&dyn Provider) -> Result<R, EthError>,
) -> Result<R, EthError> {
    let mut last_error = EthError::Provider(format!("{call}: no providers available"));
    for offset in 0..providers.len() {
        let index = (start + offset) % providers.len();
        match f(providers[index].as_ref()) {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("{call}: backend {index} failed: {e}");
                last_error = e;
            }
        }
    }
    Err(last_error)
}
