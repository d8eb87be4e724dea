//! Wallet configuration, loaded from JSON.

use chain_eth::jsonrpc::{JsonRpcProvider, Transport};
use chain_eth::provider::{FallbackProvider, Provider, RoundRobinProvider};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::path::HARDENED_OFFSET;
use crate::types::Chain;

/// Gas used by a plain value transfer.
pub const TRANSFER_GAS: u64 = 21_000;

/// How several endpoints are combined into one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStrategy {
    /// Only the first endpoint is used.
    #[default]
    Single,
    Fallback,
    RoundRobin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalletConfig {
    pub chain: Chain,
    pub account: u32,
    pub address_index: u32,
    pub default_gas_limit: u64,
    /// JSON-RPC endpoints; empty means the chain's public endpoint.
    pub endpoints: Vec<String>,
    pub strategy: ProviderStrategy,
}

impl Default for WalletConfig {
    fn default() -> Self {
        WalletConfig {
            chain: Chain::AmbrosusTestnet,
            account: 0,
            address_index: 0,
            default_gas_limit: TRANSFER_GAS,
            endpoints: Vec::new(),
            strategy: ProviderStrategy::Single,
        }
    }
}

impl WalletConfig {
    /// Parses and validates a JSON document. Missing fields take their
    /// default values.
    pub fn from_json(json: &str) -> Result<Self, WalletError> {
        let config: WalletConfig =
            serde_json::from_str(json).map_err(|e| WalletError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, WalletError> {
        serde_json::to_string_pretty(self).map_err(|e| WalletError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        if self.account >= HARDENED_OFFSET || self.address_index >= HARDENED_OFFSET {
            return Err(WalletError::InvalidConfig(
                "account and address_index must be below 2^31".into(),
            ));
        }
        if self.default_gas_limit < TRANSFER_GAS {
            return Err(WalletError::InvalidConfig(format!(
                "default_gas_limit {} is below the {TRANSFER_GAS} a transfer needs",
                self.default_gas_limit
            )));
        }
        if let Some(bad) = self
            .endpoints
            .iter()
            .find(|e| !(e.starts_with("https://") || e.starts_with("http://")))
        {
            return Err(WalletError::InvalidConfig(format!(
                "endpoint {bad:?} is not an http(s) url"
            )));
        }
        Ok(())
    }

    /// Configured endpoints, or the chain's public endpoint when none are set.
    pub fn resolved_endpoints(&self) -> Vec<String> {
        if self.endpoints.is_empty() {
            vec![self.chain.evm().rpc_url.to_string()]
        } else {
            self.endpoints.clone()
        }
    }

    /// Builds a provider over the resolved endpoints. `connect` turns an
    /// endpoint url into the host's transport for it.
    pub fn build_provider<T, F>(&self, connect: F) -> Result<Box<dyn Provider>, WalletError>
    where
        T: Transport + 'static,
        F: Fn(&str) -> T,
    {
        self.validate()?;
        let endpoints = self.resolved_endpoints();
        debug!(
            "building {:?} provider over {} endpoint(s) for {}",
            self.strategy,
            endpoints.len(),
            self.chain.display_name()
        );

        let mut backends = endpoints
            .iter()
            .map(|url| Box::new(JsonRpcProvider::new(connect(url))) as Box<dyn Provider>);

        let provider: Box<dyn Provider> = match self.strategy {
            ProviderStrategy::Single => backends
                .next()
                .ok_or_else(|| WalletError::InvalidConfig("no endpoints".into()))?,
            ProviderStrategy::Fallback => Box::new(FallbackProvider::new(backends.collect())?),
            ProviderStrategy::RoundRobin => Box::new(RoundRobinProvider::new(backends.collect())?),
        };
        Ok(provider)
    }
}
