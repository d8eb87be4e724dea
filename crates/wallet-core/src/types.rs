use chain_eth::chains::{self, EvmChain};
use chain_eth::Address;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::path::DerivationPath;

/// Supported networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
    Ethereum,
    Sepolia,
    Ambrosus,
    AmbrosusTestnet,
}

impl Chain {
    pub const ALL: [Chain; 4] = [
        Chain::Ethereum,
        Chain::Sepolia,
        Chain::Ambrosus,
        Chain::AmbrosusTestnet,
    ];

    /// Network parameters from the chain table.
    pub fn evm(&self) -> &'static EvmChain {
        match self {
            Chain::Ethereum => &chains::ETHEREUM,
            Chain::Sepolia => &chains::SEPOLIA,
            Chain::Ambrosus => &chains::AMBROSUS,
            Chain::AmbrosusTestnet => &chains::AMBROSUS_TESTNET,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Chain> {
        Chain::ALL.into_iter().find(|c| c.chain_id() == chain_id)
    }

    pub fn chain_id(&self) -> u64 {
        self.evm().chain_id
    }

    /// BIP-44 coin type for this chain
    pub fn coin_type(&self) -> u32 {
        self.evm().coin_type
    }

    pub fn display_name(&self) -> &'static str {
        self.evm().name
    }

    pub fn symbol(&self) -> &'static str {
        self.evm().symbol
    }

    pub fn is_testnet(&self) -> bool {
        self.evm().is_testnet
    }

    /// `m/44'/coin_type'/account'/0/index`
    pub fn derivation_path(&self, account: u32, index: u32) -> Result<DerivationPath, WalletError> {
        DerivationPath::bip44(self.coin_type(), account, 0, index)
    }
}

/// Derived address for a specific chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAddress {
    pub chain: Chain,
    pub address: Address,
    pub derivation_path: String,
}
