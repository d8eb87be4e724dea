use serde::Serialize;

use crate::error::EthError;

/// Definition of an EVM-compatible network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvmChain {
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
    /// BIP44 coin type used for account derivation.
    pub coin_type: u32,
    pub is_testnet: bool,
}

/// Ethereum Mainnet (chain ID 1).
pub const ETHEREUM: EvmChain = EvmChain {
    chain_id: 1,
    name: "Ethereum",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://eth.llamarpc.com",
    explorer_url: "https://etherscan.io",
    coin_type: 60,
    is_testnet: false,
};

/// Sepolia Testnet (chain ID 11155111).
pub const SEPOLIA: EvmChain = EvmChain {
    chain_id: 11155111,
    name: "Sepolia",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://rpc.sepolia.org",
    explorer_url: "https://sepolia.etherscan.io",
    coin_type: 60,
    is_testnet: true,
};

/// Ambrosus Mainnet (chain ID 16718).
pub const AMBROSUS: EvmChain = EvmChain {
    chain_id: 16718,
    name: "Ambrosus",
    symbol: "AMB",
    decimals: 18,
    rpc_url: "https://network.ambrosus.com",
    explorer_url: "https://explorer.ambrosus.io",
    coin_type: 60,
    is_testnet: false,
};

/// Ambrosus Testnet (chain ID 22040).
pub const AMBROSUS_TESTNET: EvmChain = EvmChain {
    chain_id: 22040,
    name: "Ambrosus Testnet",
    symbol: "AMB",
    decimals: 18,
    rpc_url: "https://network.ambrosus-test.com",
    explorer_url: "https://explorer.ambrosus-test.io",
    coin_type: 60,
    is_testnet: true,
};

const ALL_CHAINS: &[&EvmChain] = &[&ETHEREUM, &SEPOLIA, &AMBROSUS, &AMBROSUS_TESTNET];

/// Returns the chain definition for a given chain ID, or `None` if unsupported.
pub fn get_chain(chain_id: u64) -> Option<&'static EvmChain> {
    ALL_CHAINS
        .iter()
        .find(|c| c.chain_id == chain_id)
        .copied()
}

/// Like [`get_chain`], failing with [`EthError::UnsupportedChain`].
pub fn require_chain(chain_id: u64) -> Result<&'static EvmChain, EthError> {
    get_chain(chain_id).ok_or(EthError::UnsupportedChain(chain_id))
}

pub fn supported_chains() -> Vec<&'static EvmChain> {
    ALL_CHAINS.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_ethereum() {
        let chain = get_chain(1).expect("Ethereum should be supported");
        assert_eq!(chain.name, "Ethereum");
        assert_eq!(chain.symbol, "ETH");
        assert!(!chain.is_testnet);
    }

    #[test]
    fn get_ambrosus_networks() {
        let main = get_chain(16718).expect("Ambrosus should be supported");
        assert_eq!(main.symbol, "AMB");
        assert!(!main.is_testnet);

        let test = get_chain(22040).expect("Ambrosus testnet should be supported");
        assert_eq!(test.rpc_url, "https://network.ambrosus-test.com");
        assert!(test.is_testnet);
    }

    #[test]
    fn get_sepolia_testnet() {
        let chain = get_chain(11155111).expect("Sepolia should be supported");
        assert!(chain.is_testnet);
    }

    #[test]
    fn unsupported_chain() {
        assert!(get_chain(999999).is_none());
        assert_eq!(
            require_chain(999999).unwrap_err(),
            EthError::UnsupportedChain(999999)
        );
    }

    #[test]
    fn supported_chains_includes_all() {
        let chains = supported_chains();
        assert_eq!(chains.len(), 4);
        assert_eq!(chains.iter().filter(|c| c.is_testnet).count(), 2);
    }

    #[test]
    fn all_chains_share_evm_conventions() {
        for chain in supported_chains() {
            assert_eq!(chain.decimals, 18, "{} should have 18 decimals", chain.name);
            assert_eq!(chain.coin_type, 60);
            assert!(chain.rpc_url.starts_with("https://"));
            assert!(chain.explorer_url.starts_with("https://"));
        }
    }

    #[test]
    fn chains_serialize_to_json() {
        let json = serde_json::to_value(&AMBROSUS_TESTNET).unwrap();
        assert_eq!(json["chain_id"], 22040);
        assert_eq!(json["name"], "Ambrosus Testnet");
    }
}
