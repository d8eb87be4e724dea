use chain_eth::Address;

use crate::error::WalletError;
use crate::hd_derivation;
use crate::types::{Chain, DerivedAddress};

/// Derive an address for a given chain from seed bytes
pub fn derive_address(
    seed: &[u8],
    chain: Chain,
    account: u32,
    index: u32,
) -> Result<DerivedAddress, WalletError> {
    let path = chain.derivation_path(account, index)?;
    let key = hd_derivation::derive_from_seed(seed, &path)?;

    Ok(DerivedAddress {
        chain,
        address: Address::from_public_key(&key.public_key()),
        derivation_path: path.to_string(),
    })
}

/// The first `count` receive addresses of `account`.
pub fn derive_addresses(
    seed: &[u8],
    chain: Chain,
    account: u32,
    count: u32,
) -> Result<Vec<DerivedAddress>, WalletError> {
    (0..count)
        .map(|index| derive_address(seed, chain, account, index))
        .collect()
}

/// Validate an address string: well-formed, and checksum-correct when
/// mixed case.
pub fn validate_address(address: &str) -> Result<bool, WalletError> {
    Ok(chain_eth::address::validate_address(address)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::{mnemonic_to_seed, Seed};

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn test_seed() -> Seed {
        mnemonic_to_seed(TEST_MNEMONIC, "").unwrap()
    }

    #[test]
    fn test_derive_eth_address() {
        let seed = test_seed();
        let addr = derive_address(seed.as_bytes(), Chain::Ethereum, 0, 0).unwrap();
        assert_eq!(
            addr.address.to_string(),
            "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
        );
        assert_eq!(addr.derivation_path, "m/44'/60'/0'/0/0");
    }

    #[test]
    fn test_evm_chains_same_address() {
        let seed = test_seed();
        let eth = derive_address(seed.as_bytes(), Chain::Ethereum, 0, 0).unwrap();
        let amb = derive_address(seed.as_bytes(), Chain::AmbrosusTestnet, 0, 0).unwrap();
        assert_eq!(eth.address, amb.address);
        assert_eq!(amb.chain, Chain::AmbrosusTestnet);
    }

    #[test]
    fn test_derive_addresses_are_distinct() {
        let seed = test_seed();
        let addresses = derive_addresses(seed.as_bytes(), Chain::Ethereum, 0, 3).unwrap();
        assert_eq!(addresses.len(), 3);
        assert_eq!(addresses[2].derivation_path, "m/44'/60'/0'/0/2");
        assert_ne!(addresses[0].address, addresses[1].address);
        assert_ne!(addresses[1].address, addresses[2].address);
    }

    #[test]
    fn test_account_out_of_range() {
        let seed = test_seed();
        assert!(matches!(
            derive_address(seed.as_bytes(), Chain::Ethereum, 0x8000_0000, 0),
            Err(WalletError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address("0x9858EfFD232B4033E47d90003D41EC34EcaEda94").unwrap());
        assert!(!validate_address("0x9858efFD232B4033E47d90003D41EC34EcaEda94").unwrap());
        assert!(validate_address("0x123").is_err());
    }
}
