use chain_eth::EthError;
use crypto_utils::CryptoError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Cannot derive hardened child {index} from a public key")]
    HardenedFromPublic { index: u32 },

    /// The child at `index` does not exist; the caller may move on to the
    /// next index.
    #[error("Derived key at index {index} is invalid")]
    InvalidDerivedKey { index: u32 },

    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("Invalid extended key: {0}")]
    InvalidExtendedKey(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Eth(#[from] EthError),
}
