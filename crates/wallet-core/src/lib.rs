//! # wallet-core
//!
//! Mnemonic handling, hierarchical key derivation, and the signing
//! pipeline for Ethereum-compatible chains. The flat functions below are
//! the embedding surface; [`wallet::Wallet`] ties the pieces to a
//! [`config::WalletConfig`] and a network [`chain_eth::Provider`].

pub mod address;
pub mod config;
pub mod error;
pub mod hd_derivation;
pub mod mnemonic;
pub mod path;
pub mod types;
pub mod wallet;

use chain_eth::transaction::legacy_v;
use chain_eth::{Address, SignedEthTransaction, Transaction};
use crypto_utils::{BigInt, CryptoError, PublicKey, Signature};
use zeroize::Zeroizing;

use config::WalletConfig;
use error::WalletError;
use hd_derivation::{ExtendedKey, Network};
use mnemonic::Seed;
use path::DerivationPath;
use types::{Chain, DerivedAddress};
use wallet::Wallet;

pub use chain_eth;
pub use crypto_utils;

// ─── Mnemonics ───────────────────────────────────────────────────────

/// Generate a new BIP-39 mnemonic of 12, 15, 18, 21 or 24 words
pub fn generate_mnemonic(word_count: usize) -> Result<String, WalletError> {
    mnemonic::generate_mnemonic(word_count)
}

/// Validate a mnemonic phrase, including its checksum
pub fn validate_mnemonic(phrase: &str) -> bool {
    mnemonic::validate_mnemonic(phrase)
}

/// Check if a single word is in the BIP-39 word list
pub fn is_valid_bip39_word(word: &str) -> bool {
    mnemonic::is_valid_word(word)
}

/// Derive seed bytes from mnemonic + passphrase
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<Seed, WalletError> {
    mnemonic::mnemonic_to_seed(phrase, passphrase)
}

// ─── Addresses ───────────────────────────────────────────────────────

/// Derive an address for a specific chain from mnemonic
pub fn derive_address_from_mnemonic(
    phrase: &str,
    passphrase: &str,
    chain: Chain,
    account: u32,
    index: u32,
) -> Result<DerivedAddress, WalletError> {
    let seed = mnemonic::mnemonic_to_seed(phrase, passphrase)?;
    address::derive_address(seed.as_bytes(), chain, account, index)
}

/// The first `count` receive addresses of `account`
pub fn derive_addresses_from_mnemonic(
    phrase: &str,
    passphrase: &str,
    chain: Chain,
    account: u32,
    count: u32,
) -> Result<Vec<DerivedAddress>, WalletError> {
    let seed = mnemonic::mnemonic_to_seed(phrase, passphrase)?;
    address::derive_addresses(seed.as_bytes(), chain, account, count)
}

/// Validate an address string
pub fn validate_address(addr: &str) -> Result<bool, WalletError> {
    address::validate_address(addr)
}

// ─── Extended keys ───────────────────────────────────────────────────

/// Base58Check extended private key at `path`
pub fn export_xprv(
    seed: &[u8],
    path: &str,
    network: Network,
) -> Result<Zeroizing<String>, WalletError> {
    let path: DerivationPath = path.parse()?;
    Ok(hd_derivation::derive_from_seed(seed, &path)?.to_base58(network))
}

/// Base58Check extended public key at `path`
pub fn export_xpub(seed: &[u8], path: &str, network: Network) -> Result<String, WalletError> {
    let path: DerivationPath = path.parse()?;
    let key = hd_derivation::derive_from_seed(seed, &path)?.neuter();
    Ok(key.to_base58(network).as_str().to_owned())
}

/// Derive a child address from an exported xpub without touching any
/// private key. `path` is relative to the xpub and must be unhardened.
pub fn derive_address_from_xpub(xpub: &str, path: &str) -> Result<Address, WalletError> {
    let (key, _) = ExtendedKey::from_base58(xpub)?;
    let path: DerivationPath = path.parse()?;
    let child = key.neuter().derive_path(&path)?;
    Ok(Address::from_public_key(&child.public_key()))
}

// ─── Signing ─────────────────────────────────────────────────────────

/// Sign a legacy EIP-155 transaction with the key at
/// `m/44'/coin'/account'/0/index`. The transaction's chain id must match
/// `chain`.
pub fn sign_eth_transaction(
    seed: &[u8],
    chain: Chain,
    account: u32,
    index: u32,
    tx: &Transaction,
) -> Result<SignedEthTransaction, WalletError> {
    signer(seed, chain, account, index)?.sign(tx)
}

/// Sign an ERC-20 `transfer(to, amount)` call on `token`
#[allow(clippy::too_many_arguments)]
pub fn sign_erc20_transfer(
    seed: &[u8],
    chain: Chain,
    account: u32,
    index: u32,
    nonce: u64,
    token: &str,
    to: &str,
    amount: &BigInt,
    gas_price: BigInt,
    gas_limit: u64,
) -> Result<SignedEthTransaction, WalletError> {
    let token: Address = token.parse()?;
    let to: Address = to.parse()?;
    let tx = Transaction::erc20_transfer(
        chain.chain_id(),
        nonce,
        token,
        &to,
        amount,
        gas_price,
        BigInt::from(gas_limit),
    )?;
    signer(seed, chain, account, index)?.sign(&tx)
}

/// Sign an arbitrary message with EIP-191 personal_sign.
/// Returns 65-byte signature (r + s + v).
pub fn sign_eth_message(
    seed: &[u8],
    account: u32,
    index: u32,
    message: &[u8],
) -> Result<[u8; 65], WalletError> {
    signer(seed, Chain::Ethereum, account, index)?.sign_message(message)
}

/// Sign a raw 32-byte hash (no EIP-191 prefix). `v` is 27 or 28.
pub fn sign_eth_raw_hash(
    seed: &[u8],
    account: u32,
    index: u32,
    hash: &[u8; 32],
) -> Result<[u8; 65], WalletError> {
    let path = Chain::Ethereum.derivation_path(account, index)?;
    let key = hd_derivation::derive_from_seed(seed, &path)?;
    let private_key = key
        .private_key()
        .ok_or_else(|| WalletError::InvalidSeed("derivation produced a public key".into()))?;
    let mut sig = private_key.sign_prehash(hash).to_bytes();
    sig[64] = legacy_v(sig[64])?;
    Ok(sig)
}

/// Compute Keccak-256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    crypto_utils::hash::keccak256(data)
}

/// Recover the uncompressed public key (0x04 || x || y) from a 65-byte
/// signature and a 32-byte message hash. `v` may be 0/1 or 27/28.
pub fn recover_eth_pubkey(signature: &[u8; 65], hash: &[u8; 32]) -> Result<[u8; 65], WalletError> {
    let mut bytes = *signature;
    bytes[64] = match bytes[64] {
        v @ (27 | 28) => v - 27,
        v @ (0 | 1) => v,
        v => {
            return Err(WalletError::Crypto(CryptoError::InvalidSignature(format!(
                "unexpected recovery byte v = {v}"
            ))))
        }
    };
    let sig = Signature::from_bytes(&bytes)?;
    Ok(PublicKey::recover(hash, &sig)?.to_uncompressed())
}

fn signer(seed: &[u8], chain: Chain, account: u32, index: u32) -> Result<Wallet, WalletError> {
    let config = WalletConfig {
        chain,
        account,
        address_index: index,
        ..WalletConfig::default()
    };
    Wallet::from_seed(seed, &config)
}
