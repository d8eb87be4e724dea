//! A single-account wallet bound to one chain.

use chain_eth::transaction::{self, sign_transaction};
use chain_eth::{Address, Provider, SignedEthTransaction, Transaction};
use crypto_utils::{BigInt, PrivateKey, PublicKey};
use log::{debug, info, warn};

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::hd_derivation;
use crate::mnemonic::Mnemonic;
use crate::path::DerivationPath;
use crate::types::Chain;

pub struct Wallet {
    chain: Chain,
    private_key: PrivateKey,
    address: Address,
    path: DerivationPath,
    default_gas_limit: u64,
}

impl Wallet {
    pub fn from_mnemonic(
        phrase: &str,
        passphrase: &str,
        config: &WalletConfig,
    ) -> Result<Self, WalletError> {
        let seed = Mnemonic::parse(phrase)?.to_seed(passphrase);
        Self::from_seed(seed.as_bytes(), config)
    }

    /// Derives the account key at `m/44'/coin'/account'/0/address_index`.
    pub fn from_seed(seed: &[u8], config: &WalletConfig) -> Result<Self, WalletError> {
        config.validate()?;
        let path = config
            .chain
            .derivation_path(config.account, config.address_index)?;
        let extended = hd_derivation::derive_from_seed(seed, &path)?;
        let private_key = extended
            .private_key()
            .cloned()
            .ok_or_else(|| WalletError::InvalidSeed("derivation produced a public key".into()))?;
        let address = Address::from_public_key(&private_key.public_key());
        debug!("wallet opened on {} at {path}", config.chain.display_name());

        Ok(Wallet {
            chain: config.chain,
            private_key,
            address,
            path,
            default_gas_limit: config.default_gas_limit,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn derivation_path(&self) -> &DerivationPath {
        &self.path
    }

    pub fn public_key(&self) -> PublicKey {
        self.private_key.public_key()
    }

    pub fn balance(&self, provider: &dyn Provider) -> Result<BigInt, WalletError> {
        Ok(provider.get_balance(&self.address)?)
    }

    /// An unsigned transfer on this wallet's chain using the configured
    /// gas limit.
    pub fn build_transfer(
        &self,
        nonce: u64,
        to: Address,
        value: BigInt,
        gas_price: BigInt,
    ) -> Transaction {
        Transaction::transfer(
            self.chain.chain_id(),
            nonce,
            to,
            value,
            gas_price,
            BigInt::from(self.default_gas_limit),
        )
    }

    /// Signs `tx`, which must target this wallet's chain.
    pub fn sign(&self, tx: &Transaction) -> Result<SignedEthTransaction, WalletError> {
        if tx.chain_id() != self.chain.chain_id() {
            return Err(WalletError::Eth(chain_eth::EthError::UnsupportedChain(tx.chain_id())));
        }
        Ok(sign_transaction(tx, &self.private_key)?)
    }

    /// EIP-191 personal message signature, `r || s || v` with v = 27/28.
    pub fn sign_message(&self, message: &[u8]) -> Result<[u8; 65], WalletError> {
        Ok(transaction::sign_message(message, &self.private_key)?)
    }

    /// Queries the nonce and gas price, signs a transfer and broadcasts it.
    /// Returns the transaction hash reported by the provider.
    pub fn send_transfer(
        &self,
        provider: &dyn Provider,
        to: &Address,
        value: &BigInt,
    ) -> Result<String, WalletError> {
        let nonce = provider.get_transaction_count(&self.address)?;
        let gas_price = provider.get_gas_price()?;
        debug!(
            "sending transfer from {} nonce={nonce} gas_price={gas_price}",
            self.address
        );

        let tx = self.build_transfer(nonce, *to, value.clone(), gas_price);
        let signed = self.sign(&tx)?;
        let reported = provider.send_raw_transaction(&signed.raw_tx)?;
        if !reported.eq_ignore_ascii_case(&signed.tx_hash) {
            warn!(
                "provider reported hash {reported}, local hash is {}",
                signed.tx_hash
            );
        }
        info!("broadcast {} on {}", reported, self.chain.display_name());
        Ok(reported)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("chain", &self.chain)
            .field("address", &self.address)
            .field("path", &self.path.to_string())
            .finish_non_exhaustive()
    }
}
