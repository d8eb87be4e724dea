//! Legacy transactions with EIP-155 replay protection.
//!
//! A [`Transaction`] starts unsigned. [`Transaction::sign`] returns a copy
//! with the signature attached; only a signed transaction can be turned into
//! raw bytes for broadcast.

use crypto_utils::hash::keccak256;
use crypto_utils::{BigInt, CryptoError, PrivateKey, PublicKey, Signature};
use log::debug;

use crate::address::Address;
use crate::erc20;
use crate::error::EthError;
use crate::rlp::{self, RlpItem};

const EIP155_OFFSET: u64 = 35;
const FIELD_COUNT: usize = 9;

/// Fields are fixed at construction; a signed copy can therefore never
/// drift from the payload its signature covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    nonce: u64,
    gas_price: BigInt,
    gas_limit: BigInt,
    /// `None` deploys a contract with `data` as init code.
    to: Option<Address>,
    value: BigInt,
    data: Vec<u8>,
    chain_id: u64,
    signature: Option<Signature>,
}

/// A signed transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEthTransaction {
    pub raw_tx: Vec<u8>,
    /// Keccak-256 of `raw_tx` as a 0x-prefixed hex string.
    pub tx_hash: String,
}

impl Transaction {
    /// An unsigned transaction with arbitrary calldata.
    pub fn new(
        chain_id: u64,
        nonce: u64,
        to: Option<Address>,
        value: BigInt,
        data: Vec<u8>,
        gas_price: BigInt,
        gas_limit: BigInt,
    ) -> Self {
        Transaction {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data,
            chain_id,
            signature: None,
        }
    }

    /// A plain value transfer with empty calldata.
    pub fn transfer(
        chain_id: u64,
        nonce: u64,
        to: Address,
        value: BigInt,
        gas_price: BigInt,
        gas_limit: BigInt,
    ) -> Self {
        Self::new(chain_id, nonce, Some(to), value, Vec::new(), gas_price, gas_limit)
    }

    pub fn contract_creation(
        chain_id: u64,
        nonce: u64,
        init_code: Vec<u8>,
        value: BigInt,
        gas_price: BigInt,
        gas_limit: BigInt,
    ) -> Self {
        Self::new(chain_id, nonce, None, value, init_code, gas_price, gas_limit)
    }

    /// A call to `token`'s `transfer(address,uint256)` moving `amount` to `to`.
    pub fn erc20_transfer(
        chain_id: u64,
        nonce: u64,
        token: Address,
        to: &Address,
        amount: &BigInt,
        gas_price: BigInt,
        gas_limit: BigInt,
    ) -> Result<Self, EthError> {
        let data = erc20::encode_transfer(to, amount)?;
        Ok(Self::new(
            chain_id,
            nonce,
            Some(token),
            BigInt::zero(),
            data,
            gas_price,
            gas_limit,
        ))
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn gas_price(&self) -> &BigInt {
        &self.gas_price
    }

    pub fn gas_limit(&self) -> &BigInt {
        &self.gas_limit
    }

    /// Recipient, or `None` for contract creation.
    pub fn to(&self) -> Option<&Address> {
        self.to.as_ref()
    }

    pub fn value(&self) -> &BigInt {
        &self.value
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// `RLP[nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0]`.
    pub fn signing_payload(&self) -> Result<Vec<u8>, EthError> {
        let mut items = self.base_fields()?;
        items.push(RlpItem::from_u64(self.chain_id));
        items.push(RlpItem::empty());
        items.push(RlpItem::empty());
        Ok(rlp::encode_list(&items))
    }

    pub fn signing_hash(&self) -> Result<[u8; 32], EthError> {
        Ok(keccak256(&self.signing_payload()?))
    }

    /// Returns a signed copy; `self` is left untouched. Re-signing an
    /// already signed transaction replaces its signature.
    pub fn sign(&self, key: &PrivateKey) -> Result<Transaction, EthError> {
        let hash = self.signing_hash()?;
        let signature = key.sign_prehash(&hash);
        // Fail now rather than at serialization time.
        eip155_v(signature.recovery_id(), self.chain_id)?;

        debug!(
            "signed transaction chain_id={} nonce={} signing_hash=0x{}",
            self.chain_id,
            self.nonce,
            hex::encode(hash)
        );
        Ok(Transaction {
            signature: Some(signature),
            ..self.clone()
        })
    }

    /// The EIP-155 `v` value of a signed transaction.
    pub fn v(&self) -> Result<u64, EthError> {
        let signature = self.require_signature()?;
        eip155_v(signature.recovery_id(), self.chain_id)
    }

    /// `RLP[nonce, gasPrice, gasLimit, to, value, data, v, r, s]`.
    pub fn raw_transaction(&self) -> Result<Vec<u8>, EthError> {
        let signature = self.require_signature()?;
        let mut items = self.base_fields()?;
        items.push(RlpItem::from_u64(eip155_v(
            signature.recovery_id(),
            self.chain_id,
        )?));
        items.push(RlpItem::from_bigint(signature.r())?);
        items.push(RlpItem::from_bigint(signature.s())?);
        Ok(rlp::encode_list(&items))
    }

    /// Keccak-256 of the raw signed bytes.
    pub fn tx_hash(&self) -> Result<[u8; 32], EthError> {
        Ok(keccak256(&self.raw_transaction()?))
    }

    /// Parses raw bytes of a signed EIP-155 transaction.
    pub fn decode_raw(raw: &[u8]) -> Result<Transaction, EthError> {
        let item = rlp::decode(raw)?;
        let fields = item.as_list()?;
        if fields.len() != FIELD_COUNT {
            return Err(EthError::MalformedRlp(format!(
                "expected {FIELD_COUNT} transaction fields, got {}",
                fields.len()
            )));
        }

        let to = match fields[3].as_bytes()? {
            [] => None,
            bytes => Some(Address::from_slice(bytes)?),
        };

        let v = fields[6].as_u64()?;
        if v < EIP155_OFFSET {
            return Err(EthError::TransactionBuildError(format!(
                "v = {v} is not an EIP-155 value; pre-EIP-155 transactions are not supported"
            )));
        }
        let chain_id = (v - EIP155_OFFSET) >> 1;
        let recovery_id = ((v - EIP155_OFFSET) & 1) as u8;
        let signature = Signature::new(fields[7].as_bigint()?, fields[8].as_bigint()?, recovery_id)?;

        Ok(Transaction {
            nonce: fields[0].as_u64()?,
            gas_price: fields[1].as_bigint()?,
            gas_limit: fields[2].as_bigint()?,
            to,
            value: fields[4].as_bigint()?,
            data: fields[5].as_bytes()?.to_vec(),
            chain_id,
            signature: Some(signature),
        })
    }

    /// Recovers the address that signed this transaction.
    pub fn recover_sender(&self) -> Result<Address, EthError> {
        let signature = self.require_signature()?;
        let key = PublicKey::recover(&self.signing_hash()?, signature)?;
        Ok(Address::from_public_key(&key))
    }

    fn base_fields(&self) -> Result<Vec<RlpItem>, EthError> {
        let to = match &self.to {
            Some(address) => RlpItem::from(&address.as_bytes()[..]),
            None => RlpItem::empty(),
        };
        Ok(vec![
            RlpItem::from_u64(self.nonce),
            RlpItem::from_bigint(&self.gas_price)?,
            RlpItem::from_bigint(&self.gas_limit)?,
            to,
            RlpItem::from_bigint(&self.value)?,
            RlpItem::from(self.data.as_slice()),
        ])
    }

    fn require_signature(&self) -> Result<&Signature, EthError> {
        self.signature
            .as_ref()
            .ok_or_else(|| EthError::TransactionBuildError("transaction is not signed".into()))
    }
}

/// `v = recovery_id + chain_id * 2 + 35`.
///
/// Only recovery ids 0 and 1 fit the EIP-155 encoding; 2 and 3 (R.x above
/// the group order) are rejected.
pub fn eip155_v(recovery_id: u8, chain_id: u64) -> Result<u64, EthError> {
    check_recovery_id(recovery_id)?;
    chain_id
        .checked_mul(2)
        .and_then(|v| v.checked_add(EIP155_OFFSET))
        .and_then(|v| v.checked_add(u64::from(recovery_id)))
        .ok_or_else(|| {
            EthError::EncodingOverflow(format!("chain id {chain_id} does not fit an EIP-155 v"))
        })
}

/// Pre-EIP-155 `v`: 27 or 28.
pub fn legacy_v(recovery_id: u8) -> Result<u8, EthError> {
    check_recovery_id(recovery_id)?;
    Ok(27 + recovery_id)
}

fn check_recovery_id(recovery_id: u8) -> Result<(), EthError> {
    if recovery_id > 1 {
        return Err(EthError::Crypto(CryptoError::InvalidSignature(format!(
            "recovery id {recovery_id} cannot be encoded in v"
        ))));
    }
    Ok(())
}

/// Signs `tx` and returns its raw bytes together with the transaction hash.
pub fn sign_transaction(
    tx: &Transaction,
    key: &PrivateKey,
) -> Result<SignedEthTransaction, EthError> {
    let signed = tx.sign(key)?;
    let raw_tx = signed.raw_transaction()?;
    let tx_hash = format!("0x{}", hex::encode(keccak256(&raw_tx)));
    debug!("transaction ready for broadcast tx_hash={tx_hash}");
    Ok(SignedEthTransaction { raw_tx, tx_hash })
}

// ---------------------------------------------------------------------------
// EIP-191 personal messages
// ---------------------------------------------------------------------------

/// `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`.
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    let mut buf = Vec::with_capacity(prefix.len() + message.len());
    buf.extend_from_slice(prefix.as_bytes());
    buf.extend_from_slice(message);
    keccak256(&buf)
}

/// Returns `r || s || v` with `v` = 27 or 28.
pub fn sign_message(message: &[u8], key: &PrivateKey) -> Result<[u8; 65], EthError> {
    let mut sig = key.sign_prehash(&hash_message(message)).to_bytes();
    sig[64] = legacy_v(sig[64])?;
    Ok(sig)
}

/// Accepts `v` as 27/28 or as a bare recovery id 0/1.
pub fn recover_message_signer(message: &[u8], signature: &[u8; 65]) -> Result<Address, EthError> {
    let mut bytes = *signature;
    bytes[64] = match bytes[64] {
        v @ (27 | 28) => v - 27,
        v @ (0 | 1) => v,
        v => {
            return Err(EthError::TransactionBuildError(format!(
                "unexpected message signature v = {v}"
            )))
        }
    };
    let sig = Signature::from_bytes(&bytes)?;
    let key = PublicKey::recover(&hash_message(message), &sig)?;
    Ok(Address::from_public_key(&key))
}
