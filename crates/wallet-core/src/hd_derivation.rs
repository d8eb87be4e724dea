//! BIP32 hierarchical deterministic keys over secp256k1.

use crypto_utils::hash::{hash160, hmac_sha512};
use crypto_utils::{secp256k1, BigInt, Point, PrivateKey, PublicKey};
use log::{debug, trace};
use zeroize::{Zeroize, Zeroizing};

use crate::error::WalletError;
use crate::path::{ChildIndex, DerivationPath};

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";
const SERIALIZED_LEN: usize = 78;

/// Which version bytes an extended key is serialized with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// `xprv` / `xpub`
    Mainnet,
    /// `tprv` / `tpub`
    Testnet,
}

impl Network {
    fn private_version(self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0x04, 0x88, 0xAD, 0xE4],
            Network::Testnet => [0x04, 0x35, 0x83, 0x94],
        }
    }

    fn public_version(self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0x04, 0x88, 0xB2, 0x1E],
            Network::Testnet => [0x04, 0x35, 0x87, 0xCF],
        }
    }

    /// `(network, is_private)` for a version prefix.
    fn from_version(version: [u8; 4]) -> Option<(Network, bool)> {
        [Network::Mainnet, Network::Testnet]
            .into_iter()
            .find_map(|net| {
                if version == net.private_version() {
                    Some((net, true))
                } else if version == net.public_version() {
                    Some((net, false))
                } else {
                    None
                }
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyMaterial {
    Private(PrivateKey),
    Public(PublicKey),
}

/// An extended private or public key: a key plus chain code and its
/// position in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    key: KeyMaterial,
    chain_code: [u8; 32],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_index: ChildIndex,
}

impl ExtendedKey {
    /// Master key from a 16 to 64 byte seed.
    pub fn master(seed: &[u8]) -> Result<Self, WalletError> {
        if !(16..=64).contains(&seed.len()) {
            return Err(WalletError::InvalidSeed(format!(
                "seed must be 16 to 64 bytes, got {}",
                seed.len()
            )));
        }
        let mut i = hmac_sha512(MASTER_HMAC_KEY, seed);
        let key = PrivateKey::from_slice(&i[..32]).map_err(|_| {
            WalletError::InvalidSeed("master key is zero or not below the curve order".into())
        });
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        i.zeroize();

        Ok(ExtendedKey {
            key: KeyMaterial::Private(key?),
            chain_code,
            depth: 0,
            parent_fingerprint: [0; 4],
            child_index: ChildIndex::from_raw(0),
        })
    }

    /// CKDpriv or CKDpub depending on the key held.
    pub fn derive_child(&self, index: ChildIndex) -> Result<Self, WalletError> {
        let depth = self.depth.checked_add(1).ok_or_else(|| {
            WalletError::InvalidPath("derivation depth cannot exceed 255".into())
        })?;

        let mut data = Zeroizing::new(Vec::with_capacity(37));
        match (&self.key, index.is_hardened()) {
            (KeyMaterial::Public(_), true) => {
                return Err(WalletError::HardenedFromPublic { index: index.raw() });
            }
            (KeyMaterial::Private(k), true) => {
                data.push(0x00);
                data.extend_from_slice(k.to_bytes().as_slice());
            }
            (_, false) => data.extend_from_slice(&self.public_key().to_compressed()),
        }
        data.extend_from_slice(&index.raw().to_be_bytes());

        let mut i = Zeroizing::new(hmac_sha512(&self.chain_code, &data));
        let key = self.tweak(&i[..32], index)?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        i.zeroize();
        trace!("derived child {index} at depth {depth}");

        Ok(ExtendedKey {
            key,
            chain_code,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_index: index,
        })
    }

    /// Combines the left half of the child HMAC with this key: `IL + k mod n`
    /// for a private key, `IL*G + K` for a public one.
    fn tweak(&self, il: &[u8], index: ChildIndex) -> Result<KeyMaterial, WalletError> {
        let curve = secp256k1();
        let il = Zeroizing::new(BigInt::from_bytes_be(il));
        if *il >= curve.n {
            debug!("IL not below the curve order at index {index}");
            return Err(WalletError::InvalidDerivedKey { index: index.raw() });
        }

        let invalid = |_| WalletError::InvalidDerivedKey { index: index.raw() };
        Ok(match &self.key {
            KeyMaterial::Private(k) => {
                let child = curve.scalar.add(&il, k.scalar());
                KeyMaterial::Private(PrivateKey::from_scalar(child).map_err(invalid)?)
            }
            KeyMaterial::Public(k) => {
                let child = Point::generator().mul(&il).add(k.point());
                KeyMaterial::Public(PublicKey::from_point(child).map_err(invalid)?)
            }
        })
    }

    /// Walks every step of `path` from this key.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, WalletError> {
        debug!("deriving {path} from depth {}", self.depth);
        path.iter()
            .try_fold(self.clone(), |key, index| key.derive_child(index))
    }

    /// The extended public key with the same chain code and position.
    pub fn neuter(&self) -> Self {
        ExtendedKey {
            key: KeyMaterial::Public(self.public_key()),
            chain_code: self.chain_code,
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_index: self.child_index,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self.key, KeyMaterial::Private(_))
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        match &self.key {
            KeyMaterial::Private(k) => Some(k),
            KeyMaterial::Public(_) => None,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match &self.key {
            KeyMaterial::Private(k) => k.public_key(),
            KeyMaterial::Public(k) => k.clone(),
        }
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    pub fn child_index(&self) -> ChildIndex {
        self.child_index
    }

    /// HASH160 of the compressed public key.
    pub fn identifier(&self) -> [u8; 20] {
        hash160(&self.public_key().to_compressed())
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        let id = self.identifier();
        [id[0], id[1], id[2], id[3]]
    }

    /// The 78-byte serialization: version, depth, parent fingerprint,
    /// child index, chain code, key.
    pub fn encode(&self, network: Network) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(Vec::with_capacity(SERIALIZED_LEN));
        match &self.key {
            KeyMaterial::Private(_) => out.extend_from_slice(&network.private_version()),
            KeyMaterial::Public(_) => out.extend_from_slice(&network.public_version()),
        }
        out.push(self.depth);
        out.extend_from_slice(&self.parent_fingerprint);
        out.extend_from_slice(&self.child_index.raw().to_be_bytes());
        out.extend_from_slice(&self.chain_code);
        match &self.key {
            KeyMaterial::Private(k) => {
                out.push(0x00);
                out.extend_from_slice(k.to_bytes().as_slice());
            }
            KeyMaterial::Public(k) => out.extend_from_slice(&k.to_compressed()),
        }
        out
    }

    /// Base58Check text (`xprv...`, `xpub...`, `tprv...`, `tpub...`).
    pub fn to_base58(&self, network: Network) -> Zeroizing<String> {
        Zeroizing::new(bs58::encode(self.encode(network).as_slice()).with_check().into_string())
    }

    /// Parses Base58Check text and reports the network its version names.
    pub fn from_base58(text: &str) -> Result<(Self, Network), WalletError> {
        let bytes = Zeroizing::new(
            bs58::decode(text)
                .with_check(None)
                .into_vec()
                .map_err(|e| WalletError::InvalidExtendedKey(e.to_string()))?,
        );
        ExtendedKey::decode(&bytes)
    }

    /// Inverse of [`ExtendedKey::encode`].
    pub fn decode(bytes: &[u8]) -> Result<(Self, Network), WalletError> {
        if bytes.len() != SERIALIZED_LEN {
            return Err(WalletError::InvalidExtendedKey(format!(
                "expected {SERIALIZED_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let version = [bytes[0], bytes[1], bytes[2], bytes[3]];
        let (network, is_private) = Network::from_version(version).ok_or_else(|| {
            WalletError::InvalidExtendedKey(format!("unknown version {}", hex::encode(version)))
        })?;

        let depth = bytes[4];
        let parent_fingerprint = [bytes[5], bytes[6], bytes[7], bytes[8]];
        let child_index =
            ChildIndex::from_raw(u32::from_be_bytes([bytes[9], bytes[10], bytes[11], bytes[12]]));
        if depth == 0 && (parent_fingerprint != [0; 4] || child_index.raw() != 0) {
            return Err(WalletError::InvalidExtendedKey(
                "master key must have zero parent fingerprint and index".into(),
            ));
        }

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&bytes[13..45]);

        let key_data = &bytes[45..];
        let key = if is_private {
            if key_data[0] != 0x00 {
                return Err(WalletError::InvalidExtendedKey(
                    "private key data must start with 0x00".into(),
                ));
            }
            KeyMaterial::Private(
                PrivateKey::from_slice(&key_data[1..])
                    .map_err(|e| WalletError::InvalidExtendedKey(e.to_string()))?,
            )
        } else {
            if !matches!(key_data[0], 0x02 | 0x03) {
                return Err(WalletError::InvalidExtendedKey(
                    "public key data must be a compressed point".into(),
                ));
            }
            KeyMaterial::Public(
                PublicKey::from_bytes(key_data)
                    .map_err(|e| WalletError::InvalidExtendedKey(e.to_string()))?,
            )
        };

        Ok((
            ExtendedKey {
                key,
                chain_code,
                depth,
                parent_fingerprint,
                child_index,
            },
            network,
        ))
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.chain_code.zeroize();
    }
}

/// Derives the key at `path` straight from a seed.
pub fn derive_from_seed(seed: &[u8], path: &DerivationPath) -> Result<ExtendedKey, WalletError> {
    ExtendedKey::master(seed)?.derive_path(path)
}
