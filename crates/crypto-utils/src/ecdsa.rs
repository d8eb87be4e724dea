//! ECDSA over secp256k1 with deterministic nonces.
//!
//! Signing follows RFC 6979 (HMAC-SHA256, qlen = 256), so the same key and
//! digest always give the same signature. Signatures are normalized to
//! low-s and carry the public-key recovery id Ethereum's `v` is built from.

use std::fmt;

use log::trace;
use zeroize::{Zeroize, Zeroizing};

use crate::bigint::BigInt;
use crate::curve::{be32, secp256k1, Point};
use crate::error::CryptoError;
use crate::hash::hmac_sha256;
use crate::random::random_bytes_fixed;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// A secp256k1 secret scalar in `[1, n-1]`. The scalar is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    scalar: BigInt,
}

impl PrivateKey {
    /// Validates `1 <= scalar < n`.
    pub fn from_scalar(scalar: BigInt) -> Result<Self, CryptoError> {
        if !scalar.is_positive() || scalar >= secp256k1().n {
            return Err(CryptoError::InvalidPrivateKey(
                "scalar must be in [1, n-1]".into(),
            ));
        }
        Ok(PrivateKey { scalar })
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        PrivateKey::from_scalar(BigInt::from_bytes_be(bytes))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: &[u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidPrivateKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        PrivateKey::from_bytes(bytes)
    }

    /// Draws a fresh key from the OS RNG, rejecting out-of-range scalars.
    pub fn random() -> Self {
        loop {
            let bytes = Zeroizing::new(random_bytes_fixed::<32>());
            if let Ok(key) = PrivateKey::from_bytes(&bytes) {
                return key;
            }
        }
    }

    pub fn scalar(&self) -> &BigInt {
        &self.scalar
    }

    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(be32(&self.scalar))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            point: Point::generator().mul(&self.scalar),
        }
    }

    /// Signs a 32-byte digest. Never fails: invalid RFC 6979 candidates are
    /// skipped deterministically.
    pub fn sign_prehash(&self, hash: &[u8; 32]) -> Signature {
        let c = secp256k1();
        let n = &c.scalar;
        let z = BigInt::from_bytes_be(hash);
        let d = self.to_bytes();
        let mut nonces = Rfc6979::new(&d, hash);

        loop {
            let k = nonces.next_nonce();
            let big_r = Point::generator().mul(&k);
            let Some((rx, ry)) = big_r.coordinates() else {
                trace!("rfc6979 candidate produced infinity, retrying");
                continue;
            };
            let r = n.reduce(rx);
            if r.is_zero() {
                trace!("rfc6979 candidate produced r = 0, retrying");
                continue;
            }
            let Some(k_inv) = n.inverse(&k) else {
                continue;
            };
            let s = n.mul(&k_inv, &n.add(&z, &n.mul(&r, &self.scalar)));
            if s.is_zero() {
                trace!("rfc6979 candidate produced s = 0, retrying");
                continue;
            }
            let recovery_id = (ry.is_odd() as u8) | (((rx >= &c.n) as u8) << 1);
            return Signature { r, s, recovery_id }.normalize_s();
        }
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.scalar.zeroize();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// A secp256k1 public key: any finite curve point.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PublicKey {
    point: Point,
}

impl PublicKey {
    pub fn from_point(point: Point) -> Result<Self, CryptoError> {
        if point.is_infinity() {
            return Err(CryptoError::InvalidPoint(
                "public key cannot be the point at infinity".into(),
            ));
        }
        Ok(PublicKey { point })
    }

    /// Parses a 33-byte compressed or 65-byte uncompressed SEC1 key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        PublicKey::from_point(Point::from_bytes(bytes)?)
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn to_compressed(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out.copy_from_slice(&self.point.to_bytes(true));
        out
    }

    pub fn to_uncompressed(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out.copy_from_slice(&self.point.to_bytes(false));
        out
    }

    /// Checks `sig` against a 32-byte digest.
    ///
    /// High-s signatures are rejected as malleable, matching what the
    /// signer produces.
    pub fn verify(&self, hash: &[u8; 32], sig: &Signature) -> Result<(), CryptoError> {
        let c = secp256k1();
        let n = &c.scalar;
        sig.check_range()?;
        if !sig.is_low_s() {
            return Err(CryptoError::InvalidSignature("s is not in the lower half".into()));
        }
        let z = BigInt::from_bytes_be(hash);
        let w = n
            .inverse(&sig.s)
            .ok_or_else(|| CryptoError::InvalidSignature("s is not invertible".into()))?;
        let u1 = n.mul(&z, &w);
        let u2 = n.mul(&sig.r, &w);
        let x = Point::generator().mul(&u1).add(&self.point.mul(&u2));
        match x.x() {
            Some(rx) if n.reduce(rx) == sig.r => Ok(()),
            _ => Err(CryptoError::VerificationFailed),
        }
    }

    /// Recovers the signer's public key from a digest and a recoverable
    /// signature.
    pub fn recover(hash: &[u8; 32], sig: &Signature) -> Result<Self, CryptoError> {
        let c = secp256k1();
        let n = &c.scalar;
        sig.check_range()?;

        // R.x = r + j*n for the high recovery bit.
        let x = if sig.recovery_id & 2 != 0 {
            &sig.r + &c.n
        } else {
            sig.r.clone()
        };
        if x >= c.p {
            return Err(CryptoError::InvalidSignature(
                "recovery id points outside the field".into(),
            ));
        }
        let big_r = Point::lift_x(&x, sig.recovery_id & 1 == 1)
            .map_err(|_| CryptoError::InvalidSignature("no curve point for r".into()))?;

        let r_inv = n
            .inverse(&sig.r)
            .ok_or_else(|| CryptoError::InvalidSignature("r is not invertible".into()))?;
        let z = BigInt::from_bytes_be(hash);
        // Q = r^-1 (sR - zG)
        let s_r = big_r.mul(&sig.s);
        let z_g = Point::generator().mul(&z);
        let q = s_r.add(&z_g.negate()).mul(&r_inv);
        PublicKey::from_point(q)
            .map_err(|_| CryptoError::InvalidSignature("recovered the point at infinity".into()))
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// A recoverable ECDSA signature `(r, s, recovery_id)`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Signature {
    r: BigInt,
    s: BigInt,
    recovery_id: u8,
}

impl Signature {
    /// Validates `r, s` in `[1, n-1]` and `recovery_id <= 3`.
    pub fn new(r: BigInt, s: BigInt, recovery_id: u8) -> Result<Self, CryptoError> {
        let sig = Signature { r, s, recovery_id };
        sig.check_range()?;
        Ok(sig)
    }

    /// Parses the 65-byte `r || s || recovery_id` layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 65 {
            return Err(CryptoError::InvalidSignature(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }
        Signature::new(
            BigInt::from_bytes_be(&bytes[..32]),
            BigInt::from_bytes_be(&bytes[32..64]),
            bytes[64],
        )
    }

    pub fn r(&self) -> &BigInt {
        &self.r
    }

    pub fn s(&self) -> &BigInt {
        &self.s
    }

    pub fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    pub fn r_bytes(&self) -> [u8; 32] {
        be32(&self.r)
    }

    pub fn s_bytes(&self) -> [u8; 32] {
        be32(&self.s)
    }

    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r_bytes());
        out[32..64].copy_from_slice(&self.s_bytes());
        out[64] = self.recovery_id;
        out
    }

    pub fn is_low_s(&self) -> bool {
        self.s <= secp256k1().half_n
    }

    /// Replaces a high `s` with `n - s` and flips the y-parity bit of the
    /// recovery id; low-s signatures are returned unchanged.
    pub fn normalize_s(self) -> Signature {
        if self.is_low_s() {
            return self;
        }
        Signature {
            s: &secp256k1().n - &self.s,
            recovery_id: self.recovery_id ^ 1,
            r: self.r,
        }
    }

    fn check_range(&self) -> Result<(), CryptoError> {
        let n = &secp256k1().n;
        if !self.r.is_positive() || &self.r >= n {
            return Err(CryptoError::InvalidSignature("r out of range".into()));
        }
        if !self.s.is_positive() || &self.s >= n {
            return Err(CryptoError::InvalidSignature("s out of range".into()));
        }
        if self.recovery_id > 3 {
            return Err(CryptoError::InvalidSignature(format!(
                "recovery id {} out of range",
                self.recovery_id
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RFC 6979
// ---------------------------------------------------------------------------

/// HMAC-DRBG nonce stream from RFC 6979 section 3.2.
struct Rfc6979 {
    k: Zeroizing<[u8; 32]>,
    v: Zeroizing<[u8; 32]>,
}

impl Rfc6979 {
    fn new(secret: &[u8; 32], hash: &[u8; 32]) -> Self {
        // bits2octets(h1) = int2octets(h1 mod n)
        let h = be32(&secp256k1().scalar.reduce(&BigInt::from_bytes_be(hash)));
        let mut drbg = Rfc6979 {
            k: Zeroizing::new([0x00; 32]),
            v: Zeroizing::new([0x01; 32]),
        };
        for tag in [0x00u8, 0x01] {
            let mut data = Zeroizing::new(Vec::with_capacity(97));
            data.extend_from_slice(&*drbg.v);
            data.push(tag);
            data.extend_from_slice(secret);
            data.extend_from_slice(&h);
            *drbg.k = hmac_sha256(&*drbg.k, &data);
            *drbg.v = hmac_sha256(&*drbg.k, &*drbg.v);
        }
        drbg
    }

    /// Next candidate `k` in `[1, n-1]`.
    fn next_nonce(&mut self) -> BigInt {
        loop {
            *self.v = hmac_sha256(&*self.k, &*self.v);
            let candidate = BigInt::from_bytes_be(&*self.v);
            self.reseed();
            if candidate.is_positive() && candidate < secp256k1().n {
                return candidate;
            }
            trace!("rfc6979 candidate outside [1, n-1], retrying");
        }
    }

    fn reseed(&mut self) {
        let mut data = [0u8; 33];
        data[..32].copy_from_slice(&*self.v);
        *self.k = hmac_sha256(&*self.k, &data);
        *self.v = hmac_sha256(&*self.k, &*self.v);
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

pub fn sign(hash: &[u8; 32], key: &PrivateKey) -> Signature {
    key.sign_prehash(hash)
}

pub fn verify(hash: &[u8; 32], sig: &Signature, key: &PublicKey) -> Result<(), CryptoError> {
    key.verify(hash, sig)
}

pub fn recover(hash: &[u8; 32], sig: &Signature) -> Result<PublicKey, CryptoError> {
    PublicKey::recover(hash, sig)
}
