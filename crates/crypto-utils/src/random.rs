//! OS-backed randomness for key and mnemonic generation.
//!
//! Signing never draws from here; nonces are derived with RFC 6979.

use rand::RngCore;
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Fixed-size array of OS random bytes.
pub fn random_bytes_fixed<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Fresh mnemonic entropy. Only the BIP39 sizes (16, 20, 24, 28 or 32
/// bytes) are accepted.
pub fn random_entropy(len: usize) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if !(16..=32).contains(&len) || len % 4 != 0 {
        return Err(CryptoError::InvalidInput(format!(
            "entropy must be 16, 20, 24, 28 or 32 bytes, got {len}"
        )));
    }
    let mut buf = Zeroizing::new(vec![0u8; len]);
    OsRng.fill_bytes(&mut buf);
    Ok(buf)
}
