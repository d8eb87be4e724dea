//! Arbitrary-precision signed integers.
//!
//! [`BigInt`] is an immutable value: every operation allocates a fresh
//! result and leaves its operands untouched. The magnitude is stored as
//! little-endian `u32` limbs with no most-significant zero limbs, so every
//! value has exactly one representation.
//!
//! Two byte conventions exist and are kept apart:
//! - [`BigInt::to_bytes_be`] is the minimal big-endian form used by RLP;
//!   zero is the empty byte string.
//! - [`BigInt::to_fixed_bytes`] / [`BigInt::to_bytes_padded`] produce
//!   fixed-width words (keys, signature scalars); zero is all zero bytes.

mod limbs;
mod modulus;
mod ops;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use zeroize::Zeroize;

use crate::error::CryptoError;

pub use modulus::Modulus;

/// Sign of a [`BigInt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sign {
    Minus,
    Zero,
    Plus,
}

impl Sign {
    fn negate(self) -> Sign {
        match self {
            Sign::Minus => Sign::Plus,
            Sign::Zero => Sign::Zero,
            Sign::Plus => Sign::Minus,
        }
    }
}

/// Arbitrary-precision signed integer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BigInt {
    sign: Sign,
    mag: Vec<u32>,
}

impl BigInt {
    /// Builds a value from a sign and a (possibly untrimmed) magnitude.
    pub(crate) fn from_parts(sign: Sign, mut mag: Vec<u32>) -> Self {
        limbs::trim(&mut mag);
        if mag.is_empty() {
            return BigInt {
                sign: Sign::Zero,
                mag,
            };
        }
        let sign = if sign == Sign::Zero { Sign::Plus } else { sign };
        BigInt { sign, mag }
    }

    pub(crate) fn magnitude(&self) -> &[u32] {
        &self.mag
    }

    pub fn zero() -> Self {
        BigInt {
            sign: Sign::Zero,
            mag: Vec::new(),
        }
    }

    pub fn one() -> Self {
        BigInt::from(1u32)
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn is_zero(&self) -> bool {
        self.sign == Sign::Zero
    }

    pub fn is_negative(&self) -> bool {
        self.sign == Sign::Minus
    }

    pub fn is_positive(&self) -> bool {
        self.sign == Sign::Plus
    }

    pub fn is_odd(&self) -> bool {
        self.mag.first().is_some_and(|l| l & 1 == 1)
    }

    pub fn abs(&self) -> BigInt {
        BigInt::from_parts(Sign::Plus, self.mag.clone())
    }

    /// Number of significant bits in the magnitude (zero has none).
    pub fn bits(&self) -> usize {
        limbs::bits(&self.mag)
    }

    /// Bit `index` of the magnitude, counting from the least significant.
    pub fn bit(&self, index: usize) -> bool {
        limbs::bit(&self.mag, index)
    }

    /// Interprets `bytes` as an unsigned big-endian integer. Leading zero
    /// bytes are accepted and ignored.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        let mut mag = Vec::with_capacity(bytes.len().div_ceil(4));
        for chunk in bytes.rchunks(4) {
            let limb = chunk.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
            mag.push(limb);
        }
        BigInt::from_parts(Sign::Plus, mag)
    }

    /// Minimal big-endian bytes of the magnitude. Zero yields an empty vector.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.mag.len() * 4);
        for limb in self.mag.iter().rev() {
            out.extend_from_slice(&limb.to_be_bytes());
        }
        let first = out.iter().position(|&b| b != 0).unwrap_or(out.len());
        out.drain(..first);
        out
    }

    /// Big-endian bytes left-padded to exactly `width` bytes.
    pub fn to_bytes_padded(&self, width: usize) -> Result<Vec<u8>, CryptoError> {
        if self.is_negative() {
            return Err(CryptoError::EncodingOverflow(
                "negative value has no unsigned encoding".into(),
            ));
        }
        let minimal = self.to_bytes_be();
        if minimal.len() > width {
            return Err(CryptoError::EncodingOverflow(format!(
                "value needs {} bytes, field holds {width}",
                minimal.len()
            )));
        }
        let mut out = vec![0u8; width - minimal.len()];
        out.extend_from_slice(&minimal);
        Ok(out)
    }

    /// Fixed-width big-endian array; zero is `[0; N]`.
    pub fn to_fixed_bytes<const N: usize>(&self) -> Result<[u8; N], CryptoError> {
        let padded = self.to_bytes_padded(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&padded);
        Ok(out)
    }

    pub fn to_u64(&self) -> Option<u64> {
        if self.is_negative() || self.mag.len() > 2 {
            return None;
        }
        Some(
            self.mag
                .iter()
                .enumerate()
                .fold(0u64, |acc, (i, &l)| acc | ((l as u64) << (32 * i))),
        )
    }

    /// Parses digits in radix 10 or 16 with an optional leading `-`.
    /// A `0x` prefix is not accepted here; see [`FromStr`].
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self, CryptoError> {
        if radix != 10 && radix != 16 {
            return Err(CryptoError::InvalidNumber(format!("unsupported radix {radix}")));
        }
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if digits.is_empty() {
            return Err(CryptoError::InvalidNumber("no digits".into()));
        }
        let mut mag = Vec::new();
        for c in digits.chars() {
            let d = c
                .to_digit(radix)
                .ok_or_else(|| CryptoError::InvalidNumber(format!("invalid digit {c:?}")))?;
            mag = limbs::mul_small_add(&mag, radix, d);
        }
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        Ok(BigInt::from_parts(sign, mag))
    }

    /// Renders the value in radix 10 or 16 (lowercase, no prefix).
    pub fn to_str_radix(&self, radix: u32) -> String {
        let mut digits = Vec::new();
        let mut mag = self.mag.clone();
        let (chunk, width) = if radix == 16 { (1 << 28, 7) } else { (1_000_000_000, 9) };
        while !mag.is_empty() {
            let (q, r) = limbs::divrem_small(&mag, chunk);
            mag = q;
            let piece = if radix == 16 {
                format!("{r:x}")
            } else {
                r.to_string()
            };
            digits.push((piece, mag.is_empty()));
        }
        let mut out = String::new();
        if self.is_negative() {
            out.push('-');
        }
        if digits.is_empty() {
            out.push('0');
        }
        for (piece, is_top) in digits.iter().rev() {
            if !*is_top {
                out.extend(std::iter::repeat_n('0', width - piece.len()));
            }
            out.push_str(piece);
        }
        out
    }

    /// Truncated division: the quotient rounds toward zero and the remainder
    /// takes the sign of `self`.
    pub fn div_rem(&self, divisor: &BigInt) -> Result<(BigInt, BigInt), CryptoError> {
        if divisor.is_zero() {
            return Err(CryptoError::DivisionByZero);
        }
        let (q, r) = limbs::divrem(&self.mag, &divisor.mag);
        let q_sign = if self.sign == divisor.sign { Sign::Plus } else { Sign::Minus };
        Ok((BigInt::from_parts(q_sign, q), BigInt::from_parts(self.sign, r)))
    }

    /// Euclidean remainder in `[0, |m|)`.
    pub fn modulo(&self, m: &BigInt) -> Result<BigInt, CryptoError> {
        let (_, r) = self.div_rem(m)?;
        if r.is_negative() {
            Ok(&r + &m.abs())
        } else {
            Ok(r)
        }
    }

    /// `self^exponent mod m` for a positive modulus and non-negative exponent.
    pub fn pow_mod(&self, exponent: &BigInt, m: &BigInt) -> Result<BigInt, CryptoError> {
        if exponent.is_negative() {
            return Err(CryptoError::InvalidNumber("negative exponent".into()));
        }
        let modulus = Modulus::new(m.clone())?;
        Ok(modulus.pow(self, exponent))
    }

    /// Multiplicative inverse modulo a positive `m`.
    pub fn mod_inverse(&self, m: &BigInt) -> Result<BigInt, CryptoError> {
        let modulus = Modulus::new(m.clone())?;
        modulus
            .inverse(self)
            .ok_or_else(|| CryptoError::InvalidNumber(format!("{self} has no inverse mod {m}")))
    }
}

impl Default for BigInt {
    fn default() -> Self {
        BigInt::zero()
    }
}

impl Zeroize for BigInt {
    fn zeroize(&mut self) {
        self.mag.zeroize();
        self.sign = Sign::Zero;
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.sign.cmp(&other.sign) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.sign {
            Sign::Zero => Ordering::Equal,
            Sign::Plus => limbs::cmp(&self.mag, &other.mag),
            Sign::Minus => limbs::cmp(&other.mag, &self.mag),
        }
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for BigInt {
            fn from(v: $t) -> Self {
                let v = v as u128;
                let mag = vec![v as u32, (v >> 32) as u32, (v >> 64) as u32, (v >> 96) as u32];
                BigInt::from_parts(Sign::Plus, mag)
            }
        }
    )*};
}

macro_rules! from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for BigInt {
            fn from(v: $t) -> Self {
                let magnitude = BigInt::from(v.unsigned_abs());
                if v < 0 { -magnitude } else { magnitude }
            }
        }
    )*};
}

from_unsigned!(u8, u16, u32, u64, u128, usize);
from_signed!(i8, i16, i32, i64, i128);

impl FromStr for BigInt {
    type Err = CryptoError;

    /// Accepts decimal, `0x`-prefixed hex, and a leading `-` on either.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let value = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
            Some(hex) => BigInt::from_str_radix(hex, 16)?,
            None => BigInt::from_str_radix(body, 10)?,
        };
        if value.is_negative() {
            // "--5" or "-0x-5"
            return Err(CryptoError::InvalidNumber(format!("malformed number {s:?}")));
        }
        Ok(if negative { -value } else { value })
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_radix(10))
    }
}

impl fmt::LowerHex for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            let s = self.to_str_radix(16);
            match s.strip_prefix('-') {
                Some(rest) => write!(f, "-0x{rest}"),
                None => write!(f, "0x{s}"),
            }
        } else {
            f.write_str(&self.to_str_radix(16))
        }
    }
}

impl fmt::Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigInt({:#x})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigInt {
        s.parse().unwrap()
    }

    #[test]
    fn zero_is_normalized() {
        let z = BigInt::from_bytes_be(&[0, 0, 0]);
        assert!(z.is_zero());
        assert_eq!(z, BigInt::zero());
        assert_eq!(z.sign(), Sign::Zero);
        assert_eq!(-z.clone(), z);
    }

    #[test]
    fn bytes_be_minimal_form() {
        assert!(BigInt::zero().to_bytes_be().is_empty());
        assert_eq!(BigInt::from(128u32).to_bytes_be(), vec![0x80]);
        assert_eq!(BigInt::from(0x0102_0304_05u64).to_bytes_be(), vec![1, 2, 3, 4, 5]);
        assert_eq!(
            BigInt::from_bytes_be(&[0, 0, 0x12, 0x34]).to_bytes_be(),
            vec![0x12, 0x34]
        );
    }

    #[test]
    fn fixed_width_zero_is_zero_bytes() {
        assert_eq!(BigInt::zero().to_fixed_bytes::<4>().unwrap(), [0u8; 4]);
        assert_eq!(BigInt::from(1u8).to_bytes_padded(3).unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn fixed_width_overflow_fails() {
        let err = BigInt::from(0x1_0000u32).to_fixed_bytes::<2>().unwrap_err();
        assert!(matches!(err, CryptoError::EncodingOverflow(_)));
        let err = BigInt::from(-1i32).to_bytes_padded(32).unwrap_err();
        assert!(matches!(err, CryptoError::EncodingOverflow(_)));
    }

    #[test]
    fn parse_and_display_decimal() {
        let s = "115792089237316195423570985008687907852837564279074904382605163141518161494337";
        assert_eq!(big(s).to_string(), s);
        assert_eq!(big("-1000000000").to_string(), "-1000000000");
        assert_eq!(big("0").to_string(), "0");
        assert_eq!(big("1000000000000000000").to_string(), "1000000000000000000");
    }

    #[test]
    fn parse_and_display_hex() {
        let n = big("0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141");
        assert_eq!(
            format!("{n:x}"),
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        );
        assert_eq!(format!("{:#x}", BigInt::from(255u32)), "0xff");
        assert_eq!(format!("{:#x}", BigInt::from(-16i32)), "-0x10");
        assert_eq!(format!("{:x}", BigInt::from(0x1000_0000u32)), "10000000");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<BigInt>().is_err());
        assert!("12a".parse::<BigInt>().is_err());
        assert!("0x".parse::<BigInt>().is_err());
        assert!("--5".parse::<BigInt>().is_err());
        assert!(BigInt::from_str_radix("10", 8).is_err());
    }

    #[test]
    fn ordering_respects_sign() {
        let mut values = vec![big("5"), big("-7"), big("0"), big("-2"), big("100000000000000000000")];
        values.sort();
        let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        assert_eq!(rendered, ["-7", "-2", "0", "5", "100000000000000000000"]);
    }

    #[test]
    fn div_rem_truncates_toward_zero() {
        let (q, r) = big("-7").div_rem(&big("2")).unwrap();
        assert_eq!((q, r), (big("-3"), big("-1")));
        let (q, r) = big("7").div_rem(&big("-2")).unwrap();
        assert_eq!((q, r), (big("-3"), big("1")));
    }

    #[test]
    fn division_by_zero_fails() {
        assert!(matches!(
            big("7").div_rem(&BigInt::zero()),
            Err(CryptoError::DivisionByZero)
        ));
        assert!(matches!(
            big("7").modulo(&BigInt::zero()),
            Err(CryptoError::DivisionByZero)
        ));
        assert!(matches!(
            big("7").pow_mod(&big("2"), &BigInt::zero()),
            Err(CryptoError::DivisionByZero)
        ));
    }

    #[test]
    fn modulo_is_non_negative() {
        assert_eq!(big("-7").modulo(&big("3")).unwrap(), big("2"));
        assert_eq!(big("-6").modulo(&big("3")).unwrap(), big("0"));
        assert_eq!(big("7").modulo(&big("-3")).unwrap(), big("1"));
    }

    #[test]
    fn pow_mod_small_cases() {
        assert_eq!(big("4").pow_mod(&big("13"), &big("497")).unwrap(), big("445"));
        assert_eq!(big("5").pow_mod(&big("0"), &big("7")).unwrap(), big("1"));
        assert_eq!(big("5").pow_mod(&big("3"), &big("1")).unwrap(), big("0"));
        assert!(big("5").pow_mod(&big("-1"), &big("7")).is_err());
    }

    #[test]
    fn fermat_inverse_matches_euclid() {
        let p = big("0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F");
        let a = big("0x79BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798");
        let fermat = a.pow_mod(&(&p - &big("2")), &p).unwrap();
        let euclid = a.mod_inverse(&p).unwrap();
        assert_eq!(fermat, euclid);
        assert_eq!((&a * &euclid).modulo(&p).unwrap(), BigInt::one());
    }

    #[test]
    fn non_invertible_fails() {
        assert!(big("6").mod_inverse(&big("9")).is_err());
        assert!(big("0").mod_inverse(&big("7")).is_err());
    }

    #[test]
    fn to_u64_bounds() {
        assert_eq!(BigInt::from(u64::MAX).to_u64(), Some(u64::MAX));
        assert_eq!((BigInt::from(u64::MAX) + BigInt::one()).to_u64(), None);
        assert_eq!(BigInt::from(-1i8).to_u64(), None);
    }

    #[test]
    fn zeroize_clears_value() {
        let mut v = big("123456789012345678901234567890");
        v.zeroize();
        assert!(v.is_zero());
    }
}
