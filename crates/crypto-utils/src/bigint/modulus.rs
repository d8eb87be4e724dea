//! Arithmetic modulo a fixed positive integer.

use crate::error::CryptoError;

use super::{limbs, BigInt, Sign};

/// A strictly positive modulus. Holding one makes every reduction
/// infallible, so field and scalar arithmetic never returns `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modulus {
    m: BigInt,
}

impl Modulus {
    pub fn new(m: BigInt) -> Result<Self, CryptoError> {
        match m.sign() {
            Sign::Zero => Err(CryptoError::DivisionByZero),
            Sign::Minus => Err(CryptoError::InvalidNumber(format!(
                "modulus must be positive, got {m}"
            ))),
            Sign::Plus => Ok(Modulus { m }),
        }
    }

    /// For constants known to be positive at the call site.
    pub(crate) fn from_positive(m: BigInt) -> Self {
        debug_assert!(m.is_positive());
        Modulus { m }
    }

    pub fn value(&self) -> &BigInt {
        &self.m
    }

    /// Euclidean reduction into `[0, m)`.
    pub fn reduce(&self, a: &BigInt) -> BigInt {
        let (_, r) = limbs::divrem(a.magnitude(), self.m.magnitude());
        let r = BigInt::from_parts(Sign::Plus, r);
        if a.is_negative() && !r.is_zero() {
            &self.m - &r
        } else {
            r
        }
    }

    pub fn add(&self, a: &BigInt, b: &BigInt) -> BigInt {
        self.reduce(&(a + b))
    }

    pub fn sub(&self, a: &BigInt, b: &BigInt) -> BigInt {
        self.reduce(&(a - b))
    }

    pub fn mul(&self, a: &BigInt, b: &BigInt) -> BigInt {
        self.reduce(&(a * b))
    }

    pub fn neg(&self, a: &BigInt) -> BigInt {
        self.reduce(&-a)
    }

    /// Left-to-right square-and-multiply. The product and remainder
    /// buffers are reused across iterations.
    pub fn pow(&self, base: &BigInt, exponent: &BigInt) -> BigInt {
        let m = self.m.magnitude();
        let mut acc: Vec<u32> = limbs::divrem(&[1], m).1;
        let base = self.reduce(base);
        let b = base.magnitude();
        let mut scratch: Vec<u32> = Vec::with_capacity(2 * m.len() + 1);

        for i in (0..exponent.bits()).rev() {
            limbs::mul_into(&mut scratch, &acc, &acc);
            acc = limbs::divrem(&scratch, m).1;
            if exponent.bit(i) {
                limbs::mul_into(&mut scratch, &acc, b);
                acc = limbs::divrem(&scratch, m).1;
            }
        }
        BigInt::from_parts(Sign::Plus, acc)
    }

    /// Inverse via the extended Euclidean algorithm; `None` when
    /// `gcd(a, m) != 1`.
    pub fn inverse(&self, a: &BigInt) -> Option<BigInt> {
        let mut r0 = self.m.clone();
        let mut r1 = self.reduce(a);
        let mut t0 = BigInt::zero();
        let mut t1 = BigInt::one();
        while !r1.is_zero() {
            let (q, r) = limbs::divrem(r0.magnitude(), r1.magnitude());
            let q = BigInt::from_parts(Sign::Plus, q);
            let r = BigInt::from_parts(Sign::Plus, r);
            let t = &t0 - &(&q * &t1);
            r0 = std::mem::replace(&mut r1, r);
            t0 = std::mem::replace(&mut t1, t);
        }
        if r0 != BigInt::one() {
            return None;
        }
        Some(self.reduce(&t0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigInt {
        s.parse().unwrap()
    }

    #[test]
    fn rejects_zero_and_negative() {
        assert!(matches!(
            Modulus::new(BigInt::zero()),
            Err(CryptoError::DivisionByZero)
        ));
        assert!(matches!(
            Modulus::new(big("-7")),
            Err(CryptoError::InvalidNumber(_))
        ));
    }

    #[test]
    fn reduce_negative_wraps() {
        let m = Modulus::new(big("7")).unwrap();
        assert_eq!(m.reduce(&big("-1")), big("6"));
        assert_eq!(m.reduce(&big("-14")), big("0"));
        assert_eq!(m.neg(&big("3")), big("4"));
        assert_eq!(m.sub(&big("2"), &big("5")), big("4"));
    }

    #[test]
    fn pow_with_large_exponent() {
        // Fermat: a^(p-1) = 1 mod p
        let p = big("0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F");
        let m = Modulus::new(p.clone()).unwrap();
        let a = big("123456789");
        assert_eq!(m.pow(&a, &(&p - &BigInt::one())), BigInt::one());
    }

    #[test]
    fn inverse_round_trip() {
        let m = Modulus::new(big("1000000007")).unwrap();
        let a = big("-42");
        let inv = m.inverse(&a).unwrap();
        assert_eq!(m.mul(&m.reduce(&a), &inv), BigInt::one());
    }
}
