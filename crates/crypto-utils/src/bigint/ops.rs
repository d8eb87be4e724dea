//! Arithmetic operator impls for [`BigInt`].

use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Shl, Shr, Sub};

use super::{limbs, BigInt, Sign};

fn signed_add(a: &BigInt, b: &BigInt) -> BigInt {
    match (a.sign, b.sign) {
        (Sign::Zero, _) => b.clone(),
        (_, Sign::Zero) => a.clone(),
        (sa, sb) if sa == sb => BigInt::from_parts(sa, limbs::add(&a.mag, &b.mag)),
        (sa, sb) => match limbs::cmp(&a.mag, &b.mag) {
            Ordering::Equal => BigInt::zero(),
            Ordering::Greater => BigInt::from_parts(sa, limbs::sub(&a.mag, &b.mag)),
            Ordering::Less => BigInt::from_parts(sb, limbs::sub(&b.mag, &a.mag)),
        },
    }
}

impl Neg for BigInt {
    type Output = BigInt;

    fn neg(mut self) -> BigInt {
        self.sign = self.sign.negate();
        self
    }
}

impl Neg for &BigInt {
    type Output = BigInt;

    fn neg(self) -> BigInt {
        -self.clone()
    }
}

impl Add<&BigInt> for &BigInt {
    type Output = BigInt;

    fn add(self, rhs: &BigInt) -> BigInt {
        signed_add(self, rhs)
    }
}

impl Sub<&BigInt> for &BigInt {
    type Output = BigInt;

    fn sub(self, rhs: &BigInt) -> BigInt {
        signed_add(self, &-rhs)
    }
}

impl Mul<&BigInt> for &BigInt {
    type Output = BigInt;

    fn mul(self, rhs: &BigInt) -> BigInt {
        let sign = match (self.sign, rhs.sign) {
            (Sign::Zero, _) | (_, Sign::Zero) => return BigInt::zero(),
            (a, b) if a == b => Sign::Plus,
            _ => Sign::Minus,
        };
        BigInt::from_parts(sign, limbs::mul(&self.mag, &rhs.mag))
    }
}

// Owned-operand forms delegate to the reference impls.
macro_rules! forward_owned {
    ($($trait:ident :: $method:ident),*) => {$(
        impl $trait<BigInt> for BigInt {
            type Output = BigInt;
            fn $method(self, rhs: BigInt) -> BigInt {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&BigInt> for BigInt {
            type Output = BigInt;
            fn $method(self, rhs: &BigInt) -> BigInt {
                (&self).$method(rhs)
            }
        }

        impl $trait<BigInt> for &BigInt {
            type Output = BigInt;
            fn $method(self, rhs: BigInt) -> BigInt {
                self.$method(&rhs)
            }
        }
    )*};
}

forward_owned!(Add::add, Sub::sub, Mul::mul);

/// Shifts the magnitude; the sign is preserved unless the result is zero.
impl Shl<usize> for &BigInt {
    type Output = BigInt;

    fn shl(self, bits: usize) -> BigInt {
        BigInt::from_parts(self.sign, limbs::shl(&self.mag, bits))
    }
}

impl Shr<usize> for &BigInt {
    type Output = BigInt;

    fn shr(self, bits: usize) -> BigInt {
        BigInt::from_parts(self.sign, limbs::shr(&self.mag, bits))
    }
}

impl Shl<usize> for BigInt {
    type Output = BigInt;

    fn shl(self, bits: usize) -> BigInt {
        &self << bits
    }
}

impl Shr<usize> for BigInt {
    type Output = BigInt;

    fn shr(self, bits: usize) -> BigInt {
        &self >> bits
    }
}
