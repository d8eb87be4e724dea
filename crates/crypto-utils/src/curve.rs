//! secp256k1 group arithmetic over [`BigInt`].
//!
//! Curve constants live in a process-wide [`LazyLock`] built once on first
//! use and never mutated. Points are affine at the API boundary; scalar
//! multiplication runs a Montgomery ladder over Jacobian coordinates and
//! converts back with a single field inversion.

use std::sync::LazyLock;

use crate::bigint::{BigInt, Modulus};
use crate::error::CryptoError;

/// Decodes a 64-digit hex literal at compile time.
const fn hex32(s: &str) -> [u8; 32] {
    let bytes = s.as_bytes();
    assert!(bytes.len() == 64);
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < 32 {
        out[i] = (nibble(bytes[2 * i]) << 4) | nibble(bytes[2 * i + 1]);
        i += 1;
    }
    out
}

const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit"),
    }
}

const P: [u8; 32] = hex32("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F");
const N: [u8; 32] = hex32("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141");
const GX: [u8; 32] = hex32("79BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798");
const GY: [u8; 32] = hex32("483ADA7726A3C4655DA4FBFC0E1108A8FD17B448A68554199C47D08FFB10D4B8");

/// Domain parameters of secp256k1 (`y^2 = x^3 + 7` over `F_p`).
#[derive(Debug)]
pub struct CurveParams {
    pub p: BigInt,
    pub n: BigInt,
    pub a: BigInt,
    pub b: BigInt,
    pub g: Point,
    /// `n / 2`, the low-s threshold.
    pub half_n: BigInt,
    /// `(p + 1) / 4`; square roots exist as `a^((p+1)/4)` since `p = 3 mod 4`.
    pub sqrt_exp: BigInt,
    pub field: Modulus,
    pub scalar: Modulus,
}

pub static SECP256K1: LazyLock<CurveParams> = LazyLock::new(|| {
    let p = BigInt::from_bytes_be(&P);
    let n = BigInt::from_bytes_be(&N);
    CurveParams {
        half_n: &n >> 1,
        sqrt_exp: (&p + &BigInt::one()) >> 2,
        field: Modulus::from_positive(p.clone()),
        scalar: Modulus::from_positive(n.clone()),
        a: BigInt::zero(),
        b: BigInt::from(7u32),
        g: Point(Repr::Affine {
            x: BigInt::from_bytes_be(&GX),
            y: BigInt::from_bytes_be(&GY),
        }),
        p,
        n,
    }
});

/// Shorthand for the shared parameter set.
pub fn secp256k1() -> &'static CurveParams {
    &SECP256K1
}

/// Big-endian 32-byte form of a reduced field element or scalar.
pub(crate) fn be32(v: &BigInt) -> [u8; 32] {
    let bytes = v.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// A point on secp256k1, or the point at infinity.
///
/// Finite points can only be built through [`Point::new`] or
/// [`Point::from_bytes`], so every `Point` satisfies the curve equation.
#[derive(Clone, PartialEq, Eq)]
pub struct Point(Repr);

#[derive(Clone, PartialEq, Eq)]
enum Repr {
    Infinity,
    Affine { x: BigInt, y: BigInt },
}

/// Jacobian coordinates `(X, Y, Z)` with `x = X/Z^2`, `y = Y/Z^3`; `Z = 0`
/// is infinity.
#[derive(Clone)]
struct Jacobian {
    x: BigInt,
    y: BigInt,
    z: BigInt,
}

impl Point {
    pub const INFINITY: Point = Point(Repr::Infinity);

    /// Validates `0 <= x, y < p` and the curve equation.
    pub fn new(x: BigInt, y: BigInt) -> Result<Point, CryptoError> {
        let c = secp256k1();
        if x.is_negative() || y.is_negative() || x >= c.p || y >= c.p {
            return Err(CryptoError::InvalidPoint("coordinate outside field".into()));
        }
        if !on_curve(&x, &y) {
            return Err(CryptoError::InvalidPoint("point not on curve".into()));
        }
        Ok(Point(Repr::Affine { x, y }))
    }

    pub fn generator() -> Point {
        secp256k1().g.clone()
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self.0, Repr::Infinity)
    }

    /// Affine coordinates, `None` for infinity.
    pub fn coordinates(&self) -> Option<(&BigInt, &BigInt)> {
        match &self.0 {
            Repr::Infinity => None,
            Repr::Affine { x, y } => Some((x, y)),
        }
    }

    pub fn x(&self) -> Option<&BigInt> {
        self.coordinates().map(|(x, _)| x)
    }

    pub fn is_on_curve(&self) -> bool {
        match &self.0 {
            Repr::Infinity => true,
            Repr::Affine { x, y } => on_curve(x, y),
        }
    }

    pub fn negate(&self) -> Point {
        match &self.0 {
            Repr::Infinity => Point::INFINITY,
            Repr::Affine { x, y } => Point(Repr::Affine {
                x: x.clone(),
                y: secp256k1().field.neg(y),
            }),
        }
    }

    pub fn add(&self, other: &Point) -> Point {
        let (x1, y1, x2, y2) = match (&self.0, &other.0) {
            (Repr::Infinity, _) => return other.clone(),
            (_, Repr::Infinity) => return self.clone(),
            (Repr::Affine { x: x1, y: y1 }, Repr::Affine { x: x2, y: y2 }) => (x1, y1, x2, y2),
        };
        let f = &secp256k1().field;
        if x1 == x2 {
            return if y1 == y2 { self.double() } else { Point::INFINITY };
        }
        // lambda = (y2 - y1) / (x2 - x1)
        let Some(inv) = f.inverse(&f.sub(x2, x1)) else {
            return Point::INFINITY;
        };
        let lambda = f.mul(&f.sub(y2, y1), &inv);
        let x3 = f.sub(&f.sub(&f.mul(&lambda, &lambda), x1), x2);
        let y3 = f.sub(&f.mul(&lambda, &f.sub(x1, &x3)), y1);
        Point(Repr::Affine { x: x3, y: y3 })
    }

    pub fn double(&self) -> Point {
        let (x, y) = match &self.0 {
            Repr::Infinity => return Point::INFINITY,
            Repr::Affine { x, y } => (x, y),
        };
        if y.is_zero() {
            return Point::INFINITY;
        }
        let f = &secp256k1().field;
        // lambda = 3x^2 / 2y  (a = 0)
        let Some(inv) = f.inverse(&f.add(y, y)) else {
            return Point::INFINITY;
        };
        let x_sq = f.mul(x, x);
        let lambda = f.mul(&f.add(&f.add(&x_sq, &x_sq), &x_sq), &inv);
        let x3 = f.sub(&f.mul(&lambda, &lambda), &f.add(x, x));
        let y3 = f.sub(&f.mul(&lambda, &f.sub(x, &x3)), y);
        Point(Repr::Affine { x: x3, y: y3 })
    }

    /// Scalar multiplication `k * self`. `k` is reduced mod n first; zero
    /// and infinity both give infinity.
    pub fn mul(&self, k: &BigInt) -> Point {
        let c = secp256k1();
        let k = c.scalar.reduce(k);
        if k.is_zero() || self.is_infinity() {
            return Point::INFINITY;
        }
        let mut r0 = Jacobian::infinity();
        let mut r1 = Jacobian::from_affine(self);
        for i in (0..c.n.bits()).rev() {
            if k.bit(i) {
                r0 = r0.add(&r1);
                r1 = r1.double();
            } else {
                r1 = r0.add(&r1);
                r0 = r0.double();
            }
        }
        r0.to_affine()
    }

    /// SEC1 encoding: 33 bytes compressed, 65 bytes uncompressed, `[0x00]`
    /// for infinity.
    pub fn to_bytes(&self, compressed: bool) -> Vec<u8> {
        let (x, y) = match &self.0 {
            Repr::Infinity => return vec![0x00],
            Repr::Affine { x, y } => (x, y),
        };
        if compressed {
            let mut out = Vec::with_capacity(33);
            out.push(if y.is_odd() { 0x03 } else { 0x02 });
            out.extend_from_slice(&be32(x));
            out
        } else {
            let mut out = Vec::with_capacity(65);
            out.push(0x04);
            out.extend_from_slice(&be32(x));
            out.extend_from_slice(&be32(y));
            out
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Point, CryptoError> {
        match (bytes.len(), bytes.first()) {
            (1, Some(0x00)) => Ok(Point::INFINITY),
            (33, Some(&(prefix @ (0x02 | 0x03)))) => {
                let x = BigInt::from_bytes_be(&bytes[1..]);
                Point::lift_x(&x, prefix == 0x03)
            }
            (65, Some(0x04)) => Point::new(
                BigInt::from_bytes_be(&bytes[1..33]),
                BigInt::from_bytes_be(&bytes[33..]),
            ),
            (len, prefix) => Err(CryptoError::InvalidPoint(format!(
                "unsupported encoding: {len} bytes, prefix {prefix:02x?}"
            ))),
        }
    }

    /// Recovers the point with abscissa `x` and the requested y parity.
    pub fn lift_x(x: &BigInt, odd: bool) -> Result<Point, CryptoError> {
        let c = secp256k1();
        if x.is_negative() || x >= &c.p {
            return Err(CryptoError::InvalidPoint("x outside field".into()));
        }
        let f = &c.field;
        let rhs = f.add(&f.mul(&f.mul(x, x), x), &c.b);
        let y = f.pow(&rhs, &c.sqrt_exp);
        if f.mul(&y, &y) != rhs {
            return Err(CryptoError::InvalidPoint("x has no square root on curve".into()));
        }
        let y = if y.is_odd() == odd { y } else { f.neg(&y) };
        Ok(Point(Repr::Affine { x: x.clone(), y }))
    }
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Repr::Infinity => f.write_str("Point(Infinity)"),
            Repr::Affine { x, y } => write!(f, "Point({x:#x}, {y:#x})"),
        }
    }
}

fn on_curve(x: &BigInt, y: &BigInt) -> bool {
    let c = secp256k1();
    let f = &c.field;
    f.mul(y, y) == f.add(&f.mul(&f.mul(x, x), x), &c.b)
}

impl Jacobian {
    fn infinity() -> Self {
        Jacobian {
            x: BigInt::one(),
            y: BigInt::one(),
            z: BigInt::zero(),
        }
    }

    fn from_affine(p: &Point) -> Self {
        match &p.0 {
            Repr::Infinity => Jacobian::infinity(),
            Repr::Affine { x, y } => Jacobian {
                x: x.clone(),
                y: y.clone(),
                z: BigInt::one(),
            },
        }
    }

    fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    // dbl-2009-l
    fn double(&self) -> Self {
        if self.is_infinity() || self.y.is_zero() {
            return Jacobian::infinity();
        }
        let f = &secp256k1().field;
        let a = f.mul(&self.x, &self.x);
        let b = f.mul(&self.y, &self.y);
        let c = f.mul(&b, &b);
        let xb = f.add(&self.x, &b);
        let d = f.sub(&f.sub(&f.mul(&xb, &xb), &a), &c);
        let d = f.add(&d, &d);
        let e = f.add(&f.add(&a, &a), &a);
        let ff = f.mul(&e, &e);
        let x3 = f.sub(&ff, &f.add(&d, &d));
        let c8 = f.mul(&c, &BigInt::from(8u32));
        let y3 = f.sub(&f.mul(&e, &f.sub(&d, &x3)), &c8);
        let yz = f.mul(&self.y, &self.z);
        let z3 = f.add(&yz, &yz);
        Jacobian { x: x3, y: y3, z: z3 }
    }

    // add-2007-bl without the doubling shortcut
    fn add(&self, other: &Jacobian) -> Self {
        if self.is_infinity() {
            return other.clone();
        }
        if other.is_infinity() {
            return self.clone();
        }
        let f = &secp256k1().field;
        let z1z1 = f.mul(&self.z, &self.z);
        let z2z2 = f.mul(&other.z, &other.z);
        let u1 = f.mul(&self.x, &z2z2);
        let u2 = f.mul(&other.x, &z1z1);
        let s1 = f.mul(&f.mul(&self.y, &other.z), &z2z2);
        let s2 = f.mul(&f.mul(&other.y, &self.z), &z1z1);
        let h = f.sub(&u2, &u1);
        let r = f.sub(&s2, &s1);
        if h.is_zero() {
            return if r.is_zero() {
                self.double()
            } else {
                Jacobian::infinity()
            };
        }
        let h2 = f.mul(&h, &h);
        let h3 = f.mul(&h, &h2);
        let u1h2 = f.mul(&u1, &h2);
        let x3 = f.sub(&f.sub(&f.mul(&r, &r), &h3), &f.add(&u1h2, &u1h2));
        let y3 = f.sub(&f.mul(&r, &f.sub(&u1h2, &x3)), &f.mul(&s1, &h3));
        let z3 = f.mul(&f.mul(&h, &self.z), &other.z);
        Jacobian { x: x3, y: y3, z: z3 }
    }

    fn to_affine(&self) -> Point {
        let f = &secp256k1().field;
        let Some(z_inv) = f.inverse(&self.z) else {
            return Point::INFINITY;
        };
        let z_inv2 = f.mul(&z_inv, &z_inv);
        let z_inv3 = f.mul(&z_inv2, &z_inv);
        Point(Repr::Affine {
            x: f.mul(&self.x, &z_inv2),
            y: f.mul(&self.y, &z_inv3),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigInt {
        s.parse().unwrap()
    }

    fn g_times(k: u64) -> Point {
        Point::generator().mul(&BigInt::from(k))
    }

    #[test]
    fn generator_is_on_curve() {
        assert!(Point::generator().is_on_curve());
        assert_eq!(
            hex::encode(Point::generator().to_bytes(true)),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn double_matches_known_2g() {
        let two_g = Point::generator().double();
        let (x, y) = two_g.coordinates().unwrap();
        assert_eq!(
            x,
            &big("0xC6047F9441ED7D6D3045406E95C07CD85C778E4B8CEF3CA7ABAC09B95C709EE5")
        );
        assert_eq!(
            y,
            &big("0x1AE168FEA63DC339A3C58419466CEAEEF7F632653266D0E1236431A950CFE52A")
        );
        assert_eq!(two_g, g_times(2));
    }

    #[test]
    fn add_matches_mul() {
        let g = Point::generator();
        let three = g.double().add(&g);
        assert_eq!(
            three.x().unwrap(),
            &big("0xF9308A019258C31049344F85F89D5229B531C845836F99B08601F113BCE036F9")
        );
        assert_eq!(three, g_times(3));
        assert_eq!(g_times(7).add(&g_times(5)), g_times(12));
    }

    #[test]
    fn order_times_generator_is_infinity() {
        let c = secp256k1();
        assert!(Point::generator().mul(&c.n).is_infinity());
        let n_minus_1 = &c.n - &BigInt::one();
        assert_eq!(Point::generator().mul(&n_minus_1), Point::generator().negate());
    }

    #[test]
    fn zero_scalar_and_infinity_do_not_fault() {
        assert!(Point::generator().mul(&BigInt::zero()).is_infinity());
        assert!(Point::INFINITY.mul(&BigInt::from(5u32)).is_infinity());
        assert!(Point::INFINITY.double().is_infinity());
        let g = Point::generator();
        assert!(g.add(&g.negate()).is_infinity());
        assert_eq!(Point::INFINITY.add(&g), g);
    }

    #[test]
    fn scalar_is_reduced_mod_order() {
        let c = secp256k1();
        let k = &c.n + &BigInt::from(3u32);
        assert_eq!(Point::generator().mul(&k), g_times(3));
    }

    #[test]
    fn sec1_round_trip() {
        let p = g_times(123_456_789);
        for compressed in [true, false] {
            let bytes = p.to_bytes(compressed);
            assert_eq!(bytes.len(), if compressed { 33 } else { 65 });
            assert_eq!(Point::from_bytes(&bytes).unwrap(), p);
        }
        assert_eq!(Point::INFINITY.to_bytes(true), vec![0x00]);
        assert!(Point::from_bytes(&[0x00]).unwrap().is_infinity());
    }

    #[test]
    fn from_bytes_rejects_bad_input() {
        let mut bytes = Point::generator().to_bytes(true);
        bytes[0] = 0x05;
        assert!(Point::from_bytes(&bytes).is_err());
        assert!(Point::from_bytes(&[0x02; 32]).is_err());

        let mut off_curve = Point::generator().to_bytes(false);
        off_curve[64] ^= 1;
        assert!(matches!(
            Point::from_bytes(&off_curve),
            Err(CryptoError::InvalidPoint(_))
        ));

        // x = p is outside the field
        let mut too_big = vec![0x02];
        too_big.extend_from_slice(&P);
        assert!(Point::from_bytes(&too_big).is_err());
    }

    #[test]
    fn new_validates_equation() {
        let g = Point::generator();
        let (x, y) = g.coordinates().unwrap();
        assert!(Point::new(x.clone(), y.clone()).is_ok());
        assert!(Point::new(x.clone(), y + &BigInt::one()).is_err());
        assert!(Point::new(BigInt::from(-1i32), y.clone()).is_err());
    }

    #[test]
    fn matches_k256_public_keys() {
        use k256::elliptic_curve::sec1::ToEncodedPoint;

        for seed in [1u8, 2, 0x46, 0xAB] {
            let secret = [seed; 32];
            let expected = k256::SecretKey::from_slice(&secret)
                .unwrap()
                .public_key();
            let ours = Point::generator().mul(&BigInt::from_bytes_be(&secret));
            assert_eq!(
                ours.to_bytes(false),
                expected.to_encoded_point(false).as_bytes()
            );
        }
    }
}
