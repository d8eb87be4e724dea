use proptest::prelude::*;

use crypto_utils::hash::keccak256;
use crypto_utils::{secp256k1, BigInt, Point, PrivateKey, PublicKey};

fn big_from_i128(v: i128) -> BigInt {
    BigInt::from(v)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn bigint_arithmetic_matches_i128(a in -(1i128 << 62)..(1i128 << 62), b in -(1i128 << 62)..(1i128 << 62)) {
        let (x, y) = (big_from_i128(a), big_from_i128(b));
        prop_assert_eq!(&x + &y, big_from_i128(a + b));
        prop_assert_eq!(&x - &y, big_from_i128(a - b));
        prop_assert_eq!(&x * &y, big_from_i128(a * b));
        prop_assert_eq!(x.cmp(&y), a.cmp(&b));
    }

    #[test]
    fn bigint_div_rem_matches_i128(a in (i128::MIN + 1)..=i128::MAX, b in any::<i64>().prop_filter("non-zero", |b| *b != 0)) {
        let (q, r) = big_from_i128(a).div_rem(&BigInt::from(b)).unwrap();
        prop_assert_eq!(q, big_from_i128(a / b as i128));
        prop_assert_eq!(r, big_from_i128(a % b as i128));
    }

    #[test]
    fn bigint_division_identity(a in prop::collection::vec(any::<u8>(), 0..80), b in prop::collection::vec(any::<u8>(), 1..40)) {
        let x = BigInt::from_bytes_be(&a);
        let y = BigInt::from_bytes_be(&b);
        prop_assume!(!y.is_zero());
        let (q, r) = x.div_rem(&y).unwrap();
        prop_assert!(r < y);
        prop_assert_eq!(&(&q * &y) + &r, x);
    }

    #[test]
    fn bigint_decimal_and_hex_round_trip(bytes in prop::collection::vec(any::<u8>(), 0..64), negative in any::<bool>()) {
        let mut v = BigInt::from_bytes_be(&bytes);
        if negative {
            v = -v;
        }
        prop_assert_eq!(v.to_string().parse::<BigInt>().unwrap(), v.clone());
        prop_assert_eq!(format!("{:#x}", v).parse::<BigInt>().unwrap(), v);
    }

    #[test]
    fn bigint_bytes_round_trip(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let v = BigInt::from_bytes_be(&bytes);
        let minimal = v.to_bytes_be();
        prop_assert!(minimal.first() != Some(&0));
        prop_assert_eq!(BigInt::from_bytes_be(&minimal), v);
    }
}

proptest! {
    // Curve operations on BigInt limbs are slow in debug builds.
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn sign_verify_recover(secret in any::<[u8; 32]>(), msg in prop::collection::vec(any::<u8>(), 0..64)) {
        let key = match PrivateKey::from_bytes(&secret) {
            Ok(key) => key,
            Err(_) => return Ok(()),
        };
        let hash = keccak256(&msg);
        let sig = key.sign_prehash(&hash);
        let public = key.public_key();
        prop_assert!(sig.is_low_s());
        prop_assert!(public.verify(&hash, &sig).is_ok());
        prop_assert_eq!(PublicKey::recover(&hash, &sig).unwrap(), public);
    }

    #[test]
    fn scalar_mul_distributes(a in any::<u64>(), b in any::<u64>()) {
        let g = Point::generator();
        let lhs = g.mul(&BigInt::from(a)).add(&g.mul(&BigInt::from(b)));
        let rhs = g.mul(&(BigInt::from(a) + BigInt::from(b)));
        prop_assert_eq!(lhs, rhs);
    }

    #[test]
    fn compressed_points_decode(k in 1u64..) {
        let p = Point::generator().mul(&BigInt::from(k));
        let decoded = Point::from_bytes(&p.to_bytes(true)).unwrap();
        prop_assert!(decoded.is_on_curve());
        prop_assert_eq!(decoded, p);
    }
}

#[test]
fn every_scalar_below_order_is_a_valid_key() {
    let n = &secp256k1().n;
    for k in [BigInt::one(), BigInt::from(2u8), n - &BigInt::one(), n - &BigInt::from(2u8)] {
        let key = PrivateKey::from_scalar(k).unwrap();
        let hash = keccak256(b"edge");
        let sig = key.sign_prehash(&hash);
        assert!(key.public_key().verify(&hash, &sig).is_ok());
    }
}
