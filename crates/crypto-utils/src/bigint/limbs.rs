//! Magnitude arithmetic on little-endian `u32` limb slices.
//!
//! Every function here treats its inputs as unsigned and returns (or writes)
//! a trimmed magnitude: no most-significant zero limbs, zero is empty.

use std::cmp::Ordering;

const LIMB_BITS: u32 = 32;
const BASE: u64 = 1 << LIMB_BITS;
const LOW_MASK: u64 = 0xFFFF_FFFF;

/// Drops most-significant zero limbs.
pub(crate) fn trim(mag: &mut Vec<u32>) {
    while mag.last() == Some(&0) {
        mag.pop();
    }
}

pub(crate) fn cmp(a: &[u32], b: &[u32]) -> Ordering {
    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }
    for (x, y) in a.iter().rev().zip(b.iter().rev()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}

pub(crate) fn add(a: &[u32], b: &[u32]) -> Vec<u32> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(long.len() + 1);
    let mut carry = 0u64;
    for (i, &limb) in long.iter().enumerate() {
        let sum = limb as u64 + short.get(i).copied().unwrap_or(0) as u64 + carry;
        out.push(sum as u32);
        carry = sum >> LIMB_BITS;
    }
    if carry != 0 {
        out.push(carry as u32);
    }
    out
}

/// `a - b`; requires `a >= b`.
pub(crate) fn sub(a: &[u32], b: &[u32]) -> Vec<u32> {
    debug_assert!(cmp(a, b) != Ordering::Less);
    let mut out = Vec::with_capacity(a.len());
    let mut borrow = 0i64;
    for (i, &limb) in a.iter().enumerate() {
        let diff = limb as i64 - b.get(i).copied().unwrap_or(0) as i64 - borrow;
        if diff < 0 {
            out.push((diff + BASE as i64) as u32);
            borrow = 1;
        } else {
            out.push(diff as u32);
            borrow = 0;
        }
    }
    trim(&mut out);
    out
}

/// Schoolbook product written into `out`, reusing its allocation.
pub(crate) fn mul_into(out: &mut Vec<u32>, a: &[u32], b: &[u32]) {
    out.clear();
    if a.is_empty() || b.is_empty() {
        return;
    }
    out.resize(a.len() + b.len(), 0);
    for (i, &x) in a.iter().enumerate() {
        let mut carry = 0u64;
        for (j, &y) in b.iter().enumerate() {
            let t = out[i + j] as u64 + x as u64 * y as u64 + carry;
            out[i + j] = t as u32;
            carry = t >> LIMB_BITS;
        }
        out[i + b.len()] = carry as u32;
    }
    trim(out);
}

pub(crate) fn mul(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    mul_into(&mut out, a, b);
    out
}

/// `a * m + addend` for single-limb factors; used by string parsing.
pub(crate) fn mul_small_add(a: &[u32], m: u32, addend: u32) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len() + 1);
    let mut carry = addend as u64;
    for &limb in a {
        let t = limb as u64 * m as u64 + carry;
        out.push(t as u32);
        carry = t >> LIMB_BITS;
    }
    if carry != 0 {
        out.push(carry as u32);
    }
    trim(&mut out);
    out
}

/// Divides by a single non-zero limb, returning `(quotient, remainder)`.
pub(crate) fn divrem_small(a: &[u32], d: u32) -> (Vec<u32>, u32) {
    debug_assert!(d != 0);
    let mut q = vec![0u32; a.len()];
    let mut rem = 0u64;
    for i in (0..a.len()).rev() {
        let cur = (rem << LIMB_BITS) | a[i] as u64;
        q[i] = (cur / d as u64) as u32;
        rem = cur % d as u64;
    }
    trim(&mut q);
    (q, rem as u32)
}

/// Knuth algorithm D. `v` must be non-empty (non-zero).
pub(crate) fn divrem(u: &[u32], v: &[u32]) -> (Vec<u32>, Vec<u32>) {
    debug_assert!(!v.is_empty() && v[v.len() - 1] != 0);
    if cmp(u, v) == Ordering::Less {
        return (Vec::new(), u.to_vec());
    }
    if v.len() == 1 {
        let (q, r) = divrem_small(u, v[0]);
        let r = if r == 0 { Vec::new() } else { vec![r] };
        return (q, r);
    }

    let n = v.len();
    let m = u.len() - n;
    let shift = v[n - 1].leading_zeros();

    let vn = shl_limbs_in_place(v, shift);
    let mut un = shl_limbs_in_place(u, shift);
    un.resize(u.len() + 1, 0);
    if shift != 0 {
        un[u.len()] = u[u.len() - 1] >> (LIMB_BITS - shift);
    }

    let mut q = vec![0u32; m + 1];
    let v_top = vn[n - 1] as u64;
    let v_next = vn[n - 2] as u64;

    for j in (0..=m).rev() {
        let num = ((un[j + n] as u64) << LIMB_BITS) | un[j + n - 1] as u64;
        let mut qhat = num / v_top;
        let mut rhat = num % v_top;
        loop {
            if qhat >= BASE || qhat * v_next > ((rhat << LIMB_BITS) | un[j + n - 2] as u64) {
                qhat -= 1;
                rhat += v_top;
                if rhat < BASE {
                    continue;
                }
            }
            break;
        }

        let mut k = 0i64;
        for i in 0..n {
            let p = qhat * vn[i] as u64;
            let t = un[i + j] as i64 - k - (p & LOW_MASK) as i64;
            un[i + j] = t as u32;
            k = (p >> LIMB_BITS) as i64 - (t >> LIMB_BITS);
        }
        let t = un[j + n] as i64 - k;
        un[j + n] = t as u32;

        if t < 0 {
            q[j] = (qhat - 1) as u32;
            let mut carry = 0u64;
            for i in 0..n {
                let s = un[i + j] as u64 + vn[i] as u64 + carry;
                un[i + j] = s as u32;
                carry = s >> LIMB_BITS;
            }
            un[j + n] = un[j + n].wrapping_add(carry as u32);
        } else {
            q[j] = qhat as u32;
        }
    }

    let mut r = vec![0u32; n];
    for i in 0..n {
        r[i] = if shift == 0 {
            un[i]
        } else {
            (un[i] >> shift) | (un[i + 1] << (LIMB_BITS - shift))
        };
    }
    trim(&mut q);
    trim(&mut r);
    (q, r)
}

/// Shifts left by `shift < 32` bits without growing the limb count; the bits
/// shifted out of the top limb are dropped, so callers handle them.
fn shl_limbs_in_place(a: &[u32], shift: u32) -> Vec<u32> {
    if shift == 0 {
        return a.to_vec();
    }
    let mut out = Vec::with_capacity(a.len() + 1);
    let mut prev = 0u32;
    for &limb in a {
        out.push((limb << shift) | (prev >> (LIMB_BITS - shift)));
        prev = limb;
    }
    out
}

pub(crate) fn shl(a: &[u32], bits: usize) -> Vec<u32> {
    if a.is_empty() {
        return Vec::new();
    }
    let limb_shift = bits / LIMB_BITS as usize;
    let bit_shift = (bits % LIMB_BITS as usize) as u32;
    let mut out = vec![0u32; limb_shift];
    out.reserve(a.len() + 1);
    if bit_shift == 0 {
        out.extend_from_slice(a);
    } else {
        let mut carry = 0u32;
        for &limb in a {
            out.push((limb << bit_shift) | carry);
            carry = limb >> (LIMB_BITS - bit_shift);
        }
        if carry != 0 {
            out.push(carry);
        }
    }
    trim(&mut out);
    out
}

pub(crate) fn shr(a: &[u32], bits: usize) -> Vec<u32> {
    let limb_shift = bits / LIMB_BITS as usize;
    if limb_shift >= a.len() {
        return Vec::new();
    }
    let bit_shift = (bits % LIMB_BITS as usize) as u32;
    let src = &a[limb_shift..];
    let mut out = Vec::with_capacity(src.len());
    for i in 0..src.len() {
        let hi = if bit_shift == 0 {
            0
        } else {
            src.get(i + 1).copied().unwrap_or(0) << (LIMB_BITS - bit_shift)
        };
        out.push((src[i] >> bit_shift) | hi);
    }
    trim(&mut out);
    out
}

pub(crate) fn bits(a: &[u32]) -> usize {
    match a.last() {
        None => 0,
        Some(&top) => (a.len() - 1) * LIMB_BITS as usize + (LIMB_BITS - top.leading_zeros()) as usize,
    }
}

pub(crate) fn bit(a: &[u32], index: usize) -> bool {
    let limb = index / LIMB_BITS as usize;
    match a.get(limb) {
        Some(&l) => (l >> (index % LIMB_BITS as usize)) & 1 == 1,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_u128(v: u128) -> Vec<u32> {
        let mut out = vec![v as u32, (v >> 32) as u32, (v >> 64) as u32, (v >> 96) as u32];
        trim(&mut out);
        out
    }

    fn to_u128(a: &[u32]) -> u128 {
        a.iter()
            .enumerate()
            .fold(0u128, |acc, (i, &l)| acc | ((l as u128) << (32 * i)))
    }

    #[test]
    fn add_carries_into_new_limb() {
        assert_eq!(add(&[u32::MAX], &[1]), vec![0, 1]);
    }

    #[test]
    fn sub_borrows_across_limbs() {
        assert_eq!(sub(&[0, 1], &[1]), vec![u32::MAX]);
        assert!(sub(&[7], &[7]).is_empty());
    }

    #[test]
    fn mul_matches_u128() {
        let a = 0xFFFF_FFFF_FFFF_FFFFu128;
        let b = 0x1234_5678_9ABC_DEF0u128;
        assert_eq!(to_u128(&mul(&from_u128(a), &from_u128(b))), a * b);
    }

    #[test]
    fn mul_by_empty_is_empty() {
        assert!(mul(&[], &[5]).is_empty());
    }

    #[test]
    fn divrem_multi_limb_matches_u128() {
        let cases = [
            (u128::MAX, 0x1_0000_0001u128),
            (0xDEAD_BEEF_0000_0000_1234_5678_9ABC_DEF0, 0xFFFF_FFFF_FFFF),
            (1u128 << 100, (1u128 << 64) + 3),
            (0x8000_0000_0000_0000_0000_0000_0000_0000, 0x8000_0000_0000_0001),
        ];
        for (a, b) in cases {
            let (q, r) = divrem(&from_u128(a), &from_u128(b));
            assert_eq!(to_u128(&q), a / b, "quotient of {a:#x} / {b:#x}");
            assert_eq!(to_u128(&r), a % b, "remainder of {a:#x} % {b:#x}");
        }
    }

    #[test]
    fn divrem_smaller_dividend() {
        let (q, r) = divrem(&[5], &[0, 1]);
        assert!(q.is_empty());
        assert_eq!(r, vec![5]);
    }

    #[test]
    fn shifts_cross_limb_boundaries() {
        assert_eq!(shl(&[1], 32), vec![0, 1]);
        assert_eq!(shl(&[0x8000_0000], 1), vec![0, 1]);
        assert_eq!(shr(&[0, 1], 1), vec![0x8000_0000]);
        assert!(shr(&[1], 64).is_empty());
    }

    #[test]
    fn bit_queries() {
        let a = from_u128(1u128 << 70);
        assert_eq!(bits(&a), 71);
        assert!(bit(&a, 70));
        assert!(!bit(&a, 69));
        assert!(!bit(&a, 500));
    }
}
