//! Ring element arithmetic over R_p = Z_p[x]/(x^n + 1).
//!
//! Unlike `bth-crypto-lion`'s `Poly`, which fixes N = 256 and uses a
//! precomputed NTT for that single modulus, `n` and `p` here are runtime
//! values derived from the security parameter (see [`crate::params::Params`]),
//! so multiplication falls back to schoolbook convolution followed by
//! reduction modulo x^n + 1.

use core::ops::{Add, Mul, Neg, Sub};

use rand_core::RngCore;
use zeroize::Zeroize;

use crate::error::{NdrsError, Result};

/// A single element of the quotient ring R_p = Z_p[x]/(x^n + 1).
///
/// Coefficients are stored little-endian (`coeffs[0]` is the constant term),
/// always have length exactly `n`, and always lie in `[0, p)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingElement {
    coeffs: Vec<u64>,
    n: usize,
    p: u64,
}

impl RingElement {
    /// Constructs a ring element from arbitrary-length coefficients,
    /// reducing modulo x^n + 1 and modulo p.
    pub fn new(n: usize, p: u64, coeffs: &[u64]) -> Self {
        let mut element = RingElement {
            coeffs: coeffs.to_vec(),
            n,
            p,
        };
        element.reduce_in_place();
        element
    }

    /// The zero element of R_p.
    pub fn zero(n: usize, p: u64) -> Self {
        RingElement {
            coeffs: vec![0; n],
            n,
            p,
        }
    }

    /// The multiplicative identity of R_p.
    pub fn one(n: usize, p: u64) -> Self {
        RingElement::new(n, p, &[1])
    }

    /// Uniformly random element with coefficients in `[0, p)`.
    pub fn random(rng: &mut dyn RngCore, n: usize, p: u64) -> Self {
        let coeffs: Vec<u64> = (0..n).map(|_| uniform_below(rng, p)).collect();
        RingElement { coeffs, n, p }
    }

    /// Uniformly random element with coefficients in the signed-ternary
    /// range `{-1, 0, 1}` (range D_s), used to sample secret keys and the
    /// per-member challenge scalars `v_i`.
    pub fn random_ternary(rng: &mut dyn RngCore, n: usize, p: u64) -> Self {
        let coeffs: Vec<u64> = (0..n).map(|_| uniform_ternary(rng, p)).collect();
        RingElement { coeffs, n, p }
    }

    /// Uniformly random element whose coefficients, taken as centered
    /// representatives, lie in `[-bound, bound]` (e.g. range D_y or D_z).
    pub fn random_in_range(rng: &mut dyn RngCore, n: usize, p: u64, bound: i128) -> Self {
        let span = (2 * bound + 1) as u64;
        let coeffs: Vec<u64> = (0..n)
            .map(|_| {
                let raw = uniform_below(rng, span) as i128 - bound;
                (((raw % p as i128) + p as i128) % p as i128) as u64
            })
            .collect();
        RingElement { coeffs, n, p }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn p(&self) -> u64 {
        self.p
    }

    pub fn coeffs(&self) -> &[u64] {
        &self.coeffs
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0)
    }

    fn assert_compatible(&self, other: &RingElement) {
        assert_eq!(self.n, other.n, "ring element degree mismatch");
        assert_eq!(self.p, other.p, "ring element modulus mismatch");
    }

    fn reduce_in_place(&mut self) {
        let n = self.n;
        let p = self.p;
        let mut raw = core::mem::take(&mut self.coeffs);
        if raw.len() < n {
            raw.resize(n, 0);
        }
        // x^n = -1 in R_p, so any term of degree n+k folds into position k
        // with a sign flip. Walking from the top down handles arbitrarily
        // long inputs (e.g. the 2n-1 coefficients a schoolbook product has).
        let mut i = raw.len();
        while i > n {
            i -= 1;
            let hi = raw[i] % p;
            raw[i] = 0;
            if hi != 0 {
                let idx = i - n;
                raw[idx] = mod_sub(raw[idx], hi, p);
            }
        }
        raw.truncate(n);
        for c in raw.iter_mut() {
            *c %= p;
        }
        self.coeffs = raw;
    }

    /// Every coefficient, taken as a centered representative in
    /// `(-p/2, p/2]`, lies in `[-bound, bound]`.
    pub fn all_coeffs_in_symmetric_range(&self, bound: i128) -> bool {
        self.coeffs
            .iter()
            .all(|&c| centered(c, self.p).abs() <= bound)
    }

    /// Euclidean division in Z_p[x] — the quotient and remainder are each
    /// re-reduced modulo x^n + 1 before being returned.
    pub fn div_rem(&self, divisor: &RingElement) -> Result<(RingElement, RingElement)> {
        self.assert_compatible(divisor);
        let (q, r) = poly_divmod_raw(&self.coeffs, &divisor.coeffs, self.p)?;
        Ok((
            RingElement::new(self.n, self.p, &q),
            RingElement::new(self.n, self.p, &r),
        ))
    }

    pub fn floordiv(&self, divisor: &RingElement) -> Result<RingElement> {
        Ok(self.div_rem(divisor)?.0)
    }

    pub fn rem(&self, divisor: &RingElement) -> Result<RingElement> {
        Ok(self.div_rem(divisor)?.1)
    }

    /// True iff this element is a unit in R_p, i.e. coprime to x^n + 1.
    pub fn invertible(&self) -> bool {
        self.inverse().is_ok()
    }

    /// The multiplicative inverse in R_p, computed via the extended
    /// Euclidean algorithm against x^n + 1. Because p ≡ 3 (mod 8) and n is a
    /// power of two, x^n + 1 factors nontrivially over Z_p, so not every
    /// nonzero element is invertible.
    pub fn inverse(&self) -> Result<RingElement> {
        let modulus = cyclotomic_modulus(self.n);
        let (gcd, bezout_self, _bezout_mod) = poly_xgcd(&self.coeffs, &modulus, self.p);
        let gcd = trim(gcd);
        if gcd.len() != 1 || gcd[0] == 0 {
            return Err(NdrsError::NotInvertible);
        }
        let gcd_inv = mod_pow(gcd[0], self.p - 2, self.p);
        let scaled = poly_scale_raw(&bezout_self, gcd_inv, self.p);
        Ok(RingElement::new(self.n, self.p, &scaled))
    }

    /// Exponentiation by square-and-multiply. Negative exponents invert
    /// first and raise to the corresponding positive power.
    pub fn pow(&self, exponent: i64) -> Result<RingElement> {
        if exponent == 0 {
            return Ok(RingElement::one(self.n, self.p));
        }
        let (base, exponent) = if exponent < 0 {
            (self.inverse()?, (-exponent) as u64)
        } else {
            (self.clone(), exponent as u64)
        };
        Ok(pow_by_squaring(&base, exponent))
    }

    /// `self * other.inverse()`. Used by the Frameable variant's commitment
    /// construction; fails with `NotInvertible` if `other` is not a unit in
    /// R_p.
    pub fn div(&self, other: &RingElement) -> Result<RingElement> {
        Ok(self * &other.inverse()?)
    }
}

fn pow_by_squaring(base: &RingElement, exponent: u64) -> RingElement {
    if exponent == 1 {
        return base.clone();
    }
    if exponent % 2 == 0 {
        let half = pow_by_squaring(base, exponent / 2);
        &half * &half
    } else {
        base * &pow_by_squaring(base, exponent - 1)
    }
}

impl Zeroize for RingElement {
    fn zeroize(&mut self) {
        self.coeffs.zeroize();
    }
}

impl Add for &RingElement {
    type Output = RingElement;
    fn add(self, rhs: Self) -> RingElement {
        self.assert_compatible(rhs);
        let coeffs: Vec<u64> = self
            .coeffs
            .iter()
            .zip(rhs.coeffs.iter())
            .map(|(&a, &b)| mod_add(a, b, self.p))
            .collect();
        RingElement {
            coeffs,
            n: self.n,
            p: self.p,
        }
    }
}

impl Sub for &RingElement {
    type Output = RingElement;
    fn sub(self, rhs: Self) -> RingElement {
        self.assert_compatible(rhs);
        let coeffs: Vec<u64> = self
            .coeffs
            .iter()
            .zip(rhs.coeffs.iter())
            .map(|(&a, &b)| mod_sub(a, b, self.p))
            .collect();
        RingElement {
            coeffs,
            n: self.n,
            p: self.p,
        }
    }
}

impl Neg for &RingElement {
    type Output = RingElement;
    fn neg(self) -> RingElement {
        let coeffs: Vec<u64> = self.coeffs.iter().map(|&c| mod_neg(c, self.p)).collect();
        RingElement {
            coeffs,
            n: self.n,
            p: self.p,
        }
    }
}

impl Mul for &RingElement {
    type Output = RingElement;
    fn mul(self, rhs: Self) -> RingElement {
        self.assert_compatible(rhs);
        let mut raw = vec![0u64; 2 * self.n - 1];
        for (i, &a) in self.coeffs.iter().enumerate() {
            if a == 0 {
                continue;
            }
            for (j, &b) in rhs.coeffs.iter().enumerate() {
                if b == 0 {
                    continue;
                }
                let t = mod_mul(a, b, self.p);
                raw[i + j] = mod_add(raw[i + j], t, self.p);
            }
        }
        RingElement::new(self.n, self.p, &raw)
    }
}

/// The ring modulus x^n + 1, as a raw coefficient vector [1, 0, ..., 0, 1].
fn cyclotomic_modulus(n: usize) -> Vec<u64> {
    let mut m = vec![0u64; n + 1];
    m[0] = 1;
    m[n] = 1;
    m
}

pub(crate) fn uniform_below(rng: &mut dyn RngCore, bound: u64) -> u64 {
    if bound == 0 {
        return 0;
    }
    // Rejection sampling against the next power-of-two mask avoids modulo
    // bias for arbitrary (non power-of-two) bound.
    let bits = 64 - (bound - 1).leading_zeros();
    let mask = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
    loop {
        let candidate = rng.next_u64() & mask;
        if candidate < bound {
            return candidate;
        }
    }
}

/// Rejection-samples 2 bits at a time to draw uniformly from `{0, 1, 2}`,
/// mapped to `{0, 1, -1 mod p}`.
fn uniform_ternary(rng: &mut dyn RngCore, p: u64) -> u64 {
    loop {
        let mut byte = [0u8; 1];
        rng.fill_bytes(&mut byte);
        for shift in [0u8, 2, 4, 6] {
            let candidate = (byte[0] >> shift) & 0b11;
            match candidate {
                0 => return 0,
                1 => return 1,
                2 => return p - 1,
                _ => continue,
            }
        }
    }
}

fn mod_add(a: u64, b: u64, p: u64) -> u64 {
    (((a as u128) + (b as u128)) % (p as u128)) as u64
}

fn mod_sub(a: u64, b: u64, p: u64) -> u64 {
    let a = a % p;
    let b = b % p;
    if a >= b {
        a - b
    } else {
        p - (b - a)
    }
}

fn mod_neg(a: u64, p: u64) -> u64 {
    mod_sub(0, a, p)
}

fn mod_mul(a: u64, b: u64, p: u64) -> u64 {
    (((a as u128) * (b as u128)) % (p as u128)) as u64
}

fn mod_pow(mut base: u64, mut exponent: u64, p: u64) -> u64 {
    let mut acc = 1u64 % p;
    base %= p;
    while exponent > 0 {
        if exponent & 1 == 1 {
            acc = mod_mul(acc, base, p);
        }
        base = mod_mul(base, base, p);
        exponent >>= 1;
    }
    acc
}

/// Signed representative of `c` in `(-p/2, p/2]`.
fn centered(c: u64, p: u64) -> i128 {
    let c = c as i128;
    let p = p as i128;
    if c > p / 2 {
        c - p
    } else {
        c
    }
}

fn trim(mut coeffs: Vec<u64>) -> Vec<u64> {
    while coeffs.len() > 1 && *coeffs.last().unwrap() == 0 {
        coeffs.pop();
    }
    if coeffs.is_empty() {
        coeffs.push(0);
    }
    coeffs
}

fn is_zero_raw(coeffs: &[u64]) -> bool {
    coeffs.iter().all(|&c| c == 0)
}

fn poly_add_raw(a: &[u64], b: &[u64], p: u64) -> Vec<u64> {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| mod_add(a.get(i).copied().unwrap_or(0), b.get(i).copied().unwrap_or(0), p))
        .collect()
}

fn poly_sub_raw(a: &[u64], b: &[u64], p: u64) -> Vec<u64> {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| mod_sub(a.get(i).copied().unwrap_or(0), b.get(i).copied().unwrap_or(0), p))
        .collect()
}

fn poly_scale_raw(a: &[u64], s: u64, p: u64) -> Vec<u64> {
    a.iter().map(|&c| mod_mul(c, s, p)).collect()
}

fn poly_mul_raw(a: &[u64], b: &[u64], p: u64) -> Vec<u64> {
    if is_zero_raw(a) || is_zero_raw(b) {
        return vec![0];
    }
    let mut raw = vec![0u64; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            if y == 0 {
                continue;
            }
            raw[i + j] = mod_add(raw[i + j], mod_mul(x, y, p), p);
        }
    }
    raw
}

/// Schoolbook polynomial long division over Z_p[x], p prime.
fn poly_divmod_raw(a: &[u64], b: &[u64], p: u64) -> Result<(Vec<u64>, Vec<u64>)> {
    let mut remainder = trim(a.to_vec());
    let divisor = trim(b.to_vec());
    if is_zero_raw(&divisor) {
        return Err(NdrsError::NotInvertible);
    }
    let divisor_degree = divisor.len() - 1;
    let leading_inv = mod_pow(divisor[divisor_degree], p - 2, p);
    let mut quotient = vec![0u64; remainder.len()];

    while !is_zero_raw(&remainder) && remainder.len() - 1 >= divisor_degree {
        let remainder_degree = remainder.len() - 1;
        let shift = remainder_degree - divisor_degree;
        let coeff = mod_mul(remainder[remainder_degree], leading_inv, p);
        quotient[shift] = coeff;
        for (i, &d) in divisor.iter().enumerate() {
            let idx = shift + i;
            remainder[idx] = mod_sub(remainder[idx], mod_mul(coeff, d, p), p);
        }
        remainder = trim(remainder);
        if remainder.len() - 1 < divisor_degree && is_zero_raw(&remainder) {
            break;
        }
    }

    Ok((trim(quotient), remainder))
}

/// Extended Euclidean algorithm over Z_p[x]: returns `(gcd, x, y)` with
/// `a*x + b*y = gcd`.
fn poly_xgcd(a: &[u64], b: &[u64], p: u64) -> (Vec<u64>, Vec<u64>, Vec<u64>) {
    let (mut old_r, mut r) = (trim(a.to_vec()), trim(b.to_vec()));
    let (mut old_s, mut s) = (vec![1u64], vec![0u64]);
    let (mut old_t, mut t) = (vec![0u64], vec![1u64]);

    while !is_zero_raw(&r) {
        let (q, rem) = poly_divmod_raw(&old_r, &r, p).expect("divisor checked nonzero above");
        let new_r = rem;
        old_r = core::mem::replace(&mut r, new_r);

        let new_s = poly_sub_raw(&old_s, &poly_mul_raw(&q, &s, p), p);
        old_s = core::mem::replace(&mut s, new_s);

        let new_t = poly_sub_raw(&old_t, &poly_mul_raw(&q, &t, p), p);
        old_t = core::mem::replace(&mut t, new_t);
    }

    (old_r, old_s, old_t)
}


#[cfg(test)]
mod ring_algebra_properties {
    use super::*;
    use proptest::prelude::*;

    const N: usize = 8;
    const P: u64 = 11;

    fn element_strategy() -> impl Strategy<Value = RingElement> {
        proptest::collection::vec(0..P, N).prop_map(|c| RingElement::new(N, P, &c))
    }

    proptest! {
        #[test]
        fn reduction_keeps_coefficients_in_range(coeffs in proptest::collection::vec(0..P, N)) {
            let e = RingElement::new(N, P, &coeffs);
            for &c in e.coeffs() {
                prop_assert!(c < P);
            }
        }

        #[test]
        fn distributive_identity_holds(a in element_strategy(), b in element_strategy(), c in element_strategy()) {
            let lhs = &(&a * &b) + &c;
            let rhs = &(&a + &c) + &(&(&a * &b) - &a);
            prop_assert_eq!(lhs, rhs);
        }

        #[test]
        fn add_then_sub_is_identity(a in element_strategy(), b in element_strategy()) {
            let sum = &a + &b;
            let back = &sum - &b;
            prop_assert_eq!(back, a);
        }

        #[test]
        fn inverse_is_multiplicative_identity_when_invertible(a in element_strategy()) {
            if let Ok(inv) = a.inverse() {
                let product = &a * &inv;
                prop_assert_eq!(product, RingElement::one(N, P));
            }
        }

        #[test]
        fn negation_is_additive_inverse(a in element_strategy()) {
            let neg = -&a;
            let sum = &a + &neg;
            prop_assert_eq!(sum, RingElement::zero(N, P));
        }
    }
}
