//! NDRS parameter derivation.
//!
//! Every quantity here is derived deterministically from the security
//! parameter `k` (and a robustness constant `c`, default 3) — there is no
//! configuration file or environment variable surface (see crate docs).
//! Because the prime search in [`Params::new`] can be slow for large `k`,
//! derived parameters are memoized per (k, c).

#[cfg(feature = "std")]
use std::collections::HashMap;
#[cfg(feature = "std")]
use std::sync::Mutex;

use rand_core::RngCore;

use crate::ring_element::RingElement;

/// Domain separation tag for `H1`.
pub const DOMAIN_H1: &[u8] = b"ndrs/h1";
/// Domain separation tag for `H2`.
pub const DOMAIN_H2: &[u8] = b"ndrs/h2";
/// Domain separation tag for `H3`.
pub const DOMAIN_H3: &[u8] = b"ndrs/h3";

/// Ceiling on rejection-sampling attempts before a loop gives up and
/// surfaces [`crate::error::NdrsError::RetryExhausted`] instead of looping
/// forever under a pathological RNG.
pub const MAX_REJECTION_ITERATIONS: usize = 10_000;

/// Derived NDRS parameters, plus the scheme-wide public constant `S`.
///
/// `S` is sampled once at construction time and is immutable thereafter — it
/// plays the role of a fixed public "group generator" binding every key pair
/// produced under these parameters via the key relation `pk . sk = S`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    /// Security parameter.
    pub k: usize,
    /// Robustness constant (default 3).
    pub c: usize,
    /// Ring degree, a power of two.
    pub n: usize,
    /// Sample vector length.
    pub m: usize,
    /// Ring modulus: smallest prime ≥ n^(4+c) with p ≡ 3 (mod 8).
    pub p: u64,
    /// Bound on `ŷ` coefficients sampled in `Sign`/`EvidenceGen`.
    pub d_y_max: i128,
    /// Bound derived from `d_y_max` plus a √(n·log n) slack term. Unused by
    /// any operation in this crate, kept for parity with the scheme's
    /// published parameter set.
    pub d_h_max: i128,
    /// Bound on `ẑ` coefficients accepted by `Sign`'s rejection step.
    pub d_z_max: i128,
    /// Bound on `v` coefficients accepted by `Sign`'s rejection step.
    pub d_s_max: i128,
    /// The scheme-wide public constant.
    pub s: RingElement,
}

type ParamKey = (usize, usize);
type DerivedFields = (usize, usize, u64, i128, i128, i128, i128);

#[cfg(feature = "std")]
fn param_cache() -> &'static Mutex<HashMap<ParamKey, DerivedFields>> {
    static CACHE: std::sync::OnceLock<Mutex<HashMap<ParamKey, DerivedFields>>> = std::sync::OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

impl Params {
    /// Signed-ternary coefficient bound for secret keys and the `v`
    /// challenge list (always 1, per the scheme definition).
    pub const D_S_MAX: i128 = 1;

    /// Derives (n, m, p, D_y_max, D_h_max, D_z_max, D_s_max) from (k, c) and
    /// samples a fresh nonzero `S`. Derivation is cached by (k, c); sampling
    /// `S` is not, so repeated calls with the same (k, c) are cheap but
    /// still produce parameter bundles with independent `S` values.
    pub fn new(rng: &mut dyn RngCore, k: usize, c: usize) -> Self {
        let (n, m, p, d_y_max, d_h_max, d_z_max, d_s_max) = Self::derive(k, c);
        let zero = RingElement::zero(n, p);
        let mut s = RingElement::random(rng, n, p);
        while s == zero {
            s = RingElement::random(rng, n, p);
        }
        Params {
            k,
            c,
            n,
            m,
            p,
            d_y_max,
            d_h_max,
            d_z_max,
            d_s_max,
            s,
        }
    }

    /// Like [`Params::new`] but with an explicitly supplied `S`, used by
    /// tests that need reproducible tiny parameters and by
    /// [`crate::frameable`] when it needs to share `S` with a base scheme
    /// instance.
    pub fn with_fixed_s(k: usize, c: usize, n: usize, m: usize, p: u64, s: RingElement) -> Self {
        let (d_y_max, d_h_max, d_z_max, d_s_max) = derive_bounds(n, m);
        Params {
            k,
            c,
            n,
            m,
            p,
            d_y_max,
            d_h_max,
            d_z_max,
            d_s_max,
            s,
        }
    }

    #[cfg(feature = "std")]
    fn derive(k: usize, c: usize) -> DerivedFields {
        let key = (k, c);
        if let Some(cached) = param_cache().lock().unwrap().get(&key) {
            return *cached;
        }
        let entry = Self::derive_uncached(k, c);
        param_cache().lock().unwrap().insert(key, entry);
        entry
    }

    #[cfg(not(feature = "std"))]
    fn derive(k: usize, c: usize) -> DerivedFields {
        Self::derive_uncached(k, c)
    }

    fn derive_uncached(k: usize, c: usize) -> DerivedFields {
        let n = derive_n(k);
        let m = derive_m(n, c);
        let p = find_p(n, c);
        let (d_y_max, d_h_max, d_z_max, d_s_max) = derive_bounds(n, m);
        (n, m, p, d_y_max, d_h_max, d_z_max, d_s_max)
    }

    /// D_mod = 2 * bound + 1, the symmetric-range modulus used when a
    /// coefficient bound is interpreted as a centered range {-bound, ..., +bound}.
    pub fn d_mod(bound: i128) -> i128 {
        bound * 2 + 1
    }
}

fn derive_n(k: usize) -> usize {
    let bits = usize::BITS - 1 - (k.max(1)).leading_zeros();
    1usize << (bits + 1)
}

fn derive_m(n: usize, c: usize) -> usize {
    let log2n = (n as f64).log2();
    ((3.0 + 2.0 * c as f64 / 3.0) * log2n).round() as usize
}

fn derive_bounds(n: usize, m: usize) -> (i128, i128, i128, i128) {
    let log2n = (n as f64).log2();
    let sqrt_n_log_n = ((n as f64).sqrt() * log2n) as i128;
    let d_y_max = (m as f64 * (n as f64).powf(1.5) * log2n) as i128;
    let d_h_max = d_y_max + sqrt_n_log_n;
    let d_z_max = d_y_max - sqrt_n_log_n;
    let d_s_max = Params::D_S_MAX;
    (d_y_max, d_h_max, d_z_max, d_s_max)
}

fn find_p(n: usize, c: usize) -> u64 {
    let mut p = (n as u128).pow(4 + c as u32);
    loop {
        if p % 8 == 3 && is_prime(p) {
            return p as u64;
        }
        p += 1;
    }
}

/// Deterministic Miller-Rabin primality test (witnesses sufficient for all
/// `u64`-range candidates). Trial division becomes impractical once `p`
/// grows past a few million for larger `k`; Miller-Rabin keeps parameter
/// derivation fast regardless of security level.
fn is_prime(n: u128) -> bool {
    if n < 2 {
        return false;
    }
    for small in [2u128, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        if n == small {
            return true;
        }
        if n % small == 0 {
            return false;
        }
    }
    let mut d = n - 1;
    let mut r = 0u32;
    while d % 2 == 0 {
        d /= 2;
        r += 1;
    }
    // Deterministic witness set, sufficient for all n < 3.3 * 10^24.
    'witness: for &a in &[2u128, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        if a >= n {
            continue;
        }
        let mut x = mod_pow_u128(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 0..r - 1 {
            x = mod_pow_u128(x, 2, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

fn mod_pow_u128(mut base: u128, mut exponent: u128, modulus: u128) -> u128 {
    let mut acc = 1u128 % modulus;
    base %= modulus;
    while exponent > 0 {
        if exponent & 1 == 1 {
            acc = mulmod_u128(acc, base, modulus);
        }
        base = mulmod_u128(base, base, modulus);
        exponent >>= 1;
    }
    acc
}

fn mulmod_u128(a: u128, b: u128, modulus: u128) -> u128 {
    // modulus fits comfortably under 2^96 for any k a caller could
    // reasonably request, so widening to u128 for the product does not
    // overflow.
    (a * b) % modulus
}
