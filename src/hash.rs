//! H1, H2, H3: the scheme's three hash functions, all producing a
//! [`RingElement`] with coefficients in the signed-ternary range `{-1, 0, 1}`.
//!
//! Coefficients are derived from `SHAKE256` (`sha3`, the same extendable-
//! output function family used elsewhere in this crate family for
//! domain-separated derivations) rather than a non-cryptographic scalar
//! hash: two bits are rejection-sampled at a time out of the XOF stream to
//! land in `{0, 1, 2}`, mapped to `{0, 1, -1}`.
//!
//! **H2/H3 input shape.** Both combine a sum over the ring's public keys
//! with ring-element scalars under a single `*`. `Σ pks` is itself a sample
//! vector (each public key has `m` elements), and multiplying a sample
//! vector by a ring-element scalar broadcasts that scalar across every
//! entry, producing a new sample vector — which is exactly the shape `H1`
//! expects for its `pk` argument.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

use crate::params::{DOMAIN_H1, DOMAIN_H2, DOMAIN_H3};
use crate::ring_element::RingElement;
use crate::sample_vector::SampleVector;

/// H1(idx, pk) — derives a signed-ternary ring element from a domain tag,
/// an integer index, and a sample vector's coefficients.
pub fn h1(idx: u64, pk: &SampleVector) -> RingElement {
    let n = pk.n();
    let p = pk.p();

    let mut hasher = Shake256::default();
    hasher.update(DOMAIN_H1);
    hasher.update(&idx.to_le_bytes());
    for element in pk.elements() {
        for &c in element.coeffs() {
            hasher.update(&c.to_le_bytes());
        }
    }
    let mut reader = hasher.finalize_xof();

    let coeffs: Vec<u64> = (0..n).map(|_| ternary_coefficient(&mut reader, p)).collect();
    RingElement::new(n, p, &coeffs)
}

/// H2(sum_alphas, betas, A, pks, msg) = H1(hash(msg), (Σ pks) * (sum_alphas + Σ betas + A)).
#[allow(clippy::too_many_arguments)]
pub fn h2(
    sum_alphas: &RingElement,
    betas: &[RingElement],
    a: &RingElement,
    pks: &[SampleVector],
    msg: &[u8],
) -> RingElement {
    let scalar = betas
        .iter()
        .fold(sum_alphas.clone(), |acc, b| &acc + b);
    let scalar = &scalar + a;
    let pk_sum = SampleVector::sum(pks);
    let broadcast = &pk_sum * &scalar;
    h1(hash_message(msg), &broadcast)
}

/// H3(alpha_i, beta_i, A, pks, msg) = H1(hash(msg), (alpha_i + beta_i + A) * Σ pks).
pub fn h3(alpha_i: &RingElement, beta_i: &RingElement, a: &RingElement, pks: &[SampleVector], msg: &[u8]) -> RingElement {
    let scalar = &(alpha_i + beta_i) + a;
    let pk_sum = SampleVector::sum(pks);
    let broadcast = &pk_sum * &scalar;
    h1(hash_message(msg), &broadcast)
}

/// Collapses an arbitrary-length message into the integer index `H1`
/// expects, via the first 8 bytes of a SHAKE256 digest of the message
/// under its own domain tag.
fn hash_message(msg: &[u8]) -> u64 {
    let mut hasher = Shake256::default();
    hasher.update(b"ndrs/msg");
    hasher.update(msg);
    let mut reader = hasher.finalize_xof();
    let mut buf = [0u8; 8];
    reader.read(&mut buf);
    u64::from_le_bytes(buf)
}

/// Draws one coefficient in `{-1, 0, 1} mod p` by rejection sampling 2 bits
/// at a time from the XOF stream until a value in `{0, 1, 2}` is drawn.
fn ternary_coefficient(reader: &mut impl XofReader, p: u64) -> u64 {
    loop {
        let mut byte = [0u8; 1];
        reader.read(&mut byte);
        // each byte yields four independent 2-bit draws before we pull more
        // output; rejecting 3 keeps the distribution uniform over {0,1,2}.
        for shift in [0u8, 2, 4, 6] {
            let candidate = (byte[0] >> shift) & 0b11;
            match candidate {
                0 => return 0,
                1 => return 1,
                2 => return p - 1, // -1 mod p
                _ => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use rand_core::RngCore;

    const N: usize = 8;
    const P: u64 = 11;
    const M: usize = 3;

    fn random_vector(rng: &mut dyn RngCore) -> SampleVector {
        SampleVector::random(rng, N, P, M)
    }

    #[test]
    fn h1_is_deterministic() {
        let mut rng = OsRng;
        let pk = random_vector(&mut rng);
        assert_eq!(h1(7, &pk), h1(7, &pk));
    }

    #[test]
    fn h1_outputs_are_signed_ternary() {
        let mut rng = OsRng;
        let pk = random_vector(&mut rng);
        let out = h1(3, &pk);
        assert!(out.all_coeffs_in_symmetric_range(1));
    }

    #[test]
    fn h1_differs_across_indices_with_overwhelming_probability() {
        let mut rng = OsRng;
        let pk = random_vector(&mut rng);
        assert_ne!(h1(1, &pk), h1(2, &pk));
    }

    #[test]
    fn h2_is_deterministic_and_ternary() {
        let mut rng = OsRng;
        let pks = vec![random_vector(&mut rng), random_vector(&mut rng)];
        let sum_alphas = RingElement::random(&mut rng, N, P);
        let betas = vec![RingElement::random(&mut rng, N, P)];
        let a = RingElement::random(&mut rng, N, P);
        let out1 = h2(&sum_alphas, &betas, &a, &pks, b"msg");
        let out2 = h2(&sum_alphas, &betas, &a, &pks, b"msg");
        assert_eq!(out1, out2);
        assert!(out1.all_coeffs_in_symmetric_range(1));
    }

    #[test]
    fn h3_changes_with_message() {
        let mut rng = OsRng;
        let pks = vec![random_vector(&mut rng)];
        let alpha = RingElement::random(&mut rng, N, P);
        let beta = RingElement::random(&mut rng, N, P);
        let a = RingElement::random(&mut rng, N, P);
        let out1 = h3(&alpha, &beta, &a, &pks, b"hello");
        let out2 = h3(&alpha, &beta, &a, &pks, b"hellp");
        assert_ne!(out1, out2);
    }
}
