//! Key generation and the (public key, secret key) types bound together by
//! the scheme's key relation â . ŝ = S.

use rand_core::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{NdrsError, Result};
use crate::params::{Params, MAX_REJECTION_ITERATIONS};
use crate::ring_element::RingElement;
use crate::sample_vector::SampleVector;

/// A public key: a sample vector â with coefficients in Z_p, satisfying
/// â . ŝ = S for the holder's secret key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(pub(crate) SampleVector);

impl PublicKey {
    pub fn as_sample_vector(&self) -> &SampleVector {
        &self.0
    }
}

/// A secret key: a sample vector ŝ with signed-ternary coefficients, at
/// least one element of which is invertible in R_p. Zeroized on drop.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(pub(crate) SampleVector);

impl SecretKey {
    pub fn as_sample_vector(&self) -> &SampleVector {
        &self.0
    }
}

/// A (public key, secret key) pair produced by [`key_gen`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    pub pk: PublicKey,
    pub sk: SecretKey,
}

/// KeyGen:
///
/// 1. Sample ŝ with signed-ternary coefficients; find the smallest
///    invertible element's index `t`, resampling the whole vector if none
///    of its `m` elements is invertible.
/// 2. Sample â uniformly in Z_p.
/// 3. Overwrite â[t] so that â . ŝ = S holds exactly.
///
/// Fails with `RetryExhausted` if no resampling of ŝ within
/// `MAX_REJECTION_ITERATIONS` attempts turns up an invertible element — an
/// otherwise-unbounded rejection loop needs a ceiling somewhere.
pub fn key_gen(rng: &mut dyn RngCore, params: &Params) -> Result<KeyPair> {
    let (sk_elements, pivot) = sample_invertible_secret(rng, params)?;
    let sk = SampleVector::new(sk_elements);

    let mut pk_elements: Vec<RingElement> = (0..params.m)
        .map(|_| RingElement::random(rng, params.n, params.p))
        .collect();

    let others_sum: RingElement = (0..params.m)
        .filter(|&i| i != pivot)
        .map(|i| &pk_elements[i] * &sk.elements()[i])
        .fold(RingElement::zero(params.n, params.p), |acc, x| &acc + &x);

    let pivot_inverse = sk
        .elements()[pivot]
        .inverse()
        .expect("pivot was selected for invertibility");
    pk_elements[pivot] = &(&params.s - &others_sum) * &pivot_inverse;

    Ok(KeyPair {
        pk: PublicKey(SampleVector::new(pk_elements)),
        sk: SecretKey(sk),
    })
}

/// Samples a signed-ternary sample vector together with the index of an
/// invertible element, resampling the whole vector when none of its `m`
/// elements happens to be a unit in R_p.
fn sample_invertible_secret(rng: &mut dyn RngCore, params: &Params) -> Result<(Vec<RingElement>, usize)> {
    for _ in 0..MAX_REJECTION_ITERATIONS {
        let elements: Vec<RingElement> = (0..params.m)
            .map(|_| RingElement::random_ternary(rng, params.n, params.p))
            .collect();
        if let Some(pivot) = elements.iter().position(|e| e.invertible()) {
            return Ok((elements, pivot));
        }
    }
    Err(NdrsError::RetryExhausted {
        attempts: MAX_REJECTION_ITERATIONS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn test_params() -> Params {
        Params::new(&mut OsRng, 8, 3)
    }

    #[test]
    fn key_relation_holds() {
        let params = test_params();
        let mut rng = OsRng;
        let pair = key_gen(&mut rng, &params).unwrap();
        assert_eq!(pair.pk.as_sample_vector().hashing(pair.sk.as_sample_vector()), params.s);
    }

    #[test]
    fn two_key_gens_yield_distinct_keys_same_s() {
        let params = test_params();
        let mut rng = OsRng;
        let a = key_gen(&mut rng, &params).unwrap();
        let b = key_gen(&mut rng, &params).unwrap();
        assert_ne!(a.sk, b.sk);
        assert_eq!(a.pk.as_sample_vector().hashing(a.sk.as_sample_vector()), params.s);
        assert_eq!(b.pk.as_sample_vector().hashing(b.sk.as_sample_vector()), params.s);
    }
}
