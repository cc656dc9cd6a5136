//! Sign: hides a real signer among a set of co-signer public keys via
//! rejection sampling.

use rand_core::RngCore;

use crate::error::{NdrsError, Result};
use crate::hash::h2;
use crate::keys::{KeyPair, PublicKey};
use crate::params::{Params, MAX_REJECTION_ITERATIONS};
use crate::ring_element::{uniform_below, RingElement};
use crate::sample_vector::SampleVector;

use super::Signature;

/// Inserts the signer's public key at a uniformly random position among
/// `others` and returns the full ring plus the signer's index within it.
fn assemble_ring(rng: &mut dyn RngCore, signer_pk: &PublicKey, others: &[PublicKey]) -> (Vec<PublicKey>, usize) {
    let signer_idx = uniform_below(rng, (others.len() + 1) as u64) as usize;
    let mut pks = others.to_vec();
    pks.insert(signer_idx, signer_pk.clone());
    (pks, signer_idx)
}

pub fn sign(
    rng: &mut dyn RngCore,
    params: &Params,
    signer: &KeyPair,
    others: &[PublicKey],
    msg: &[u8],
) -> Result<Signature> {
    let (pks, signer_idx) = assemble_ring(rng, &signer.pk, others);
    let other_idx: Vec<usize> = (0..pks.len()).filter(|&i| i != signer_idx).collect();
    let zero = RingElement::zero(params.n, params.p);

    // Step 2: sample b_hat until sigma_j = b_hat . sk is nonzero.
    let (b_hat, sigma_j) = loop {
        let candidate = SampleVector::random(rng, params.n, params.p, params.m);
        let sigma = candidate.hashing(signer.sk.as_sample_vector());
        if sigma != zero {
            break (candidate, sigma);
        }
    };
    let a = &sigma_j - &(&params.s * &crate::hash::h1(signer_idx as u64, signer.pk.as_sample_vector()));

    let pk_vectors: Vec<SampleVector> = pks.iter().map(|pk| pk.as_sample_vector().clone()).collect();

    for _attempt in 0..MAX_REJECTION_ITERATIONS {
        let y_j = SampleVector::random_in_range(rng, params.n, params.p, params.m, params.d_y_max);
        let alpha_j = signer.pk.as_sample_vector().hashing(&y_j);
        let beta_j = b_hat.hashing(&y_j);

        // RNG draws for each non-signer must stay sequential (a `dyn RngCore`
        // is not `Sync`), but the pure algebraic combination that follows
        // (sigma_i, alpha_i, beta_i) has no data dependency across members —
        // computed in a second, optionally data-parallel pass.
        let decoys: Vec<(usize, SampleVector, RingElement)> = other_idx
            .iter()
            .map(|&i| {
                let z_i = SampleVector::random_in_range(rng, params.n, params.p, params.m, params.d_z_max);
                let v_i = RingElement::random_ternary(rng, params.n, params.p);
                (i, z_i, v_i)
            })
            .collect();

        let contributions = compute_decoy_contributions(params, &pks, &b_hat, &a, &decoys);

        let mut sum_alpha = alpha_j;
        let mut betas = vec![zero.clone(); pks.len()];
        let mut vs = vec![zero.clone(); pks.len()];
        let mut z_hats = vec![SampleVector::zero(params.n, params.p, params.m); pks.len()];

        for (i, z_i, v_i, alpha_i, beta_i) in contributions {
            sum_alpha = &sum_alpha + &alpha_i;
            betas[i] = beta_i;
            vs[i] = v_i;
            z_hats[i] = z_i;
        }
        betas[signer_idx] = beta_j;

        let v = h2(&sum_alpha, &betas, &a, &pk_vectors, msg);
        let other_v_sum = other_idx.iter().fold(zero.clone(), |acc, &i| &acc + &vs[i]);
        let v_j = &v - &other_v_sum;
        let z_j = &y_j + &(signer.sk.as_sample_vector() * &v_j);

        vs[signer_idx] = v_j.clone();
        z_hats[signer_idx] = z_j.clone();

        // Step 3d: accept iff the signer's own response falls inside the
        // same range a non-signer's simulated response would, which is the
        // mechanism that hides which ring position actually signed.
        if z_j.all_coeffs_in_symmetric_range(params.d_z_max) && v_j.all_coeffs_in_symmetric_range(params.d_s_max) {
            return Ok(Signature {
                pks,
                b_hat,
                a,
                z_hats,
                vs,
            });
        }
    }

    Err(NdrsError::RetryExhausted {
        attempts: MAX_REJECTION_ITERATIONS,
    })
}

/// Computes `(sigma_i, alpha_i, beta_i)` for every non-signer position from
/// already-sampled `(z_i, v_i)` pairs. Pure ring arithmetic with no
/// cross-index dependency, so under the `parallel` feature this runs via
/// `rayon`'s `par_iter`; either way the result is collected back into
/// canonical ring order before the caller folds it into `sum_alpha`/`betas`,
/// satisfying the ordering requirement on downstream hash inputs.
#[cfg(feature = "parallel")]
fn compute_decoy_contributions(
    params: &Params,
    pks: &[PublicKey],
    b_hat: &SampleVector,
    a: &RingElement,
    decoys: &[(usize, SampleVector, RingElement)],
) -> Vec<(usize, SampleVector, RingElement, RingElement, RingElement)> {
    use rayon::prelude::*;
    decoys
        .par_iter()
        .map(|(i, z_i, v_i)| decoy_contribution(params, pks, b_hat, a, *i, z_i, v_i))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn compute_decoy_contributions(
    params: &Params,
    pks: &[PublicKey],
    b_hat: &SampleVector,
    a: &RingElement,
    decoys: &[(usize, SampleVector, RingElement)],
) -> Vec<(usize, SampleVector, RingElement, RingElement, RingElement)> {
    decoys
        .iter()
        .map(|(i, z_i, v_i)| decoy_contribution(params, pks, b_hat, a, *i, z_i, v_i))
        .collect()
}

fn decoy_contribution(
    params: &Params,
    pks: &[PublicKey],
    b_hat: &SampleVector,
    a: &RingElement,
    i: usize,
    z_i: &SampleVector,
    v_i: &RingElement,
) -> (usize, SampleVector, RingElement, RingElement, RingElement) {
    let sigma_i = &(&params.s * &crate::hash::h1(i as u64, pks[i].as_sample_vector())) + a;
    let alpha_i = &pks[i].as_sample_vector().hashing(z_i) - &(&params.s * v_i);
    let beta_i = &b_hat.hashing(z_i) - &(&sigma_i * v_i);
    (i, z_i.clone(), v_i.clone(), alpha_i, beta_i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::key_gen;
    use rand::rngs::OsRng;

    fn tiny_params() -> Params {
        let n = 8;
        let p = 19;
        let m = 5;
        let mut rng = OsRng;
        let zero = RingElement::zero(n, p);
        let mut s = RingElement::random(&mut rng, n, p);
        while s == zero {
            s = RingElement::random(&mut rng, n, p);
        }
        Params::with_fixed_s(8, 3, n, m, p, s)
    }

    #[test]
    fn sign_inserts_signer_somewhere_in_the_ring() {
        let params = tiny_params();
        let mut rng = OsRng;
        let a = key_gen(&mut rng, &params).unwrap();
        let b = key_gen(&mut rng, &params).unwrap();

        let sig = sign(&mut rng, &params, &a, &[b.pk.clone()], b"msg").unwrap();
        assert_eq!(sig.pks.len(), 2);
        assert!(sig.pks.contains(&a.pk));
        assert!(sig.pks.contains(&b.pk));
    }

    #[test]
    fn signer_response_respects_rejection_bounds() {
        let params = tiny_params();
        let mut rng = OsRng;
        let a = key_gen(&mut rng, &params).unwrap();
        let b = key_gen(&mut rng, &params).unwrap();
        let c = key_gen(&mut rng, &params).unwrap();

        let sig = sign(&mut rng, &params, &a, &[b.pk.clone(), c.pk.clone()], b"msg").unwrap();
        let signer_idx = sig.pks.iter().position(|pk| *pk == a.pk).unwrap();
        assert!(sig.z_hats[signer_idx].all_coeffs_in_symmetric_range(params.d_z_max));
        assert!(sig.vs[signer_idx].all_coeffs_in_symmetric_range(params.d_s_max));
    }
}
