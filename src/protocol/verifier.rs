//! Verify. Never fails — malformed or invalid signatures simply verify to
//! `false`.

use crate::hash::h1;
use crate::params::Params;
use crate::ring_element::RingElement;
use crate::sample_vector::SampleVector;

use super::Signature;

/// Structural checks that let `verify` return `false` instead of panicking
/// on a malformed signature: mismatched ring parameters are a programmer
/// error internally, but a `Signature` crossing the public API boundary is
/// untrusted input.
fn shape_is_valid(params: &Params, sig: &Signature) -> bool {
    if sig.pks.is_empty() {
        return false;
    }
    if sig.z_hats.len() != sig.pks.len() || sig.vs.len() != sig.pks.len() {
        return false;
    }
    if sig.b_hat.n() != params.n || sig.b_hat.p() != params.p || sig.b_hat.len() != params.m {
        return false;
    }
    if sig.a.n() != params.n || sig.a.p() != params.p {
        return false;
    }
    sig.pks.iter().all(|pk| {
        let v = pk.as_sample_vector();
        v.n() == params.n && v.p() == params.p && v.len() == params.m
    }) && sig.z_hats.iter().all(|z| z.n() == params.n && z.p() == params.p && z.len() == params.m)
        && sig.vs.iter().all(|v| v.n() == params.n && v.p() == params.p)
}

pub fn verify(params: &Params, msg: &[u8], sig: &Signature) -> bool {
    if !shape_is_valid(params, sig) {
        return false;
    }

    let zero = RingElement::zero(params.n, params.p);
    let pk_vectors: Vec<SampleVector> = sig.pks.iter().map(|pk| pk.as_sample_vector().clone()).collect();

    let mut alpha_prime = Vec::with_capacity(sig.pks.len());
    let mut beta_prime = Vec::with_capacity(sig.pks.len());

    for i in 0..sig.pks.len() {
        let sigma_i = &(&params.s * &h1(i as u64, sig.pks[i].as_sample_vector())) + &sig.a;
        let alpha_i = &sig.pks[i].as_sample_vector().hashing(&sig.z_hats[i]) - &(&params.s * &sig.vs[i]);
        let beta_i = &sig.b_hat.hashing(&sig.z_hats[i]) - &(&sigma_i * &sig.vs[i]);
        alpha_prime.push(alpha_i);
        beta_prime.push(beta_i);
    }

    let sum_alpha = alpha_prime.iter().fold(zero.clone(), |acc, x| &acc + x);
    let v_prime = crate::hash::h2(&sum_alpha, &beta_prime, &sig.a, &pk_vectors, msg);
    let v_sum = sig.vs.iter().fold(zero, |acc, x| &acc + x);

    v_prime == v_sum
}
