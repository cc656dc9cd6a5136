//! EvidenceGen and EvidenceCheck: the deniability mechanism — the true
//! signer can later produce proof binding them to a signature.
//!
//! `EvidenceCheck` never errors on an honest non-signer's evidence: their
//! recomputed challenge disagreeing with the submitted one is the expected,
//! common case (see the soundness property this module's tests cover), so
//! it resolves to `Ok(false)`. `InvalidEvidence`/`RingMismatch` are reserved
//! for `evi`/`claimed_signer_pk` being malformed relative to the scheme's
//! parameters, not for a legitimate non-signer failing the check.

use rand_core::RngCore;

use crate::error::{NdrsError, Result};
use crate::hash::h3;
use crate::keys::{KeyPair, PublicKey};
use crate::params::Params;
use crate::ring_element::RingElement;
use crate::sample_vector::SampleVector;

use super::{verifier, Signature};

/// Proof that the holder of a particular key pair produced a given
/// signature. All fields are ring elements except `z_hat`, a sample vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evidence {
    pub sigma: RingElement,
    pub alpha: RingElement,
    pub beta: RingElement,
    pub z_hat: SampleVector,
    pub e: RingElement,
}

/// True iff `pk`'s (n, p, m) match `params` — a public key crossing the
/// public API boundary (as opposed to one this crate produced itself) is
/// untrusted input and must not reach the arithmetic layer's `assert_eq!`s.
fn pk_shape_matches(params: &Params, pk: &PublicKey) -> bool {
    let v = pk.as_sample_vector();
    v.n() == params.n && v.p() == params.p && v.len() == params.m
}

/// As [`pk_shape_matches`], for the (public key, secret key) pair a caller
/// supplies to `evidence_gen`.
fn keypair_shape_matches(params: &Params, pair: &KeyPair) -> bool {
    pk_shape_matches(params, &pair.pk) && {
        let sk = pair.sk.as_sample_vector();
        sk.n() == params.n && sk.p() == params.p && sk.len() == params.m
    }
}

/// True iff every field of `evi` has the (n, p) `params` expects and
/// `z_hat` has length `m` — malformation distinct from a legitimate
/// recomputed-challenge mismatch (see [`evidence_check`]).
fn evidence_shape_matches(params: &Params, evi: &Evidence) -> bool {
    let ring_ok = |e: &RingElement| e.n() == params.n && e.p() == params.p;
    ring_ok(&evi.sigma)
        && ring_ok(&evi.alpha)
        && ring_ok(&evi.beta)
        && ring_ok(&evi.e)
        && evi.z_hat.n() == params.n
        && evi.z_hat.p() == params.p
        && evi.z_hat.len() == params.m
}

/// EvidenceGen. No rejection sampling is performed — unlike `Sign`, the
/// output is not required to be distribution-hiding, since its purpose is
/// proof rather than anonymity.
pub fn evidence_gen(rng: &mut dyn RngCore, params: &Params, signer: &KeyPair, msg: &[u8], sig: &Signature) -> Result<Evidence> {
    if !verifier::verify(params, msg, sig) {
        return Err(NdrsError::InvalidSignature);
    }
    if !keypair_shape_matches(params, signer) {
        return Err(NdrsError::RingMismatch);
    }

    let sigma = sig.b_hat.hashing(signer.sk.as_sample_vector());
    let y_hat = SampleVector::random_in_range(rng, params.n, params.p, params.m, params.d_y_max);
    let alpha = signer.pk.as_sample_vector().hashing(&y_hat);
    let beta = sig.b_hat.hashing(&y_hat);

    let pk_vectors: Vec<SampleVector> = sig.pks.iter().map(|pk| pk.as_sample_vector().clone()).collect();
    let e = h3(&alpha, &beta, &sig.a, &pk_vectors, msg);
    let z_hat = &y_hat + &(signer.sk.as_sample_vector() * &e);

    Ok(Evidence { sigma, alpha, beta, z_hat, e })
}

/// EvidenceCheck. Returns whether `claimed_signer_pk` is cryptographically
/// bound to `sig`. A recomputed challenge that disagrees with `evi.e` is the
/// expected outcome for an honest non-signer's evidence (their `pk` feeds a
/// different `alpha'` than the one that produced `evi.e`) and for any other
/// mismatched evidence, so it resolves to `Ok(false)` rather than an error —
/// `InvalidEvidence` is reserved for `evi` itself being malformed relative to
/// `params`. A public key absent from the signature's ring cannot be bound
/// to it either, so that case also returns `Ok(false)`.
pub fn evidence_check(params: &Params, claimed_signer_pk: &PublicKey, msg: &[u8], sig: &Signature, evi: &Evidence) -> Result<bool> {
    if !verifier::verify(params, msg, sig) {
        return Err(NdrsError::InvalidSignature);
    }
    if !pk_shape_matches(params, claimed_signer_pk) {
        return Err(NdrsError::RingMismatch);
    }
    if !evidence_shape_matches(params, evi) {
        return Err(NdrsError::InvalidEvidence);
    }

    let alpha_prime = &claimed_signer_pk.as_sample_vector().hashing(&evi.z_hat) - &(&params.s * &evi.e);
    let beta_prime = &sig.b_hat.hashing(&evi.z_hat) - &(&evi.sigma * &evi.e);

    let pk_vectors: Vec<SampleVector> = sig.pks.iter().map(|pk| pk.as_sample_vector().clone()).collect();
    let e_prime = h3(&alpha_prime, &beta_prime, &sig.a, &pk_vectors, msg);
    if e_prime != evi.e {
        return Ok(false);
    }

    let Some(idx) = sig.pks.iter().position(|pk| pk == claimed_signer_pk) else {
        return Ok(false);
    };
    let expected = &(&params.s * &crate::hash::h1(idx as u64, claimed_signer_pk.as_sample_vector())) + &sig.a;
    Ok(evi.sigma == expected)
}
