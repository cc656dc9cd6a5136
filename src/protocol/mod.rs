//! The NDRS protocol state machine: parameter bundle, signatures, evidence,
//! and the five operations that tie them together (KeyGen lives in
//! [`crate::keys`]; the rest live in this module's children).

pub(crate) mod evidence;
pub(crate) mod signer;
pub(crate) mod verifier;

use rand_core::RngCore;

use crate::error::Result;
use crate::keys::{key_gen, KeyPair, PublicKey};
use crate::params::Params;
use crate::ring_element::RingElement;
use crate::sample_vector::SampleVector;

pub use evidence::Evidence;

/// A ring signature: the full ring of public keys, the ephemeral
/// commitment b̂, the ring element A, and one (ẑ, v) response pair per ring
/// member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub pks: Vec<PublicKey>,
    pub b_hat: SampleVector,
    pub a: RingElement,
    pub z_hats: Vec<SampleVector>,
    pub vs: Vec<RingElement>,
}

/// An NDRS protocol instance: a parameter bundle plus the operations that
/// are parameterized by it. Construct once per security level and reuse —
/// `Params::new` pays for a prime search the first time a given `(k, c)` is
/// seen (see [`crate::params`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ndrs {
    params: Params,
}

impl Ndrs {
    /// Constructs a protocol instance for security parameter `k` with
    /// robustness constant `c` (the scheme's default is 3).
    pub fn new(rng: &mut dyn RngCore, k: usize, c: usize) -> Self {
        Ndrs {
            params: Params::new(rng, k, c),
        }
    }

    /// Constructs a protocol instance around an already-derived parameter
    /// bundle, e.g. one produced with fixed tiny parameters for tests.
    pub fn with_params(params: Params) -> Self {
        Ndrs { params }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// KeyGen. Fails with `RetryExhausted` if no resampling of the secret
    /// key within the attempt ceiling yields an invertible element
    /// (astronomically unlikely, see [`crate::keys::key_gen`]).
    pub fn key_gen(&self, rng: &mut dyn RngCore) -> Result<KeyPair> {
        key_gen(rng, &self.params)
    }

    /// Sign. `others` is the set of co-signer public keys the `signer` will
    /// be hidden among; the signer's own public key is inserted at a
    /// uniformly random position.
    pub fn sign(&self, rng: &mut dyn RngCore, signer: &KeyPair, others: &[PublicKey], msg: &[u8]) -> Result<Signature> {
        signer::sign(rng, &self.params, signer, others, msg)
    }

    /// Verify. Never fails; returns `false` on any malformed or invalid
    /// signature.
    pub fn verify(&self, msg: &[u8], sig: &Signature) -> bool {
        verifier::verify(&self.params, msg, sig)
    }

    /// EvidenceGen. Fails with `InvalidSignature` unless `verify(msg, sig)`
    /// holds.
    pub fn evidence_gen(&self, rng: &mut dyn RngCore, signer: &KeyPair, msg: &[u8], sig: &Signature) -> Result<Evidence> {
        evidence::evidence_gen(rng, &self.params, signer, msg, sig)
    }

    /// EvidenceCheck. Fails with `InvalidSignature` unless `verify(msg, sig)`
    /// holds, or `InvalidEvidence` if the recomputed challenge disagrees
    /// with the submitted one.
    pub fn evidence_check(&self, claimed_signer_pk: &PublicKey, msg: &[u8], sig: &Signature, evi: &Evidence) -> Result<bool> {
        evidence::evidence_check(&self.params, claimed_signer_pk, msg, sig, evi)
    }

    /// Verifies a batch of independent (message, signature) pairs, short
    /// circuiting on the first failure. Batch-verifying independent
    /// signatures has no ordering dependency for this scheme to preserve.
    pub fn verify_batch(&self, items: &[(&[u8], &Signature)]) -> bool {
        items.iter().all(|(msg, sig)| self.verify(msg, sig))
    }

    /// As [`Ndrs::verify_batch`], but evaluates every item (rather than
    /// short-circuiting) and reports which ones failed.
    #[cfg(feature = "parallel")]
    pub fn verify_batch_all(&self, items: &[(&[u8], &Signature)]) -> Vec<bool> {
        use rayon::prelude::*;
        items.par_iter().map(|(msg, sig)| self.verify(msg, sig)).collect()
    }

    /// Sequential fallback of [`Ndrs::verify_batch_all`] when the `parallel`
    /// feature is disabled.
    #[cfg(not(feature = "parallel"))]
    pub fn verify_batch_all(&self, items: &[(&[u8], &Signature)]) -> Vec<bool> {
        items.iter().map(|(msg, sig)| self.verify(msg, sig)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn tiny_ndrs() -> Ndrs {
        // Spec scenario S1: tiny fixed parameters for fast unit tests.
        let n = 8;
        let p = 19; // prime, 19 % 8 == 3
        let m = 5;
        let mut rng = OsRng;
        let zero = RingElement::zero(n, p);
        let mut s = RingElement::random(&mut rng, n, p);
        while s == zero {
            s = RingElement::random(&mut rng, n, p);
        }
        Ndrs::with_params(Params::with_fixed_s(8, 3, n, m, p, s))
    }

    #[test]
    fn s1_keygen_sign_verify_round_trip() {
        let ndrs = tiny_ndrs();
        let mut rng = OsRng;
        let a = ndrs.key_gen(&mut rng).unwrap();
        let b = ndrs.key_gen(&mut rng).unwrap();
        let c = ndrs.key_gen(&mut rng).unwrap();

        let sig = ndrs
            .sign(&mut rng, &a, &[b.pk.clone(), c.pk.clone()], b"hello")
            .expect("signing should succeed");
        assert!(ndrs.verify(b"hello", &sig));
    }

    #[test]
    fn s3_evidence_distinguishes_signer_from_non_signer() {
        let ndrs = tiny_ndrs();
        let mut rng = OsRng;
        let a = ndrs.key_gen(&mut rng).unwrap();
        let b = ndrs.key_gen(&mut rng).unwrap();
        let c = ndrs.key_gen(&mut rng).unwrap();

        let sig = ndrs
            .sign(&mut rng, &a, &[b.pk.clone(), c.pk.clone()], b"hello")
            .expect("signing should succeed");
        assert!(ndrs.verify(b"hello", &sig));

        let evi = ndrs
            .evidence_gen(&mut rng, &a, b"hello", &sig)
            .expect("evidence_gen should succeed for the true signer");
        assert!(ndrs
            .evidence_check(&a.pk, b"hello", &sig, &evi)
            .expect("evidence_check should succeed"));

        assert!(!ndrs
            .evidence_check(&b.pk, b"hello", &sig, &evi)
            .expect("evidence_check should not error for a non-signer"));
    }

    #[test]
    fn s4_mutating_signature_breaks_verify() {
        let ndrs = tiny_ndrs();
        let mut rng = OsRng;
        let a = ndrs.key_gen(&mut rng).unwrap();
        let b = ndrs.key_gen(&mut rng).unwrap();

        let mut sig = ndrs.sign(&mut rng, &a, &[b.pk.clone()], b"hello").unwrap();
        assert!(ndrs.verify(b"hello", &sig));

        sig.a = &sig.a + &RingElement::one(sig.a.n(), sig.a.p());
        assert!(!ndrs.verify(b"hello", &sig));
    }

    #[test]
    fn s5_mutating_message_breaks_verify() {
        let ndrs = tiny_ndrs();
        let mut rng = OsRng;
        let a = ndrs.key_gen(&mut rng).unwrap();
        let b = ndrs.key_gen(&mut rng).unwrap();

        let sig = ndrs.sign(&mut rng, &a, &[b.pk.clone()], b"hello").unwrap();
        assert!(ndrs.verify(b"hello", &sig));
        assert!(!ndrs.verify(b"hellp", &sig));
    }
}
