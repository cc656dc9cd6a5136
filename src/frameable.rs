//! The Frameable NDRS variant: a demonstration attack in which an adversary
//! holding a colluding key pair can construct a signature that
//! `evidence_check` later attributes to an innocent ring member.

use rand_core::RngCore;

use crate::error::{NdrsError, Result};
use crate::hash::{h1, h2};
use crate::keys::{key_gen as base_key_gen, KeyPair, PublicKey, SecretKey};
use crate::params::{Params, MAX_REJECTION_ITERATIONS};
use crate::protocol::{evidence, signer, verifier, Evidence, Signature};
use crate::ring_element::{uniform_below, RingElement};
use crate::sample_vector::SampleVector;

/// KeyGen, overridden so the secret key's invertible pivot always lands at
/// index 0 — the invariant [`fake_skey_gen`] relies on.
pub fn key_gen(rng: &mut dyn RngCore, params: &Params) -> Result<KeyPair> {
    let pair = base_key_gen(rng, params)?;
    let pivot = pair
        .sk
        .as_sample_vector()
        .elements()
        .iter()
        .position(|e| e.invertible())
        .expect("base key_gen guarantees at least one invertible secret element");

    if pivot == 0 {
        return Ok(pair);
    }

    let mut sk_elements = pair.sk.as_sample_vector().elements().to_vec();
    let mut pk_elements = pair.pk.as_sample_vector().elements().to_vec();
    sk_elements.swap(0, pivot);
    pk_elements.swap(0, pivot);

    Ok(KeyPair {
        pk: PublicKey(SampleVector::new(pk_elements)),
        sk: SecretKey(SampleVector::new(sk_elements)),
    })
}

/// FakeSkeyGen: given an honest victim's key pair (with `sk[0]` invertible,
/// the invariant [`key_gen`] establishes), constructs a second public key
/// `pk'` satisfying the key relation under *both* the victim's genuine
/// secret key and a freshly sampled attacker secret key `ŝ'`.
pub fn fake_skey_gen(rng: &mut dyn RngCore, params: &Params, original: &KeyPair) -> Result<(KeyPair, SecretKey)> {
    let fake_sk_elements = sample_secret_with_invertible_second(rng, params)?;
    let mut fake_sk_elements = fake_sk_elements;
    fake_sk_elements[0] = RingElement::zero(params.n, params.p);
    let fake_sk = SampleVector::new(fake_sk_elements);

    let mut pk_elements = original.pk.as_sample_vector().elements().to_vec();
    let zero = RingElement::zero(params.n, params.p);

    let sum_from_2 = (2..params.m)
        .map(|i| &pk_elements[i] * &fake_sk.elements()[i])
        .fold(zero.clone(), |acc, x| &acc + &x);
    let fake_sk1_inv = fake_sk.elements()[1].inverse()?;
    pk_elements[1] = &(&params.s - &sum_from_2) * &fake_sk1_inv;

    let sum_from_1 = (1..params.m)
        .map(|i| &pk_elements[i] * &fake_sk.elements()[i])
        .fold(zero, |acc, x| &acc + &x);
    let original_sk0_inv = original.sk.as_sample_vector().elements()[0].inverse()?;
    pk_elements[0] = &(&params.s - &sum_from_1) * &original_sk0_inv;

    let frame_pair = KeyPair {
        pk: PublicKey(SampleVector::new(pk_elements)),
        sk: original.sk.clone(),
    };
    Ok((frame_pair, SecretKey(fake_sk)))
}

fn sample_secret_with_invertible_second(rng: &mut dyn RngCore, params: &Params) -> Result<Vec<RingElement>> {
    for _ in 0..MAX_REJECTION_ITERATIONS {
        let elements: Vec<RingElement> = (0..params.m)
            .map(|_| RingElement::random_ternary(rng, params.n, params.p))
            .collect();
        if elements[1].invertible() {
            return Ok(elements);
        }
    }
    Err(NdrsError::RetryExhausted {
        attempts: MAX_REJECTION_ITERATIONS,
    })
}

/// FrameablySign: constructs `b_hat` so that the true signer's trapdoor
/// value `sigma_j = b_hat . sk` forces `sigma_framed = S*H1(framed,.) + A`
/// to hold for the chosen innocent ring index, binding `evidence_check` to
/// that party instead of the attacker. No rejection loop — unlike `Sign`,
/// the attacker has no interest in hiding the output's distribution.
pub fn frameably_sign(
    rng: &mut dyn RngCore,
    params: &Params,
    signer_pair: &KeyPair,
    others: &[PublicKey],
    msg: &[u8],
    framed_idx: usize,
) -> Result<Signature> {
    if framed_idx >= others.len() {
        return Err(NdrsError::IndexOutOfBounds {
            index: framed_idx,
            size: others.len(),
        });
    }

    let signer_idx = uniform_below(rng, (others.len() + 1) as u64) as usize;
    let mut pks = others.to_vec();
    pks.insert(signer_idx, signer_pair.pk.clone());
    let other_idx: Vec<usize> = (0..pks.len()).filter(|&i| i != signer_idx).collect();

    let framed_pk = &others[framed_idx];
    let h_diff = &h1(framed_idx as u64, framed_pk.as_sample_vector()) - &h1(signer_idx as u64, signer_pair.pk.as_sample_vector());
    let numerator = &(framed_pk.as_sample_vector() * &h_diff) * &params.s;
    let denom = &params.s - &framed_pk.as_sample_vector().hashing(signer_pair.sk.as_sample_vector());
    let b_hat = numerator.div_scalar(&denom)?;

    let sigma_j = b_hat.hashing(signer_pair.sk.as_sample_vector());
    let a = &sigma_j - &(&h1(signer_idx as u64, signer_pair.pk.as_sample_vector()) * &params.s);

    let y_j = SampleVector::random_in_range(rng, params.n, params.p, params.m, params.d_y_max);
    let alpha_j = signer_pair.pk.as_sample_vector().hashing(&y_j);
    let beta_j = b_hat.hashing(&y_j);

    let zero = RingElement::zero(params.n, params.p);
    let mut sum_alpha = alpha_j;
    let mut betas = vec![zero.clone(); pks.len()];
    let mut vs = vec![zero.clone(); pks.len()];
    let mut z_hats = vec![SampleVector::zero(params.n, params.p, params.m); pks.len()];

    for &i in &other_idx {
        let z_i = SampleVector::random_in_range(rng, params.n, params.p, params.m, params.d_z_max);
        let v_i = RingElement::random_ternary(rng, params.n, params.p);
        let sigma_i = &(&params.s * &h1(i as u64, pks[i].as_sample_vector())) + &a;
        let alpha_i = &pks[i].as_sample_vector().hashing(&z_i) - &(&params.s * &v_i);
        let beta_i = &b_hat.hashing(&z_i) - &(&sigma_i * &v_i);

        sum_alpha = &sum_alpha + &alpha_i;
        betas[i] = beta_i;
        vs[i] = v_i;
        z_hats[i] = z_i;
    }
    betas[signer_idx] = beta_j;

    let pk_vectors: Vec<SampleVector> = pks.iter().map(|pk| pk.as_sample_vector().clone()).collect();
    let v = h2(&sum_alpha, &betas, &a, &pk_vectors, msg);
    let other_v_sum = other_idx.iter().fold(zero.clone(), |acc, &i| &acc + &vs[i]);
    let v_j = &v - &other_v_sum;
    let z_j = &y_j + &(signer_pair.sk.as_sample_vector() * &v_j);

    vs[signer_idx] = v_j;
    z_hats[signer_idx] = z_j;

    Ok(Signature {
        pks,
        b_hat,
        a,
        z_hats,
        vs,
    })
}

/// A Frameable NDRS protocol instance — the honest operations are identical
/// to [`crate::protocol::Ndrs`]; `key_gen` is overridden and `fake_skey_gen`
/// / `frameably_sign` are added.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameableNdrs {
    params: Params,
}

impl FrameableNdrs {
    pub fn new(rng: &mut dyn RngCore, k: usize, c: usize) -> Self {
        FrameableNdrs {
            params: Params::new(rng, k, c),
        }
    }

    pub fn with_params(params: Params) -> Self {
        FrameableNdrs { params }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn key_gen(&self, rng: &mut dyn RngCore) -> Result<KeyPair> {
        key_gen(rng, &self.params)
    }

    pub fn fake_skey_gen(&self, rng: &mut dyn RngCore, original: &KeyPair) -> Result<(KeyPair, SecretKey)> {
        fake_skey_gen(rng, &self.params, original)
    }

    pub fn frameably_sign(
        &self,
        rng: &mut dyn RngCore,
        signer_pair: &KeyPair,
        others: &[PublicKey],
        msg: &[u8],
        framed_idx: usize,
    ) -> Result<Signature> {
        frameably_sign(rng, &self.params, signer_pair, others, msg, framed_idx)
    }

    pub fn sign(&self, rng: &mut dyn RngCore, signer_pair: &KeyPair, others: &[PublicKey], msg: &[u8]) -> Result<Signature> {
        signer::sign(rng, &self.params, signer_pair, others, msg)
    }

    pub fn verify(&self, msg: &[u8], sig: &Signature) -> bool {
        verifier::verify(&self.params, msg, sig)
    }

    pub fn evidence_gen(&self, rng: &mut dyn RngCore, signer_pair: &KeyPair, msg: &[u8], sig: &Signature) -> Result<Evidence> {
        evidence::evidence_gen(rng, &self.params, signer_pair, msg, sig)
    }

    pub fn evidence_check(&self, claimed_signer_pk: &PublicKey, msg: &[u8], sig: &Signature, evi: &Evidence) -> Result<bool> {
        evidence::evidence_check(&self.params, claimed_signer_pk, msg, sig, evi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn tiny_frameable() -> FrameableNdrs {
        let n = 8;
        let p = 19;
        let m = 5;
        let mut rng = OsRng;
        let zero = RingElement::zero(n, p);
        let mut s = RingElement::random(&mut rng, n, p);
        while s == zero {
            s = RingElement::random(&mut rng, n, p);
        }
        FrameableNdrs::with_params(Params::with_fixed_s(8, 3, n, m, p, s))
    }

    #[test]
    fn key_gen_places_invertible_pivot_at_zero() {
        let scheme = tiny_frameable();
        let mut rng = OsRng;
        for _ in 0..10 {
            let pair = scheme.key_gen(&mut rng).unwrap();
            assert!(pair.sk.as_sample_vector().elements()[0].invertible());
        }
    }

    #[test]
    fn s6_fake_skey_gen_produces_dual_witness_public_key() {
        let scheme = tiny_frameable();
        let mut rng = OsRng;
        let victim = scheme.key_gen(&mut rng).unwrap();

        let (frame_pair, fake_sk) = scheme.fake_skey_gen(&mut rng, &victim).unwrap();

        assert_eq!(
            frame_pair.pk.as_sample_vector().hashing(victim.sk.as_sample_vector()),
            scheme.params().s
        );
        assert_eq!(
            frame_pair.pk.as_sample_vector().hashing(&fake_sk.0),
            scheme.params().s
        );
    }

    #[test]
    fn s7_frameable_sign_binds_evidence_to_innocent_party() {
        let scheme = tiny_frameable();
        let mut rng = OsRng;

        let framed = scheme.key_gen(&mut rng).unwrap();
        let attacker = scheme.key_gen(&mut rng).unwrap();
        let bystander = scheme.key_gen(&mut rng).unwrap();

        let others = vec![framed.pk.clone(), bystander.pk.clone()];
        let framed_idx = others.iter().position(|pk| *pk == framed.pk).unwrap();

        let sig = scheme
            .frameably_sign(&mut rng, &attacker, &others, b"frame me", framed_idx)
            .unwrap();
        assert!(scheme.verify(b"frame me", &sig));

        let evi = scheme.evidence_gen(&mut rng, &framed, b"frame me", &sig).unwrap();
        assert!(scheme.evidence_check(&framed.pk, b"frame me", &sig, &evi).unwrap());
    }
}
