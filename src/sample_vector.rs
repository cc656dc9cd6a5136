//! Sample vectors: fixed-length ordered tuples of [`RingElement`]s.
//!
//! A [`SampleVector`] is what the scheme calls a public key, secret key, or
//! ephemeral commitment — m ring elements sharing the same (n, p), combined
//! element-wise or reduced to a single ring element via an inner product
//! ("hashing" in this scheme's terminology, despite producing a ring
//! element rather than a digest).

use core::ops::{Add, Mul, Sub};

use rand_core::RngCore;
use zeroize::Zeroize;

use crate::error::Result;
use crate::ring_element::RingElement;

/// An ordered tuple of `m` ring elements sharing (n, p).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleVector {
    elements: Vec<RingElement>,
}

impl SampleVector {
    pub fn new(elements: Vec<RingElement>) -> Self {
        assert!(!elements.is_empty(), "sample vector must be non-empty");
        let (n, p) = (elements[0].n(), elements[0].p());
        for e in &elements {
            assert_eq!(e.n(), n, "sample vector element degree mismatch");
            assert_eq!(e.p(), p, "sample vector element modulus mismatch");
        }
        SampleVector { elements }
    }

    pub fn zero(n: usize, p: u64, m: usize) -> Self {
        SampleVector::new((0..m).map(|_| RingElement::zero(n, p)).collect())
    }

    pub fn random(rng: &mut dyn RngCore, n: usize, p: u64, m: usize) -> Self {
        SampleVector::new((0..m).map(|_| RingElement::random(rng, n, p)).collect())
    }

    /// As [`SampleVector::random`] but with signed-ternary coefficients
    /// (range D_s), used to sample secret keys.
    pub fn random_ternary(rng: &mut dyn RngCore, n: usize, p: u64, m: usize) -> Self {
        SampleVector::new((0..m).map(|_| RingElement::random_ternary(rng, n, p)).collect())
    }

    /// As [`SampleVector::random`] but with coefficients centered in
    /// `[-bound, bound]` (range D_y or D_z), used by `Sign` and
    /// `EvidenceGen`'s rejection-sampling loops.
    pub fn random_in_range(rng: &mut dyn RngCore, n: usize, p: u64, m: usize, bound: i128) -> Self {
        SampleVector::new((0..m).map(|_| RingElement::random_in_range(rng, n, p, bound)).collect())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn n(&self) -> usize {
        self.elements[0].n()
    }

    pub fn p(&self) -> u64 {
        self.elements[0].p()
    }

    pub fn elements(&self) -> &[RingElement] {
        &self.elements
    }

    fn assert_compatible(&self, other: &SampleVector) {
        assert_eq!(self.len(), other.len(), "sample vector length mismatch");
    }

    /// Inner product Σ self_i * other_i, collapsing to a single ring element.
    pub fn hashing(&self, other: &SampleVector) -> RingElement {
        self.assert_compatible(other);
        self.elements
            .iter()
            .zip(other.elements.iter())
            .map(|(a, b)| a * b)
            .fold(RingElement::zero(self.n(), self.p()), |acc, x| &acc + &x)
    }

    /// Element-wise sum of `Σ pks` — every vector must share (n, p) and m.
    pub fn sum(vectors: &[SampleVector]) -> SampleVector {
        assert!(!vectors.is_empty(), "sum of empty vector list");
        let mut acc = vectors[0].clone();
        for v in &vectors[1..] {
            acc = &acc + v;
        }
        acc
    }

    /// `bound <= coeff <= bound` for every coefficient of every element.
    pub fn all_coeffs_in_symmetric_range(&self, bound: i128) -> bool {
        self.elements
            .iter()
            .all(|e| e.all_coeffs_in_symmetric_range(bound))
    }

    /// Broadcasts division by a ring-element scalar across every entry,
    /// i.e. `self * scalar.inverse()`. Used by the Frameable variant's
    /// commitment construction, the one place this scheme divides a sample
    /// vector by a scalar.
    pub fn div_scalar(&self, scalar: &RingElement) -> Result<SampleVector> {
        let inverse = scalar.inverse()?;
        Ok(self * &inverse)
    }
}

impl Zeroize for SampleVector {
    fn zeroize(&mut self) {
        for e in self.elements.iter_mut() {
            e.zeroize();
        }
    }
}

impl Add for &SampleVector {
    type Output = SampleVector;
    fn add(self, rhs: Self) -> SampleVector {
        self.assert_compatible(rhs);
        SampleVector::new(
            self.elements
                .iter()
                .zip(rhs.elements.iter())
                .map(|(a, b)| a + b)
                .collect(),
        )
    }
}

impl Sub for &SampleVector {
    type Output = SampleVector;
    fn sub(self, rhs: Self) -> SampleVector {
        self.assert_compatible(rhs);
        SampleVector::new(
            self.elements
                .iter()
                .zip(rhs.elements.iter())
                .map(|(a, b)| a - b)
                .collect(),
        )
    }
}

/// Broadcasts a ring-element scalar across every entry of the vector. This
/// is the operation `lsum(pks) * scalar` relies on when H2/H3 fold a summed
/// public key vector against a challenge scalar (see `hash` module docs).
impl Mul<&RingElement> for &SampleVector {
    type Output = SampleVector;
    fn mul(self, rhs: &RingElement) -> SampleVector {
        SampleVector::new(self.elements.iter().map(|e| e * rhs).collect())
    }
}
