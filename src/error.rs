//! Error types for the NDRS scheme.

use thiserror::Error;

/// Errors that can occur in NDRS operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NdrsError {
    /// A signature failed `verify` when `evidence_gen` or `evidence_check`
    /// required it to hold first.
    #[error("signature is invalid")]
    InvalidSignature,

    /// `evidence_check` recomputed a challenge that disagreed with the
    /// submitted one.
    #[error("evidence is invalid")]
    InvalidEvidence,

    /// `RingElement::inverse` was called on a non-unit.
    #[error("ring element is not invertible")]
    NotInvertible,

    /// A rejection-sampling loop exceeded its attempt ceiling.
    #[error("rejection sampling exhausted {attempts} attempts")]
    RetryExhausted {
        /// Number of attempts made before giving up.
        attempts: usize,
    },

    /// Ring elements or sample vectors with mismatched (n, p) or length were
    /// combined at a public API boundary where the caller, not the scheme,
    /// controls those inputs (e.g. a signature assembled from an untrusted
    /// source). Internal code treats mismatches of its own construction as
    /// programmer errors and asserts instead, per the scheme's error design.
    #[error("ring parameters do not match")]
    RingMismatch,

    /// An index passed by the caller (insertion index, framed index, ring
    /// position) was out of bounds.
    #[error("index {index} out of bounds for ring of size {size}")]
    IndexOutOfBounds {
        /// requested index
        index: usize,
        /// ring size
        size: usize,
    },
}

/// Result type for NDRS operations.
pub type Result<T> = core::result::Result<T, NdrsError>;
