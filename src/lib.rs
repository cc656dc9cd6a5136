// Copyright (c) 2024 Botho Foundation

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

//! NDRS: a Non-interactive Deniable Ring Signature scheme.
//!
//! NDRS is a lattice-based ring signature scheme in which a member of an
//! ad-hoc ring of public keys can sign a message so that a verifier is
//! convinced *some* ring member signed, the signer remains anonymous among
//! the ring, and the true signer can later produce cryptographic evidence
//! proving they signed — without any other ring member being able to forge
//! such evidence for the same signature.
//!
//! # Overview
//!
//! The scheme is built from two layers:
//!
//! - [`ring_element`]: arithmetic over the quotient ring `R_p = Z_p[x]/(x^n + 1)`
//!   — addition, multiplication, inversion, and uniform sampling.
//! - [`sample_vector`]: fixed-length tuples of ring elements (public keys,
//!   secret keys, and the ephemeral commitment `b_hat` are all sample
//!   vectors), plus their inner-product "hashing" operation.
//!
//! [`params::Params`] derives every scheme constant from a security
//! parameter `k`; [`protocol::Ndrs`] ties parameter derivation, key
//! generation, signing, verification, and evidence into one protocol
//! instance. [`frameable::FrameableNdrs`] is a variant that demonstrates an
//! attack: a colluding key pair can construct a signature later
//! attributable to an innocent ring member.
//!
//! # Example
//!
//! ```rust
//! use ndrs::protocol::Ndrs;
//! use rand::rngs::OsRng;
//!
//! let mut rng = OsRng;
//! let scheme = Ndrs::new(&mut rng, 8, 3);
//!
//! let alice = scheme.key_gen(&mut rng).expect("key_gen should succeed");
//! let bob = scheme.key_gen(&mut rng).expect("key_gen should succeed");
//!
//! let sig = scheme
//!     .sign(&mut rng, &alice, &[bob.pk.clone()], b"transfer 100 credits")
//!     .expect("signing should succeed");
//! assert!(scheme.verify(b"transfer 100 credits", &sig));
//!
//! // Alice can later prove she signed...
//! let evidence = scheme
//!     .evidence_gen(&mut rng, &alice, b"transfer 100 credits", &sig)
//!     .expect("evidence_gen should succeed for the true signer");
//! assert!(scheme
//!     .evidence_check(&alice.pk, b"transfer 100 credits", &sig, &evidence)
//!     .expect("evidence_check should not error for the true signer"));
//!
//! // ...but Bob cannot produce evidence binding himself to Alice's signature.
//! let bobs_evidence = scheme
//!     .evidence_gen(&mut rng, &bob, b"transfer 100 credits", &sig)
//!     .expect("evidence_gen only fails if verify() itself fails");
//! assert!(!scheme
//!     .evidence_check(&bob.pk, b"transfer 100 credits", &sig, &bobs_evidence)
//!     .expect("evidence_check should not error for a non-signer"));
//! ```
//!
//! # Scope
//!
//! This crate is the in-process protocol core only: parameter derivation,
//! ring arithmetic, and the five NDRS operations. A command-line shell,
//! example drivers, and wire serialization are out of scope — callers
//! consume and produce in-memory algebraic objects directly.
//!
//! # Non-goals
//!
//! Arithmetic here is not constant-time; secret-dependent branches
//! (invertibility checks, rejection loops) leak timing and a production
//! deployment facing an adversary with timing access should address this
//! before use. Randomness is drawn from a caller-supplied `RngCore`, with no
//! mandated source beyond "cryptographically strong".

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod error;
pub mod frameable;
pub mod hash;
pub mod keys;
pub mod params;
pub mod protocol;
pub mod ring_element;
pub mod sample_vector;

pub use error::{NdrsError, Result};
pub use frameable::FrameableNdrs;
pub use keys::{KeyPair, PublicKey, SecretKey};
pub use params::Params;
pub use protocol::{Evidence, Ndrs, Signature};
pub use ring_element::RingElement;
pub use sample_vector::SampleVector;
