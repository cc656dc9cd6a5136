// Copyright (c) 2024 Botho Foundation

//! Benchmarks for the NDRS ring signature scheme.
//!
//! Run with: cargo bench -p ndrs
//!
//! These benchmarks measure the performance of:
//! - Parameter derivation (the prime search `Params::new` performs)
//! - Key generation
//! - Ring signing (rejection-sampling loop) across ring sizes
//! - Verification
//! - Evidence generation and checking

use ndrs::protocol::Ndrs;
use ndrs::{KeyPair, Params, PublicKey};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::OsRng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Tiny fixed parameters (spec scenario S1) — keeps the benchmark suite fast
/// to run while still exercising every operation's real code path.
fn tiny_ndrs() -> Ndrs {
    let n = 8;
    let p = 19;
    let m = 5;
    let mut rng = OsRng;
    let zero = ndrs::RingElement::zero(n, p);
    let mut s = ndrs::RingElement::random(&mut rng, n, p);
    while s == zero {
        s = ndrs::RingElement::random(&mut rng, n, p);
    }
    Ndrs::with_params(Params::with_fixed_s(8, 3, n, m, p, s))
}

struct BenchFixtures {
    scheme: Ndrs,
    signer: KeyPair,
    ring: Vec<PublicKey>,
    message: Vec<u8>,
}

impl BenchFixtures {
    fn new(ring_size: usize) -> Self {
        let scheme = tiny_ndrs();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let signer = scheme.key_gen(&mut rng).expect("key_gen should succeed");
        let ring: Vec<PublicKey> = (0..ring_size)
            .map(|_| scheme.key_gen(&mut rng).expect("key_gen should succeed").pk)
            .collect();

        Self {
            scheme,
            signer,
            ring,
            message: b"benchmark message for ring signature".to_vec(),
        }
    }
}

fn bench_params_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("NDRS params");

    for k in [8usize, 16, 32].iter() {
        group.bench_with_input(BenchmarkId::new("derive", k), k, |b, &k| {
            let mut rng = ChaCha20Rng::seed_from_u64(7);
            b.iter(|| black_box(Params::new(&mut rng, k, 3)))
        });
    }

    group.finish();
}

fn bench_keygen(c: &mut Criterion) {
    let scheme = tiny_ndrs();
    let mut rng = ChaCha20Rng::seed_from_u64(123);

    c.bench_function("NDRS keygen", |b| {
        b.iter(|| black_box(scheme.key_gen(&mut rng).expect("key_gen should succeed")))
    });
}

fn bench_sign(c: &mut Criterion) {
    let mut group = c.benchmark_group("NDRS sign");

    for ring_size in [1usize, 4, 8].iter() {
        let fixtures = BenchFixtures::new(*ring_size);
        let mut rng = ChaCha20Rng::seed_from_u64(999);

        group.bench_with_input(BenchmarkId::new("ring size", ring_size), ring_size, |b, _| {
            b.iter(|| {
                black_box(
                    fixtures
                        .scheme
                        .sign(&mut rng, &fixtures.signer, &fixtures.ring, &fixtures.message)
                        .expect("signing should succeed"),
                )
            })
        });
    }

    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let fixtures = BenchFixtures::new(4);
    let mut rng = ChaCha20Rng::seed_from_u64(555);
    let sig = fixtures
        .scheme
        .sign(&mut rng, &fixtures.signer, &fixtures.ring, &fixtures.message)
        .expect("signing should succeed");

    c.bench_function("NDRS verify", |b| {
        b.iter(|| black_box(fixtures.scheme.verify(&fixtures.message, &sig)))
    });
}

fn bench_evidence(c: &mut Criterion) {
    let fixtures = BenchFixtures::new(4);
    let mut rng = ChaCha20Rng::seed_from_u64(321);
    let sig = fixtures
        .scheme
        .sign(&mut rng, &fixtures.signer, &fixtures.ring, &fixtures.message)
        .expect("signing should succeed");

    let mut group = c.benchmark_group("NDRS evidence");

    group.bench_function("evidence_gen", |b| {
        b.iter(|| {
            black_box(
                fixtures
                    .scheme
                    .evidence_gen(&mut rng, &fixtures.signer, &fixtures.message, &sig)
                    .expect("evidence_gen should succeed"),
            )
        })
    });

    let evidence = fixtures
        .scheme
        .evidence_gen(&mut rng, &fixtures.signer, &fixtures.message, &sig)
        .expect("evidence_gen should succeed");

    group.bench_function("evidence_check", |b| {
        b.iter(|| {
            black_box(
                fixtures
                    .scheme
                    .evidence_check(&fixtures.signer.pk, &fixtures.message, &sig, &evidence)
                    .expect("evidence_check should not error"),
            )
        })
    });

    group.finish();
}

fn bench_full_cycle(c: &mut Criterion) {
    let fixtures = BenchFixtures::new(4);
    let mut rng = ChaCha20Rng::seed_from_u64(777);

    c.bench_function("NDRS sign+verify cycle", |b| {
        b.iter(|| {
            let sig = fixtures
                .scheme
                .sign(&mut rng, &fixtures.signer, &fixtures.ring, &fixtures.message)
                .expect("signing should succeed");
            black_box(fixtures.scheme.verify(&fixtures.message, &sig))
        })
    });
}

criterion_group!(
    benches,
    bench_params_derivation,
    bench_keygen,
    bench_sign,
    bench_verify,
    bench_evidence,
    bench_full_cycle,
);

criterion_main!(benches);
