//! Benchmarks for the matrix LWE KEM
//!
//! This benchmark suite measures the performance of:
//! - Matrix multiplication (the O(n^3) hot path)
//! - Noise sampling (Box–Muller vs. constant-time CDT)
//! - Key generation, encapsulation and decapsulation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use synapsed_kem::noise::NoiseSampler;
use synapsed_kem::prelude::*;

fn bench_multiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix_multiply");
    group.sample_size(10);

    for n in [64usize, 160, 320, 640] {
        let mut rng = SeededRng::from_u32(1);
        let a = Matrix::generate_uniform(n, n, 32768, &mut rng).unwrap();
        let b = Matrix::generate_noise(n, n, 2.8, &mut rng).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| black_box(a.multiply(&b).unwrap()));
        });
    }

    group.finish();
}

fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("noise_640x640");
    group.sample_size(10);

    let samplers = [
        ("box_muller", NoiseSampler::box_muller(2.8).unwrap()),
        ("cdt", NoiseSampler::frodo640()),
    ];
    for (name, sampler) in &samplers {
        group.bench_function(*name, |b| {
            let mut rng = SeededRng::from_u32(2);
            b.iter(|| black_box(Matrix::generate_noise_with(640, 640, sampler, &mut rng).unwrap()));
        });
    }

    group.finish();
}

fn bench_kem(c: &mut Criterion) {
    let mut group = c.benchmark_group("kem");
    group.sample_size(10);

    for params in [Params::new(64, 32768, 2.8).unwrap(), Params::FRODO640] {
        let kem = LatticeKem::new(params).unwrap();
        let mut rng = SeededRng::from_u32(3);
        let keypair = kem.key_gen(&mut rng).unwrap();
        let ciphertext = kem.encapsulate(&keypair.public_key, &mut rng).unwrap();

        group.bench_with_input(BenchmarkId::new("key_gen", params.n), &params.n, |b, _| {
            b.iter(|| black_box(kem.key_gen(&mut rng).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("encapsulate", params.n), &params.n, |b, _| {
            b.iter(|| black_box(kem.encapsulate(&keypair.public_key, &mut rng).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("decapsulate", params.n), &params.n, |b, _| {
            b.iter(|| black_box(kem.decapsulate(&ciphertext, &keypair.private_key).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_multiply, bench_noise, bench_kem);
criterion_main!(benches);
