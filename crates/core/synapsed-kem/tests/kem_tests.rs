//! End-to-end tests for the matrix LWE KEM

use std::sync::Arc;
use synapsed_kem::derive::derive;
use synapsed_kem::kem::EncapsulationRandomness;
use synapsed_kem::noise::NoiseSampler;
use synapsed_kem::observability::KemObservability;
use synapsed_kem::prelude::*;
use synapsed_kem::random::RngWrapper;

const SEED: u32 = 0x5EED;

#[test]
fn test_toy_scenario_end_to_end() {
    let kem = LatticeKem::new(Params::TOY).unwrap();
    let mut rng = SeededRng::from_u32(SEED);

    let keypair = kem.key_gen(&mut rng).unwrap();
    assert_eq!(keypair.public_key.dims(), (2, 2));
    assert!(keypair.public_key.entries().iter().all(|&x| (0..97).contains(&x)));

    let ciphertext = kem.encapsulate(&keypair.public_key, &mut rng).unwrap();
    assert!(ciphertext.c1().entries().iter().all(|&x| (0..97).contains(&x)));
    assert!(ciphertext.c2().entries().iter().all(|&x| (0..97).contains(&x)));

    let secret = kem.decapsulate(&ciphertext, &keypair.private_key).unwrap();
    assert_eq!(secret.as_bytes().len(), 32);

    // Recompute C2 - S^T·C1 mod 97 by hand
    let s = &keypair.private_key;
    let c1 = ciphertext.c1();
    let c2 = ciphertext.c2();
    let mut shared = Matrix::zeros(2, 2);
    for i in 0..2 {
        for j in 0..2 {
            let mut acc = 0i64;
            for k in 0..2 {
                acc += s[(k, i)] * c1[(k, j)];
            }
            let derived = acc.rem_euclid(97);
            shared.set(i, j, (c2[(i, j)] - derived).rem_euclid(97)).unwrap();
        }
    }
    assert_eq!(secret, derive(&shared));
}

#[test]
fn test_same_seed_same_run() {
    let run = || {
        let kem = LatticeKem::new(Params::TOY).unwrap();
        let mut rng = SeededRng::from_u32(SEED);
        let keypair = kem.key_gen(&mut rng).unwrap();
        let ciphertext = kem.encapsulate(&keypair.public_key, &mut rng).unwrap();
        let secret = kem.decapsulate(&ciphertext, &keypair.private_key).unwrap();
        (keypair.public_key.clone(), ciphertext, secret)
    };
    assert_eq!(run(), run());
}

#[test]
fn test_different_seeds_diverge() {
    let kem = LatticeKem::new(Params::TOY).unwrap();
    let a = kem.key_gen(&mut SeededRng::from_u32(1)).unwrap();
    let b = kem.key_gen(&mut SeededRng::from_u32(2)).unwrap();
    assert_ne!(a.public_key, b.public_key);
}

#[test]
fn test_fresh_public_matrix_per_encapsulation() {
    let kem = LatticeKem::new(Params::new(4, 97, 1.0).unwrap()).unwrap();
    let mut rng = SeededRng::from_u32(SEED);
    let keypair = kem.key_gen(&mut rng).unwrap();
    let (_, first) = kem.encapsulate_traced(&keypair.public_key, &mut rng).unwrap();
    let (_, second) = kem.encapsulate_traced(&keypair.public_key, &mut rng).unwrap();
    assert_ne!(first.a, second.a);
}

#[test]
fn test_symmetric_public_matrix_case() {
    // A = A' = I and no noise: C2 - S^T·C1 = S·r - S^T·r, zero for symmetric S
    let kem = LatticeKem::new(Params::TOY).unwrap();
    let a = Matrix::identity(2);
    let s = Matrix::from_rows(vec![vec![1, 2], vec![2, -1]]).unwrap();
    let zero = Matrix::zeros(2, 2);
    let keypair = kem.key_gen_from_matrices(&a, &s, &zero).unwrap();

    let r = Matrix::from_rows(vec![vec![0, 1], vec![-1, 1]]).unwrap();
    let ct = kem
        .encapsulate_from_matrices(&keypair.public_key, &a, &r, &zero, &zero)
        .unwrap();
    let shared = kem.shared_matrix(&ct, &keypair.private_key).unwrap();
    assert_eq!(shared, Matrix::zeros(2, 2));
}

#[test]
fn test_rand_core_generator_drives_kem() {
    use rand::SeedableRng;
    let kem = LatticeKem::new(Params::TOY).unwrap();
    let mut rng = RngWrapper::new(rand_chacha::ChaCha20Rng::seed_from_u64(9));
    let keypair = kem.key_gen(&mut rng).unwrap();
    let ciphertext = kem.encapsulate(&keypair.public_key, &mut rng).unwrap();
    assert!(kem.decapsulate(&ciphertext, &keypair.private_key).is_ok());
}

#[test]
fn test_os_entropy_key_gen() {
    let kem = LatticeKem::new(Params::new(8, 32768, 2.8).unwrap()).unwrap();
    let keypair = kem.key_gen(&mut OsRandom::new()).unwrap();
    assert!(keypair.public_key.is_reduced(32768));
}

#[test]
fn test_cdt_noise_matrix() {
    let mut rng = SeededRng::from_u32(SEED);
    let sampler = NoiseSampler::frodo640();
    let m = Matrix::generate_noise_with(16, 16, &sampler, &mut rng).unwrap();
    assert!(m.entries().iter().all(|x| x.abs() <= 12));
}

#[test]
fn test_session_agrees_with_direct_calls() {
    let kem = LatticeKem::new(Params::TOY).unwrap();

    let mut rng = SeededRng::from_u32(SEED);
    let direct = {
        let keypair = kem.key_gen(&mut rng).unwrap();
        let ct = kem.encapsulate(&keypair.public_key, &mut rng).unwrap();
        kem.decapsulate(&ct, &keypair.private_key).unwrap()
    };

    let mut rng = SeededRng::from_u32(SEED);
    let via_session = Session::new(kem)
        .key_gen(&mut rng)
        .unwrap()
        .encapsulate(&mut rng)
        .unwrap()
        .decapsulate()
        .unwrap()
        .into_shared_secret();

    assert_eq!(direct, via_session);
}

#[test]
fn test_observability_counts_full_run() {
    let obs = Arc::new(KemObservability::new("integration"));
    let kem = LatticeKem::new(Params::TOY).unwrap().with_observability(obs.clone());
    let mut rng = SeededRng::from_u32(SEED);
    for _ in 0..3 {
        let keypair = kem.key_gen(&mut rng).unwrap();
        let ct = kem.encapsulate(&keypair.public_key, &mut rng).unwrap();
        kem.decapsulate(&ct, &keypair.private_key).unwrap();
    }
    let metrics = obs.get_metrics();
    assert_eq!(metrics.total_operations, 9);
    assert_eq!(metrics.key_generations, 3);
    assert_eq!(metrics.failed_operations, 0);
}

#[test]
fn test_traced_randomness_is_redacted_in_debug() {
    let kem = LatticeKem::new(Params::TOY).unwrap();
    let mut rng = SeededRng::from_u32(SEED);
    let keypair = kem.key_gen(&mut rng).unwrap();
    let (_, randomness): (_, EncapsulationRandomness) =
        kem.encapsulate_traced(&keypair.public_key, &mut rng).unwrap();
    let dbg = format!("{randomness:?}");
    assert!(dbg.contains("REDACTED"));
}
