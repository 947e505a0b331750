//! Test-vector generation example
//!
//! This example demonstrates how to:
//! - Run one protocol round with a reproducible seed
//! - Write the keys, ciphertext, randomness and secrets to a directory
//! - Load the directory back and replay it
//!
//! Usage: `cargo run --example generate_vectors -- [output-dir] [seed]`
//! Set `RUST_LOG=debug` to see the stage logs.

use synapsed_kem::prelude::*;
use synapsed_kem::vectors::TestVector;
use tracing_subscriber::EnvFilter;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "output".to_string());
    let seed: u32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(42);

    println!("=== Synapsed KEM: Test Vectors ===\n");

    let kem = LatticeKem::new(Params::TOY)?;
    let mut rng = SeededRng::from_u32(seed);

    println!("1. Generating vector (n = {}, q = {}, seed = {seed})...", kem.params().n, kem.params().q);
    let vector = TestVector::generate(&kem, &mut rng)?;
    println!("   Encapsulation secret: {}", vector.encapsulation_secret.to_hex());
    println!("   Decapsulation secret: {}", vector.decapsulation_secret.to_hex());

    println!("\n2. Saving to {output}/...");
    vector.save(&output)?;

    println!("\n3. Replaying saved vector...");
    let report = TestVector::load(&output, kem.params())?.validate(&kem)?;
    println!("   C1 matches:            {}", report.c1_matches);
    println!("   C2 matches:            {}", report.c2_matches);
    println!("   Encapsulation matches: {}", report.encapsulation_matches);
    println!("   Decapsulation matches: {}", report.decapsulation_matches);

    println!("\nTest vectors validation {}", if report.passed() { "PASSED" } else { "FAILED" });
    Ok(())
}
