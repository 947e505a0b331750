//! Test-vector capture and replay
//!
//! A [`TestVector`] records one protocol run (keys, ciphertext, the
//! encapsulation randomness and both recorded secrets) so it can be written
//! to a directory and replayed later against the same parameters.
//!
//! The encapsulation-side secret is computed with the private key, as
//! `derive(C2 - S^T·C1 mod q)`. Without the private key the encapsulating
//! party has no way to reach the decapsulated matrix (see [`crate::kem`]),
//! so the two recorded secrets check replay consistency rather than KEM
//! agreement.

use crate::codec::{load_matrix_in_range, load_secret, save_matrix, save_secret};
use crate::derive::{derive, SharedSecret};
use crate::error::Result;
use crate::kem::{Ciphertext, EncapsulationRandomness, KeyPair, LatticeKem};
use crate::params::Params;
use crate::traits::RandomSource;
use std::fs;
use std::path::Path;

const PUBLIC_KEY_FILE: &str = "public_key.txt";
const PRIVATE_KEY_FILE: &str = "private_key.txt";
const C1_FILE: &str = "ciphertext_C1.txt";
const C2_FILE: &str = "ciphertext_C2.txt";
const A_FILE: &str = "random_A.txt";
const R_FILE: &str = "random_r.txt";
const E1_FILE: &str = "random_e1.txt";
const E2_FILE: &str = "random_e2.txt";
const ENCAPSULATION_SECRET_FILE: &str = "shared_secret_encapsulation.txt";
const DECAPSULATION_SECRET_FILE: &str = "shared_secret_decapsulation.txt";
const RESULT_FILE: &str = "test_result.txt";

const ENCAPSULATION_LABEL: &str = "Shared Secret (Encapsulation)";
const DECAPSULATION_LABEL: &str = "Shared Secret (Decapsulation)";

/// One recorded protocol run
#[derive(Debug, Clone)]
pub struct TestVector {
    /// Key pair used
    pub keypair: KeyPair,
    /// Ciphertext produced
    pub ciphertext: Ciphertext,
    /// Randomness drawn during encapsulation
    pub randomness: EncapsulationRandomness,
    /// Secret recorded on the encapsulation side
    pub encapsulation_secret: SharedSecret,
    /// Secret recovered by decapsulation
    pub decapsulation_secret: SharedSecret,
}

/// Outcome of replaying a [`TestVector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationReport {
    /// Recomputed C1 equals the recorded one
    pub c1_matches: bool,
    /// Recomputed C2 equals the recorded one
    pub c2_matches: bool,
    /// Recorded encapsulation secret equals the recomputed secret
    pub encapsulation_matches: bool,
    /// Recorded decapsulation secret equals the recomputed secret
    pub decapsulation_matches: bool,
}

impl ValidationReport {
    /// Every check succeeded
    pub fn passed(&self) -> bool {
        self.c1_matches && self.c2_matches && self.encapsulation_matches && self.decapsulation_matches
    }
}

impl TestVector {
    /// Run key generation, encapsulation and decapsulation and record them
    pub fn generate<R: RandomSource + ?Sized>(kem: &LatticeKem, rng: &mut R) -> Result<Self> {
        let keypair = kem.key_gen(rng)?;
        let (ciphertext, randomness) = kem.encapsulate_traced(&keypair.public_key, rng)?;
        let encapsulation_secret = derive(&kem.shared_matrix(&ciphertext, &keypair.private_key)?);
        let decapsulation_secret = kem.decapsulate(&ciphertext, &keypair.private_key)?;

        Ok(Self {
            keypair,
            ciphertext,
            randomness,
            encapsulation_secret,
            decapsulation_secret,
        })
    }

    /// Whether the two recorded secrets agree
    pub fn secrets_agree(&self) -> bool {
        self.encapsulation_secret == self.decapsulation_secret
    }

    /// Write every component into `dir`, creating it if needed
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        save_matrix(dir.join(PUBLIC_KEY_FILE), &self.keypair.public_key)?;
        save_matrix(dir.join(PRIVATE_KEY_FILE), &self.keypair.private_key)?;
        save_matrix(dir.join(C1_FILE), self.ciphertext.c1())?;
        save_matrix(dir.join(C2_FILE), self.ciphertext.c2())?;
        save_matrix(dir.join(A_FILE), &self.randomness.a)?;
        save_matrix(dir.join(R_FILE), &self.randomness.r)?;
        save_matrix(dir.join(E1_FILE), &self.randomness.e1)?;
        save_matrix(dir.join(E2_FILE), &self.randomness.e2)?;
        save_secret(
            dir.join(ENCAPSULATION_SECRET_FILE),
            ENCAPSULATION_LABEL,
            &self.encapsulation_secret,
        )?;
        save_secret(
            dir.join(DECAPSULATION_SECRET_FILE),
            DECAPSULATION_LABEL,
            &self.decapsulation_secret,
        )?;

        let verdict = if self.secrets_agree() { "PASSED" } else { "FAILED" };
        fs::write(dir.join(RESULT_FILE), format!("Test {verdict}\n"))?;

        tracing::info!(dir = %dir.display(), "saved test vector");
        Ok(())
    }

    /// Load a vector of `n x n` matrices from `dir`.
    ///
    /// The public key, both ciphertext halves and A must already be reduced
    /// into `[0, q)`. Noise matrices may be signed and must lie in `(-q, q)`.
    pub fn load(dir: impl AsRef<Path>, params: &Params) -> Result<Self> {
        let dir = dir.as_ref();
        let (n, q) = (params.n, params.q);
        // residues for pk, C1, C2 and A; signed noise for S, r, e1, e2
        let reduced = |name: &str| load_matrix_in_range(dir.join(name), n, n, 0..q);
        let noise = |name: &str| load_matrix_in_range(dir.join(name), n, n, (1 - q)..q);

        let keypair = KeyPair {
            public_key: reduced(PUBLIC_KEY_FILE)?,
            private_key: noise(PRIVATE_KEY_FILE)?,
        };
        let ciphertext = Ciphertext::new(reduced(C1_FILE)?, reduced(C2_FILE)?)?;
        let randomness = EncapsulationRandomness {
            a: reduced(A_FILE)?,
            r: noise(R_FILE)?,
            e1: noise(E1_FILE)?,
            e2: noise(E2_FILE)?,
        };
        let (_, encapsulation_secret) = load_secret(dir.join(ENCAPSULATION_SECRET_FILE))?;
        let (_, decapsulation_secret) = load_secret(dir.join(DECAPSULATION_SECRET_FILE))?;

        Ok(Self {
            keypair,
            ciphertext,
            randomness,
            encapsulation_secret,
            decapsulation_secret,
        })
    }

    /// Recompute the ciphertext and secret and compare with the recorded values
    pub fn validate(&self, kem: &LatticeKem) -> Result<ValidationReport> {
        let recomputed = kem.encapsulate_from_matrices(
            &self.keypair.public_key,
            &self.randomness.a,
            &self.randomness.r,
            &self.randomness.e1,
            &self.randomness.e2,
        )?;
        let secret = kem.decapsulate(&self.ciphertext, &self.keypair.private_key)?;

        let report = ValidationReport {
            c1_matches: recomputed.c1().equals(self.ciphertext.c1()),
            c2_matches: recomputed.c2().equals(self.ciphertext.c2()),
            encapsulation_matches: secret == self.encapsulation_secret,
            decapsulation_matches: secret == self.decapsulation_secret,
        };

        if report.passed() {
            tracing::debug!("test vector validated");
        } else {
            tracing::warn!(
                c1 = report.c1_matches,
                c2 = report.c2_matches,
                encapsulation = report.encapsulation_matches,
                decapsulation = report.decapsulation_matches,
                "test vector mismatch"
            );
        }
        Ok(report)
    }
}
