//! Matrix LWE key encapsulation
//!
//! Key generation, encapsulation and decapsulation over square `n x n`
//! matrices modulo `q`:
//!
//! ```text
//! KeyGen:       B  = A·S + E            (mod q)   pk = B, sk = S
//! Encapsulate:  C1 = A'·r + e1          (mod q)
//!               C2 = B·r + e2           (mod q)
//! Decapsulate:  K  = C2 - (S^T·C1 mod q) (mod q)  -> derive(K)
//! ```
//!
//! ## Correctness caveat
//!
//! `A'` is drawn fresh during encapsulation and is unrelated to the `A`
//! used at key generation, and the scheme has no rounding/reconciliation
//! step. The encapsulating party therefore cannot compute the decapsulated
//! matrix on its own; the two sides only agree when the decapsulation-side
//! computation is replayed (see [`LatticeKem::shared_matrix`] and
//! [`crate::vectors`]). Treat this module as an arithmetic reference, not
//! as a secure KEM.

use crate::derive::{derive, SharedSecret};
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::observability::{KemEvent, KemObservability};
use crate::params::Params;
use crate::traits::RandomSource;
use core::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use zeroize::Zeroize;

/// Public/private key pair. The private key is wiped on drop.
#[derive(Clone)]
pub struct KeyPair {
    /// Public matrix B = A·S + E mod q
    pub public_key: Matrix,
    /// Secret noise matrix S
    pub private_key: Matrix,
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key.dims())
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Ciphertext produced by one encapsulation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    c1: Matrix,
    c2: Matrix,
}

impl Ciphertext {
    /// Assemble a ciphertext from its two components
    pub fn new(c1: Matrix, c2: Matrix) -> Result<Self> {
        if c1.dims() != c2.dims() {
            return Err(Error::dimension_mismatch("ciphertext", c1.dims(), c2.dims()));
        }
        Ok(Self { c1, c2 })
    }

    /// First component, A'·r + e1 mod q
    pub fn c1(&self) -> &Matrix {
        &self.c1
    }

    /// Second component, B·r + e2 mod q
    pub fn c2(&self) -> &Matrix {
        &self.c2
    }
}

/// Randomness drawn during one encapsulation, retained for test vectors
#[derive(Clone)]
pub struct EncapsulationRandomness {
    /// Fresh uniform matrix A'
    pub a: Matrix,
    /// Ephemeral secret r
    pub r: Matrix,
    /// Error added to C1
    pub e1: Matrix,
    /// Error added to C2
    pub e2: Matrix,
}

impl Drop for EncapsulationRandomness {
    fn drop(&mut self) {
        self.r.zeroize();
        self.e1.zeroize();
        self.e2.zeroize();
    }
}

impl fmt::Debug for EncapsulationRandomness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncapsulationRandomness")
            .field("a", &self.a.dims())
            .field("r", &"[REDACTED]")
            .field("e1", &"[REDACTED]")
            .field("e2", &"[REDACTED]")
            .finish()
    }
}

/// KEM instance bound to one parameter set
#[derive(Debug, Clone)]
pub struct LatticeKem {
    params: Params,
    observability: Option<Arc<KemObservability>>,
}

impl LatticeKem {
    /// Create a KEM for validated parameters
    pub fn new(params: Params) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            observability: None,
        })
    }

    /// Attach a metrics context
    pub fn with_observability(mut self, observability: Arc<KemObservability>) -> Self {
        self.observability = Some(observability);
        self
    }

    /// Parameters in use
    pub fn params(&self) -> &Params {
        &self.params
    }

    fn observed<T>(
        &self,
        operation: &str,
        event: impl FnOnce(Duration) -> KemEvent,
        f: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let start = Instant::now();
        let result = f();
        if let Some(obs) = &self.observability {
            match &result {
                Ok(_) => obs.record_operation(event(start.elapsed())),
                Err(e) => obs.start_operation(operation).failed(e.to_string()),
            }
        }
        if let Err(e) = &result {
            tracing::debug!(%operation, error = %e, "KEM stage failed");
        }
        result
    }

    fn square_check(&self, m: &Matrix, op: &'static str) -> Result<()> {
        let n = self.params.n;
        if m.dims() != (n, n) {
            return Err(Error::dimension_mismatch(op, m.dims(), (n, n)));
        }
        Ok(())
    }

    /// Generate a key pair.
    ///
    /// Draws A (uniform), then S and E (noise), in that order. A is not
    /// retained.
    pub fn key_gen<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<KeyPair> {
        let n = self.params.n;
        self.observed(
            "key_gen",
            |duration| KemEvent::KeyGenCompleted { n, duration },
            || {
                tracing::debug!(n, q = self.params.q, sigma = self.params.sigma, "generating key pair");
                let a = Matrix::generate_uniform(n, n, self.params.q, rng)?;
                let mut s = Matrix::generate_noise(n, n, self.params.sigma, rng)?;
                let mut e = Matrix::generate_noise(n, n, self.params.sigma, rng)?;
                let keypair = self.key_gen_from_matrices(&a, &s, &e);
                s.zeroize();
                e.zeroize();
                keypair
            },
        )
    }

    /// Build a key pair from caller-supplied A, S and E
    pub fn key_gen_from_matrices(&self, a: &Matrix, s: &Matrix, e: &Matrix) -> Result<KeyPair> {
        let public_key = a.multiply(s)?.add(e)?.mod_reduce(self.params.q)?;
        Ok(KeyPair {
            public_key,
            private_key: s.clone(),
        })
    }

    /// Encapsulate against a public key
    pub fn encapsulate<R: RandomSource + ?Sized>(
        &self,
        public_key: &Matrix,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        self.encapsulate_traced(public_key, rng).map(|(ct, _)| ct)
    }

    /// Encapsulate and also return the randomness that was drawn.
    ///
    /// Draws A' (uniform), then r, e1, e2 (noise), in that order.
    pub fn encapsulate_traced<R: RandomSource + ?Sized>(
        &self,
        public_key: &Matrix,
        rng: &mut R,
    ) -> Result<(Ciphertext, EncapsulationRandomness)> {
        let n = self.params.n;
        self.observed(
            "encapsulate",
            |duration| KemEvent::EncapsulationCompleted { n, duration },
            || {
                self.square_check(public_key, "encapsulate")?;
                tracing::debug!(n, q = self.params.q, "encapsulating");
                let randomness = EncapsulationRandomness {
                    a: Matrix::generate_uniform(n, n, self.params.q, rng)?,
                    r: Matrix::generate_noise(n, n, self.params.sigma, rng)?,
                    e1: Matrix::generate_noise(n, n, self.params.sigma, rng)?,
                    e2: Matrix::generate_noise(n, n, self.params.sigma, rng)?,
                };
                let ct = self.encapsulate_from_matrices(
                    public_key,
                    &randomness.a,
                    &randomness.r,
                    &randomness.e1,
                    &randomness.e2,
                )?;
                Ok((ct, randomness))
            },
        )
    }

    /// Compute a ciphertext from caller-supplied A', r, e1 and e2
    pub fn encapsulate_from_matrices(
        &self,
        public_key: &Matrix,
        a: &Matrix,
        r: &Matrix,
        e1: &Matrix,
        e2: &Matrix,
    ) -> Result<Ciphertext> {
        let q = self.params.q;
        let c1 = a.multiply(r)?.add(e1)?.mod_reduce(q)?;
        let c2 = public_key.multiply(r)?.add(e2)?.mod_reduce(q)?;
        Ciphertext::new(c1, c2)
    }

    /// Recover the shared matrix C2 - (S^T·C1 mod q) mod q
    pub fn shared_matrix(&self, ciphertext: &Ciphertext, private_key: &Matrix) -> Result<Matrix> {
        self.square_check(private_key, "decapsulate")?;
        self.square_check(ciphertext.c1(), "decapsulate")?;
        self.square_check(ciphertext.c2(), "decapsulate")?;
        let q = self.params.q;
        let derived = private_key
            .transpose()
            .multiply(ciphertext.c1())?
            .mod_reduce(q)?;
        ciphertext.c2().subtract(&derived)?.mod_reduce(q)
    }

    /// Decapsulate a ciphertext into the shared secret
    pub fn decapsulate(&self, ciphertext: &Ciphertext, private_key: &Matrix) -> Result<SharedSecret> {
        let n = self.params.n;
        self.observed(
            "decapsulate",
            |duration| KemEvent::DecapsulationCompleted { n, duration },
            || {
                tracing::debug!(dims = ?ciphertext.c1().dims(), q = self.params.q, "decapsulating");
                let mut shared = self.shared_matrix(ciphertext, private_key)?;
                let secret = derive(&shared);
                shared.zeroize();
                Ok(secret)
            },
        )
    }
}
