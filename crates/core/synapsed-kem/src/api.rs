//! High-level API
//!
//! Free functions over the reference parameter set
//! ([`Params::FRODO640`]). Use [`kem_for`] for any other parameters.
//!
//! ## Example
//! ```no_run
//! use synapsed_kem::api::*;
//! use synapsed_kem::random::OsRandom;
//!
//! let mut rng = OsRandom::new();
//! let keypair = key_gen(&mut rng)?;
//! let ciphertext = encapsulate(&keypair.public_key, &mut rng)?;
//! let secret = decapsulate(&ciphertext, &keypair.private_key)?;
//! assert_eq!(secret.as_bytes().len(), 32);
//! # Ok::<(), synapsed_kem::Error>(())
//! ```

use crate::{
    derive::SharedSecret,
    error::Result,
    kem::{Ciphertext, KeyPair, LatticeKem},
    matrix::Matrix,
    params::Params,
    traits::RandomSource,
};

/// Build a validated KEM for `params`
pub fn kem_for(params: Params) -> Result<LatticeKem> {
    LatticeKem::new(params)
}

fn reference() -> Result<LatticeKem> {
    kem_for(Params::FRODO640)
}

/// Generate a FrodoKEM-640 sized key pair
pub fn key_gen<R: RandomSource + ?Sized>(rng: &mut R) -> Result<KeyPair> {
    reference()?.key_gen(rng)
}

/// Encapsulate against a FrodoKEM-640 sized public key
pub fn encapsulate<R: RandomSource + ?Sized>(public_key: &Matrix, rng: &mut R) -> Result<Ciphertext> {
    reference()?.encapsulate(public_key, rng)
}

/// Decapsulate a FrodoKEM-640 sized ciphertext
pub fn decapsulate(ciphertext: &Ciphertext, private_key: &Matrix) -> Result<SharedSecret> {
    reference()?.decapsulate(ciphertext, private_key)
}

/// Shape and entry-wise comparison, for verification tooling
pub fn matrix_equals(a: &Matrix, b: &Matrix) -> bool {
    a.equals(b)
}
