//! # Synapsed KEM
//!
//! A matrix learning-with-errors key encapsulation core in the style of
//! FrodoKEM: dense modular matrix algebra, error sampling, and the
//! key generation / encapsulation / decapsulation algebra that ties them
//! together.
//!
//! ## Quick Start
//!
//! ```
//! use synapsed_kem::prelude::*;
//!
//! # fn main() -> synapsed_kem::Result<()> {
//! let kem = LatticeKem::new(Params::TOY)?;
//! let mut rng = SeededRng::from_u32(7);
//!
//! let keypair = kem.key_gen(&mut rng)?;
//! let ciphertext = kem.encapsulate(&keypair.public_key, &mut rng)?;
//! let secret = kem.decapsulate(&ciphertext, &keypair.private_key)?;
//! assert_eq!(secret.as_bytes().len(), 32);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - [`matrix`]: dense `i64` matrices with modular reduction
//! - [`noise`]: Box–Muller and constant-time CDT error samplers
//! - [`random`]: seeded SHAKE256 stream, OS entropy, `rand_core` adapter
//! - [`kem`]: key generation, encapsulation, decapsulation
//! - [`session`]: typestate wrapper over one protocol run
//! - [`derive`]: shared-secret derivation
//! - [`codec`]: tab-separated text persistence
//! - [`vectors`]: test-vector capture and replay
//! - [`api`]: free functions over the FrodoKEM-640 parameters
//!
//! ## Security Warning
//!
//! This is an arithmetic reference. The Box–Muller sampler is not constant
//! time, and encapsulation draws a fresh public matrix with no
//! reconciliation step, so the two parties do not agree on a secret
//! without the private key. See [`kem`] for details.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

pub use crate::derive::SharedSecret;
pub use crate::error::{Error, Result};
pub use crate::kem::{Ciphertext, KeyPair, LatticeKem};
pub use crate::matrix::Matrix;
pub use crate::params::Params;
pub use crate::random::{OsRandom, SeededRng};
pub use crate::session::Session;
pub use crate::traits::RandomSource;

// Core modules
pub mod error;
pub mod params;
pub mod traits;
pub mod random;

// Arithmetic
pub mod matrix;
pub mod noise;
pub mod derive;

// Protocol
pub mod kem;
pub mod session;
pub mod observability;

// Persistence
pub mod codec;
pub mod vectors;

#[cfg(feature = "config")]
pub mod config;

// High-level API
pub mod api;

pub mod prelude {
    //! Common imports
    //!
    //! ```
    //! use synapsed_kem::prelude::*;
    //! ```

    pub use crate::{
        api::{decapsulate, encapsulate, key_gen, kem_for, matrix_equals},
        derive::derive,
        noise::NoiseSampler,
        Ciphertext, Error, KeyPair, LatticeKem, Matrix, OsRandom, Params, RandomSource, Result,
        SeededRng, Session, SharedSecret,
    };

    #[cfg(feature = "config")]
    pub use crate::config::KemConfig;
}
