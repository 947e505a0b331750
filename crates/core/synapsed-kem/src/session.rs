//! Typestate protocol session
//!
//! A [`Session`] walks `Uninitialized → KeyGenerated → Encapsulated →
//! Decapsulated`. Each transition consumes the previous session, so a
//! stage can neither be repeated nor run out of order, and every stage
//! draws fresh randomness from the caller's source.
//!
//! ```
//! use synapsed_kem::{LatticeKem, Params, SeededRng, Session};
//!
//! # fn main() -> synapsed_kem::Result<()> {
//! let mut rng = SeededRng::from_u32(42);
//! let session = Session::new(LatticeKem::new(Params::TOY)?)
//!     .key_gen(&mut rng)?
//!     .encapsulate(&mut rng)?
//!     .decapsulate()?;
//! assert_eq!(session.shared_secret().as_bytes().len(), 32);
//! # Ok(())
//! # }
//! ```

use crate::derive::SharedSecret;
use crate::error::Result;
use crate::kem::{Ciphertext, KeyPair, LatticeKem};
use crate::matrix::Matrix;
use crate::traits::RandomSource;

mod sealed {
    pub trait Sealed {}
}

/// Marker for session stages
pub trait Stage: sealed::Sealed {
    /// Stage name, for logs
    const NAME: &'static str;
}

/// No keys yet
#[derive(Debug)]
pub struct Uninitialized;

/// Key pair generated
#[derive(Debug)]
pub struct KeyGenerated {
    keypair: KeyPair,
}

/// Ciphertext produced
#[derive(Debug)]
pub struct Encapsulated {
    keypair: KeyPair,
    ciphertext: Ciphertext,
}

/// Shared secret recovered (terminal)
#[derive(Debug)]
pub struct Decapsulated {
    keypair: KeyPair,
    ciphertext: Ciphertext,
    secret: SharedSecret,
}

impl sealed::Sealed for Uninitialized {}
impl sealed::Sealed for KeyGenerated {}
impl sealed::Sealed for Encapsulated {}
impl sealed::Sealed for Decapsulated {}

impl Stage for Uninitialized {
    const NAME: &'static str = "uninitialized";
}
impl Stage for KeyGenerated {
    const NAME: &'static str = "key-generated";
}
impl Stage for Encapsulated {
    const NAME: &'static str = "encapsulated";
}
impl Stage for Decapsulated {
    const NAME: &'static str = "decapsulated";
}

/// One protocol run
#[derive(Debug)]
pub struct Session<S: Stage> {
    kem: LatticeKem,
    state: S,
}

impl<S: Stage> Session<S> {
    /// Current stage name
    pub fn stage(&self) -> &'static str {
        S::NAME
    }

    /// KEM driving this session
    pub fn kem(&self) -> &LatticeKem {
        &self.kem
    }
}

fn transition<T: Stage>(kem: LatticeKem, from: &'static str, state: T) -> Session<T> {
    tracing::debug!(from, to = T::NAME, "session transition");
    Session { kem, state }
}

impl Session<Uninitialized> {
    /// Start a session
    pub fn new(kem: LatticeKem) -> Self {
        Self {
            kem,
            state: Uninitialized,
        }
    }

    /// Generate the key pair
    pub fn key_gen<R: RandomSource + ?Sized>(self, rng: &mut R) -> Result<Session<KeyGenerated>> {
        let keypair = self.kem.key_gen(rng)?;
        Ok(transition(self.kem, Uninitialized::NAME, KeyGenerated { keypair }))
    }
}

impl Session<KeyGenerated> {
    /// Public key to hand to the encapsulating party
    pub fn public_key(&self) -> &Matrix {
        &self.state.keypair.public_key
    }

    /// Encapsulate against this session's public key
    pub fn encapsulate<R: RandomSource + ?Sized>(self, rng: &mut R) -> Result<Session<Encapsulated>> {
        let ciphertext = self.kem.encapsulate(&self.state.keypair.public_key, rng)?;
        let KeyGenerated { keypair } = self.state;
        Ok(transition(
            self.kem,
            KeyGenerated::NAME,
            Encapsulated { keypair, ciphertext },
        ))
    }
}

impl Session<Encapsulated> {
    /// Ciphertext produced by the encapsulation stage
    pub fn ciphertext(&self) -> &Ciphertext {
        &self.state.ciphertext
    }

    /// Recover the shared secret with the session's private key
    pub fn decapsulate(self) -> Result<Session<Decapsulated>> {
        let secret = self
            .kem
            .decapsulate(&self.state.ciphertext, &self.state.keypair.private_key)?;
        let Encapsulated { keypair, ciphertext } = self.state;
        Ok(transition(
            self.kem,
            Encapsulated::NAME,
            Decapsulated {
                keypair,
                ciphertext,
                secret,
            },
        ))
    }
}

impl Session<Decapsulated> {
    /// Recovered shared secret
    pub fn shared_secret(&self) -> &SharedSecret {
        &self.state.secret
    }

    /// Ciphertext the secret was recovered from
    pub fn ciphertext(&self) -> &Ciphertext {
        &self.state.ciphertext
    }

    /// Key pair used in this run
    pub fn keypair(&self) -> &KeyPair {
        &self.state.keypair
    }

    /// Consume the session, keeping only the secret
    pub fn into_shared_secret(self) -> SharedSecret {
        self.state.secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive;
    use crate::params::Params;
    use crate::random::SeededRng;

    #[test]
    fn test_full_session() {
        let kem = LatticeKem::new(Params::TOY).unwrap();
        let mut rng = SeededRng::from_u32(11);

        let session = Session::new(kem);
        assert_eq!(session.stage(), "uninitialized");
        let session = session.key_gen(&mut rng).unwrap();
        assert_eq!(session.stage(), "key-generated");
        assert!(session.public_key().is_reduced(97));
        let session = session.encapsulate(&mut rng).unwrap();
        assert_eq!(session.stage(), "encapsulated");
        let session = session.decapsulate().unwrap();
        assert_eq!(session.stage(), "decapsulated");

        let expected = derive(
            &session
                .kem()
                .shared_matrix(session.ciphertext(), &session.keypair().private_key)
                .unwrap(),
        );
        assert_eq!(session.shared_secret(), &expected);
        assert_eq!(session.into_shared_secret(), expected);
    }

    #[test]
    fn test_sessions_reproducible_from_seed() {
        let run = |seed| {
            let mut rng = SeededRng::from_u32(seed);
            Session::new(LatticeKem::new(Params::TOY).unwrap())
                .key_gen(&mut rng)
                .and_then(|s| s.encapsulate(&mut rng))
                .and_then(|s| s.decapsulate())
                .map(|s| s.into_shared_secret())
                .unwrap()
        };
        assert_eq!(run(5), run(5));
    }
}
