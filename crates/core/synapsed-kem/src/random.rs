//! Random number generation utilities
//!
//! This module provides the [`RandomSource`] implementations used by the
//! KEM: a reproducible SHAKE256 stream for test vectors, the operating
//! system generator for production keys, and an adapter for any
//! `rand_core` cryptographic RNG.

use crate::error::{Error, Result};
use crate::traits::RandomSource;
use core::fmt;
use rand_core::{CryptoRng, RngCore, SeedableRng};
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};

/// Deterministic generator seeded from arbitrary bytes.
///
/// The seed is absorbed into SHAKE256 and the output stream is squeezed on
/// demand. Two instances built from the same seed yield the same stream,
/// and the stream position advances on every draw.
pub struct SeededRng {
    reader: sha3::Shake256Reader,
    position: u64,
}

impl SeededRng {
    /// Create a generator from seed bytes of any length
    pub fn new(seed: &[u8]) -> Self {
        let mut hasher = Shake256::default();
        hasher.update(seed);
        Self {
            reader: hasher.finalize_xof(),
            position: 0,
        }
    }

    /// Create a generator from a 32-bit integer seed (big-endian encoded)
    pub fn from_u32(seed: u32) -> Self {
        Self::new(&seed.to_be_bytes())
    }

    /// Number of bytes drawn so far
    pub fn position(&self) -> u64 {
        self.position
    }

    fn squeeze(&mut self, dest: &mut [u8]) {
        self.reader.read(dest);
        self.position += dest.len() as u64;
    }
}

impl RandomSource for SeededRng {
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<()> {
        self.squeeze(dest);
        Ok(())
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.squeeze(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.squeeze(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.squeeze(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
        self.squeeze(dest);
        Ok(())
    }
}

impl CryptoRng for SeededRng {}

impl SeedableRng for SeededRng {
    type Seed = [u8; 32];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(&seed)
    }
}

impl fmt::Debug for SeededRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededRng")
            .field("reader", &"<Shake256Reader>")
            .field("position", &self.position)
            .finish()
    }
}

/// Operating-system entropy source for production key generation
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl OsRandom {
    /// Create a new OS-backed source
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for OsRandom {
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<()> {
        getrandom::getrandom(dest).map_err(Error::from)
    }
}

/// Wrapper for any RngCore + CryptoRng
pub struct RngWrapper<R: RngCore + CryptoRng> {
    rng: R,
}

impl<R: RngCore + CryptoRng> RngWrapper<R> {
    /// Create a new RNG wrapper
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Recover the wrapped generator
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: RngCore + CryptoRng> RandomSource for RngWrapper<R> {
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<()> {
        self.rng
            .try_fill_bytes(dest)
            .map_err(|e| Error::EntropyUnavailable(e.to_string()))
    }
}

impl<R: RngCore + CryptoRng> fmt::Debug for RngWrapper<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RngWrapper")
            .field("rng", &"<RNG>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_rng_reproducible() {
        let mut rng1 = SeededRng::new(b"fixed seed");
        let mut rng2 = SeededRng::new(b"fixed seed");

        let mut buf1 = [0u8; 64];
        let mut buf2 = [0u8; 64];
        RandomSource::try_fill_bytes(&mut rng1, &mut buf1).unwrap();
        RandomSource::try_fill_bytes(&mut rng2, &mut buf2).unwrap();

        assert_eq!(buf1, buf2);
        assert_eq!(rng1.position(), 64);
    }

    #[test]
    fn test_seeded_rng_stream_advances() {
        let mut rng = SeededRng::from_u32(42);
        let a = RandomSource::next_u64(&mut rng).unwrap();
        let b = RandomSource::next_u64(&mut rng).unwrap();
        assert_ne!(a, b);
        assert_eq!(rng.position(), 16);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut rng1 = SeededRng::from_u32(1);
        let mut rng2 = SeededRng::from_u32(2);
        assert_ne!(
            RandomSource::next_u64(&mut rng1).unwrap(),
            RandomSource::next_u64(&mut rng2).unwrap()
        );
    }

    #[test]
    fn test_seedable_matches_new() {
        let seed = [7u8; 32];
        let mut a = SeededRng::from_seed(seed);
        let mut b = SeededRng::new(&seed);
        assert_eq!(RngCore::next_u64(&mut a), RngCore::next_u64(&mut b));
    }

    #[test]
    fn test_os_random() {
        let mut rng = OsRandom::new();
        let mut buf = [0u8; 32];
        rng.try_fill_bytes(&mut buf).unwrap();

        // Check that we got non-zero output
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_wrapper_delegates() {
        let mut wrapped = RngWrapper::new(SeededRng::from_u32(9));
        let mut direct = SeededRng::from_u32(9);
        assert_eq!(
            RandomSource::uniform(&mut wrapped, 97).unwrap(),
            RandomSource::uniform(&mut direct, 97).unwrap()
        );
    }
}
