//! Core traits for randomness consumed by the KEM
//!
//! Every generation routine takes an explicit `&mut impl RandomSource`.
//! There is no ambient generator: the caller owns the stream and therefore
//! owns the draw order.

use crate::error::{Error, Result};

/// Source of randomness for uniform and noise sampling.
///
/// Implementors only provide [`RandomSource::try_fill_bytes`]; every other
/// draw is derived from it, so two sources producing the same byte stream
/// produce the same integers, floats and Gaussian samples.
pub trait RandomSource {
    /// Fill the given buffer with random bytes.
    ///
    /// Fails with [`Error::EntropyUnavailable`] if the underlying source
    /// cannot be read. Callers must not fall back to a weaker source.
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<()>;

    /// Generate a random u32
    fn next_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.try_fill_bytes(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Generate a random u64
    fn next_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.try_fill_bytes(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Generate a float strictly inside (0, 1) with 53 bits of precision
    fn next_unit_open(&mut self) -> Result<f64> {
        let bits = self.next_u64()? >> 11;
        Ok((bits as f64 + 0.5) / (1u64 << 53) as f64)
    }

    /// Draw an integer uniformly from `[0, modulus)`.
    ///
    /// Uses rejection sampling, so there is no modulo bias. The number of
    /// bytes consumed therefore depends on the values drawn.
    fn uniform(&mut self, modulus: i64) -> Result<i64> {
        if modulus <= 0 {
            return Err(Error::InvalidModulus(modulus));
        }
        let m = modulus as u64;
        // 2^64 mod m: values below this would over-represent small residues
        let threshold = m.wrapping_neg() % m;
        loop {
            let x = self.next_u64()?;
            if x >= threshold {
                return Ok((x % m) as i64);
            }
        }
    }

    /// Draw one rounded Gaussian sample with standard deviation `sigma`
    fn gaussian_sample(&mut self, sigma: f64) -> Result<i64> {
        crate::noise::box_muller(self, sigma)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<()> {
        (**self).try_fill_bytes(dest)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<()> {
        (**self).try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed list of u64 words
    struct Script {
        words: Vec<u64>,
        pos: usize,
    }

    impl RandomSource for Script {
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<()> {
            for chunk in dest.chunks_mut(8) {
                let word = self.words[self.pos % self.words.len()];
                self.pos += 1;
                chunk.copy_from_slice(&word.to_le_bytes()[..chunk.len()]);
            }
            Ok(())
        }
    }

    #[test]
    fn test_uniform_rejects_biased_words() {
        // For m = 3, 2^64 mod 3 = 1, so the word 0 must be rejected
        let mut src = Script {
            words: vec![0, 5],
            pos: 0,
        };
        assert_eq!(src.uniform(3).unwrap(), 5 % 3);
        assert_eq!(src.pos, 2);
    }

    #[test]
    fn test_uniform_invalid_modulus() {
        let mut src = Script {
            words: vec![1],
            pos: 0,
        };
        assert_eq!(src.uniform(0), Err(Error::InvalidModulus(0)));
        assert_eq!(src.uniform(-5), Err(Error::InvalidModulus(-5)));
        assert_eq!(src.pos, 0);
    }

    #[test]
    fn test_unit_open_bounds() {
        let mut low = Script {
            words: vec![0],
            pos: 0,
        };
        let mut high = Script {
            words: vec![u64::MAX],
            pos: 0,
        };
        let lo = low.next_unit_open().unwrap();
        let hi = high.next_unit_open().unwrap();
        assert!(lo > 0.0 && lo < 1.0);
        assert!(hi > 0.0 && hi < 1.0);
    }
}
