//! Parameter sets for the matrix LWE key encapsulation
//!
//! All matrices in one protocol run are square `n x n`, reduced modulo `q`,
//! and perturbed with noise of standard deviation `sigma`.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of the derived shared secret in bytes
pub const SHARED_SECRET_SIZE: usize = 32;

/// Protocol parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Params {
    /// Matrix dimension (all matrices are n x n)
    pub n: usize,
    /// Modulus defining the ring Z_q
    pub q: i64,
    /// Standard deviation of the error distribution
    pub sigma: f64,
}

impl Params {
    /// FrodoKEM-640 sized parameters (n = 640, q = 2^15, sigma = 2.8)
    pub const FRODO640: Params = Params {
        n: 640,
        q: 32768,
        sigma: 2.8,
    };

    /// Small parameters for tests and worked examples
    pub const TOY: Params = Params {
        n: 2,
        q: 97,
        sigma: 1.0,
    };

    /// Create and validate a parameter set
    pub fn new(n: usize, q: i64, sigma: f64) -> Result<Self> {
        let params = Self { n, q, sigma };
        params.validate()?;
        Ok(params)
    }

    /// Check that the parameters describe a usable ring and distribution
    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(Error::invalid_parameter("dimension n must be non-zero"));
        }
        if self.q <= 1 {
            return Err(Error::InvalidModulus(self.q));
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(Error::invalid_parameter(format!(
                "sigma must be finite and positive, got {}",
                self.sigma
            )));
        }
        Ok(())
    }

    /// Number of entries in one n x n matrix
    pub fn matrix_len(&self) -> usize {
        self.n * self.n
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::FRODO640
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(Params::FRODO640.validate().is_ok());
        assert!(Params::TOY.validate().is_ok());
        assert_eq!(Params::default(), Params::FRODO640);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Params::new(0, 97, 1.0),
            Err(Error::InvalidParameter(_))
        ));
        assert_eq!(Params::new(2, 0, 1.0), Err(Error::InvalidModulus(0)));
        assert_eq!(Params::new(2, -5, 1.0), Err(Error::InvalidModulus(-5)));
        assert!(Params::new(2, 97, 0.0).is_err());
        assert!(Params::new(2, 97, f64::NAN).is_err());
    }
}
