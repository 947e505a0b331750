//! Error-distribution sampling
//!
//! Two samplers are provided:
//!
//! - [`NoiseSampler::BoxMuller`]: the reference rounded-Gaussian sampler.
//!   It uses floating-point `ln`/`cos`, so its timing depends on the drawn
//!   values. It is fine for tests and reproducible vectors but is **not**
//!   side-channel safe.
//! - [`NoiseSampler::Cdt`]: a table-driven sampler over a cumulative
//!   distribution table. Every draw reads exactly two bytes and scans the
//!   whole table with constant-time comparisons.

use crate::error::{Error, Result};
use crate::traits::RandomSource;
use core::f64::consts::PI;
use subtle::{Choice, ConditionallySelectable, ConstantTimeGreater};

/// FrodoKEM-640 cumulative distribution table (sigma = 2.8, 15-bit precision)
pub const FRODO640_CDF: [u16; 13] = [
    4643, 13363, 20579, 25843, 29227, 31145, 32103, 32525, 32689, 32745, 32762, 32766, 32767,
];

/// Draw one rounded Box–Muller sample with standard deviation `sigma`.
///
/// Consumes two `u64` words from `rng`. Output is not clamped.
pub fn box_muller<R: RandomSource + ?Sized>(rng: &mut R, sigma: f64) -> Result<i64> {
    check_sigma(sigma)?;
    let u1 = rng.next_unit_open()?;
    let u2 = rng.next_unit_open()?;
    let gaussian = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos() * sigma;
    // Halves round towards positive infinity
    Ok((gaussian + 0.5).floor() as i64)
}

fn check_sigma(sigma: f64) -> Result<()> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(Error::invalid_parameter(format!(
            "sigma must be finite and positive, got {sigma}"
        )));
    }
    Ok(())
}

/// Cumulative distribution table for the constant-time sampler.
///
/// Entries are non-decreasing and fit in 15 bits. A table of length `k`
/// yields samples in `[-k, k]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdtTable {
    entries: Vec<u16>,
}

impl CdtTable {
    /// Validate and wrap a table
    pub fn new(entries: Vec<u16>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::invalid_parameter("CDF table must not be empty"));
        }
        if entries.iter().any(|&e| e > 0x7fff) {
            return Err(Error::invalid_parameter("CDF entries must fit in 15 bits"));
        }
        if entries.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::invalid_parameter("CDF table must be non-decreasing"));
        }
        Ok(Self { entries })
    }

    /// Table entries
    pub fn entries(&self) -> &[u16] {
        &self.entries
    }

    fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<i64> {
        let mut buf = [0u8; 2];
        rng.try_fill_bytes(&mut buf)?;
        let r = u16::from_le_bytes(buf);
        let prnd = r >> 1;
        let negative = Choice::from((r & 1) as u8);

        let mut magnitude: i64 = 0;
        for entry in &self.entries {
            magnitude += i64::from(prnd.ct_gt(entry).unwrap_u8());
        }
        Ok(i64::conditional_select(&magnitude, &-magnitude, negative))
    }
}

/// Discrete error distribution used to fill noise matrices
#[derive(Debug, Clone, PartialEq)]
pub enum NoiseSampler {
    /// Rounded continuous Gaussian via the Box–Muller transform
    BoxMuller {
        /// Standard deviation
        sigma: f64,
    },
    /// Constant-time inversion of a cumulative distribution table
    Cdt(CdtTable),
}

impl NoiseSampler {
    /// Box–Muller sampler with the given standard deviation
    pub fn box_muller(sigma: f64) -> Result<Self> {
        check_sigma(sigma)?;
        Ok(NoiseSampler::BoxMuller { sigma })
    }

    /// Table sampler with FrodoKEM-640's distribution
    pub fn frodo640() -> Self {
        NoiseSampler::Cdt(CdtTable {
            entries: FRODO640_CDF.to_vec(),
        })
    }

    /// Draw one sample
    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<i64> {
        match self {
            NoiseSampler::BoxMuller { sigma } => box_muller(rng, *sigma),
            NoiseSampler::Cdt(table) => table.sample(rng),
        }
    }

    /// Whether a draw takes the same time regardless of its value
    pub fn is_constant_time(&self) -> bool {
        matches!(self, NoiseSampler::Cdt(_))
    }
}
