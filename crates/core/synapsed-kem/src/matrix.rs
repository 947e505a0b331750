//! Dense integer matrices over Z_q
//!
//! Arithmetic (`add`, `subtract`, `multiply`) is exact over `i64` and never
//! reduces; callers apply [`Matrix::mod_reduce`] when they want canonical
//! residues. A result that leaves the `i64` range is reported as
//! [`Error::Overflow`] instead of wrapping. Every operation returns a freshly owned matrix and leaves its
//! inputs untouched, including on error.

use crate::error::{Error, Result};
use crate::noise::NoiseSampler;
use crate::traits::RandomSource;
use core::ops::Index;
use zeroize::Zeroize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Dense row-major matrix of integers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    entries: Vec<i64>,
}

impl Matrix {
    /// Create a matrix of zeros
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: vec![0; rows * cols],
        }
    }

    /// Create the n x n identity matrix
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.entries[i * n + i] = 1;
        }
        m
    }

    /// Create a matrix from row-major entries
    pub fn from_vec(rows: usize, cols: usize, entries: Vec<i64>) -> Result<Self> {
        if entries.len() != rows * cols {
            return Err(Error::dimension_mismatch(
                "from_vec",
                (rows, cols),
                (1, entries.len()),
            ));
        }
        Ok(Self { rows, cols, entries })
    }

    /// Create a matrix from a list of rows.
    ///
    /// Rejects empty input and rows of differing length.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(Error::invalid_parameter("matrix must be non-empty"));
        }
        let n_rows = rows.len();
        let mut entries = Vec::with_capacity(n_rows * cols);
        for row in rows {
            if row.len() != cols {
                return Err(Error::dimension_mismatch(
                    "from_rows",
                    (n_rows, cols),
                    (1, row.len()),
                ));
            }
            entries.extend(row);
        }
        Ok(Self {
            rows: n_rows,
            cols,
            entries,
        })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as (rows, cols)
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row-major entries
    pub fn entries(&self) -> &[i64] {
        &self.entries
    }

    /// Entry at (row, col), or `None` when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        if row < self.rows && col < self.cols {
            Some(self.entries[row * self.cols + col])
        } else {
            None
        }
    }

    /// Overwrite the entry at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: i64) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::dimension_mismatch(
                "set",
                (self.rows, self.cols),
                (row, col),
            ));
        }
        self.entries[row * self.cols + col] = value;
        Ok(())
    }

    /// Borrow one row
    pub fn row(&self, row: usize) -> Option<&[i64]> {
        if row < self.rows {
            Some(&self.entries[row * self.cols..(row + 1) * self.cols])
        } else {
            None
        }
    }

    /// Iterate over rows
    pub fn iter_rows(&self) -> impl Iterator<Item = &[i64]> {
        // chunks(0) panics; a 0-column matrix has no entries to yield anyway
        self.entries.chunks(self.cols.max(1)).take(self.rows)
    }

    /// Matrix with every entry drawn uniformly from `[0, modulus)`
    pub fn generate_uniform<R: RandomSource + ?Sized>(
        rows: usize,
        cols: usize,
        modulus: i64,
        rng: &mut R,
    ) -> Result<Self> {
        if modulus <= 0 {
            return Err(Error::InvalidModulus(modulus));
        }
        let entries = (0..rows * cols)
            .map(|_| rng.uniform(modulus))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows, cols, entries })
    }

    /// Matrix of rounded Box–Muller samples with standard deviation `sigma`
    pub fn generate_noise<R: RandomSource + ?Sized>(
        rows: usize,
        cols: usize,
        sigma: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let sampler = NoiseSampler::box_muller(sigma)?;
        Self::generate_noise_with(rows, cols, &sampler, rng)
    }

    /// Matrix of samples from an arbitrary error distribution
    pub fn generate_noise_with<R: RandomSource + ?Sized>(
        rows: usize,
        cols: usize,
        sampler: &NoiseSampler,
        rng: &mut R,
    ) -> Result<Self> {
        let entries = (0..rows * cols)
            .map(|_| sampler.sample(rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows, cols, entries })
    }

    fn check_same_shape(&self, other: &Self, op: &'static str) -> Result<()> {
        if self.dims() != other.dims() {
            return Err(Error::dimension_mismatch(op, self.dims(), other.dims()));
        }
        Ok(())
    }

    /// Element-wise sum, without reduction.
    ///
    /// Fails with [`Error::Overflow`] rather than wrapping.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.check_same_shape(other, "add")?;
        let entries = self
            .entries
            .iter()
            .zip(&other.entries)
            .map(|(a, b)| a.checked_add(*b).ok_or(Error::overflow("add")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            entries,
        })
    }

    /// Element-wise difference, without reduction
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.check_same_shape(other, "subtract")?;
        let entries = self
            .entries
            .iter()
            .zip(&other.entries)
            .map(|(a, b)| a.checked_sub(*b).ok_or(Error::overflow("subtract")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            entries,
        })
    }

    /// Element-wise negation
    pub fn negate(&self) -> Result<Self> {
        let entries = self
            .entries
            .iter()
            .map(|x| x.checked_neg().ok_or(Error::overflow("negate")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            entries,
        })
    }

    /// Multiply every entry by a scalar, without reduction
    pub fn scalar_mul(&self, k: i64) -> Result<Self> {
        let entries = self
            .entries
            .iter()
            .map(|x| x.checked_mul(k).ok_or(Error::overflow("scalar_mul")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            entries,
        })
    }

    /// Matrix product, without reduction. Fails with [`Error::Overflow`]
    /// if any partial sum leaves the i64 range.
    ///
    /// O(rows * inner * cols). With the `parallel` feature, output rows are
    /// partitioned across rayon workers; each worker owns its row slice, so
    /// the result is identical to the serial loop.
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        if self.cols != other.rows {
            return Err(Error::dimension_mismatch(
                "multiply",
                self.dims(),
                other.dims(),
            ));
        }
        let mut result = Self::zeros(self.rows, other.cols);
        if result.entries.is_empty() {
            return Ok(result);
        }

        let out_cols = other.cols;
        let inner = self.cols;
        let lhs = &self.entries;
        let rhs = &other.entries;
        let fill_row = |(i, out): (usize, &mut [i64])| -> Result<()> {
            let a_row = &lhs[i * inner..(i + 1) * inner];
            for (k, &a) in a_row.iter().enumerate() {
                let b_row = &rhs[k * out_cols..(k + 1) * out_cols];
                for (acc, &b) in out.iter_mut().zip(b_row) {
                    let sum = *acc;
                    *acc = a
                        .checked_mul(b)
                        .and_then(|p| sum.checked_add(p))
                        .ok_or(Error::overflow("multiply"))?;
                }
            }
            Ok(())
        };

        #[cfg(feature = "parallel")]
        result
            .entries
            .par_chunks_mut(out_cols)
            .enumerate()
            .try_for_each(fill_row)?;

        #[cfg(not(feature = "parallel"))]
        result
            .entries
            .chunks_mut(out_cols)
            .enumerate()
            .try_for_each(fill_row)?;

        Ok(result)
    }

    /// Swap rows and columns
    pub fn transpose(&self) -> Self {
        let mut result = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                result.entries[j * self.rows + i] = self.entries[i * self.cols + j];
            }
        }
        result
    }

    /// Map every entry to its least non-negative residue modulo `modulus`
    pub fn mod_reduce(&self, modulus: i64) -> Result<Self> {
        if modulus <= 0 {
            return Err(Error::InvalidModulus(modulus));
        }
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            entries: self.entries.iter().map(|x| x.rem_euclid(modulus)).collect(),
        })
    }

    /// Whether every entry already lies in `[0, modulus)`
    pub fn is_reduced(&self, modulus: i64) -> bool {
        self.entries.iter().all(|&x| (0..modulus).contains(&x))
    }

    /// Dimension and element-wise equality
    pub fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = i64;

    fn index(&self, (row, col): (usize, usize)) -> &i64 {
        assert!(row < self.rows && col < self.cols, "matrix index out of bounds");
        &self.entries[row * self.cols + col]
    }
}

impl Zeroize for Matrix {
    fn zeroize(&mut self) {
        // Wipe in place so the shape stays consistent
        self.entries.as_mut_slice().zeroize();
    }
}
