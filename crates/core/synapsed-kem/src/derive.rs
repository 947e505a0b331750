//! Shared-secret derivation
//!
//! Collapses a shared matrix into a fixed 32-byte secret with SHAKE256.
//! The XOF absorbs the shape (`rows`, `cols` as u64 little-endian) followed
//! by every entry as i64 little-endian in row-major order.

use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::params::SHARED_SECRET_SIZE;
use core::fmt;
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Fixed-length secret agreed by both parties
#[derive(Clone)]
pub struct SharedSecret {
    bytes: [u8; SHARED_SECRET_SIZE],
}

impl SharedSecret {
    /// Wrap raw secret bytes
    pub fn from_bytes(bytes: [u8; SHARED_SECRET_SIZE]) -> Self {
        Self { bytes }
    }

    /// Parse a lowercase or uppercase hex string of exactly 32 bytes
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let decoded = hex::decode(hex_str)
            .map_err(|e| Error::deserialization(0, format!("invalid hex digest: {e}")))?;
        let bytes: [u8; SHARED_SECRET_SIZE] = decoded.as_slice().try_into().map_err(|_| {
            Error::deserialization(
                0,
                format!(
                    "digest is {} bytes, expected {SHARED_SECRET_SIZE}",
                    decoded.len()
                ),
            )
        })?;
        Ok(Self { bytes })
    }

    /// Secret bytes
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.bytes
    }

    /// Lowercase hex encoding
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl AsRef<[u8]> for SharedSecret {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for SharedSecret {}

impl Zeroize for SharedSecret {
    fn zeroize(&mut self) {
        self.bytes.zeroize();
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for SharedSecret {}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("len", &SHARED_SECRET_SIZE)
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive the shared secret from a (reduced) shared matrix.
///
/// Pure function: equal matrices always yield equal secrets.
pub fn derive(matrix: &Matrix) -> SharedSecret {
    let mut hasher = Shake256::default();
    hasher.update(&(matrix.rows() as u64).to_le_bytes());
    hasher.update(&(matrix.cols() as u64).to_le_bytes());
    for entry in matrix.entries() {
        hasher.update(&entry.to_le_bytes());
    }

    let mut bytes = [0u8; SHARED_SECRET_SIZE];
    hasher.finalize_xof().read(&mut bytes);
    SharedSecret { bytes }
}
