//! TOML configuration
//!
//! ```toml
//! [params]
//! n = 640
//! q = 32768
//! sigma = 2.8
//!
//! [rng]
//! seed = "00112233"   # optional, hex; omit for OS entropy
//! ```

use crate::error::{Error, Result};
use crate::kem::LatticeKem;
use crate::params::Params;
use crate::random::{OsRandom, SeededRng};
use crate::traits::RandomSource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Random source settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RngConfig {
    /// Hex-encoded seed for a deterministic stream
    pub seed: Option<String>,
}

/// Top-level KEM configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KemConfig {
    /// Protocol parameters, FrodoKEM-640 when omitted
    #[serde(default)]
    pub params: Params,
    /// Random source, OS entropy when omitted
    #[serde(default)]
    pub rng: Option<RngConfig>,
}

impl KemConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading KEM config");
        Self::from_toml_str(&text)
    }

    /// Check parameters and seed encoding
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        self.seed_bytes()?;
        Ok(())
    }

    fn seed_bytes(&self) -> Result<Option<Vec<u8>>> {
        match self.rng.as_ref().and_then(|rng| rng.seed.as_deref()) {
            None => Ok(None),
            Some(seed) => {
                let bytes =
                    hex::decode(seed).map_err(|e| Error::Config(format!("rng.seed: {e}")))?;
                if bytes.is_empty() {
                    return Err(Error::Config("rng.seed must not be empty".to_string()));
                }
                Ok(Some(bytes))
            }
        }
    }

    /// Whether the configured source is reproducible
    pub fn is_deterministic(&self) -> bool {
        matches!(self.seed_bytes(), Ok(Some(_)))
    }

    /// Build a KEM for the configured parameters
    pub fn kem(&self) -> Result<LatticeKem> {
        LatticeKem::new(self.params)
    }

    /// Build the configured random source
    pub fn random_source(&self) -> Result<Box<dyn RandomSource>> {
        Ok(match self.seed_bytes()? {
            Some(seed) => Box::new(SeededRng::new(&seed)),
            None => Box::new(OsRandom::new()),
        })
    }
}
