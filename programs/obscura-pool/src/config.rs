//! Mixer configuration
//!
//! Loaded from TOML:
//! ```toml
//! min_deposit = 1
//! max_deposit = 1000000000000
//! max_merkle_depth = 32
//! root_history_size = 100
//! ```
//! Missing keys fall back to [`MixerConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MixerError, Result};

/// Deepest tree the crate supports (2^32 leaves).
pub const MAX_SUPPORTED_MERKLE_DEPTH: u8 = 32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MixerConfig {
    /// Smallest accepted deposit
    pub min_deposit: u64,

    /// Largest accepted deposit
    pub max_deposit: u64,

    /// Upper bound for `create_pool` depth, at most 32
    pub max_merkle_depth: u8,

    /// Number of recent roots a withdrawal proof may reference
    pub root_history_size: usize,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            min_deposit: 1,
            max_deposit: 1_000_000_000_000,
            max_merkle_depth: MAX_SUPPORTED_MERKLE_DEPTH,
            root_history_size: 100,
        }
    }
}

impl MixerConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(input).map_err(|e| MixerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MixerError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| MixerError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_deposit == 0 {
            return Err(MixerError::InvalidConfig("min_deposit must be positive".into()));
        }
        if self.min_deposit > self.max_deposit {
            return Err(MixerError::InvalidConfig(format!(
                "min_deposit {} exceeds max_deposit {}",
                self.min_deposit, self.max_deposit
            )));
        }
        if self.max_merkle_depth == 0 || self.max_merkle_depth > MAX_SUPPORTED_MERKLE_DEPTH {
            return Err(MixerError::InvalidConfig(format!(
                "max_merkle_depth must be in 1..={}",
                MAX_SUPPORTED_MERKLE_DEPTH
            )));
        }
        if self.root_history_size == 0 {
            return Err(MixerError::InvalidConfig(
                "root_history_size must be positive".into(),
            ));
        }
        Ok(())
    }
}
