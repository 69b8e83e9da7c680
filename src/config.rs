//! Wallet configuration, read from JSON. Missing fields take defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{ChainContext, Network};
use crate::error::KeyError;
use crate::keys::OutputKind;
use crate::path::{parse_path, DecomposedDerivationPath, PresetPath};
use crate::storage::NoxsVersion;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid derivation path in config: {0}")]
    Path(#[from] KeyError),
    #[error("Level {level} is outside 1..={max}")]
    Level { level: usize, max: usize },
    #[error("Row count {0} is outside 1..={max}", max = MAX_ROWS)]
    Rows(usize),
}

/// Upper bound on rows derived per table.
pub const MAX_ROWS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default = "default_network")]
    pub network: Network,

    /// Path whose index at `level` is varied across rows.
    #[serde(default = "default_derivation_path")]
    pub derivation_path: String,

    /// 1-based position in `derivation_path`.
    #[serde(default = "default_level")]
    pub level: usize,

    #[serde(default = "default_rows")]
    pub rows: usize,

    #[serde(default = "default_outputs")]
    pub outputs: Vec<OutputKind>,

    /// Container version used for exports.
    #[serde(default = "default_noxs_version")]
    pub noxs_version: NoxsVersion,
}

fn default_network() -> Network {
    Network::Main
}

fn default_derivation_path() -> String {
    PresetPath::DefaultPrivate.path().to_string()
}

fn default_level() -> usize {
    PresetPath::DefaultPrivate.level()
}

fn default_rows() -> usize {
    9
}

fn default_outputs() -> Vec<OutputKind> {
    vec![OutputKind::EthAddress]
}

fn default_noxs_version() -> NoxsVersion {
    NoxsVersion::X
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            derivation_path: default_derivation_path(),
            level: default_level(),
            rows: default_rows(),
            outputs: default_outputs(),
            noxs_version: default_noxs_version(),
        }
    }
}

impl WalletConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WalletConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loading wallet config from {}", path.as_ref().display());
        Self::from_json_str(&contents)
    }

    /// Applies a preset path together with its usual level.
    pub fn with_preset(mut self, preset: PresetPath) -> Self {
        self.derivation_path = preset.path().to_string();
        self.level = preset.level();
        self
    }

    pub fn path(&self) -> Result<DecomposedDerivationPath, ConfigError> {
        Ok(parse_path(&self.derivation_path, false, true)?)
    }

    /// Checks that the path parses, `level` points into it and the row
    /// count is within bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.rows > MAX_ROWS {
            return Err(ConfigError::Rows(self.rows));
        }
        let path = self.path()?;
        if self.level == 0 || self.level > path.len() {
            return Err(ConfigError::Level {
                level: self.level,
                max: path.len(),
            });
        }
        Ok(())
    }

    pub fn context(&self) -> ChainContext {
        ChainContext::new(self.network)
    }
}
