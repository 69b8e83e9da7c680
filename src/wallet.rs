//! Entry point for callers holding user input: turns a mnemonic or an
//! extended key into a root node and derives tables of outputs from it.

use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::{ConfigError, WalletConfig};
use crate::context::ChainContext;
use crate::derivation::HDNode;
use crate::error::KeyError;
use crate::keys::OutputKind;
use crate::path::{parse_path, DecomposedDerivationPath, PresetPath};
use crate::storage::{ExportBundle, StorageError};

#[derive(Error, Debug)]
pub enum WalletError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Input is neither a valid mnemonic nor an extended key")]
    UnrecognizedInput,
    #[error("Level {level} is outside 1..={max}")]
    InvalidLevel { level: usize, max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSource {
    Mnemonic,
    ExtendedKey,
}

/// A root node plus the user input it was built from.
pub struct KeyRoot {
    node: HDNode,
    source: RootSource,
    input: Zeroizing<String>,
    passphrase: Zeroizing<String>,
}

/// One derived path and its rendered outputs, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedRow {
    pub path: String,
    pub values: Vec<String>,
}

impl KeyRoot {
    /// Tries `input` as a mnemonic first, then as an extended key. The
    /// passphrase only applies to mnemonics and is dropped otherwise.
    pub fn from_input(ctx: &ChainContext, input: &str, passphrase: &str) -> Result<Self, WalletError> {
        let input = input.trim();
        match HDNode::from_mnemonic(ctx, input, passphrase) {
            Ok(node) => {
                log::debug!("root built from mnemonic");
                return Ok(KeyRoot {
                    node,
                    source: RootSource::Mnemonic,
                    input: Zeroizing::new(input.to_string()),
                    passphrase: Zeroizing::new(passphrase.to_string()),
                });
            }
            Err(KeyError::Mnemonic(e)) => log::debug!("input is not a mnemonic: {}", e),
            Err(e) => return Err(e.into()),
        }

        match HDNode::from_extended_key(ctx, input) {
            Ok(node) => {
                log::debug!("root built from extended key, private: {}", node.is_private());
                Ok(KeyRoot {
                    node,
                    source: RootSource::ExtendedKey,
                    input: Zeroizing::new(input.to_string()),
                    passphrase: Zeroizing::new(String::new()),
                })
            }
            Err(e) => {
                log::debug!("input is not an extended key: {}", e);
                Err(WalletError::UnrecognizedInput)
            }
        }
    }

    /// Rebuilds the root stored in an export bundle.
    pub fn from_bundle(ctx: &ChainContext, bundle: &ExportBundle) -> Result<Self, WalletError> {
        Self::from_input(ctx, &bundle.key, &bundle.passphrase)
    }

    pub fn node(&self) -> &HDNode {
        &self.node
    }

    pub fn source(&self) -> RootSource {
        self.source
    }

    pub fn is_private(&self) -> bool {
        self.node.is_private()
    }

    /// Path a fresh session starts from: public roots cannot walk `m/...`.
    pub fn default_preset(&self) -> PresetPath {
        if self.is_private() {
            PresetPath::DefaultPrivate
        } else {
            PresetPath::DefaultPublic
        }
    }

    /// Derives `rows` consecutive siblings at `level` (1-based) of `path`,
    /// starting from the index the path already has there, and renders
    /// `outputs` for each. The row count is cut short where the index would
    /// leave its hardened or non-hardened range. A sibling whose derivation
    /// is numerically invalid is skipped.
    pub fn derive_rows(
        &self,
        ctx: &ChainContext,
        path: &str,
        level: usize,
        rows: usize,
        outputs: &[OutputKind],
    ) -> Result<Vec<DerivedRow>, WalletError> {
        let base = parse_path(path, false, self.is_private())?;
        if level == 0 || level > base.len() {
            return Err(WalletError::InvalidLevel {
                level,
                max: base.len(),
            });
        }
        let position = level - 1;

        let mut count = rows;
        if let Some(max) = base.max_children_derivable(position) {
            if (max as usize) < count {
                count = max as usize + 1;
            }
        }

        let first = base.node_indexes[position];
        let mut result = Vec::new();
        for offset in 0..count as u32 {
            let mut sibling = base.clone();
            sibling.node_indexes[position] = first + offset;
            match self.derive_row(ctx, &sibling, outputs) {
                Ok(row) => result.push(row),
                Err(KeyError::InvalidChildNode) => {
                    log::warn!("skipping {}: invalid child", sibling);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(result)
    }

    /// [`KeyRoot::derive_rows`] with the path, level, row count and outputs
    /// taken from `config`.
    pub fn derive_configured(&self, ctx: &ChainContext, config: &WalletConfig) -> Result<Vec<DerivedRow>, WalletError> {
        config.validate()?;
        self.derive_rows(ctx, &config.derivation_path, config.level, config.rows, &config.outputs)
    }

    fn derive_row(
        &self,
        ctx: &ChainContext,
        path: &DecomposedDerivationPath,
        outputs: &[OutputKind],
    ) -> Result<DerivedRow, KeyError> {
        let node = self.node.derive_path(ctx, path)?;
        let values = outputs
            .iter()
            .map(|&kind| node.render(ctx, kind))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DerivedRow {
            path: path.to_string(),
            values,
        })
    }

    /// Bundle for encrypted export of this root with the given view settings.
    pub fn export(&self, path: &str, level: usize) -> ExportBundle {
        ExportBundle {
            key: self.input.as_str().to_owned(),
            passphrase: self.passphrase.as_str().to_owned(),
            path: path.to_string(),
            level,
        }
    }
}

impl std::fmt::Debug for KeyRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRoot")
            .field("source", &self.source)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

/// Lines of `path  value  value ...` with paths padded to a common width.
pub fn format_rows(rows: &[DerivedRow]) -> Vec<String> {
    let width = rows.iter().map(|row| row.path.len()).max().unwrap_or(0);
    rows.iter()
        .map(|row| {
            let mut line = format!("{:<width$}", row.path, width = width);
            for value in &row.values {
                line.push_str("  ");
                line.push_str(value);
            }
            line
        })
        .collect()
}
