pub mod base58;
pub mod cashaddr;
pub mod config;
pub mod context;
pub mod derivation;
pub mod error;
pub mod hash;
pub mod keys;
pub mod mnemonic;
pub mod path;
pub mod segwit;
pub mod storage;
pub mod wallet;

pub use config::{ConfigError, WalletConfig};
pub use context::{ChainContext, KeyFamily, Network, NetworkParams};
pub use derivation::HDNode;
pub use error::KeyError;
pub use keys::OutputKind;
pub use mnemonic::{MnemonicError, MnemonicStrength};
pub use path::{parse_path, DecomposedDerivationPath, PresetPath, HARDENED_OFFSET};
pub use storage::{ExportBundle, NoxsError, NoxsVersion, StorageError};
pub use wallet::{format_rows, DerivedRow, KeyRoot, RootSource, WalletError};
