use thiserror::Error;

use crate::mnemonic::MnemonicError;

/// Failures raised while building, deriving or rendering HD nodes.
///
/// All of these are local validation failures: nothing here is fatal to the
/// process and no partially derived output is ever returned alongside them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid public key")]
    InvalidPubKey,
    #[error("Invalid private key")]
    InvalidPrivKey,
    #[error("Invalid chain code")]
    InvalidChainCode,
    #[error("Invalid parent fingerprint")]
    InvalidFingerprint,
    #[error("Invalid extended key")]
    InvalidExtendedKey,
    /// The HMAC output for this index is not a usable scalar, or the tweak
    /// produced the point at infinity. Callers should move on to `index + 1`.
    #[error("Invalid child node")]
    InvalidChildNode,
    #[error("Hardened derivation is not allowed from a public key")]
    HardenedNotAllowed,
    #[error("Private key is not accessible")]
    PrivKeyNotAccessible,
    #[error("Invalid derivation path")]
    InvalidDerivationPath,
    #[error("Derivation path exceeds the maximum depth of 255")]
    PathTooDeep,
    #[error("Invalid seed: expected 64 bytes")]
    InvalidSeed,
    #[error("Unknown output key")]
    UnknownKey,
    #[error("Invalid data")]
    InvalidData,
    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),
}
