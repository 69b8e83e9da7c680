//! NoXS: versioned password-based authenticated encryption.
//!
//! Container layout: `[version:1][salt][ciphertext][tag:16]`. The key is
//! Argon2id(password, salt) and the AEAD nonce is the tail of the salt, so the
//! salt is the only random input. Associated data is empty.
//!
//! | version | byte | salt | nonce | cipher             |
//! |---------|------|------|-------|--------------------|
//! | `One`   | 0x01 | 16   | 12    | ChaCha20-Poly1305  |
//! | `X`     | 0x78 | 24   | 24    | XChaCha20-Poly1305 |

use std::fs;
use std::path::Path;

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce, XChaCha20Poly1305, XNonce,
};
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

pub const KEY_LEN: usize = 32;
pub const TAG_LEN: usize = 16;
const VERSION_PREFIX_LEN: usize = 1;

const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_MEMORY_KIB: u32 = 256 * 1024;
const ARGON2_PARALLELISM: u32 = 2;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoxsError {
    #[error("Invalid input data")]
    InvalidData,
    #[error("Encryption failed")]
    EncryptFailed,
    #[error("Decryption failed")]
    DecryptFailed,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Noxs(#[from] NoxsError),
    #[error("Invalid export format: {0}")]
    InvalidFormat(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoxsVersion {
    One,
    X,
}

impl NoxsVersion {
    pub fn version_byte(self) -> u8 {
        match self {
            NoxsVersion::One => 0x01,
            NoxsVersion::X => 0x78,
        }
    }

    pub fn salt_len(self) -> usize {
        match self {
            NoxsVersion::One => 16,
            NoxsVersion::X => 24,
        }
    }

    pub fn nonce_len(self) -> usize {
        match self {
            NoxsVersion::One => 12,
            NoxsVersion::X => 24,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(NoxsVersion::One),
            0x78 => Some(NoxsVersion::X),
            _ => None,
        }
    }

    fn min_container_len(self) -> usize {
        VERSION_PREFIX_LEN + self.salt_len() + TAG_LEN
    }
}

/// Stretches `password` with Argon2id (t=2, m=256 MiB, p=2, v0x13) into a
/// 32-byte key.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, NoxsError> {
    let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_ITERATIONS, ARGON2_PARALLELISM, Some(KEY_LEN))
        .map_err(|_| NoxsError::InvalidData)?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, &mut key[..])
        .map_err(|_| NoxsError::InvalidData)?;
    Ok(key)
}

/// Draws a fresh salt for `version` and stretches `password` with it.
pub fn derive_key_with_salt<R: RngCore + CryptoRng>(
    rng: &mut R,
    password: &[u8],
    version: NoxsVersion,
) -> Result<(Zeroizing<[u8; KEY_LEN]>, Vec<u8>), NoxsError> {
    let mut salt = vec![0u8; version.salt_len()];
    rng.try_fill_bytes(&mut salt).map_err(|_| NoxsError::EncryptFailed)?;
    let key = derive_key(password, &salt)?;
    Ok((key, salt))
}

/// Encrypts under a key derived from `password` and a fresh OS-random salt.
pub fn encrypt(password: &[u8], plaintext: &[u8], version: NoxsVersion) -> Result<Vec<u8>, NoxsError> {
    encrypt_with_rng(&mut OsRng, password, plaintext, version)
}

pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    password: &[u8],
    plaintext: &[u8],
    version: NoxsVersion,
) -> Result<Vec<u8>, NoxsError> {
    let (key, salt) = derive_key_with_salt(rng, password, version)?;
    log::debug!("noxs encrypt: {:?}, {} bytes", version, plaintext.len());
    encrypt_with_key(&key[..], &salt, plaintext, version)
}

/// Encrypts with an already stretched key. `salt` is written into the
/// container as-is and its tail is the nonce, so it must never be reused
/// with the same key.
pub fn encrypt_with_key(
    key: &[u8],
    salt: &[u8],
    plaintext: &[u8],
    version: NoxsVersion,
) -> Result<Vec<u8>, NoxsError> {
    if key.len() != KEY_LEN || salt.len() != version.salt_len() {
        return Err(NoxsError::InvalidData);
    }
    let nonce = &salt[version.salt_len() - version.nonce_len()..];
    let key = Key::from_slice(key);

    let sealed = match version {
        NoxsVersion::One => ChaCha20Poly1305::new(key).encrypt(Nonce::from_slice(nonce), plaintext),
        NoxsVersion::X => XChaCha20Poly1305::new(key).encrypt(XNonce::from_slice(nonce), plaintext),
    }
    .map_err(|_| NoxsError::EncryptFailed)?;

    let mut container = Vec::with_capacity(VERSION_PREFIX_LEN + salt.len() + sealed.len());
    container.push(version.version_byte());
    container.extend_from_slice(salt);
    container.extend_from_slice(&sealed);
    Ok(container)
}

/// Decrypts with an already stretched key. An unknown version byte is
/// reported as a decryption failure.
pub fn decrypt_with_key(key: &[u8], container: &[u8]) -> Result<Vec<u8>, NoxsError> {
    if key.len() != KEY_LEN {
        return Err(NoxsError::InvalidData);
    }
    let &version_byte = container.first().ok_or(NoxsError::InvalidData)?;
    let version = NoxsVersion::from_byte(version_byte).ok_or(NoxsError::DecryptFailed)?;
    if container.len() < version.min_container_len() {
        return Err(NoxsError::InvalidData);
    }

    let salt_end = VERSION_PREFIX_LEN + version.salt_len();
    let nonce = &container[salt_end - version.nonce_len()..salt_end];
    let sealed = &container[salt_end..];
    let key = Key::from_slice(key);

    let opened = match version {
        NoxsVersion::One => ChaCha20Poly1305::new(key).decrypt(Nonce::from_slice(nonce), sealed),
        NoxsVersion::X => XChaCha20Poly1305::new(key).decrypt(XNonce::from_slice(nonce), sealed),
    };
    opened.map_err(|_| {
        log::warn!("noxs container failed authentication");
        NoxsError::DecryptFailed
    })
}

/// Decrypts with a key re-derived from `password` and the container's salt.
/// An unknown version byte is reported as invalid data.
pub fn decrypt(password: &[u8], container: &[u8]) -> Result<Vec<u8>, NoxsError> {
    let &version_byte = container.first().ok_or(NoxsError::InvalidData)?;
    let version = NoxsVersion::from_byte(version_byte).ok_or(NoxsError::InvalidData)?;
    if container.len() < version.min_container_len() {
        return Err(NoxsError::InvalidData);
    }

    let salt = &container[VERSION_PREFIX_LEN..VERSION_PREFIX_LEN + version.salt_len()];
    let key = derive_key(password, salt)?;
    log::debug!("noxs decrypt: {:?}, {} bytes", version, container.len());
    decrypt_with_key(&key[..], container)
}

/// The key material and derivation settings written to an export file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub key: String,
    #[serde(default)]
    pub passphrase: String,
    pub path: String,
    pub level: usize,
}

impl ExportBundle {
    pub fn seal(&self, password: &str, version: NoxsVersion) -> Result<Vec<u8>, StorageError> {
        let json = Zeroizing::new(serde_json::to_vec(self)?);
        Ok(encrypt(password.as_bytes(), &json, version)?)
    }

    pub fn open(password: &str, container: &[u8]) -> Result<Self, StorageError> {
        let json = Zeroizing::new(decrypt(password.as_bytes(), container)?);
        Ok(serde_json::from_slice(&json)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P, password: &str, version: NoxsVersion) -> Result<(), StorageError> {
        let container = self.seal(password, version)?;
        fs::write(path.as_ref(), container)?;
        log::debug!("export written to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P, password: &str) -> Result<Self, StorageError> {
        let container = fs::read(path.as_ref())?;
        Self::open(password, &container)
    }
}

impl std::fmt::Debug for ExportBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportBundle")
            .field("path", &self.path)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

impl Drop for ExportBundle {
    fn drop(&mut self) {
        self.key.zeroize();
        self.passphrase.zeroize();
    }
}
