//! Base58 and Base58Check.
//!
//! Base58Check appends the first four bytes of SHA256(SHA256(payload)) before
//! encoding; leading zero bytes map to leading `1` characters.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Base58Error {
    #[error("Invalid base58 character {0:?}")]
    InvalidCharacter(char),
    #[error("Invalid base58check checksum")]
    InvalidChecksum,
    #[error("Data too short for a base58check checksum")]
    TooShort,
}

impl From<bs58::decode::Error> for Base58Error {
    fn from(err: bs58::decode::Error) -> Self {
        match err {
            bs58::decode::Error::InvalidCharacter { character, .. } => {
                Base58Error::InvalidCharacter(character)
            }
            bs58::decode::Error::NonAsciiCharacter { .. } => Base58Error::InvalidCharacter('\u{FFFD}'),
            bs58::decode::Error::NoChecksum => Base58Error::TooShort,
            _ => Base58Error::InvalidChecksum,
        }
    }
}

pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    Ok(bs58::decode(s.trim()).into_vec()?)
}

/// Encodes `payload ‖ checksum(payload)`.
pub fn check_encode(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Decodes and verifies a Base58Check string, returning the payload without
/// its checksum.
pub fn check_decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    let raw = decode(s)?;
    split_checksum(&raw).map(<[u8]>::to_vec)
}

/// Verifies the trailing four checksum bytes of `data` and returns the payload.
pub fn split_checksum(data: &[u8]) -> Result<&[u8], Base58Error> {
    if data.len() < 5 {
        return Err(Base58Error::TooShort);
    }
    let (payload, checksum) = data.split_at(data.len() - 4);
    if crate::hash::checksum(payload) != checksum {
        return Err(Base58Error::InvalidChecksum);
    }
    Ok(payload)
}
