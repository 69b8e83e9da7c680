//! Segregated witness addresses (BIP173 / BIP350).
//!
//! Witness version 0 uses the Bech32 checksum, versions 1 through 16 use
//! Bech32m.

use bech32::{u5, Variant};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegwitError {
    #[error("Bech32 error: {0}")]
    Bech32(#[from] bech32::Error),
    #[error("Human-readable part {got:?} does not match expected {expected:?}")]
    HrpMismatch { got: String, expected: String },
    #[error("Missing witness version")]
    MissingVersion,
    #[error("Witness version {0} is not supported")]
    UnsupportedVersion(u8),
    #[error("Witness program size {0} outside 2..=40")]
    InvalidProgramLength(usize),
    #[error("Version 0 witness program must be 20 or 32 bytes, got {0}")]
    InvalidV0ProgramLength(usize),
    #[error("Checksum variant does not match witness version")]
    VariantMismatch,
}

fn variant_for(version: u8) -> Variant {
    if version == 0 {
        Variant::Bech32
    } else {
        Variant::Bech32m
    }
}

fn check_program(version: u8, program: &[u8]) -> Result<(), SegwitError> {
    if version > 16 {
        return Err(SegwitError::UnsupportedVersion(version));
    }
    if program.len() < 2 || program.len() > 40 {
        return Err(SegwitError::InvalidProgramLength(program.len()));
    }
    if version == 0 && program.len() != 20 && program.len() != 32 {
        return Err(SegwitError::InvalidV0ProgramLength(program.len()));
    }
    Ok(())
}

/// Encodes a witness program under `hrp`.
pub fn encode(hrp: &str, version: u8, program: &[u8]) -> Result<String, SegwitError> {
    check_program(version, program)?;
    let mut data = Vec::with_capacity(1 + (program.len() * 8 + 4) / 5);
    data.push(u5::try_from_u8(version)?);
    let regrouped = bech32::convert_bits(program, 8, 5, true)?;
    for value in regrouped {
        data.push(u5::try_from_u8(value)?);
    }
    Ok(bech32::encode(hrp, data, variant_for(version))?)
}

/// Decodes a segwit address, requiring the given human-readable part.
/// Returns the witness version and program.
pub fn decode(hrp: &str, address: &str) -> Result<(u8, Vec<u8>), SegwitError> {
    let (got_hrp, data, variant) = bech32::decode(address)?;
    if got_hrp != hrp.to_lowercase() {
        return Err(SegwitError::HrpMismatch {
            got: got_hrp,
            expected: hrp.to_string(),
        });
    }
    let (version, payload) = data.split_first().ok_or(SegwitError::MissingVersion)?;
    let version = version.to_u8();
    let program = bech32::convert_bits(payload, 5, 8, false)?;
    check_program(version, &program)?;
    if variant != variant_for(version) {
        return Err(SegwitError::VariantMismatch);
    }
    Ok((version, program))
}
