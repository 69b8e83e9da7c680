//! CashAddr-style Bech32 variant.
//!
//! Same base32 alphabet and 8-to-5 bit regrouping as segwit Bech32, but a
//! 40-bit BCH checksum over `prefix & 0x1f ‖ 0 ‖ payload`, eight checksum
//! characters and a `:` separator between prefix and payload.

use thiserror::Error;

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const CHECKSUM_LEN: usize = 8;
const GENERATORS: [u64; 5] = [
    0x98_F2BC_8E61,
    0x79_B76D_99E2,
    0xF3_3E5F_B3C4,
    0xAE_2EAB_E2A8,
    0x1E_4F43_E470,
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CashAddrError {
    #[error("Missing ':' separator")]
    MissingSeparator,
    #[error("Invalid character {0:?}")]
    InvalidCharacter(char),
    #[error("Mixed-case address")]
    MixedCase,
    #[error("Payload too short")]
    TooShort,
    #[error("Invalid checksum")]
    InvalidChecksum,
    #[error("Invalid padding")]
    InvalidPadding,
}

fn polymod(values: impl IntoIterator<Item = u8>) -> u64 {
    let mut c: u64 = 1;
    for d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_FFFF_FFFF) << 5) ^ u64::from(d);
        for (bit, generator) in GENERATORS.iter().enumerate() {
            if (c0 >> bit) & 1 != 0 {
                c ^= generator;
            }
        }
    }
    c ^ 1
}

fn expand_prefix(prefix: &str) -> impl Iterator<Item = u8> + '_ {
    prefix.bytes().map(|b| b & 0x1F).chain(std::iter::once(0))
}

fn create_checksum(prefix: &str, payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let values = expand_prefix(prefix)
        .chain(payload.iter().copied())
        .chain([0u8; CHECKSUM_LEN]);
    let modulus = polymod(values);
    let mut checksum = [0u8; CHECKSUM_LEN];
    for (i, slot) in checksum.iter_mut().enumerate() {
        *slot = ((modulus >> (5 * (7 - i))) & 0x1F) as u8;
    }
    checksum
}

/// Encodes raw `payload` bytes under `prefix`.
pub fn encode(payload: &[u8], prefix: &str) -> String {
    // 8 -> 5 regrouping with padding cannot fail
    let words = bech32::convert_bits(payload, 8, 5, true).unwrap_or_default();
    let checksum = create_checksum(prefix, &words);

    let mut out = String::with_capacity(prefix.len() + 1 + words.len() + CHECKSUM_LEN);
    out.push_str(prefix);
    out.push(':');
    for w in words.iter().chain(checksum.iter()) {
        out.push(CHARSET[*w as usize] as char);
    }
    out
}

/// Decodes `prefix:payload`, verifying the checksum. Returns the prefix and
/// the raw payload bytes.
pub fn decode(address: &str) -> Result<(String, Vec<u8>), CashAddrError> {
    let has_lower = address.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = address.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(CashAddrError::MixedCase);
    }
    let address = address.to_ascii_lowercase();
    let (prefix, data) = address.rsplit_once(':').ok_or(CashAddrError::MissingSeparator)?;

    let mut words = Vec::with_capacity(data.len());
    for c in data.chars() {
        let value = CHARSET
            .iter()
            .position(|&b| b as char == c)
            .ok_or(CashAddrError::InvalidCharacter(c))?;
        words.push(value as u8);
    }
    if words.len() < CHECKSUM_LEN {
        return Err(CashAddrError::TooShort);
    }
    if polymod(expand_prefix(prefix).chain(words.iter().copied())) != 0 {
        return Err(CashAddrError::InvalidChecksum);
    }
    words.truncate(words.len() - CHECKSUM_LEN);
    let payload = bech32::convert_bits(&words, 5, 8, false).map_err(|_| CashAddrError::InvalidPadding)?;
    Ok((prefix.to_string(), payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn bitcoin_cash_p2pkh_vector() {
        let mut payload = vec![0x00];
        payload.extend_from_slice(&hex!("F5BF48B397DAE70BE82B3CCA4793F8EB2B6CDAC9"));
        assert_eq!(
            encode(&payload, "bitcoincash"),
            "bitcoincash:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eylep8ekg2"
        );
    }

    #[test]
    fn decode_verifies_checksum() {
        let (prefix, payload) = decode("bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a").unwrap();
        assert_eq!(prefix, "bitcoincash");
        assert_eq!(payload[0], 0x00);
        assert_eq!(&payload[1..], &hex!("76a04053bda0a88bda5177b86a15c3b29f559873"));

        assert_eq!(
            decode("bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6q"),
            Err(CashAddrError::InvalidChecksum)
        );
    }

    #[test]
    fn prefix_is_part_of_the_checksum() {
        let payload = [0u8; 33];
        let main = encode(&payload, "kaspa");
        let test = encode(&payload, "kaspatest");
        assert_eq!(main.split_once(':').unwrap().1.len(), test.split_once(':').unwrap().1.len());
        assert_ne!(main.split_once(':').unwrap().1, test.split_once(':').unwrap().1);
        let swapped = format!("kaspatest:{}", main.split_once(':').unwrap().1);
        assert_eq!(decode(&swapped), Err(CashAddrError::InvalidChecksum));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(decode("kaspaqqqq"), Err(CashAddrError::MissingSeparator));
        assert_eq!(decode("kaspa:qqqb"), Err(CashAddrError::InvalidCharacter('b')));
        assert_eq!(decode("kaspa:qqq"), Err(CashAddrError::TooShort));
        assert_eq!(decode("Kaspa:qqqqqqqqqq"), Err(CashAddrError::MixedCase));
    }
}
