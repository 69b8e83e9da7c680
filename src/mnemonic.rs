//! Mnemonic engine over the `bip39` crate: phrase generation, the stricter
//! input rules applied before parsing, and seed stretching.

use bip39::{Language, Mnemonic};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

/// Entropy sizes in bytes, giving 12, 15, 18, 21 and 24 words.
pub const ENTROPY_LENGTHS: [usize; 5] = [16, 20, 24, 28, 32];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("Invalid entropy length: {0} bytes")]
    InvalidEntropyLength(usize),
    #[error("Invalid mnemonic phrase")]
    InvalidMnemonic,
    #[error("Failed to generate entropy")]
    EntropyUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MnemonicStrength {
    Words12,
    Words15,
    Words18,
    Words21,
    Words24,
}

impl MnemonicStrength {
    pub fn entropy_len(&self) -> usize {
        match self {
            MnemonicStrength::Words12 => 16,
            MnemonicStrength::Words15 => 20,
            MnemonicStrength::Words18 => 24,
            MnemonicStrength::Words21 => 28,
            MnemonicStrength::Words24 => 32,
        }
    }
}

fn is_valid_entropy_len(len: usize) -> bool {
    ENTROPY_LENGTHS.contains(&len)
}

/// Generates a phrase from `entropy_len` bytes of fresh OS randomness.
pub fn generate(entropy_len: usize) -> Result<String, MnemonicError> {
    if !is_valid_entropy_len(entropy_len) {
        return Err(MnemonicError::InvalidEntropyLength(entropy_len));
    }
    let mut entropy = Zeroizing::new(vec![0u8; entropy_len]);
    OsRng
        .try_fill_bytes(&mut entropy)
        .map_err(|_| MnemonicError::EntropyUnavailable)?;
    from_entropy(&entropy)
}

/// Deterministic half of [`generate`].
pub fn from_entropy(entropy: &[u8]) -> Result<String, MnemonicError> {
    if !is_valid_entropy_len(entropy.len()) {
        return Err(MnemonicError::InvalidEntropyLength(entropy.len()));
    }
    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
        .map_err(|_| MnemonicError::InvalidEntropyLength(entropy.len()))?;
    Ok(mnemonic.to_string())
}

/// Validates a phrase and returns its lower-cased words.
///
/// The phrase must be letters-only words separated by whitespace, the word
/// count must map to a supported entropy size, and every word and the
/// embedded checksum must check out against the English list.
pub fn validate_and_extract_words(mnemonic: &str) -> Result<Vec<String>, MnemonicError> {
    parse(mnemonic).map(|(words, _)| words)
}

fn parse(mnemonic: &str) -> Result<(Vec<String>, Mnemonic), MnemonicError> {
    let trimmed = mnemonic.trim();
    if !trimmed.chars().all(|c| c.is_ascii_alphabetic() || c.is_whitespace()) {
        return Err(MnemonicError::InvalidMnemonic);
    }

    let words: Vec<String> = trimmed.split_whitespace().map(str::to_ascii_lowercase).collect();
    if words.len() % 3 != 0 || !is_valid_entropy_len(words.len() * 4 / 3) {
        return Err(MnemonicError::InvalidMnemonic);
    }

    let normalized = Zeroizing::new(words.join(" "));
    let parsed = Mnemonic::parse_in_normalized(Language::English, &normalized).map_err(|e| {
        log::debug!("mnemonic rejected: {}", e);
        MnemonicError::InvalidMnemonic
    })?;
    Ok((words, parsed))
}

/// Stretches a valid phrase and optional passphrase into a 64-byte seed.
///
/// The password is the normalized phrase (lower case, single spaces), the
/// salt is NFKD(`"mnemonic" + passphrase`).
pub fn seed(mnemonic: &str, passphrase: &str) -> Result<[u8; 64], MnemonicError> {
    let (_, parsed) = parse(mnemonic)?;
    let passphrase = Zeroizing::new(passphrase.nfkd().collect::<String>());
    Ok(parsed.to_seed_normalized(&passphrase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn zero_entropy_vector() {
        let phrase = from_entropy(&[0u8; 16]).unwrap();
        assert_eq!(
            phrase,
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
        );
    }

    #[test]
    fn all_ones_entropy_vector() {
        let phrase = from_entropy(&[0xFFu8; 32]).unwrap();
        assert_eq!(
            phrase,
            "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo vote"
        );
    }

    #[test]
    fn trezor_seed_vector() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let seed = seed(phrase, "TREZOR").unwrap();
        assert_eq!(
            seed,
            hex!("c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04")
        );
    }

    #[test]
    fn generate_rejects_unsupported_lengths() {
        for len in [0, 12, 17, 31, 33, 64] {
            assert_eq!(generate(len), Err(MnemonicError::InvalidEntropyLength(len)));
        }
    }

    #[test]
    fn generated_phrases_validate() {
        for (len, strength) in ENTROPY_LENGTHS.iter().zip([
            MnemonicStrength::Words12,
            MnemonicStrength::Words15,
            MnemonicStrength::Words18,
            MnemonicStrength::Words21,
            MnemonicStrength::Words24,
        ]) {
            assert_eq!(strength.entropy_len(), *len);
            let phrase = generate(*len).unwrap();
            let words = validate_and_extract_words(&phrase).unwrap();
            assert_eq!(words.len(), len * 3 / 4);
        }
    }

    #[test]
    fn every_length_round_trips() {
        for len in ENTROPY_LENGTHS {
            let entropy: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(37).wrapping_add(11)).collect();
            let phrase = from_entropy(&entropy).unwrap();
            let parsed = Mnemonic::parse_in_normalized(Language::English, &phrase).unwrap();
            assert_eq!(parsed.to_entropy(), entropy);
            assert_eq!(seed(&phrase, "pass").unwrap(), parsed.to_seed("pass"));
        }
    }

    #[test]
    fn passphrase_is_nfkd_normalized() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        assert_eq!(seed(phrase, "\u{212B}").unwrap(), seed(phrase, "A\u{30A}").unwrap());
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        let messy = "  Abandon abandon\tabandon abandon abandon abandon\nabandon abandon abandon abandon abandon ABOUT ";
        let clean = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        assert_eq!(seed(messy, "").unwrap(), seed(clean, "").unwrap());
    }

    #[test]
    fn rejects_bad_checksum() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        assert_eq!(validate_and_extract_words(phrase), Err(MnemonicError::InvalidMnemonic));
    }

    #[test]
    fn rejects_unknown_words_and_symbols() {
        let unknown = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon bitcoin";
        assert_eq!(validate_and_extract_words(unknown), Err(MnemonicError::InvalidMnemonic));
        let digits = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about1";
        assert_eq!(validate_and_extract_words(digits), Err(MnemonicError::InvalidMnemonic));
    }

    #[test]
    fn rejects_wrong_word_counts() {
        assert_eq!(validate_and_extract_words("abandon"), Err(MnemonicError::InvalidMnemonic));
        assert_eq!(validate_and_extract_words(""), Err(MnemonicError::InvalidMnemonic));
        let eleven = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        assert_eq!(validate_and_extract_words(eleven), Err(MnemonicError::InvalidMnemonic));
    }
}
