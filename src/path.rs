use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeyError;

/// Index offset for hardened children (index >= 0x80000000) i.e., 0x80000000 = 2³¹
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Suffixes accepted as a hardened marker. Besides the ASCII apostrophe, the
/// typographic quotes and accents that keyboards substitute for it are taken.
const HARDENED_MARKERS: [char; 7] = ['\'', '’', '‘', '´', '`', 'h', 'H'];

/// A parsed derivation path: child indexes in walk order plus whether the
/// path is rooted at the private (`m`) or public (`M`) master.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecomposedDerivationPath {
    pub node_indexes: Vec<u32>,
    pub is_private: bool,
}

/// Parses a path such as `m/44'/60'/0'/0/0` or `M/0/1`.
///
/// `allow_empty` admits a bare `m`/`M`; `allow_private` admits the `m` root.
/// Hardened segments are only legal under a private root.
pub fn parse_path(
    path: &str,
    allow_empty: bool,
    allow_private: bool,
) -> Result<DecomposedDerivationPath, KeyError> {
    let path = path.trim();
    let mut chars = path.chars();
    let is_private = match chars.next() {
        Some('m') => true,
        Some('M') => false,
        _ => return Err(KeyError::InvalidDerivationPath),
    };
    if is_private && !allow_private {
        return Err(KeyError::InvalidDerivationPath);
    }

    let rest = chars.as_str();
    let mut node_indexes = Vec::new();
    if !rest.is_empty() {
        let segments = rest
            .strip_prefix('/')
            .ok_or(KeyError::InvalidDerivationPath)?;
        for segment in segments.split('/') {
            node_indexes.push(parse_segment(segment, is_private)?);
        }
    }

    if node_indexes.is_empty() && !allow_empty {
        return Err(KeyError::InvalidDerivationPath);
    }
    Ok(DecomposedDerivationPath {
        node_indexes,
        is_private,
    })
}

fn parse_segment(segment: &str, is_private: bool) -> Result<u32, KeyError> {
    let (digits, hardened) = match segment.chars().last() {
        Some(c) if HARDENED_MARKERS.contains(&c) => (&segment[..segment.len() - c.len_utf8()], true),
        _ => (segment, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(KeyError::InvalidDerivationPath);
    }
    let index: u32 = digits.parse().map_err(|_| KeyError::InvalidDerivationPath)?;
    if index >= HARDENED_OFFSET {
        return Err(KeyError::InvalidDerivationPath);
    }
    if hardened {
        if !is_private {
            return Err(KeyError::InvalidDerivationPath);
        }
        Ok(index + HARDENED_OFFSET)
    } else {
        Ok(index)
    }
}

impl DecomposedDerivationPath {
    pub fn len(&self) -> usize {
        self.node_indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_indexes.is_empty()
    }

    /// How many further siblings follow the index at `position` before the
    /// index would cross into (or out of) the hardened range.
    pub fn max_children_derivable(&self, position: usize) -> Option<u32> {
        let index = *self.node_indexes.get(position)?;
        Some(if index < HARDENED_OFFSET {
            HARDENED_OFFSET - index - 1
        } else {
            u32::MAX - index
        })
    }
}

impl FromStr for DecomposedDerivationPath {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, KeyError> {
        parse_path(s, true, true)
    }
}

impl fmt::Display for DecomposedDerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.is_private { "m" } else { "M" })?;
        for &index in &self.node_indexes {
            if index >= HARDENED_OFFSET {
                write!(f, "/{}'", index - HARDENED_OFFSET)?;
            } else {
                write!(f, "/{}", index)?;
            }
        }
        Ok(())
    }
}

/// Well-known paths, each with the level whose index is usually varied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetPath {
    DefaultPrivate,
    DefaultPublic,
    Bip44Bitcoin,
    Bip44Ethereum,
    Bip44Tron,
    Bip44Kaspa,
    Bip49Bitcoin,
    Bip84Bitcoin,
}

impl PresetPath {
    pub const ALL: [PresetPath; 8] = [
        PresetPath::DefaultPrivate,
        PresetPath::DefaultPublic,
        PresetPath::Bip44Bitcoin,
        PresetPath::Bip44Ethereum,
        PresetPath::Bip44Tron,
        PresetPath::Bip44Kaspa,
        PresetPath::Bip49Bitcoin,
        PresetPath::Bip84Bitcoin,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            PresetPath::DefaultPrivate => "m/0'/0",
            PresetPath::DefaultPublic => "M/0/0",
            PresetPath::Bip44Bitcoin => "m/44'/0'/0'/0/0",
            PresetPath::Bip44Ethereum => "m/44'/60'/0'/0/0",
            PresetPath::Bip44Tron => "m/44'/195'/0'/0/0",
            PresetPath::Bip44Kaspa => "m/44'/111111'/0'/0/0",
            PresetPath::Bip49Bitcoin => "m/49'/0'/0'/0/0",
            PresetPath::Bip84Bitcoin => "m/84'/0'/0'/0/0",
        }
    }

    /// 1-based level
    pub fn level(&self) -> usize {
        match self {
            PresetPath::DefaultPrivate | PresetPath::DefaultPublic => 2,
            PresetPath::Bip44Kaspa => 5,
            _ => 3,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PresetPath::DefaultPrivate => "Default (Private)",
            PresetPath::DefaultPublic => "Default (Public)",
            PresetPath::Bip44Bitcoin => "BIP44 (Bitcoin)",
            PresetPath::Bip44Ethereum => "BIP44 (Ethereum)",
            PresetPath::Bip44Tron => "BIP44 (Tron)",
            PresetPath::Bip44Kaspa => "BIP44 (Kaspa)",
            PresetPath::Bip49Bitcoin => "BIP49 (Bitcoin)",
            PresetPath::Bip84Bitcoin => "BIP84 (Bitcoin)",
        }
    }

    pub fn decompose(&self) -> DecomposedDerivationPath {
        match self.path().parse() {
            Ok(path) => path,
            Err(_) => unreachable!("preset paths are well-formed"),
        }
    }
}
