//! Address and key formatters.
//!
//! Every formatter validates the shape of the key it is given before encoding
//! and fails with `InvalidPubKey` / `InvalidPrivKey` on mismatch.

use secp256k1::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::base58;
use crate::cashaddr;
use crate::context::ChainContext;
use crate::error::KeyError;
use crate::hash::{hash160, keccak256};
use crate::segwit;

/// Redeem script prefix for a version-0 witness program of 20 bytes: OP_0 PUSH20.
const P2WPKH_SCRIPT_PREFIX: [u8; 2] = [0x00, 0x14];

/// Everything a derived node can be rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    PublicKey,
    P2pkhAddress,
    P2wpkhAddress,
    Xpub,
    Ypub,
    Zpub,
    EthAddress,
    TronAddress,
    KaspaAddress,
    KaspaTestAddress,
    PrivateKey,
    Wif,
    Xprv,
    Yprv,
    Zprv,
    P2shP2wpkhAddress,
}

impl OutputKind {
    pub const ALL: [OutputKind; 16] = [
        OutputKind::PublicKey,
        OutputKind::P2pkhAddress,
        OutputKind::P2wpkhAddress,
        OutputKind::Xpub,
        OutputKind::Ypub,
        OutputKind::Zpub,
        OutputKind::EthAddress,
        OutputKind::TronAddress,
        OutputKind::KaspaAddress,
        OutputKind::KaspaTestAddress,
        OutputKind::PrivateKey,
        OutputKind::Wif,
        OutputKind::Xprv,
        OutputKind::Yprv,
        OutputKind::Zprv,
        OutputKind::P2shP2wpkhAddress,
    ];

    /// Stable numeric id, the position in [`OutputKind::ALL`].
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Result<Self, KeyError> {
        Self::ALL.get(usize::from(id)).copied().ok_or(KeyError::UnknownKey)
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputKind::PublicKey => "Public Key",
            OutputKind::P2pkhAddress => "Bitcoin Address (P2PKH)",
            OutputKind::P2wpkhAddress => "Bitcoin Address (P2WPKH)",
            OutputKind::Xpub => "Extended Public Key (xpub)",
            OutputKind::Ypub => "Extended Public Key (ypub)",
            OutputKind::Zpub => "Extended Public Key (zpub)",
            OutputKind::EthAddress => "Ethereum Address",
            OutputKind::TronAddress => "Tron Address",
            OutputKind::KaspaAddress => "Kaspa Address",
            OutputKind::KaspaTestAddress => "Kaspa Test Address",
            OutputKind::PrivateKey => "Private Key",
            OutputKind::Wif => "Private Key (WIF)",
            OutputKind::Xprv => "Extended Private Key (xprv)",
            OutputKind::Yprv => "Extended Private Key (yprv)",
            OutputKind::Zprv => "Extended Private Key (zprv)",
            OutputKind::P2shP2wpkhAddress => "Bitcoin Address (P2SH-P2WPKH)",
        }
    }

    /// Outputs that can only be produced from a node holding a private key.
    pub fn is_private_only(self) -> bool {
        matches!(
            self,
            OutputKind::PrivateKey | OutputKind::Wif | OutputKind::Xprv | OutputKind::Yprv | OutputKind::Zprv
        )
    }
}

fn check_pubkey(pubkey: &[u8], len: Option<usize>) -> Result<(), KeyError> {
    if len.map_or(false, |len| pubkey.len() != len) || PublicKey::from_slice(pubkey).is_err() {
        return Err(KeyError::InvalidPubKey);
    }
    Ok(())
}

fn check_privkey(privkey: &[u8]) -> Result<(), KeyError> {
    if privkey.len() != 32 || SecretKey::from_slice(privkey).is_err() {
        return Err(KeyError::InvalidPrivKey);
    }
    Ok(())
}

/// Public key for a raw private key, 33 bytes compressed or 65 uncompressed.
pub fn public_key(ctx: &ChainContext, privkey: &[u8], compressed: bool) -> Result<Vec<u8>, KeyError> {
    check_privkey(privkey)?;
    let sk = SecretKey::from_slice(privkey).map_err(|_| KeyError::InvalidPrivKey)?;
    let pk = PublicKey::from_secret_key(ctx.secp(), &sk);
    Ok(if compressed {
        pk.serialize().to_vec()
    } else {
        pk.serialize_uncompressed().to_vec()
    })
}

/// Legacy pay-to-pubkey-hash address. Either key encoding is accepted and
/// hashed as given.
pub fn p2pkh_address(pubkey: &[u8], prefix: u8) -> Result<String, KeyError> {
    check_pubkey(pubkey, None)?;
    let mut payload = Vec::with_capacity(21);
    payload.push(prefix);
    payload.extend_from_slice(&hash160(pubkey));
    Ok(base58::check_encode(&payload))
}

/// Segwit-compatible address: P2WPKH wrapped in P2SH.
pub fn p2sh_p2wpkh_address(compressed_pubkey: &[u8], prefix: u8) -> Result<String, KeyError> {
    check_pubkey(compressed_pubkey, Some(33))?;
    let mut redeem_script = Vec::with_capacity(22);
    redeem_script.extend_from_slice(&P2WPKH_SCRIPT_PREFIX);
    redeem_script.extend_from_slice(&hash160(compressed_pubkey));

    let mut payload = Vec::with_capacity(21);
    payload.push(prefix);
    payload.extend_from_slice(&hash160(&redeem_script));
    Ok(base58::check_encode(&payload))
}

/// Native segwit address.
pub fn p2wpkh_address(compressed_pubkey: &[u8], hrp: &str, version: u8) -> Result<String, KeyError> {
    check_pubkey(compressed_pubkey, Some(33))?;
    segwit::encode(hrp, version, &hash160(compressed_pubkey)).map_err(|e| {
        log::warn!("segwit encoding failed: {}", e);
        KeyError::InvalidData
    })
}

fn account_hash(uncompressed_pubkey: &[u8]) -> Result<[u8; 20], KeyError> {
    check_pubkey(uncompressed_pubkey, Some(65))?;
    let digest = keccak256(&uncompressed_pubkey[1..]);
    let mut account = [0u8; 20];
    account.copy_from_slice(&digest[12..]);
    Ok(account)
}

/// `0x` + lower-case hex of the last 20 bytes of Keccak-256 over the
/// uncompressed key without its format byte.
pub fn eth_address(uncompressed_pubkey: &[u8]) -> Result<String, KeyError> {
    Ok(format!("0x{}", hex::encode(account_hash(uncompressed_pubkey)?)))
}

/// Same account hash as [`eth_address`], behind a version byte and Base58Check.
pub fn tron_address(uncompressed_pubkey: &[u8], prefix: u8) -> Result<String, KeyError> {
    let account = account_hash(uncompressed_pubkey)?;
    let mut payload = Vec::with_capacity(21);
    payload.push(prefix);
    payload.extend_from_slice(&account);
    Ok(base58::check_encode(&payload))
}

/// Kaspa address: type byte 0 followed by the x coordinate of the key.
pub fn kaspa_address(compressed_pubkey: &[u8], prefix: &str) -> Result<String, KeyError> {
    check_pubkey(compressed_pubkey, Some(33))?;
    let mut payload = Vec::with_capacity(33);
    payload.push(0x00);
    payload.extend_from_slice(&compressed_pubkey[1..]);
    Ok(cashaddr::encode(&payload, prefix))
}

/// Wallet import format: prefix ‖ key ‖ [0x01 if compressed] ‖ checksum.
pub fn wif(privkey: &[u8], prefix: u8, compressed: bool) -> Result<String, KeyError> {
    check_privkey(privkey)?;
    let mut payload = Zeroizing::new(Vec::with_capacity(34));
    payload.push(prefix);
    payload.extend_from_slice(privkey);
    if compressed {
        payload.push(0x01);
    }
    Ok(base58::check_encode(&payload))
}
