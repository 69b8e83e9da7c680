use secp256k1::{PublicKey, Scalar, SecretKey};
use zeroize::Zeroizing;

use crate::base58;
use crate::context::{ChainContext, KeyFamily};
use crate::error::KeyError;
use crate::hash::{hash160, hmac_sha512};
use crate::keys::{self, OutputKind};
use crate::mnemonic;
use crate::path::{DecomposedDerivationPath, HARDENED_OFFSET};

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Serialized extended key length before Base58: 78-byte body + checksum.
const EXTENDED_KEY_LEN: usize = 82;
const SEED_LEN: usize = 64;

/// One node of a BIP32 key tree.
///
/// Nodes are plain values: deriving a child never touches the parent, and the
/// only fact a child keeps about its parent is the fingerprint.
#[derive(Clone, PartialEq, Eq)]
pub struct HDNode {
    private_key: Option<SecretKey>,
    public_key: PublicKey,
    chain_code: [u8; 32],
    parent_fingerprint: [u8; 4],
    index: u32,
    depth: u8,
}

impl HDNode {
    /// Creates a depth-0 node from raw key material and a chain code.
    pub fn from_key(
        ctx: &ChainContext,
        key: &[u8],
        is_private: bool,
        chain_code: &[u8],
    ) -> Result<Self, KeyError> {
        let chain_code: [u8; 32] = chain_code
            .try_into()
            .map_err(|_| KeyError::InvalidChainCode)?;

        let (private_key, public_key) = if is_private {
            if key.len() != 32 {
                return Err(KeyError::InvalidPrivKey);
            }
            let sk = SecretKey::from_slice(key).map_err(|_| KeyError::InvalidPrivKey)?;
            (Some(sk), PublicKey::from_secret_key(ctx.secp(), &sk))
        } else {
            let pk = PublicKey::from_slice(key).map_err(|_| KeyError::InvalidPubKey)?;
            (None, pk)
        };

        Ok(HDNode {
            private_key,
            public_key,
            chain_code,
            parent_fingerprint: [0u8; 4],
            index: 0,
            depth: 0,
        })
    }

    /// Creates the master node from a 64-byte seed.
    pub fn from_seed(ctx: &ChainContext, seed: &[u8]) -> Result<Self, KeyError> {
        if seed.len() != SEED_LEN {
            return Err(KeyError::InvalidSeed);
        }
        let digest = Zeroizing::new(hmac_sha512(MASTER_HMAC_KEY, seed));
        let (key, chain_code) = digest.split_at(32);
        let node = Self::from_key(ctx, key, true, chain_code)?;
        log::debug!("master node created from seed, fingerprint {}", hex::encode(node.fingerprint()));
        Ok(node)
    }

    /// Master node of a mnemonic phrase and optional passphrase.
    pub fn from_mnemonic(ctx: &ChainContext, phrase: &str, passphrase: &str) -> Result<Self, KeyError> {
        let seed = Zeroizing::new(mnemonic::seed(phrase, passphrase)?);
        Self::from_seed(ctx, &seed[..])
    }

    /// Parses an xprv/xpub-style string. Any of the three key families of the
    /// context's network is accepted; the version decides public vs private.
    pub fn from_extended_key(ctx: &ChainContext, encoded: &str) -> Result<Self, KeyError> {
        let raw = Zeroizing::new(base58::decode(encoded).map_err(|_| KeyError::InvalidExtendedKey)?);
        if raw.len() != EXTENDED_KEY_LEN {
            return Err(KeyError::InvalidExtendedKey);
        }
        let body = base58::split_checksum(&raw).map_err(|_| KeyError::InvalidExtendedKey)?;

        let version = u32::from_be_bytes([body[0], body[1], body[2], body[3]]);
        let (_, is_private) = ctx
            .params()
            .classify_version(version)
            .ok_or(KeyError::InvalidExtendedKey)?;

        let depth = body[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&body[5..9]);
        let index = u32::from_be_bytes([body[9], body[10], body[11], body[12]]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&body[13..45]);
        let key_data = &body[45..78];

        let (private_key, public_key) = if is_private {
            if key_data[0] != 0x00 {
                return Err(KeyError::InvalidExtendedKey);
            }
            let sk = SecretKey::from_slice(&key_data[1..]).map_err(|_| KeyError::InvalidPrivKey)?;
            (Some(sk), PublicKey::from_secret_key(ctx.secp(), &sk))
        } else {
            let pk = PublicKey::from_slice(key_data).map_err(|_| KeyError::InvalidPubKey)?;
            (None, pk)
        };

        if depth == 0 && parent_fingerprint != [0u8; 4] {
            return Err(KeyError::InvalidFingerprint);
        }
        if depth == 0 && index != 0 {
            return Err(KeyError::InvalidExtendedKey);
        }

        Ok(HDNode {
            private_key,
            public_key,
            chain_code,
            parent_fingerprint,
            index,
            depth,
        })
    }

    pub fn is_private(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    pub fn private_key(&self) -> Option<&SecretKey> {
        self.private_key.as_ref()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn compressed_public_key(&self) -> [u8; 33] {
        self.public_key.serialize()
    }

    pub fn uncompressed_public_key(&self) -> [u8; 65] {
        self.public_key.serialize_uncompressed()
    }

    /// First four bytes of HASH160 of the compressed public key.
    pub fn fingerprint(&self) -> [u8; 4] {
        let hash = hash160(&self.public_key.serialize());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Copy of this node without the private key.
    pub fn neuter(&self) -> Self {
        HDNode {
            private_key: None,
            ..self.clone()
        }
    }

    fn child_digest(&self, data: &[u8], index: u32) -> Result<Zeroizing<[u8; 64]>, KeyError> {
        if self.depth == u8::MAX {
            return Err(KeyError::PathTooDeep);
        }
        let mut input = Zeroizing::new(Vec::with_capacity(37));
        input.extend_from_slice(data);
        input.extend_from_slice(&index.to_be_bytes());
        Ok(Zeroizing::new(hmac_sha512(&self.chain_code, &input)))
    }

    fn child(&self, private_key: Option<SecretKey>, public_key: PublicKey, chain_code: &[u8], index: u32) -> Self {
        let mut code = [0u8; 32];
        code.copy_from_slice(chain_code);
        HDNode {
            private_key,
            public_key,
            chain_code: code,
            parent_fingerprint: self.fingerprint(),
            index,
            depth: self.depth + 1,
        }
    }

    /// CKDpriv: derives the child at `index`, hardened when the top bit is set.
    pub fn derive_private(&self, ctx: &ChainContext, index: u32) -> Result<Self, KeyError> {
        let parent_key = self.private_key.ok_or(KeyError::InvalidPrivKey)?;

        let digest = if index >= HARDENED_OFFSET {
            let mut data = Zeroizing::new([0u8; 33]);
            data[1..].copy_from_slice(&parent_key.secret_bytes());
            self.child_digest(&data[..], index)?
        } else {
            self.child_digest(&self.public_key.serialize(), index)?
        };
        let (il, ir) = digest.split_at(32);

        let tweak = tweak_scalar(il)?;
        let child_key = parent_key
            .add_tweak(&tweak)
            .map_err(|_| KeyError::InvalidChildNode)?;
        let child_public = PublicKey::from_secret_key(ctx.secp(), &child_key);
        Ok(self.child(Some(child_key), child_public, ir, index))
    }

    /// CKDpub: derives the public child at a non-hardened `index`.
    pub fn derive_public(&self, ctx: &ChainContext, index: u32) -> Result<Self, KeyError> {
        if index >= HARDENED_OFFSET {
            return Err(KeyError::HardenedNotAllowed);
        }
        let digest = self.child_digest(&self.public_key.serialize(), index)?;
        let (il, ir) = digest.split_at(32);

        let tweak = tweak_scalar(il)?;
        let child_public = self
            .public_key
            .add_exp_tweak(ctx.secp(), &tweak)
            .map_err(|_| KeyError::InvalidChildNode)?;
        Ok(self.child(None, child_public, ir, index))
    }

    /// Walks every index of `path`, privately for `m` paths and publicly for
    /// `M` paths. The first failing step aborts the walk, so a public node
    /// walking a non-empty `m` path fails with `InvalidPrivKey`.
    pub fn derive_path(&self, ctx: &ChainContext, path: &DecomposedDerivationPath) -> Result<Self, KeyError> {
        if path.len() > usize::from(u8::MAX - self.depth) {
            return Err(KeyError::PathTooDeep);
        }
        let mut node = self.clone();
        for &index in &path.node_indexes {
            node = if path.is_private {
                node.derive_private(ctx, index)?
            } else {
                node.derive_public(ctx, index)?
            };
        }
        log::debug!("derived {} from depth {}", path, self.depth);
        Ok(node)
    }

    /// Base58Check-encodes the node under `family`'s version for the
    /// context's network.
    pub fn serialize(&self, ctx: &ChainContext, as_private: bool, family: KeyFamily) -> Result<String, KeyError> {
        let version = ctx.params().extended_version(family, as_private);

        let mut data = Zeroizing::new(Vec::with_capacity(78));
        data.extend_from_slice(&version.to_be_bytes());
        data.push(self.depth);
        data.extend_from_slice(&self.parent_fingerprint);
        data.extend_from_slice(&self.index.to_be_bytes());
        data.extend_from_slice(&self.chain_code);
        if as_private {
            let sk = self.private_key.as_ref().ok_or(KeyError::PrivKeyNotAccessible)?;
            data.push(0x00);
            data.extend_from_slice(&sk.secret_bytes());
        } else {
            data.extend_from_slice(&self.public_key.serialize());
        }

        Ok(base58::check_encode(&data))
    }

    /// Renders one output column for this node.
    pub fn render(&self, ctx: &ChainContext, kind: OutputKind) -> Result<String, KeyError> {
        let params = ctx.params();
        let secret = || {
            self.private_key
                .as_ref()
                .map(SecretKey::secret_bytes)
                .map(Zeroizing::new)
                .ok_or(KeyError::PrivKeyNotAccessible)
        };
        let compressed = self.public_key.serialize();

        match kind {
            OutputKind::PublicKey => Ok(hex::encode(compressed)),
            OutputKind::P2pkhAddress => {
                let address = keys::p2pkh_address(&compressed, params.p2pkh_prefix)?;
                Ok(format!("{:<34}", address))
            }
            OutputKind::P2wpkhAddress => keys::p2wpkh_address(&compressed, params.segwit_hrp, params.segwit_version),
            OutputKind::P2shP2wpkhAddress => keys::p2sh_p2wpkh_address(&compressed, params.p2sh_prefix),
            OutputKind::Xpub => self.serialize(ctx, false, KeyFamily::Bip32),
            OutputKind::Ypub => self.serialize(ctx, false, KeyFamily::Bip49),
            OutputKind::Zpub => self.serialize(ctx, false, KeyFamily::Bip84),
            OutputKind::EthAddress => keys::eth_address(&self.public_key.serialize_uncompressed()),
            OutputKind::TronAddress => keys::tron_address(&self.public_key.serialize_uncompressed(), params.tron_prefix),
            OutputKind::KaspaAddress => keys::kaspa_address(&compressed, params.kaspa_prefix),
            OutputKind::KaspaTestAddress => keys::kaspa_address(&compressed, params.kaspa_test_prefix),
            OutputKind::PrivateKey => Ok(hex::encode(&secret()?[..])),
            OutputKind::Wif => keys::wif(&secret()?[..], params.wif_prefix, true),
            OutputKind::Xprv => self.serialize(ctx, true, KeyFamily::Bip32),
            OutputKind::Yprv => self.serialize(ctx, true, KeyFamily::Bip49),
            OutputKind::Zprv => self.serialize(ctx, true, KeyFamily::Bip84),
        }
    }
}

/// IL must itself be a valid private key: non-zero and below the curve order.
fn tweak_scalar(il: &[u8]) -> Result<Scalar, KeyError> {
    let sk = SecretKey::from_slice(il).map_err(|_| KeyError::InvalidChildNode)?;
    Ok(Scalar::from(sk))
}

impl std::fmt::Debug for HDNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HDNode")
            .field("public_key", &hex::encode(self.public_key.serialize()))
            .field("has_private_key", &self.private_key.is_some())
            .field("depth", &self.depth)
            .field("index", &self.index)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .finish_non_exhaustive()
    }
}
