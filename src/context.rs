//! EC provider handle and per-network encoding parameters.
//!
//! A [`ChainContext`] is created once and passed by reference into every
//! operation that touches the curve or a network-specific prefix. Dropping it
//! releases the underlying secp256k1 context.

use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Main,
    Test,
}

/// Extended key version family.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyFamily {
    /// xpub/xprv, tpub/tprv
    Bip32,
    /// ypub/yprv, upub/uprv
    Bip49,
    /// zpub/zprv, vpub/vprv
    Bip84,
}

impl KeyFamily {
    pub const ALL: [KeyFamily; 3] = [KeyFamily::Bip32, KeyFamily::Bip49, KeyFamily::Bip84];
}

/// Public/private 4-byte version pair for one key family.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VersionPair {
    pub public: u32,
    pub private: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkParams {
    pub network: Network,
    pub p2pkh_prefix: u8,
    pub p2sh_prefix: u8,
    pub segwit_hrp: &'static str,
    pub segwit_version: u8,
    pub wif_prefix: u8,
    pub tron_prefix: u8,
    pub kaspa_prefix: &'static str,
    pub kaspa_test_prefix: &'static str,
    bip32: VersionPair,
    bip49: VersionPair,
    bip84: VersionPair,
}

impl NetworkParams {
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Main => NetworkParams {
                network,
                p2pkh_prefix: 0x00,
                p2sh_prefix: 0x05,
                segwit_hrp: "bc",
                segwit_version: 0,
                wif_prefix: 0x80,
                tron_prefix: 0x41,
                kaspa_prefix: "kaspa",
                kaspa_test_prefix: "kaspatest",
                bip32: VersionPair { public: 0x0488_B21E, private: 0x0488_ADE4 },
                bip49: VersionPair { public: 0x049D_7CB2, private: 0x049D_7878 },
                bip84: VersionPair { public: 0x04B2_4746, private: 0x04B2_430C },
            },
            Network::Test => NetworkParams {
                network,
                p2pkh_prefix: 0x6F,
                p2sh_prefix: 0xC4,
                segwit_hrp: "tb",
                segwit_version: 0,
                wif_prefix: 0xEF,
                tron_prefix: 0x41,
                kaspa_prefix: "kaspa",
                kaspa_test_prefix: "kaspatest",
                bip32: VersionPair { public: 0x0435_87CF, private: 0x0435_8394 },
                bip49: VersionPair { public: 0x044A_5262, private: 0x044A_4E28 },
                bip84: VersionPair { public: 0x045F_1CF6, private: 0x045F_18BC },
            },
        }
    }

    pub fn versions(&self, family: KeyFamily) -> VersionPair {
        match family {
            KeyFamily::Bip32 => self.bip32,
            KeyFamily::Bip49 => self.bip49,
            KeyFamily::Bip84 => self.bip84,
        }
    }

    pub fn extended_version(&self, family: KeyFamily, private: bool) -> u32 {
        let pair = self.versions(family);
        if private {
            pair.private
        } else {
            pair.public
        }
    }

    /// Looks up a serialized version: which family it belongs to and whether
    /// it marks a private key. `None` for versions foreign to this network.
    pub fn classify_version(&self, version: u32) -> Option<(KeyFamily, bool)> {
        KeyFamily::ALL.iter().find_map(|&family| {
            let pair = self.versions(family);
            if version == pair.public {
                Some((family, false))
            } else if version == pair.private {
                Some((family, true))
            } else {
                None
            }
        })
    }
}

/// Process-wide handle bundling the secp256k1 context with the selected
/// network's parameters.
pub struct ChainContext {
    secp: Secp256k1<All>,
    params: NetworkParams,
}

impl ChainContext {
    pub fn new(network: Network) -> Self {
        let mut secp = Secp256k1::new();
        secp.randomize(&mut rand::thread_rng());
        log::debug!("created secp256k1 context for {:?} network", network);
        ChainContext {
            secp,
            params: NetworkParams::for_network(network),
        }
    }

    pub fn secp(&self) -> &Secp256k1<All> {
        &self.secp
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    pub fn network(&self) -> Network {
        self.params.network
    }

    /// A 32-byte slice that is a non-zero scalar below the curve order.
    pub fn is_valid_private_key(&self, key: &[u8]) -> bool {
        key.len() == 32 && SecretKey::from_slice(key).is_ok()
    }

    /// A 33-byte compressed or 65-byte uncompressed encoding of a curve point.
    pub fn is_valid_public_key(&self, key: &[u8]) -> bool {
        PublicKey::from_slice(key).is_ok()
    }
}

impl std::fmt::Debug for ChainContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainContext")
            .field("network", &self.params.network)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_mainnet_versions() {
        let params = NetworkParams::for_network(Network::Main);
        assert_eq!(params.classify_version(0x0488_ADE4), Some((KeyFamily::Bip32, true)));
        assert_eq!(params.classify_version(0x049D_7CB2), Some((KeyFamily::Bip49, false)));
        assert_eq!(params.classify_version(0x04B2_430C), Some((KeyFamily::Bip84, true)));
        // tpub is not a mainnet version
        assert_eq!(params.classify_version(0x0435_87CF), None);
    }

    #[test]
    fn testnet_versions_round_trip() {
        let params = NetworkParams::for_network(Network::Test);
        for family in KeyFamily::ALL {
            for private in [false, true] {
                let version = params.extended_version(family, private);
                assert_eq!(params.classify_version(version), Some((family, private)));
            }
        }
    }

    #[test]
    fn key_validity_checks() {
        let ctx = ChainContext::new(Network::Main);
        assert!(!ctx.is_valid_private_key(&[0u8; 32]));
        assert!(!ctx.is_valid_private_key(&[1u8; 31]));
        assert!(ctx.is_valid_private_key(&[1u8; 32]));
        assert!(!ctx.is_valid_private_key(&[0xFF; 32]));

        let sk = SecretKey::from_slice(&[1u8; 32]).unwrap();
        let pk = PublicKey::from_secret_key(ctx.secp(), &sk);
        assert!(ctx.is_valid_public_key(&pk.serialize()));
        assert!(ctx.is_valid_public_key(&pk.serialize_uncompressed()));
        assert!(!ctx.is_valid_public_key(&[0x05; 33]));
    }
}
