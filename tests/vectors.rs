//! Published test vectors exercised through the public API.

use chain_keys::{
    mnemonic, segwit, storage, ChainContext, HDNode, KeyFamily, KeyRoot, Network, NoxsError, NoxsVersion, OutputKind,
    DecomposedDerivationPath,
};
use hex_literal::hex;

const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn abandon_root(ctx: &ChainContext) -> HDNode {
    let seed = mnemonic::seed(ABANDON, "").unwrap();
    HDNode::from_seed(ctx, &seed).unwrap()
}

fn render_at(ctx: &ChainContext, root: &HDNode, path: &str, kind: OutputKind) -> String {
    let path: DecomposedDerivationPath = path.parse().unwrap();
    root.derive_path(ctx, &path).unwrap().render(ctx, kind).unwrap()
}

#[test]
fn bip32_vector2() {
    let ctx = ChainContext::new(Network::Main);
    let seed = hex!(
        "fffcf9f6f3f0edeae7e4e1dedbd8d5d2cfccc9c6c3c0bdbab7b4b1aeaba8a5a29f9c999693908d8a8784817e7b7875726f6c696663605d5a5754514e4b484542"
    );
    let master = HDNode::from_seed(&ctx, &seed).unwrap();
    assert_eq!(
        master.render(&ctx, OutputKind::Xprv).unwrap(),
        "xprv9s21ZrQH143K31xYSDQpPDxsXRTUcvj2iNHm5NUtrGiGG5e2DtALGdso3pGz6ssrdK4PFmM8NSpSBHNqPqm55Qn3LqFtT2emdEXVYsCzC2U"
    );
    assert_eq!(
        master.render(&ctx, OutputKind::Xpub).unwrap(),
        "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB"
    );

    let child = master.derive_path(&ctx, &"m/0".parse().unwrap()).unwrap();
    assert_eq!(
        child.render(&ctx, OutputKind::Xprv).unwrap(),
        "xprv9vHkqa6EV4sPZHYqZznhT2NPtPCjKuDKGY38FBWLvgaDx45zo9WQRUT3dKYnjwih2yJD9mkrocEZXo1ex8G81dwSM1fwqWpWkeS3v86pgKt"
    );
    assert_eq!(
        child.render(&ctx, OutputKind::Xpub).unwrap(),
        "xpub69H7F5d8KSRgmmdJg2KhpAK8SR3DjMwAdkxj3ZuxV27CprR9LgpeyGmXUbC6wb7ERfvrnKZjXoUmmDznezpbZb7ap6r1D3tgFxHmwMkQTPH"
    );

    // The public walk from the neutered master reaches the same xpub.
    let public_child = master.neuter().derive_path(&ctx, &"M/0".parse().unwrap()).unwrap();
    assert_eq!(public_child.render(&ctx, OutputKind::Xpub).unwrap(), child.render(&ctx, OutputKind::Xpub).unwrap());
}

#[test]
fn bip32_vector1_hardened_chain() {
    let ctx = ChainContext::new(Network::Main);
    let xprv = "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi";
    let master = HDNode::from_extended_key(&ctx, xprv).unwrap();
    let node = master.derive_path(&ctx, &"m/0'/1/2'".parse().unwrap()).unwrap();
    assert_eq!(
        node.render(&ctx, OutputKind::Xprv).unwrap(),
        "xprv9z4pot5VBttmtdRTWfWQmoH1taj2axGVzFqSb8C9xaxKymcFzXBDptWmT7FwuEzG3ryjH4ktypQSAewRiNMjANTtpgP4mLTj34bhnZX7UiM"
    );
    assert_eq!(
        node.render(&ctx, OutputKind::Xpub).unwrap(),
        "xpub6D4BDPcP2GT577Vvch3R8wDkScZWzQzMMUm3PWbmWvVJrZwQY4VUNgqFJPMM3No2dFDFGTsxxpG5uJh7n7epu4trkrX7x7DogT5Uv6fcLW5"
    );
    assert_eq!(node.depth(), 3);
}

#[test]
fn bip39_zero_entropy_mnemonic() {
    assert_eq!(mnemonic::from_entropy(&[0u8; 16]).unwrap(), ABANDON);
}

#[test]
fn bip44_ethereum_address() {
    let ctx = ChainContext::new(Network::Main);
    let root = abandon_root(&ctx);
    assert_eq!(
        render_at(&ctx, &root, "m/44'/60'/0'/0/0", OutputKind::EthAddress),
        "0x9858effd232b4033e47d90003d41ec34ecaeda94"
    );
    assert_eq!(
        render_at(&ctx, &root, "m/44'/60'/0'/0/0", OutputKind::TronAddress),
        "TPrkFhZ8LH8Mruco8vXyA496TaeFBrbmeU"
    );
}

#[test]
fn bitcoin_address_flavours() {
    let ctx = ChainContext::new(Network::Main);
    let root = abandon_root(&ctx);
    assert_eq!(
        render_at(&ctx, &root, "m/44'/0'/0'/0/0", OutputKind::P2pkhAddress).trim_end(),
        "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA"
    );
    assert_eq!(
        render_at(&ctx, &root, "m/44'/0'/0'/0/0", OutputKind::Wif),
        "L4p2b9VAf8k5aUahF1JCJUzZkgNEAqLfq8DDdQiyAprQAKSbu8hf"
    );
    assert_eq!(
        render_at(&ctx, &root, "m/49'/0'/0'/0/0", OutputKind::P2shP2wpkhAddress),
        "37VucYSaXLCAsxYyAPfbSi9eh4iEcbShgf"
    );

    let p2wpkh = render_at(&ctx, &root, "m/84'/0'/0'/0/0", OutputKind::P2wpkhAddress);
    assert_eq!(p2wpkh, "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu");
    assert_eq!(
        segwit::decode("bc", &p2wpkh).unwrap(),
        (0, hex!("c0cebcd6c3d3ca8c75dc5ec62ebe55330ef910e2").to_vec())
    );
}

#[test]
fn bip84_root_zprv() {
    let ctx = ChainContext::new(Network::Main);
    let zprv = abandon_root(&ctx).render(&ctx, OutputKind::Zprv).unwrap();
    assert_eq!(
        zprv,
        "zprvAWgYBBk7JR8Gjrh4UJQ2uJdG1r3WNRRfURiABBE3RvMXYSrRJL62XuezvGdPvG6GFBZduosCc1YP5wixPox7zhZLfiUm8aunE96BBa4Kei5"
    );
    let reparsed = HDNode::from_extended_key(&ctx, &zprv).unwrap();
    assert_eq!(reparsed.serialize(&ctx, true, KeyFamily::Bip32).unwrap(), abandon_root(&ctx).render(&ctx, OutputKind::Xprv).unwrap());
}

#[test]
fn kaspa_addresses() {
    let ctx = ChainContext::new(Network::Main);
    let root = abandon_root(&ctx);
    assert_eq!(
        render_at(&ctx, &root, "m/44'/111111'/0'/0/0", OutputKind::KaspaAddress),
        "kaspa:qqd6e65yefepe9wk0m9vuxdufxd80sphy67gwwd0vdaumzdt4tc9s3qt0lqeh"
    );
    assert_eq!(
        render_at(&ctx, &root, "m/44'/111111'/0'/0/0", OutputKind::KaspaTestAddress),
        "kaspatest:qqd6e65yefepe9wk0m9vuxdufxd80sphy67gwwd0vdaumzdt4tc9ssxd5s7gn"
    );
}

#[test]
fn testnet_encodings() {
    let ctx = ChainContext::new(Network::Test);
    let root = abandon_root(&ctx);
    assert!(root.render(&ctx, OutputKind::Xprv).unwrap().starts_with("tprv"));
    assert!(root.render(&ctx, OutputKind::Ypub).unwrap().starts_with("upub"));
    assert!(root.render(&ctx, OutputKind::Zpub).unwrap().starts_with("vpub"));
    assert!(root.render(&ctx, OutputKind::P2wpkhAddress).unwrap().starts_with("tb1q"));
    assert!(root.render(&ctx, OutputKind::P2shP2wpkhAddress).unwrap().starts_with('2'));
    assert!(root.render(&ctx, OutputKind::Wif).unwrap().starts_with('c'));
    let p2pkh = root.render(&ctx, OutputKind::P2pkhAddress).unwrap();
    assert!(p2pkh.starts_with('m') || p2pkh.starts_with('n'));
}

#[test]
fn wallet_input_classification() {
    let ctx = ChainContext::new(Network::Main);
    let from_mnemonic = KeyRoot::from_input(&ctx, ABANDON, "").unwrap();
    let xprv = from_mnemonic.node().render(&ctx, OutputKind::Xprv).unwrap();
    let from_xprv = KeyRoot::from_input(&ctx, &xprv, "").unwrap();
    assert_eq!(from_mnemonic.node(), from_xprv.node());

    let with_passphrase = KeyRoot::from_input(&ctx, ABANDON, "TREZOR").unwrap();
    assert_ne!(with_passphrase.node(), from_mnemonic.node());
}

#[test]
fn noxs_wrong_password_is_a_decrypt_error() {
    let container = storage::encrypt(b"pw", b"hello", NoxsVersion::X).unwrap();
    assert_eq!(storage::decrypt(b"wrong", &container), Err(NoxsError::DecryptFailed));
}

#[test]
fn noxs_version_one_round_trip() {
    let container = storage::encrypt(b"pw", b"", NoxsVersion::One).unwrap();
    assert_eq!(container.len(), 1 + 16 + 16);
    assert_eq!(storage::decrypt(b"pw", &container).unwrap(), Vec::<u8>::new());
}
