use std::env;
use std::io::{self, BufRead};

use chain_keys::{
    format_rows, mnemonic, ExportBundle, KeyRoot, MnemonicStrength, WalletConfig,
};

/// Usage: derive_addresses [config.json] [export-file]
///
/// Reads a mnemonic or extended key from stdin (a fresh 12-word mnemonic is
/// generated when stdin is empty), prints the configured table and, if an
/// export file is given, seals the input into it under the password from
/// `NOXS_PASSWORD`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => WalletConfig::from_file(path)?,
        None => WalletConfig::default(),
    };
    let ctx = config.context();

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    if input.trim().is_empty() {
        input = mnemonic::generate(MnemonicStrength::Words12.entropy_len())?;
        println!("Generated mnemonic: {}", input);
    }
    let passphrase = env::var("BIP39_PASSPHRASE").unwrap_or_default();

    let root = KeyRoot::from_input(&ctx, &input, &passphrase)?;
    println!("Root fingerprint: {}", hex::encode(root.node().fingerprint()));

    let config = if root.is_private() || !config.path()?.is_private {
        config
    } else {
        config.with_preset(root.default_preset())
    };

    print!("{:<width$}", "Path", width = config.derivation_path.len());
    for kind in &config.outputs {
        print!("  {}", kind.label());
    }
    println!();
    for line in format_rows(&root.derive_configured(&ctx, &config)?) {
        println!("{}", line);
    }

    if let Some(export) = args.next() {
        let password = env::var("NOXS_PASSWORD")?;
        let bundle = root.export(&config.derivation_path, config.level);
        bundle.save(&export, &password, config.noxs_version)?;
        let restored = KeyRoot::from_bundle(&ctx, &ExportBundle::load(&export, &password)?)?;
        if restored.node() != root.node() {
            return Err(format!("export {} does not reload to the same root", export).into());
        }
        println!(
            "Export written to {}, reloads to fingerprint {}",
            export,
            hex::encode(restored.node().fingerprint())
        );
    }

    Ok(())
}
