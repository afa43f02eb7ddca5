// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # paychan
//!
//! Entry point for the `paychan` binary. Parses CLI arguments, initializes
//! logging and dispatches to a subcommand:
//!
//! - `keygen`: generate a channel key
//! - `address`: show the address of a key
//! - `sign`: sign a payment voucher
//! - `verify`: verify a payment voucher
//! - `hash`: print the digest a voucher signs
//! - `registry`: inspect or edit the local channel registry
//! - `version`: print build version information

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;

use paychan_protocol::crypto::{voucher_hash, ChannelKeypair};
use paychan_protocol::registry::{ChannelKey, Registry, SledRegistry};
use paychan_protocol::voucher::{
    channel_id_for, parse_channel_id, sign_voucher, verify_voucher, verify_voucher_from,
    AddressIdResolver, PaymentVoucher,
};

use cli::{Commands, PaychanCli, RegistryCommand};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = PaychanCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format));

    match cli.command {
        Commands::Keygen(args) => keygen(args),
        Commands::Address(args) => show_address(args),
        Commands::Sign(args) => sign(args),
        Commands::Verify(args) => verify(args),
        Commands::Hash(args) => hash(args),
        Commands::Registry(args) => registry(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Resolves the signing key from `--key`, `$PAYCHAN_KEY` or `--key-file`.
fn load_key(args: &cli::KeyArgs) -> Result<ChannelKeypair> {
    let hex_key = match (&args.key, &args.key_file) {
        (Some(key), _) => key.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read key file {}", path.display()))?,
        (None, None) => bail!("no key given: pass --key, --key-file or set PAYCHAN_KEY"),
    };
    ChannelKeypair::from_hex(hex_key.trim()).context("invalid secret key")
}

fn keygen(args: cli::KeygenArgs) -> Result<()> {
    let keypair = ChannelKeypair::generate();

    match &args.out {
        Some(path) => {
            std::fs::write(path, keypair.secret_key_hex())
                .with_context(|| format!("failed to write key to {}", path.display()))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
            }

            tracing::info!(
                address = %keypair.address(),
                path = %path.display(),
                "channel key generated"
            );
            println!("{}", keypair.address());
        }
        None => {
            println!("address     {}", keypair.address());
            println!("secret key  {}", keypair.secret_key_hex());
        }
    }
    Ok(())
}

fn show_address(args: cli::KeyArgs) -> Result<()> {
    let keypair = load_key(&args)?;
    println!("address     {}", keypair.address());
    println!("public key  0x{}", hex::encode(keypair.public_key_compressed()));
    println!("channel id  {}", channel_id_for(&keypair.address()));
    Ok(())
}

fn sign(args: cli::SignArgs) -> Result<()> {
    let keypair = load_key(&args.key)?;
    let voucher = sign_voucher(&AddressIdResolver, &args.channel, args.value, &keypair)
        .context("failed to sign voucher")?;
    tracing::info!(channel = %args.channel, value = %args.value, "voucher signed");

    if args.json {
        let doc = json!({
            "channel_id": voucher.channel_id,
            "value": voucher.value.to_string(),
            "signature": format!("0x{}", hex::encode(&voucher.signature)),
            "public_key": format!("0x{}", hex::encode(&voucher.public_key)),
            "signer": keypair.address().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("{}", voucher.to_hex()?);
    }
    Ok(())
}

fn verify(args: cli::VerifyArgs) -> Result<()> {
    let voucher = PaymentVoucher::from_hex(args.voucher.trim()).context("malformed voucher")?;

    let valid = match &args.payer {
        Some(payer) => verify_voucher_from(&AddressIdResolver, &voucher, payer)?,
        None => verify_voucher(&AddressIdResolver, &voucher)?,
    };
    if !valid {
        bail!("voucher for {} is NOT valid", voucher.channel_id);
    }

    println!("valid: {} wei on channel {}", voucher.value, voucher.channel_id);
    Ok(())
}

fn hash(args: cli::HashArgs) -> Result<()> {
    let Some(channel) = parse_channel_id(&args.channel) else {
        bail!("cannot resolve channel identifier {:?}", args.channel);
    };
    println!("{}", voucher_hash(&channel, &args.value));
    Ok(())
}

async fn registry(args: cli::RegistryArgs) -> Result<()> {
    let store = SledRegistry::open(&args.db)
        .with_context(|| format!("failed to open registry at {}", args.db.display()))?;

    match args.command {
        RegistryCommand::Latest(pair) => {
            let key = ChannelKey::new(pair.payer, pair.payee);
            println!("{}", store.resolve_latest(&key).await?);
        }
        RegistryCommand::List(pair) => {
            let key = ChannelKey::new(pair.payer, pair.payee);
            for address in store.list_all(&key).await? {
                println!("{address}");
            }
        }
        RegistryCommand::Register { pair, channel } => {
            let key = ChannelKey::new(pair.payer, pair.payee);
            store.register(channel, &key).await?;
            tracing::info!(%channel, %key, "channel registered");
        }
    }
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("paychan          {}", env!("CARGO_PKG_VERSION"));
    println!("default gas      {} wei", paychan_protocol::config::DEFAULT_GAS_PRICE_WEI);
    println!("send retries     {}", paychan_protocol::config::SEND_RETRY_LIMIT);
    println!("confirm retries  {}", paychan_protocol::config::CONFIRM_RETRY_LIMIT);
}
