//! # CLI Interface
//!
//! Defines the command-line argument structure for `paychan` using `clap`
//! derive. Everything a channel operator does without a node connection:
//! key handling, voucher signing and checking, and the local registry.

use alloy_primitives::{Address, U256};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Payment channel operator tool.
///
/// Generates channel keys, signs and verifies payment vouchers, and
/// inspects the local channel registry.
#[derive(Parser, Debug)]
#[command(
    name = "paychan",
    about = "Payment channel operator tool",
    version,
    propagate_version = true
)]
pub struct PaychanCli {
    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "PAYCHAN_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "paychan=info,paychan_protocol=info")]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh secp256k1 channel key.
    Keygen(KeygenArgs),
    /// Print the address and public key of a channel key.
    Address(KeyArgs),
    /// Sign a payment voucher.
    Sign(SignArgs),
    /// Verify a hex-encoded payment voucher.
    Verify(VerifyArgs),
    /// Print the digest a voucher for (channel, value) signs.
    Hash(HashArgs),
    /// Inspect or edit the local channel registry.
    Registry(RegistryArgs),
    /// Print version information and exit.
    Version,
}

/// Where the signing key comes from.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Hex-encoded secret key.
    ///
    /// **Prefer `--key-file` or the environment variable** so the key does
    /// not end up in shell history.
    #[arg(long, env = "PAYCHAN_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// File holding the hex-encoded secret key.
    #[arg(long, conflicts_with = "key")]
    pub key_file: Option<PathBuf>,
}

/// Arguments for the `keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the secret key here (mode 0600) instead of printing it.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

/// Arguments for the `sign` subcommand.
#[derive(Args, Debug)]
pub struct SignArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Channel identifier: `0x` address or base58.
    #[arg(long)]
    pub channel: String,

    /// Cumulative value in wei (decimal or `0x` hex).
    #[arg(long)]
    pub value: U256,

    /// Print the voucher as JSON instead of wire hex.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Hex-encoded voucher wire bytes.
    pub voucher: String,

    /// Also require the voucher to be signed by this address.
    #[arg(long)]
    pub payer: Option<Address>,
}

/// Arguments for the `hash` subcommand.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Channel identifier: `0x` address or base58.
    #[arg(long)]
    pub channel: String,

    /// Cumulative value in wei.
    #[arg(long)]
    pub value: U256,
}

/// Arguments for the `registry` subcommand.
#[derive(Args, Debug)]
pub struct RegistryArgs {
    /// Path to the registry database.
    #[arg(long, env = "PAYCHAN_REGISTRY_DB", default_value = "paychan-registry")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: RegistryCommand,
}

#[derive(Subcommand, Debug)]
pub enum RegistryCommand {
    /// Most recently registered channel for a pair.
    Latest(PairArgs),
    /// Every channel registered for a pair, oldest first.
    List(PairArgs),
    /// Record a channel deployed elsewhere.
    Register {
        #[command(flatten)]
        pair: PairArgs,
        /// Channel contract address.
        #[arg(long)]
        channel: Address,
    },
}

#[derive(Args, Debug)]
pub struct PairArgs {
    #[arg(long)]
    pub payer: Address,
    #[arg(long)]
    pub payee: Address,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        PaychanCli::command().debug_assert();
    }

    #[test]
    fn parses_sign_arguments() {
        let cli = PaychanCli::try_parse_from([
            "paychan",
            "sign",
            "--key",
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            "--channel",
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
            "--value",
            "1500",
        ])
        .unwrap();

        match cli.command {
            Commands::Sign(args) => {
                assert_eq!(args.value, U256::from(1500u64));
                assert!(!args.json);
                assert!(args.key.key.is_some());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn key_and_key_file_conflict() {
        let res = PaychanCli::try_parse_from([
            "paychan", "address", "--key", "00", "--key-file", "/tmp/k",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn parses_registry_register() {
        let cli = PaychanCli::try_parse_from([
            "paychan",
            "registry",
            "--db",
            "/tmp/reg",
            "register",
            "--payer",
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "--payee",
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
            "--channel",
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Registry(RegistryArgs {
                command: RegistryCommand::Register { .. },
                ..
            })
        ));
    }
}
