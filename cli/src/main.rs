// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Threshold Vault CLI
//!
//! Entry point for the `vault` binary. Parses CLI arguments, initializes
//! logging, and runs one subcommand:
//!
//! - `seal`:    encrypt a file, write its manifest, print share tokens
//! - `open`:    recover a file from its manifest and enough shares
//! - `inspect`: describe a share token without printing its payload
//! - `version`: print build version information
//!
//! Share tokens go to stdout, one per line; everything else goes to stderr.

mod bundle;
mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;

use threshold_vault::DigestStatus;

use cli::{Commands, VaultCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = VaultCli::parse();

    logging::init_logging(LogFormat::from_str_lossy(&cli.log_format));

    match cli.command {
        Commands::Seal(args) => {
            let outcome = commands::seal(&args)?;
            let params = outcome.record.params();

            eprintln!("Sealed {}", args.input.display());
            eprintln!("  Ciphertext : {}", outcome.ciphertext_path.display());
            eprintln!("  Manifest   : {}", outcome.manifest_path.display());
            if let Some(path) = &outcome.bundle_path {
                eprintln!("  Bundle     : {}", path.display());
            }
            for path in &outcome.member_files {
                eprintln!("  Share file : {}", path.display());
            }
            eprintln!("  Digest     : {}", outcome.record.digest_hex());
            eprintln!(
                "  Shares     : {} (any {} open it)",
                params.total_shares, params.threshold
            );

            for token in &outcome.record.share_tokens {
                println!("{token}");
            }
            Ok(())
        }
        Commands::Open(args) => {
            let outcome = commands::open(&args)?;

            eprintln!("Recovered {}", outcome.file_meta.name);
            eprintln!("  Written to : {}", outcome.out_path.display());
            eprintln!("  Size       : {} bytes", outcome.bytes_written);
            eprintln!("  Type       : {}", outcome.file_meta.mime_type);
            match outcome.digest {
                DigestStatus::Matched => eprintln!("  Digest     : verified"),
                DigestStatus::Mismatch { expected, actual } => {
                    eprintln!("  Digest     : MISMATCH");
                    eprintln!("    expected {expected}");
                    eprintln!("    actual   {actual}");
                }
                DigestStatus::NotChecked => eprintln!("  Digest     : not checked"),
            }
            Ok(())
        }
        Commands::Inspect(args) => {
            let share = commands::inspect(&args.token)?;
            println!("index      : {}", share.index());
            println!("bit length : {}", share.bit_length());
            println!("payload    : {} bytes", share.values().len());
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("vault          {}", env!("CARGO_PKG_VERSION"));
    println!("library        {}", threshold_vault::config::VAULT_VERSION);
    println!(
        "record format  {}",
        threshold_vault::config::RECORD_FORMAT_VERSION
    );
    println!(
        "cipher         {} / {}",
        threshold_vault::config::SYMMETRIC_ALGORITHM,
        threshold_vault::config::DIGEST_ALGORITHM
    );
    println!("rustc          {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
