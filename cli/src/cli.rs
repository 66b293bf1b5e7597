//! # CLI Interface
//!
//! Defines the command-line argument structure for `vault` using `clap`
//! derive. Supports four subcommands: `seal`, `open`, `inspect`, and
//! `version`.

use clap::{ArgGroup, Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;
use zeroize::Zeroize;

use threshold_vault::config::{DEFAULT_THRESHOLD, DEFAULT_TOTAL_SHARES};

/// Threshold document vault.
///
/// Encrypts a file under a one-time key and splits the key into share
/// tokens. Any `t` of the `n` tokens open the file again.
#[derive(Parser, Debug)]
#[command(
    name = "vault",
    about = "Threshold document vault",
    version,
    propagate_version = true
)]
pub struct VaultCli {
    /// Log output format: `pretty` or `json`. Logs go to stderr.
    #[arg(long, global = true, env = "VAULT_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the vault binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encrypt a file and print its share tokens.
    Seal(SealArgs),
    /// Recover a sealed file from its manifest and enough share tokens.
    Open(OpenArgs),
    /// Decode a share token and describe it without revealing the payload.
    Inspect(InspectArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `seal` subcommand.
#[derive(Parser, Debug)]
#[command(group(
    ArgGroup::new("share_files")
        .args(["bundle", "member_files"])
        .multiple(true)
))]
pub struct SealArgs {
    /// File to seal.
    pub input: PathBuf,

    /// Total number of shares to create.
    #[arg(
        long = "total-shares",
        short = 'n',
        env = "VAULT_TOTAL_SHARES",
        default_value_t = DEFAULT_TOTAL_SHARES as u16
    )]
    pub total_shares: u16,

    /// Number of shares required to open the file.
    #[arg(
        long,
        short = 't',
        env = "VAULT_THRESHOLD",
        default_value_t = DEFAULT_THRESHOLD as u16
    )]
    pub threshold: u16,

    /// Declared MIME type. Defaults to `application/octet-stream`.
    #[arg(long)]
    pub mime_type: Option<String>,

    /// Directory for `<file>.enc` and `<file>.vault.json`.
    ///
    /// Defaults to the directory the input file lives in.
    #[arg(long, short = 'o')]
    pub out_dir: Option<PathBuf>,

    /// Authenticate the file name, size and type along with the contents.
    #[arg(long, env = "VAULT_BIND_METADATA")]
    pub bind_metadata: bool,

    /// Also write `<file>.shares.json` with one labelled entry per holder.
    ///
    /// The bundle holds every share. Hand the entries out and delete it.
    #[arg(long)]
    pub bundle: bool,

    /// Also write one `<label>-<file>.share.json` per holder, each holding
    /// that holder's share only.
    #[arg(long)]
    pub member_files: bool,

    /// Holder name, in share order. Repeat once per holder; missing names
    /// default to `Member <i>`.
    #[arg(long = "label", requires = "share_files")]
    pub labels: Vec<String>,

    /// Free-text note embedded in every exported share file.
    #[arg(long, requires = "share_files")]
    pub note: Option<String>,
}

/// Arguments for the `open` subcommand.
///
/// Tokens passed with `--share` are wiped on drop and never printed by
/// `Debug`.
#[derive(Parser)]
pub struct OpenArgs {
    /// The `<file>.enc` ciphertext written by `seal`.
    pub ciphertext: PathBuf,

    /// The `<file>.vault.json` manifest written by `seal`.
    #[arg(long, short = 'm')]
    pub manifest: PathBuf,

    /// A share token. Repeat once per share.
    #[arg(long = "share", short = 's')]
    pub shares: Vec<String>,

    /// Read share tokens from a `<file>.shares.json` bundle or a single
    /// holder's `.share.json` file.
    #[arg(long)]
    pub shares_file: Option<PathBuf>,

    /// Only use bundle entries with this label. Repeatable.
    #[arg(long = "member", requires = "shares_file")]
    pub members: Vec<String>,

    /// Where to write the recovered file.
    #[arg(long, default_value = "recovered.bin")]
    pub out: PathBuf,

    /// Fail instead of warning when the recovered digest does not match.
    #[arg(long)]
    pub require_digest_match: bool,
}

impl fmt::Debug for OpenArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenArgs")
            .field("ciphertext", &self.ciphertext)
            .field("manifest", &self.manifest)
            .field("shares", &format_args!("<{} redacted>", self.shares.len()))
            .field("shares_file", &self.shares_file)
            .field("members", &self.members)
            .field("out", &self.out)
            .field("require_digest_match", &self.require_digest_match)
            .finish()
    }
}

impl Drop for OpenArgs {
    fn drop(&mut self) {
        self.shares.zeroize();
    }
}

/// Arguments for the `inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// The share token to decode.
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        VaultCli::command().debug_assert();
    }

    #[test]
    fn seal_defaults_to_two_of_three() {
        let cli = VaultCli::try_parse_from(["vault", "seal", "report.pdf"]).unwrap();
        match cli.command {
            Commands::Seal(args) => {
                assert_eq!(args.input, PathBuf::from("report.pdf"));
                assert_eq!(args.total_shares, 3);
                assert_eq!(args.threshold, 2);
                assert!(!args.bind_metadata);
                assert!(!args.bundle);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn seal_accepts_labels_with_bundle() {
        let cli = VaultCli::try_parse_from([
            "vault", "seal", "a.bin", "-n", "5", "-t", "3", "--bundle", "--label", "Alice",
            "--label", "Bob",
        ])
        .unwrap();
        let Commands::Seal(args) = cli.command else {
            panic!("expected seal");
        };
        assert_eq!(args.total_shares, 5);
        assert_eq!(args.threshold, 3);
        assert_eq!(args.labels, vec!["Alice", "Bob"]);
    }

    #[test]
    fn label_without_share_files_is_rejected() {
        assert!(VaultCli::try_parse_from(["vault", "seal", "a.bin", "--label", "Alice"]).is_err());
        assert!(VaultCli::try_parse_from(["vault", "seal", "a.bin", "--note", "hi"]).is_err());
    }

    #[test]
    fn member_files_take_labels_and_note() {
        let cli = VaultCli::try_parse_from([
            "vault", "seal", "a.bin", "--member-files", "--label", "Alice", "--note",
            "Keep offline.",
        ])
        .unwrap();
        let Commands::Seal(args) = cli.command else {
            panic!("expected seal");
        };
        assert!(args.member_files);
        assert!(!args.bundle);
        assert_eq!(args.labels, vec!["Alice"]);
        assert_eq!(args.note.as_deref(), Some("Keep offline."));
    }

    #[test]
    fn open_collects_repeated_shares() {
        let cli = VaultCli::try_parse_from([
            "vault", "open", "a.bin.enc", "-m", "a.bin.vault.json", "-s", "801aa", "-s", "802bb",
        ])
        .unwrap();
        let Commands::Open(args) = cli.command else {
            panic!("expected open");
        };
        assert_eq!(args.shares, vec!["801aa", "802bb"]);
        assert_eq!(args.out, PathBuf::from("recovered.bin"));
        assert!(args.shares_file.is_none());
    }

    #[test]
    fn open_args_debug_redacts_tokens() {
        let cli = VaultCli::try_parse_from([
            "vault", "open", "a.bin.enc", "-m", "a.bin.vault.json", "-s", "801aa", "-s", "802bb",
        ])
        .unwrap();
        let rendered = format!("{:?}", cli.command);
        assert!(!rendered.contains("801aa"));
        assert!(!rendered.contains("802bb"));
        assert!(rendered.contains("<2 redacted>"));
    }

    #[test]
    fn open_requires_manifest() {
        assert!(VaultCli::try_parse_from(["vault", "open", "a.bin.enc", "-s", "801aa"]).is_err());
    }
}
