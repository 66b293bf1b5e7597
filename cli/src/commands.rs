//! # Subcommand Implementations
//!
//! File handling around the library: read the input, call the vault, write
//! the outputs. Printing is left to `main.rs`, so these functions can be
//! driven directly from tests.

use anyhow::{anyhow, bail, Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use threshold_vault::config::VaultSettings;
use threshold_vault::sharing::{self, Share};
use threshold_vault::{
    DigestStatus, FileMeta, ThresholdVault, VaultError, VaultManifest, VaultParameters,
    VaultRecord,
};

use crate::bundle;
use crate::cli::{OpenArgs, SealArgs};

/// What `seal` wrote.
#[derive(Debug)]
pub struct SealOutcome {
    pub ciphertext_path: PathBuf,
    pub manifest_path: PathBuf,
    pub bundle_path: Option<PathBuf>,
    pub member_files: Vec<PathBuf>,
    pub record: VaultRecord,
}

/// What `open` wrote.
#[derive(Debug)]
pub struct OpenOutcome {
    pub out_path: PathBuf,
    pub bytes_written: usize,
    pub digest: DigestStatus,
    pub file_meta: FileMeta,
}

/// `out_dir`, or the directory `input` lives in.
fn output_dir(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    }
}

/// `<dir>/<file name><suffix>`.
fn sibling_path(input: &Path, out_dir: Option<&Path>, suffix: &str) -> Result<PathBuf> {
    let mut name: OsString = input
        .file_name()
        .with_context(|| format!("{} has no file name", input.display()))?
        .to_os_string();
    name.push(suffix);
    Ok(output_dir(input, out_dir).join(name))
}

/// Turn a failed open into a message for the operator.
fn describe_open_failure(err: VaultError) -> anyhow::Error {
    if err.is_internal() {
        tracing::error!(error = %err, "internal error while combining shares");
        return anyhow!(err).context("internal error while opening the document; please report it");
    }
    if err.is_authentication_failure() {
        return anyhow!(err).context(
            "failed to open document: the shares belong to another document or the ciphertext was altered",
        );
    }
    anyhow!(err).context("failed to open document")
}

/// Seal a file: write the ciphertext and manifest, optionally the share
/// files.
pub fn seal(args: &SealArgs) -> Result<SealOutcome> {
    let params = VaultParameters::new(args.total_shares, args.threshold)
        .context("invalid share parameters")?;

    let document = Zeroizing::new(
        std::fs::read(&args.input)
            .with_context(|| format!("failed to read {}", args.input.display()))?,
    );

    let name = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut meta = FileMeta::new(name, document.len() as u64);
    if let Some(mime) = &args.mime_type {
        meta = meta.with_mime_type(mime);
    }

    let vault = ThresholdVault::new(VaultSettings {
        bind_metadata: args.bind_metadata,
    });
    let record = vault
        .seal_document(&document, meta, params, &mut rand::rngs::OsRng)
        .context("failed to seal document")?;

    let out_dir = args.out_dir.as_deref();
    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }

    let ciphertext_path = sibling_path(&args.input, out_dir, ".enc")?;
    std::fs::write(&ciphertext_path, &record.ciphertext)
        .with_context(|| format!("failed to write ciphertext to {}", ciphertext_path.display()))?;

    let manifest_path = sibling_path(&args.input, out_dir, ".vault.json")?;
    let manifest_json =
        serde_json::to_string_pretty(&record.manifest).context("failed to encode manifest")?;
    std::fs::write(&manifest_path, manifest_json)
        .with_context(|| format!("failed to write manifest to {}", manifest_path.display()))?;

    let entries = if args.bundle || args.member_files {
        bundle::build(&record, &args.labels, args.note.as_deref())?
    } else {
        Vec::new()
    };

    let bundle_path = if args.bundle {
        let path = sibling_path(&args.input, out_dir, ".shares.json")?;
        bundle::write(&path, &entries)?;
        tracing::warn!(
            path = %path.display(),
            "share bundle holds every share; distribute the entries and delete it"
        );
        Some(path)
    } else {
        None
    };

    let member_files = if args.member_files {
        let paths = bundle::write_member_files(&output_dir(&args.input, out_dir), &entries)?;
        tracing::info!(count = paths.len(), "wrote one share file per holder");
        paths
    } else {
        Vec::new()
    };

    tracing::info!(
        record_id = %record.manifest.record_id,
        ciphertext = %ciphertext_path.display(),
        manifest = %manifest_path.display(),
        "sealed {}",
        args.input.display()
    );

    Ok(SealOutcome {
        ciphertext_path,
        manifest_path,
        bundle_path,
        member_files,
        record,
    })
}

/// Every token from `--share` followed by those picked from the bundle.
fn collect_tokens(args: &OpenArgs, manifest: &VaultManifest) -> Result<Zeroizing<Vec<String>>> {
    let mut tokens = Zeroizing::new(args.shares.clone());

    if let Some(path) = &args.shares_file {
        let entries = bundle::read(path)?;
        let iv_hex = manifest.iv_hex();
        if entries.iter().any(|e| e.meta.iv != iv_hex) {
            tracing::warn!(
                bundle = %path.display(),
                "bundle entries reference a different IV than the manifest"
            );
        }
        let picked = bundle::select(&entries, &args.members)?;
        tokens.extend(picked.iter().cloned());
    }

    if tokens.is_empty() {
        bail!("no shares supplied; pass --share or --shares-file");
    }
    Ok(tokens)
}

/// Open a sealed file and write the recovered plaintext.
pub fn open(args: &OpenArgs) -> Result<OpenOutcome> {
    let manifest_json = std::fs::read_to_string(&args.manifest)
        .with_context(|| format!("failed to read manifest {}", args.manifest.display()))?;
    let manifest: VaultManifest = serde_json::from_str(&manifest_json)
        .with_context(|| format!("{} is not a valid vault manifest", args.manifest.display()))?;

    let ciphertext = std::fs::read(&args.ciphertext)
        .with_context(|| format!("failed to read ciphertext {}", args.ciphertext.display()))?;

    let tokens = collect_tokens(args, &manifest)?;

    let opened = ThresholdVault::default()
        .open_with_manifest(&manifest, &ciphertext, tokens.as_slice())
        .map_err(describe_open_failure)?;

    let digest = opened.digest.clone();
    let plaintext = if args.require_digest_match {
        Zeroizing::new(opened.require_digest_match()?)
    } else {
        Zeroizing::new(opened.plaintext)
    };

    std::fs::write(&args.out, plaintext.as_slice())
        .with_context(|| format!("failed to write {}", args.out.display()))?;

    tracing::info!(
        record_id = %manifest.record_id,
        out = %args.out.display(),
        bytes = plaintext.len(),
        "recovered {}",
        manifest.file_meta.name
    );

    Ok(OpenOutcome {
        out_path: args.out.clone(),
        bytes_written: plaintext.len(),
        digest,
        file_meta: manifest.file_meta,
    })
}

/// Decode a token far enough to describe it.
pub fn inspect(token: &str) -> Result<Share> {
    sharing::decode(token).context("not a valid share token")
}
