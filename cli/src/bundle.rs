//! # Share Bundles
//!
//! A share file carries one holder's share, or every holder's, together
//! with enough context to tell which document it belongs to:
//!
//! ```text
//! { "label": "Member 1", "share": "801...",
//!   "meta": { "file": "report.pdf", "iv": "...", "t": 2, "n": 3 },
//!   "note": "Keep your share offline." }
//! ```
//!
//! `seal --member-files` writes one such object per holder, named
//! `<label>-<file>.share.json`. `seal --bundle` writes all of them as a
//! single JSON array in `<file>.shares.json`. Reading accepts either shape,
//! and `threshold`/`total` are accepted in place of `t`/`n`.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use threshold_vault::{ShareToken, VaultRecord};

/// Context carried with every bundle entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMeta {
    pub file: String,
    pub iv: String,
    #[serde(rename = "t", alias = "threshold")]
    pub threshold: u8,
    #[serde(rename = "n", alias = "total")]
    pub total: u8,
}

/// One holder's share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleEntry {
    pub label: String,
    pub share: ShareToken,
    pub meta: BundleMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl BundleEntry {
    /// `<label>-<file>.share.json`, lowercased, with anything outside
    /// `[a-z0-9._-]` replaced by `-`.
    pub fn file_name(&self) -> String {
        let clean = |s: &str| -> String {
            s.chars()
                .map(|c| match c.to_ascii_lowercase() {
                    c @ ('a'..='z' | '0'..='9' | '.' | '_' | '-') => c,
                    _ => '-',
                })
                .collect()
        };
        let label = clean(self.label.trim());
        let label = if label.trim_matches('.').is_empty() {
            "member".to_string()
        } else {
            label
        };
        format!("{}-{}.share.json", label, clean(&self.meta.file))
    }
}

/// Build one entry per share, labelled from `labels` in order.
pub fn build(
    record: &VaultRecord,
    labels: &[String],
    note: Option<&str>,
) -> Result<Vec<BundleEntry>> {
    let total = record.share_tokens.len();
    if labels.len() > total {
        bail!("{} labels given for {} shares", labels.len(), total);
    }

    let meta = BundleMeta {
        file: record.manifest.file_meta.name.clone(),
        iv: record.iv_hex(),
        threshold: record.params().threshold,
        total: record.params().total_shares,
    };

    Ok(record
        .share_tokens
        .iter()
        .enumerate()
        .map(|(i, share)| BundleEntry {
            label: labels
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("Member {}", i + 1)),
            share: share.clone(),
            meta: meta.clone(),
            note: note.map(str::to_owned),
        })
        .collect())
}

/// Write `json` to `path`, readable by the owner only on Unix.
fn write_private(path: &Path, json: Zeroizing<String>) -> Result<()> {
    std::fs::write(path, json.as_bytes())
        .with_context(|| format!("failed to write share file {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Write every entry into one bundle file.
pub fn write(path: &Path, entries: &[BundleEntry]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries).context("failed to encode share bundle")?;
    write_private(path, Zeroizing::new(json))
}

/// Write one single-object share file per entry into `dir`.
pub fn write_member_files(dir: &Path, entries: &[BundleEntry]) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = dir.join(entry.file_name());
        if paths.contains(&path) {
            bail!(
                "labels {:?} map to the same share file {}",
                entry.label,
                path.display()
            );
        }
        let json = serde_json::to_string_pretty(entry)
            .with_context(|| format!("failed to encode share for {:?}", entry.label))?;
        write_private(&path, Zeroizing::new(json))?;
        paths.push(path);
    }
    Ok(paths)
}

/// Read a share file: a bundle array or a single member's object. Every
/// share in it must decode.
pub fn read(path: &Path) -> Result<Vec<BundleEntry>> {
    let json = Zeroizing::new(
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read share file {}", path.display()))?,
    );
    let value: serde_json::Value = serde_json::from_str(&json)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let entries = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|entry: BundleEntry| vec![entry])
    };
    entries.with_context(|| format!("{} is not a valid share file", path.display()))
}

/// Pick the tokens of the named members, or all of them when `members` is
/// empty. Unknown names are an error.
pub fn select(entries: &[BundleEntry], members: &[String]) -> Result<Zeroizing<Vec<String>>> {
    if members.is_empty() {
        return Ok(Zeroizing::new(
            entries.iter().map(|e| e.share.to_string()).collect(),
        ));
    }

    let mut tokens = Zeroizing::new(Vec::with_capacity(members.len()));
    for name in members {
        let entry = entries
            .iter()
            .find(|e| &e.label == name)
            .with_context(|| format!("no bundle entry labelled {name:?}"))?;
        tokens.push(entry.share.to_string());
    }
    Ok(tokens)
}
