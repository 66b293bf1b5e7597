//! Sealed-record types: what [`super::ThresholdVault::seal_document`]
//! produces and what a recovering party needs back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{AES_NONCE_LENGTH, DIGEST_LENGTH, RECORD_FORMAT_VERSION};
use crate::sharing::{ShareToken, VaultParameters};

/// Declared MIME type when the caller has none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Descriptive metadata about the sealed document.
///
/// Stored next to the ciphertext. Authenticated only when the vault runs
/// with `bind_metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: DEFAULT_MIME_TYPE.to_string(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Canonical byte encoding used as AEAD associated data.
    ///
    /// Compact JSON with fields in declaration order: `{"name":..,"size":..,"type":..}`.
    pub fn associated_data(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Everything about a sealed document except the ciphertext and the shares.
///
/// Safe to store or publish next to the ciphertext: without `t` shares it
/// reveals only the file metadata and the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultManifest {
    pub record_id: Uuid,
    pub format_version: u16,
    pub sealed_at: DateTime<Utc>,
    #[serde(with = "hex::serde")]
    pub iv: [u8; AES_NONCE_LENGTH],
    #[serde(with = "hex::serde")]
    pub plaintext_digest: [u8; DIGEST_LENGTH],
    pub file_meta: FileMeta,
    pub params: VaultParameters,
    pub metadata_bound: bool,
}

impl VaultManifest {
    pub(crate) fn new(
        iv: [u8; AES_NONCE_LENGTH],
        plaintext_digest: [u8; DIGEST_LENGTH],
        file_meta: FileMeta,
        params: VaultParameters,
        metadata_bound: bool,
    ) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            format_version: RECORD_FORMAT_VERSION,
            sealed_at: Utc::now(),
            iv,
            plaintext_digest,
            file_meta,
            params,
            metadata_bound,
        }
    }

    pub fn iv_hex(&self) -> String {
        hex::encode(self.iv)
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.plaintext_digest)
    }
}

/// The full output of one sealing.
///
/// `share_tokens[i]` is the share with index `i + 1`. Hand each token to a
/// different holder and do not store the set next to the ciphertext.
#[derive(Debug, Clone)]
pub struct VaultRecord {
    pub manifest: VaultManifest,
    /// AES-256-GCM ciphertext with the tag appended.
    pub ciphertext: Vec<u8>,
    pub share_tokens: Vec<ShareToken>,
}

impl VaultRecord {
    pub fn iv_hex(&self) -> String {
        self.manifest.iv_hex()
    }

    pub fn digest_hex(&self) -> String {
        self.manifest.digest_hex()
    }

    pub fn params(&self) -> VaultParameters {
        self.manifest.params
    }
}
