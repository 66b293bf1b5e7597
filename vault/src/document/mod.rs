//! # Threshold Vault
//!
//! Seals a document under a one-time AES-256-GCM key and splits that key
//! into `n` share tokens, any `t` of which open the document again.
//!
//! ```text
//!   seal_document                          open_document
//!   ─────────────                          ─────────────
//!   validate (n, t)                        parse iv
//!   envelope::seal(doc) ─► key, iv, ct     decode tokens ─► shares
//!   shamir::split(key)  ─► shares          shamir::combine ─► key
//!   drop key                               envelope::open(ct, key, iv)
//!   codec::encode       ─► tokens          compare digest (advisory)
//! ```
//!
//! The key exists in memory only between encryption and splitting on the
//! way in, and between combining and decryption on the way out. Both copies
//! are zeroized on drop.
//!
//! The plaintext digest is informational. Integrity comes from the GCM tag:
//! a document that decrypts has not been modified, so a digest mismatch is
//! reported in [`OpenedDocument::digest`] and logged, not raised.

pub mod error;
pub mod record;

pub use error::VaultError;
pub use record::{FileMeta, VaultManifest, VaultRecord, DEFAULT_MIME_TYPE};

use rand::{CryptoRng, RngCore};
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::{VaultSettings, AES_NONCE_LENGTH, DIGEST_LENGTH, RECORD_FORMAT_VERSION};
use crate::crypto::envelope::{self, KeyMaterial, SealedEnvelope};
use crate::crypto::hash::{digest_matches_hex, sha256_array};
use crate::sharing::{self, Share, VaultParameters};

// ---------------------------------------------------------------------------
// Open Request
// ---------------------------------------------------------------------------

/// Everything a recovering party brings to [`ThresholdVault::open_document`].
///
/// ```
/// use threshold_vault::document::{FileMeta, OpenRequest, ThresholdVault};
/// use threshold_vault::sharing::VaultParameters;
///
/// let vault = ThresholdVault::default();
/// let params = VaultParameters::new(3, 2).unwrap();
/// let record = vault
///     .seal_document(b"board minutes", FileMeta::new("minutes.txt", 13), params, &mut rand::rngs::OsRng)
///     .unwrap();
///
/// let tokens = [&record.share_tokens[0], &record.share_tokens[2]];
/// let request = OpenRequest::from_hex_iv(&record.ciphertext, &record.iv_hex(), &tokens)
///     .unwrap()
///     .expect_threshold(2)
///     .expect_digest_hex(record.digest_hex());
///
/// let opened = vault.open_document(&request).unwrap();
/// assert_eq!(opened.plaintext, b"board minutes");
/// assert!(opened.digest.is_match());
/// ```
///
/// `Debug` reports sizes and expectations only, never tokens or IV bytes.
#[derive(Clone)]
pub struct OpenRequest<'a> {
    ciphertext: &'a [u8],
    iv: Vec<u8>,
    share_tokens: Vec<&'a str>,
    expected_threshold: Option<u8>,
    expected_digest: Option<String>,
    associated_data: Vec<u8>,
}

impl<'a> OpenRequest<'a> {
    /// Build a request from raw IV bytes. Length is checked when opening.
    pub fn new<S: AsRef<str>>(ciphertext: &'a [u8], iv: &[u8], share_tokens: &'a [S]) -> Self {
        Self {
            ciphertext,
            iv: iv.to_vec(),
            share_tokens: share_tokens.iter().map(|token| token.as_ref()).collect(),
            expected_threshold: None,
            expected_digest: None,
            associated_data: Vec::new(),
        }
    }

    /// Build a request from a hex IV, the form it is stored and shown in.
    ///
    /// Both the hex and the 96-bit length are checked here.
    pub fn from_hex_iv<S: AsRef<str>>(
        ciphertext: &'a [u8],
        iv_hex: &str,
        share_tokens: &'a [S],
    ) -> Result<Self, VaultError> {
        let iv = envelope::parse_iv_hex(iv_hex)?;
        Ok(Self::new(ciphertext, &iv, share_tokens))
    }

    /// Refuse to interpolate from fewer than `threshold` shares.
    pub fn expect_threshold(mut self, threshold: u8) -> Self {
        self.expected_threshold = Some(threshold);
        self
    }

    /// Compare the recovered plaintext against this hex SHA-256 digest.
    pub fn expect_digest_hex(mut self, digest_hex: impl Into<String>) -> Self {
        self.expected_digest = Some(digest_hex.into());
        self
    }

    /// Authenticate `meta` as associated data. Required for records sealed
    /// with metadata binding, fatal for records sealed without.
    pub fn with_metadata(mut self, meta: &FileMeta) -> Result<Self, VaultError> {
        self.associated_data = meta.associated_data()?;
        Ok(self)
    }
}

impl fmt::Debug for OpenRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRequest")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("iv_len", &self.iv.len())
            .field("share_count", &self.share_tokens.len())
            .field("expected_threshold", &self.expected_threshold)
            .field("expected_digest", &self.expected_digest)
            .field("metadata_bound", &!self.associated_data.is_empty())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Open Result
// ---------------------------------------------------------------------------

/// Outcome of the advisory digest comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestStatus {
    Matched,
    Mismatch { expected: String, actual: String },
    /// No expected digest was supplied.
    NotChecked,
}

impl DigestStatus {
    pub fn is_match(&self) -> bool {
        matches!(self, DigestStatus::Matched)
    }
}

/// A successfully authenticated and decrypted document.
#[derive(Debug, Clone)]
pub struct OpenedDocument {
    pub plaintext: Vec<u8>,
    /// SHA-256 of `plaintext`, always recomputed.
    pub plaintext_digest: [u8; DIGEST_LENGTH],
    pub digest: DigestStatus,
}

impl OpenedDocument {
    pub fn digest_hex(&self) -> String {
        hex::encode(self.plaintext_digest)
    }

    /// Turn a digest mismatch into a hard error.
    pub fn require_digest_match(self) -> Result<Vec<u8>, VaultError> {
        match self.digest {
            DigestStatus::Mismatch { expected, actual } => {
                Err(VaultError::DigestMismatch { expected, actual })
            }
            DigestStatus::Matched | DigestStatus::NotChecked => Ok(self.plaintext),
        }
    }
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// Orchestrates envelope encryption and secret sharing.
///
/// Stateless apart from its [`VaultSettings`]; one instance can seal and
/// open any number of documents.
#[derive(Debug, Clone, Default)]
pub struct ThresholdVault {
    settings: VaultSettings,
}

impl ThresholdVault {
    pub fn new(settings: VaultSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &VaultSettings {
        &self.settings
    }

    /// Encrypt `document` and split its key into `params.total_shares` tokens.
    ///
    /// Parameters are validated before any key or nonce is generated. The
    /// document key never leaves this function in one piece.
    ///
    /// # Errors
    ///
    /// [`VaultError::Sharing`] for invalid parameters,
    /// [`VaultError::Metadata`] if metadata binding is on and the metadata
    /// cannot be encoded, [`VaultError::Envelope`] if encryption fails.
    pub fn seal_document<R: RngCore + CryptoRng>(
        &self,
        document: &[u8],
        meta: FileMeta,
        params: VaultParameters,
        rng: &mut R,
    ) -> Result<VaultRecord, VaultError> {
        params.validate()?;

        if meta.size != document.len() as u64 {
            warn!(
                declared = meta.size,
                actual = document.len(),
                "file metadata size does not match document length"
            );
        }

        let aad = if self.settings.bind_metadata {
            meta.associated_data()?
        } else {
            Vec::new()
        };

        let SealedEnvelope {
            ciphertext,
            key,
            iv,
            digest,
        } = envelope::seal(document, &aad, rng)?;

        let shares = sharing::split(key.as_bytes(), &params, rng)?;
        drop(key);

        let share_tokens = shares.iter().map(sharing::encode).collect();
        drop(shares);

        let manifest =
            VaultManifest::new(iv, digest, meta, params, self.settings.bind_metadata);

        info!(
            record_id = %manifest.record_id,
            total_shares = params.total_shares,
            threshold = params.threshold,
            size = document.len(),
            metadata_bound = manifest.metadata_bound,
            "document sealed"
        );

        Ok(VaultRecord {
            manifest,
            ciphertext,
            share_tokens,
        })
    }

    /// Recover the key from the request's tokens and decrypt.
    ///
    /// Token order does not matter. Without an expected threshold, too few
    /// shares reconstruct a wrong key and surface as an authentication
    /// failure.
    ///
    /// # Errors
    ///
    /// [`VaultError::MalformedShare`] names the first token that fails to
    /// decode. Combine-time problems come back as [`VaultError::Sharing`],
    /// cipher problems as [`VaultError::Envelope`].
    pub fn open_document(&self, request: &OpenRequest<'_>) -> Result<OpenedDocument, VaultError> {
        if request.iv.len() != AES_NONCE_LENGTH {
            return Err(envelope::EnvelopeError::InvalidNonceLength {
                got: request.iv.len(),
            }
            .into());
        }

        let shares = request
            .share_tokens
            .iter()
            .enumerate()
            .map(|(position, token)| {
                sharing::decode(token).map_err(|source| VaultError::MalformedShare { position, source })
            })
            .collect::<Result<Vec<Share>, _>>()?;

        let secret = sharing::combine(&shares, request.expected_threshold)?;
        drop(shares);
        let key = KeyMaterial::from_slice(&secret)?;
        drop(secret);

        let plaintext = envelope::open(
            request.ciphertext,
            key.as_bytes(),
            &request.iv,
            &request.associated_data,
        )?;
        drop(key);

        let plaintext_digest = sha256_array(&plaintext);
        let digest = match &request.expected_digest {
            None => DigestStatus::NotChecked,
            Some(expected) if digest_matches_hex(&plaintext_digest, expected) => {
                DigestStatus::Matched
            }
            Some(expected) => {
                let actual = hex::encode(plaintext_digest);
                warn!(%expected, %actual, "recovered document digest mismatch");
                DigestStatus::Mismatch {
                    expected: expected.trim().to_ascii_lowercase(),
                    actual,
                }
            }
        };

        debug!(
            shares = request.share_tokens.len(),
            size = plaintext.len(),
            "document opened"
        );

        Ok(OpenedDocument {
            plaintext,
            plaintext_digest,
            digest,
        })
    }

    /// Open a document described by a stored manifest.
    ///
    /// Applies everything the manifest knows: the recorded threshold is
    /// enforced, the digest is compared, and metadata is authenticated if
    /// it was bound at seal time.
    pub fn open_with_manifest<S: AsRef<str>>(
        &self,
        manifest: &VaultManifest,
        ciphertext: &[u8],
        share_tokens: &[S],
    ) -> Result<OpenedDocument, VaultError> {
        if manifest.format_version != RECORD_FORMAT_VERSION {
            return Err(VaultError::UnsupportedRecordVersion(manifest.format_version));
        }
        manifest.params.validate()?;

        let mut request = OpenRequest::new(ciphertext, &manifest.iv, share_tokens)
            .expect_threshold(manifest.params.threshold)
            .expect_digest_hex(manifest.digest_hex());
        if manifest.metadata_bound {
            request = request.with_metadata(&manifest.file_meta)?;
        }

        let opened = self.open_document(&request)?;
        info!(record_id = %manifest.record_id, "document recovered");
        Ok(opened)
    }

    /// Open an in-memory record with a subset of its own tokens.
    pub fn open_record<S: AsRef<str>>(
        &self,
        record: &VaultRecord,
        share_tokens: &[S],
    ) -> Result<OpenedDocument, VaultError> {
        self.open_with_manifest(&record.manifest, &record.ciphertext, share_tokens)
    }
}

// ---------------------------------------------------------------------------
// Convenience Entry Points
// ---------------------------------------------------------------------------

/// Seal with default settings and `(total_shares, threshold)` as plain integers.
pub fn seal_document<R: RngCore + CryptoRng>(
    document: &[u8],
    meta: FileMeta,
    total_shares: u16,
    threshold: u16,
    rng: &mut R,
) -> Result<VaultRecord, VaultError> {
    let params = VaultParameters::new(total_shares, threshold)?;
    ThresholdVault::default().seal_document(document, meta, params, rng)
}

/// Open with default settings from a hex IV and a set of tokens.
pub fn open_document<S: AsRef<str>>(
    ciphertext: &[u8],
    iv_hex: &str,
    share_tokens: &[S],
) -> Result<Vec<u8>, VaultError> {
    let request = OpenRequest::from_hex_iv(ciphertext, iv_hex, share_tokens)?;
    ThresholdVault::default()
        .open_document(&request)
        .map(|opened| opened.plaintext)
}
