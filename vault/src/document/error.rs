//! Error types for sealing and opening documents.
//!
//! Every orchestrator operation returns a [`VaultError`]. Lower layers keep
//! their own enums; this one wraps them and adds the failures that only
//! make sense once shares, ciphertext and metadata meet.

use thiserror::Error;

use crate::crypto::{EnvelopeError, FieldError};
use crate::sharing::{CodecError, ShamirError};

#[derive(Debug, Error)]
pub enum VaultError {
    /// Bad `n`/`t`, inconsistent shares, too few shares, unmet threshold.
    #[error(transparent)]
    Sharing(#[from] ShamirError),

    /// Bad key or nonce length, or authentication failure.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// A share token could not be decoded. `position` is zero-based in the
    /// order the tokens were supplied.
    #[error("share #{position} is malformed: {source}")]
    MalformedShare {
        position: usize,
        #[source]
        source: CodecError,
    },

    /// The file metadata could not be encoded as associated data.
    #[error("failed to encode file metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// The manifest was written by an incompatible version.
    #[error("unsupported record format version {0}")]
    UnsupportedRecordVersion(u16),

    /// Only produced by [`super::OpenedDocument::require_digest_match`];
    /// `open_document` itself reports a mismatch without failing.
    #[error("plaintext digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },
}

impl VaultError {
    /// Field arithmetic failures mean a bug, not bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, VaultError::Sharing(ShamirError::Field(_)))
    }

    /// True for the errors a wrong or tampered envelope produces.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            VaultError::Envelope(EnvelopeError::AuthenticationFailed)
        )
    }
}

impl From<FieldError> for VaultError {
    fn from(err: FieldError) -> Self {
        VaultError::Sharing(ShamirError::Field(err))
    }
}
