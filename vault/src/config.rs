//! # Vault Configuration & Constants
//!
//! Every magic number in the vault lives here. The share token format, the
//! cipher parameters and the default `(n, t)` pair all derive from these
//! values, so changing one after shares are in circulation means old tokens
//! stop decoding. Think twice.
//!
//! Runtime knobs that a caller may legitimately flip live in
//! [`VaultSettings`]; everything else is a `const`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

/// Version of the sealed-record layout. Bumped whenever the meaning of a
/// [`crate::document::VaultRecord`] field changes.
pub const RECORD_FORMAT_VERSION: u16 = 1;

/// Human-readable version string for the library, embedded in CLI output.
pub const VAULT_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Cipher Parameters
// ---------------------------------------------------------------------------

/// AES-256-GCM. 256-bit keys, 96-bit nonces, 128-bit tags.
pub const SYMMETRIC_ALGORITHM: &str = "AES-256-GCM";

/// AES-256-GCM key length in bytes. This is also the length of the secret
/// that gets split into shares.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes. Twelve, always.
pub const AES_NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes, appended to ciphertext.
pub const AES_TAG_LENGTH: usize = 16;

/// The plaintext digest is SHA-256.
pub const DIGEST_ALGORITHM: &str = "SHA-256";

/// Digest output length in bytes.
pub const DIGEST_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Secret Sharing Parameters
// ---------------------------------------------------------------------------

/// Field size in bits. Shares are evaluations over GF(2^8), and every token
/// records this value so a share is self-describing.
pub const SHARE_BIT_LENGTH: u8 = 8;

/// Largest share index representable in GF(2^8) (x = 0 is the secret).
pub const MAX_SHARES: u8 = 255;

/// Smallest meaningful threshold. A 1-of-n split is just n copies of the key.
pub const MIN_THRESHOLD: u8 = 2;

/// Default number of shares handed out per sealed document.
pub const DEFAULT_TOTAL_SHARES: u8 = 3;

/// Default number of shares required to open a sealed document.
pub const DEFAULT_THRESHOLD: u8 = 2;

// ---------------------------------------------------------------------------
// Runtime Settings
// ---------------------------------------------------------------------------

/// Behavioural switches for [`crate::document::ThresholdVault`].
///
/// The defaults reproduce the classic behaviour: file metadata travels next
/// to the ciphertext unauthenticated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSettings {
    /// Bind the canonical JSON encoding of the file metadata into the AEAD
    /// associated data. Renaming the file or editing its declared size or
    /// type then makes the envelope fail authentication.
    pub bind_metadata: bool,
}

impl VaultSettings {
    /// Settings with metadata binding switched on.
    pub fn hardened() -> Self {
        Self {
            bind_metadata: true,
        }
    }
}
