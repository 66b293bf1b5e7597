//! # AES-256-GCM Document Envelopes
//!
//! Authenticated encryption for sealed documents. Every call to [`seal`]
//! draws a brand-new 256-bit key and 96-bit nonce from the caller's CSPRNG,
//! encrypts the document, and hands the key back so the orchestrator can
//! split it into shares. The key is never stored next to the ciphertext.
//!
//! ## Nonce management
//!
//! GCM collapses if a nonce repeats under one key. Here the problem is
//! sidestepped rather than managed: a key encrypts exactly one document,
//! and both key and nonce are fresh random draws per call. Nothing is
//! memoized and nothing is derived from content.
//!
//! ## Wire format
//!
//! `ciphertext` is the GCM output with the 16-byte tag appended. The nonce
//! is returned separately (the surrounding record carries it as hex), which
//! differs from the `nonce || ciphertext` packing used elsewhere because the
//! IV is a first-class field of a sealed record.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::{CryptoRng, RngCore};
use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH, DIGEST_LENGTH};
use crate::crypto::hash::sha256_array;

/// Errors from envelope encryption and decryption.
///
/// Decryption failures are deliberately lumped together. Whether the key,
/// the nonce, the tag or the ciphertext was wrong is nobody's business.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("authentication failed -- wrong key, wrong IV, or tampered ciphertext")]
    AuthenticationFailed,

    #[error("invalid key length: expected {AES_KEY_LENGTH} bytes, got {got}")]
    InvalidKeyLength { got: usize },

    #[error("invalid nonce length: expected {AES_NONCE_LENGTH} bytes, got {got}")]
    InvalidNonceLength { got: usize },

    #[error("nonce is not valid hex")]
    InvalidNonceHex,
}

/// A 256-bit AES key. Wiped from memory when dropped.
///
/// Not `Clone`, not `Serialize`, and `Debug` prints nothing of the key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial([u8; AES_KEY_LENGTH]);

impl KeyMaterial {
    /// Draw a fresh key from `rng`.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut key = [0u8; AES_KEY_LENGTH];
        rng.fill_bytes(&mut key);
        Self(key)
    }

    /// Build a key from a slice, checking the length. The caller remains
    /// responsible for wiping its own copy.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let key: [u8; AES_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| EnvelopeError::InvalidKeyLength { got: bytes.len() })?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; AES_KEY_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial(<redacted>)")
    }
}

/// Output of [`seal`]: everything needed to store the document, plus the
/// key that must be split and then dropped.
pub struct SealedEnvelope {
    /// Ciphertext with the 16-byte GCM tag appended.
    pub ciphertext: Vec<u8>,
    /// The one-time document key.
    pub key: KeyMaterial,
    /// The 96-bit nonce used for this envelope.
    pub iv: [u8; AES_NONCE_LENGTH],
    /// SHA-256 of the plaintext.
    pub digest: [u8; DIGEST_LENGTH],
}

impl fmt::Debug for SealedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedEnvelope")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("key", &self.key)
            .field("iv", &hex::encode(self.iv))
            .field("digest", &hex::encode(self.digest))
            .finish()
    }
}

/// Encrypt `plaintext` under a freshly generated key and nonce.
///
/// `aad` is authenticated but not encrypted; pass an empty slice when there
/// is nothing to bind. The same bytes must be supplied to [`open`].
///
/// # Example
///
/// ```
/// use threshold_vault::crypto::envelope::{open, seal};
///
/// let mut rng = rand::rngs::OsRng;
/// let sealed = seal(b"quarterly numbers", b"", &mut rng).unwrap();
/// let plain = open(&sealed.ciphertext, sealed.key.as_bytes(), &sealed.iv, b"").unwrap();
/// assert_eq!(plain, b"quarterly numbers");
/// ```
pub fn seal<R: RngCore + CryptoRng>(
    plaintext: &[u8],
    aad: &[u8],
    rng: &mut R,
) -> Result<SealedEnvelope, EnvelopeError> {
    let key = KeyMaterial::generate(rng);

    let mut iv = [0u8; AES_NONCE_LENGTH];
    rng.fill_bytes(&mut iv);

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| EnvelopeError::EncryptFailed)?;
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| EnvelopeError::EncryptFailed)?;

    Ok(SealedEnvelope {
        ciphertext,
        key,
        iv,
        digest: sha256_array(plaintext),
    })
}

/// Decrypt and authenticate an envelope.
///
/// Lengths are checked before any cryptographic work. On tag mismatch no
/// plaintext is returned at all.
pub fn open(
    ciphertext: &[u8],
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, EnvelopeError> {
    if key.len() != AES_KEY_LENGTH {
        return Err(EnvelopeError::InvalidKeyLength { got: key.len() });
    }
    if iv.len() != AES_NONCE_LENGTH {
        return Err(EnvelopeError::InvalidNonceLength { got: iv.len() });
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EnvelopeError::AuthenticationFailed)?;
    cipher
        .decrypt(
            Nonce::from_slice(iv),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| EnvelopeError::AuthenticationFailed)
}

/// Parse a hex-encoded 96-bit nonce.
pub fn parse_iv_hex(iv_hex: &str) -> Result<[u8; AES_NONCE_LENGTH], EnvelopeError> {
    let bytes = hex::decode(iv_hex.trim()).map_err(|_| EnvelopeError::InvalidNonceHex)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| EnvelopeError::InvalidNonceLength { got: bytes.len() })
}
