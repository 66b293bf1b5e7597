//! # Plaintext Digests
//!
//! SHA-256 over the document plaintext. The digest travels next to the
//! ciphertext so a recovering party can display and compare it after
//! decryption. It is advisory: integrity is already enforced by the GCM tag,
//! and nothing here is keyed.

use sha2::{Digest, Sha256};

use crate::config::DIGEST_LENGTH;

/// Compute the SHA-256 digest of `data` as a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; DIGEST_LENGTH];
    output.copy_from_slice(&result);
    output
}

/// Compute the SHA-256 digest of `data` as lowercase hex.
///
/// # Example
///
/// ```
/// use threshold_vault::crypto::hash::sha256_hex;
///
/// assert_eq!(
///     sha256_hex(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_array(data))
}

/// Compare a digest against an expected hex string, ignoring case and
/// surrounding whitespace. Malformed hex never matches.
pub fn digest_matches_hex(digest: &[u8; DIGEST_LENGTH], expected_hex: &str) -> bool {
    match hex::decode(expected_hex.trim()) {
        Ok(expected) => expected.as_slice() == digest.as_slice(),
        Err(_) => false,
    }
}
