//! # Cryptographic Primitives
//!
//! Everything the vault needs below the secret-sharing layer:
//!
//! - **GF(2^8)** (`gf256`): the field Shamir shares live in.
//! - **AES-256-GCM** (`envelope`): one-time document envelopes.
//! - **SHA-256** (`hash`): advisory plaintext digests.
//!
//! The cipher and hash come from audited RustCrypto crates. The field
//! arithmetic is small enough to own outright and is checked against a
//! bitwise reference multiply in its tests.

pub mod envelope;
pub mod gf256;
pub mod hash;

pub use envelope::{EnvelopeError, KeyMaterial, SealedEnvelope};
pub use gf256::FieldError;
pub use hash::{sha256_array, sha256_hex};
