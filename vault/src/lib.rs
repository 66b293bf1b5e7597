// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Threshold Vault: Core Library
//!
//! Seals a document so that no single person can open it. The document is
//! encrypted once under a random AES-256-GCM key, and the key is split with
//! Shamir's scheme into `n` share tokens. Any `t` holders together recover
//! the key and the document; `t - 1` holders learn nothing about it.
//!
//! ## Architecture
//!
//! - **crypto**: GF(2^8) arithmetic, the AES-256-GCM envelope, SHA-256.
//! - **sharing**: Shamir split/combine and the share token text format.
//! - **document**: The orchestrator: `seal_document` and `open_document`.
//! - **config**: Format constants and runtime settings.
//!
//! Each layer only knows the one below it. The sharing engine splits byte
//! strings and has no idea they are keys; the envelope encrypts bytes and
//! has no idea the key gets split.
//!
//! ## Ground Rules
//!
//! 1. Every random byte comes from a caller-supplied `RngCore + CryptoRng`.
//! 2. Key material and shares are zeroized when dropped.
//! 3. Invalid input fails before any cryptographic work happens.
//! 4. A document that fails authentication yields no plaintext at all.

pub mod config;
pub mod crypto;
pub mod document;
pub mod sharing;

pub use document::{
    open_document, seal_document, DigestStatus, FileMeta, OpenRequest, OpenedDocument,
    ThresholdVault, VaultError, VaultManifest, VaultRecord,
};
pub use sharing::{ShareToken, VaultParameters};
