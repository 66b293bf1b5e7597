//! # Secret Sharing
//!
//! Threshold splitting of the document key and the text form shares travel
//! in.
//!
//! ```text
//! shamir.rs  : split/combine over GF(2^8), parameters, share type
//! codec.rs   : share <-> self-describing text token
//! ```
//!
//! The engine knows nothing about documents or ciphers. It splits and
//! combines byte strings; the vault decides that the byte string is an
//! AES key.

pub mod codec;
pub mod shamir;

pub use codec::{decode, encode, CodecError, ShareToken};
pub use shamir::{combine, split, Inconsistency, ShamirError, Share, VaultParameters};
