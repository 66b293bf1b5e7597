//! # Share Tokens
//!
//! The canonical text form of a [`Share`]. A token is self-describing: it
//! carries the field size and the share index, so a set of tokens plus the
//! document IV is all a recovering party needs.
//!
//! ```text
//!   8  03  a1b2c3...
//!   │  │   └─ payload: one lowercase hex byte per secret byte
//!   │  └───── index: ceil(bits / 4) hex digits, never zero
//!   └──────── field size in bits, one base-36 digit
//! ```
//!
//! For GF(2^8) the header is always three characters, so a token for a
//! 32-byte key is 67 characters long. Decoding is case-insensitive and
//! ignores surrounding whitespace, which makes tokens safe to paste.
//!
//! Two tokens with the same index decode fine on their own. Spotting the
//! duplicate is the job of [`super::shamir::combine`].

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::SHARE_BIT_LENGTH;
use crate::sharing::shamir::Share;

/// Radix of the bit-length digit.
const BIT_LENGTH_RADIX: u32 = 36;

/// Leading character of every token this crate produces.
const BIT_LENGTH_DIGIT: char = match char::from_digit(SHARE_BIT_LENGTH as u32, BIT_LENGTH_RADIX) {
    Some(digit) => digit.to_ascii_uppercase(),
    None => panic!("share bit length must be a single base-36 digit"),
};

/// Why a token failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed share: token too short ({0} characters)")]
    TooShort(usize),

    #[error("malformed share: {0:?} is not a bit-length digit")]
    BadBitLengthDigit(char),

    #[error("malformed share: unsupported bit length {0}")]
    UnsupportedBitLength(u32),

    #[error("malformed share: non-hex character in {0}")]
    NotHex(&'static str),

    #[error("malformed share: payload has an odd number of hex digits")]
    OddPayload,

    #[error("malformed share: index 0 is reserved for the secret")]
    ZeroIndex,

    #[error("malformed share: index {index} exceeds the {bits}-bit field")]
    IndexOutOfRange { index: u32, bits: u32 },
}

/// Number of hex digits used for the index in a `bits`-bit field.
fn index_width(bits: u32) -> usize {
    bits.div_ceil(4) as usize
}

/// Encode a share into its canonical token.
pub fn encode(share: &Share) -> ShareToken {
    debug_assert_eq!(share.bit_length(), SHARE_BIT_LENGTH);
    let width = index_width(SHARE_BIT_LENGTH as u32);

    let mut token = String::with_capacity(1 + width + share.values().len() * 2);
    token.push(BIT_LENGTH_DIGIT);
    // Writing into a String cannot fail.
    let _ = write!(token, "{:0width$x}", share.index(), width = width);
    for byte in share.values() {
        let _ = write!(token, "{byte:02x}");
    }
    ShareToken(token)
}

/// Decode a token back into a share.
///
/// # Errors
///
/// Every failure is a [`CodecError`]: too short, unsupported bit length,
/// non-hex characters, odd or empty payload, index zero, or an index
/// outside the field.
pub fn decode(token: &str) -> Result<Share, CodecError> {
    let token = token.trim();
    if !token.is_ascii() {
        return Err(CodecError::NotHex("token"));
    }

    let first = token.chars().next().ok_or(CodecError::TooShort(0))?;
    let bits = first
        .to_digit(BIT_LENGTH_RADIX)
        .ok_or(CodecError::BadBitLengthDigit(first))?;
    if bits != SHARE_BIT_LENGTH as u32 {
        return Err(CodecError::UnsupportedBitLength(bits));
    }

    let width = index_width(bits);
    // header plus at least one payload byte
    if token.len() < 1 + width + 2 {
        return Err(CodecError::TooShort(token.len()));
    }

    let (index_hex, payload_hex) = token[1..].split_at(width);

    if !index_hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodecError::NotHex("index"));
    }
    let index = u32::from_str_radix(index_hex, 16).map_err(|_| CodecError::NotHex("index"))?;
    if index == 0 {
        return Err(CodecError::ZeroIndex);
    }
    if index > (1u32 << bits) - 1 {
        return Err(CodecError::IndexOutOfRange { index, bits });
    }

    if payload_hex.len() % 2 != 0 {
        return Err(CodecError::OddPayload);
    }
    let values = hex::decode(payload_hex).map_err(|_| CodecError::NotHex("payload"))?;

    Ok(Share::new(index as u8, values))
}

/// A share in its portable text form.
///
/// Constructed only by [`encode`] or by parsing, so every `ShareToken` is
/// known to decode. `Debug` prints the header only, and the text is wiped
/// on drop.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(try_from = "String", into = "String")]
pub struct ShareToken(String);

impl ShareToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode this token into a share.
    pub fn decode(&self) -> Result<Share, CodecError> {
        decode(&self.0)
    }
}

impl fmt::Debug for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.0.get(..3).unwrap_or(&self.0);
        write!(f, "ShareToken({header}..)")
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShareToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ShareToken {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s).map(|share| encode(&share))
    }
}

impl TryFrom<String> for ShareToken {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShareToken> for String {
    fn from(mut token: ShareToken) -> Self {
        std::mem::take(&mut token.0)
    }
}
