//! # Shamir's Secret Sharing over GF(256)
//!
//! Splits a secret byte string into `n` shares such that any `t` of them
//! reconstruct it exactly and any `t - 1` reveal nothing. Each byte of the
//! secret gets its own random polynomial of degree `t - 1` whose constant
//! term is that byte; share `i` is the vector of evaluations at `x = i`.
//!
//! ## Security Model
//!
//! - Polynomial coefficients come from the caller's CSPRNG. Passing a
//!   predictable generator breaks the threshold property outright, so the
//!   bound is `RngCore + CryptoRng`, not just `RngCore`.
//! - Share indices are 1-based; x = 0 is the secret itself and is never
//!   emitted.
//! - Coefficient buffers, share payloads and reconstructed secrets are
//!   zeroized when dropped.
//!
//! ## What `combine` cannot tell you
//!
//! Shares carry no authenticity check. Hand `combine` fewer shares than the
//! threshold used at split time and it happily interpolates a *different*
//! polynomial and returns garbage. Callers that know the threshold should
//! pass it as `expected_threshold`; callers that don't must detect a wrong
//! secret some other way (the vault relies on the AES-GCM tag for that).
//!
//! ```
//! use threshold_vault::sharing::shamir::{combine, split, VaultParameters};
//!
//! let secret = b"this is a 32-byte seed value!!!!";
//! let params = VaultParameters::new(5, 3).unwrap();
//! let shares = split(secret, &params, &mut rand::rngs::OsRng).unwrap();
//!
//! // Any 3 of the 5 shares recover the secret.
//! let recovered = combine(&shares[1..4], Some(3)).unwrap();
//! assert_eq!(secret.as_slice(), recovered.as_slice());
//! ```

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::{MAX_SHARES, MIN_THRESHOLD, SHARE_BIT_LENGTH};
use crate::crypto::gf256::{self, FieldError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from splitting and combining.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShamirError {
    /// `n`/`t` outside `2 <= t <= n <= 255`.
    #[error("invalid parameters: need {MIN_THRESHOLD} <= threshold ({threshold}) <= total shares ({total}) <= {MAX_SHARES}")]
    InvalidParameters {
        /// Requested total share count.
        total: u16,
        /// Requested threshold.
        threshold: u16,
    },

    /// Nothing to split.
    #[error("secret must not be empty")]
    EmptySecret,

    /// Fewer than two shares can never determine anything.
    #[error("need at least {MIN_THRESHOLD} shares for reconstruction, got {0}")]
    InsufficientShares(usize),

    /// The supplied shares cannot belong to one sharing instance.
    #[error("inconsistent shares: {0}")]
    Inconsistent(Inconsistency),

    /// The caller asserted a threshold and supplied fewer shares.
    #[error("threshold not met: expected at least {expected} shares, got {supplied}")]
    ThresholdNotMet {
        /// The asserted threshold.
        expected: u8,
        /// How many shares were actually supplied.
        supplied: usize,
    },

    /// Internal arithmetic failure. Unreachable once inputs are validated.
    #[error("field arithmetic failed: {0}")]
    Field(#[from] FieldError),
}

/// Why a set of shares was rejected as inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Inconsistency {
    #[error("bit length {got} does not match {expected}")]
    BitLength { expected: u8, got: u8 },

    #[error("payload length {got} does not match {expected}")]
    PayloadLength { expected: usize, got: usize },

    #[error("share index {0} appears more than once")]
    DuplicateIndex(u8),

    #[error("share index 0 is reserved for the secret")]
    ZeroIndex,
}

impl From<Inconsistency> for ShamirError {
    fn from(reason: Inconsistency) -> Self {
        ShamirError::Inconsistent(reason)
    }
}

// ---------------------------------------------------------------------------
// Public Types
// ---------------------------------------------------------------------------

/// Share count and threshold for one sealing.
///
/// Fixed at seal time. There is deliberately no way to grow or shrink an
/// existing share set: new parameters mean a new key and new shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultParameters {
    /// Total number of shares to generate (`n`).
    pub total_shares: u8,
    /// Minimum number of shares required to reconstruct (`t`).
    pub threshold: u8,
}

impl VaultParameters {
    /// Validate and build parameters.
    ///
    /// # Constraints
    ///
    /// - `threshold >= 2` (1-of-n is just copying the key around)
    /// - `total_shares >= threshold`
    /// - `total_shares <= 255` (indices are non-zero bytes)
    pub fn new(total_shares: u16, threshold: u16) -> Result<Self, ShamirError> {
        let invalid = ShamirError::InvalidParameters {
            total: total_shares,
            threshold,
        };
        if threshold < MIN_THRESHOLD as u16
            || threshold > total_shares
            || total_shares > MAX_SHARES as u16
        {
            return Err(invalid);
        }
        Ok(Self {
            total_shares: total_shares as u8,
            threshold: threshold as u8,
        })
    }

    /// Re-check parameters that may have arrived through deserialization.
    pub fn validate(&self) -> Result<(), ShamirError> {
        Self::new(self.total_shares as u16, self.threshold as u16).map(|_| ())
    }
}

/// One share: the evaluations of every per-byte polynomial at `index`.
///
/// `Debug` shows the index, bit length and payload size, never the payload.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Share {
    pub(crate) index: u8,
    pub(crate) bit_length: u8,
    pub(crate) values: Vec<u8>,
}

impl Share {
    /// Build a GF(2^8) share from its index and payload.
    pub fn new(index: u8, values: Vec<u8>) -> Self {
        Self {
            index,
            bit_length: SHARE_BIT_LENGTH,
            values,
        }
    }

    /// The x-coordinate this share was evaluated at.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Field size in bits recorded with the share.
    pub fn bit_length(&self) -> u8 {
        self.bit_length
    }

    /// One field element per secret byte.
    pub fn values(&self) -> &[u8] {
        &self.values
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("index", &self.index)
            .field("bit_length", &self.bit_length)
            .field("len", &self.values.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Split and Combine
// ---------------------------------------------------------------------------

/// Split `secret` into `params.total_shares` shares.
///
/// Parameters are validated before a single random byte is drawn.
pub fn split<R: RngCore + CryptoRng>(
    secret: &[u8],
    params: &VaultParameters,
    rng: &mut R,
) -> Result<Vec<Share>, ShamirError> {
    params.validate()?;
    if secret.is_empty() {
        return Err(ShamirError::EmptySecret);
    }

    let threshold = params.threshold as usize;

    let mut shares: Vec<Share> = (1..=params.total_shares)
        .map(|index| Share::new(index, Vec::with_capacity(secret.len())))
        .collect();

    // [secret_byte, c_1, ..., c_{t-1}]
    let mut coefficients = Zeroizing::new(vec![0u8; threshold]);

    for &secret_byte in secret {
        coefficients[0] = secret_byte;
        rng.fill_bytes(&mut coefficients[1..]);

        for share in shares.iter_mut() {
            let y = gf256::eval_polynomial(&coefficients, share.index);
            share.values.push(y);
        }
    }

    tracing::debug!(
        total_shares = params.total_shares,
        threshold = params.threshold,
        secret_len = secret.len(),
        "secret split"
    );

    Ok(shares)
}

/// Reconstruct the secret from `shares` by Lagrange interpolation at zero.
///
/// All supplied shares are used; order does not matter. When
/// `expected_threshold` is `Some(t)`, fewer than `t` shares is an error
/// instead of a silently wrong result.
///
/// # Errors
///
/// - [`ShamirError::InsufficientShares`] for fewer than two shares.
/// - [`ShamirError::Inconsistent`] for mixed bit lengths or payload
///   lengths, a zero index, or a repeated index.
/// - [`ShamirError::ThresholdNotMet`] when an asserted threshold is not
///   reached.
pub fn combine(
    shares: &[Share],
    expected_threshold: Option<u8>,
) -> Result<Zeroizing<Vec<u8>>, ShamirError> {
    if shares.len() < MIN_THRESHOLD as usize {
        return Err(ShamirError::InsufficientShares(shares.len()));
    }

    check_consistency(shares)?;

    if let Some(expected) = expected_threshold {
        if shares.len() < expected as usize {
            return Err(ShamirError::ThresholdNotMet {
                expected,
                supplied: shares.len(),
            });
        }
    }

    let secret_len = shares[0].values.len();
    let xs: Vec<u8> = shares.iter().map(|s| s.index).collect();
    let mut ys = Zeroizing::new(vec![0u8; shares.len()]);
    let mut secret = Zeroizing::new(Vec::with_capacity(secret_len));

    for byte_idx in 0..secret_len {
        for (y, share) in ys.iter_mut().zip(shares) {
            *y = share.values[byte_idx];
        }
        secret.push(gf256::lagrange_interpolate_at_zero(&xs, &ys)?);
    }

    tracing::debug!(
        shares = shares.len(),
        secret_len,
        "secret reconstructed"
    );

    Ok(secret)
}

/// Reject share sets that cannot come from one sharing instance.
fn check_consistency(shares: &[Share]) -> Result<(), Inconsistency> {
    let first = &shares[0];
    if first.bit_length != SHARE_BIT_LENGTH {
        return Err(Inconsistency::BitLength {
            expected: SHARE_BIT_LENGTH,
            got: first.bit_length,
        });
    }

    let mut seen = [false; 256];
    for share in shares {
        if share.bit_length != first.bit_length {
            return Err(Inconsistency::BitLength {
                expected: first.bit_length,
                got: share.bit_length,
            });
        }
        if share.values.len() != first.values.len() {
            return Err(Inconsistency::PayloadLength {
                expected: first.values.len(),
                got: share.values.len(),
            });
        }
        if share.index == 0 {
            return Err(Inconsistency::ZeroIndex);
        }
        if seen[share.index as usize] {
            return Err(Inconsistency::DuplicateIndex(share.index));
        }
        seen[share.index as usize] = true;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn params(n: u16, t: u16) -> VaultParameters {
        VaultParameters::new(n, t).unwrap()
    }

    #[test]
    fn basic_2_of_3_split_and_combine() {
        let secret = b"attack at dawn!!";
        let shares = split(secret, &params(3, 2), &mut rng(1)).unwrap();
        assert_eq!(shares.len(), 3);

        for pair in [[0, 1], [1, 2], [0, 2]] {
            let subset = vec![shares[pair[0]].clone(), shares[pair[1]].clone()];
            let recovered = combine(&subset, Some(2)).unwrap();
            assert_eq!(secret.as_slice(), recovered.as_slice());
        }
    }

    #[test]
    fn every_threshold_subset_recovers_for_small_parameters() {
        let mut rng = rng(2);
        for n in 2..=20u16 {
            for t in 2..=n {
                let mut secret = [0u8; 32];
                rng.fill_bytes(&mut secret);
                let mut shares = split(&secret, &params(n, t), &mut rng).unwrap();

                // A few random t-sized subsets per (n, t), in random order.
                for _ in 0..3 {
                    shares.shuffle(&mut rng);
                    let recovered = combine(&shares[..t as usize], Some(t as u8)).unwrap();
                    assert_eq!(secret.as_slice(), recovered.as_slice(), "n={n} t={t}");
                }
            }
        }
    }

    #[test]
    fn more_than_threshold_also_recovers() {
        let secret = [0x42u8; 32];
        let shares = split(&secret, &params(7, 3), &mut rng(3)).unwrap();
        let recovered = combine(&shares, Some(3)).unwrap();
        assert_eq!(secret.as_slice(), recovered.as_slice());
    }

    #[test]
    fn combine_is_order_independent() {
        let secret = b"order does not matter";
        let shares = split(secret, &params(5, 3), &mut rng(4)).unwrap();
        let a = combine(&[shares[4].clone(), shares[1].clone(), shares[3].clone()], None).unwrap();
        let b = combine(&[shares[1].clone(), shares[3].clone(), shares[4].clone()], None).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
        assert_eq!(a.as_slice(), secret.as_slice());
    }

    #[test]
    fn split_never_emits_index_zero() {
        let shares = split(&[1, 2, 3], &params(255, 2), &mut rng(5)).unwrap();
        let indices: Vec<u8> = shares.iter().map(Share::index).collect();
        assert!(!indices.contains(&0));
        assert_eq!(indices, (1..=255).collect::<Vec<u8>>());
    }

    #[test]
    fn split_is_reproducible_with_seeded_rng() {
        let secret = [7u8; 32];
        let a = split(&secret, &params(4, 3), &mut rng(6)).unwrap();
        let b = split(&secret, &params(4, 3), &mut rng(6)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn below_threshold_without_assertion_is_silently_wrong() {
        let secret = [0xA5u8; 32];
        let shares = split(&secret, &params(5, 3), &mut rng(7)).unwrap();
        let recovered = combine(&shares[..2], None).unwrap();
        assert_ne!(secret.as_slice(), recovered.as_slice());
    }

    #[test]
    fn below_asserted_threshold_is_an_error() {
        let shares = split(&[1u8; 32], &params(5, 3), &mut rng(8)).unwrap();
        assert_eq!(
            combine(&shares[..2], Some(3)),
            Err(ShamirError::ThresholdNotMet {
                expected: 3,
                supplied: 2
            })
        );
    }

    #[test]
    fn t_minus_one_shares_span_the_whole_field() {
        // With t-1 real shares, every guess for the missing t-th point yields a
        // different candidate secret byte, so all 256 values stay possible.
        let secret = [0x3Cu8; 4];
        let mut rng = rng(9);
        for _ in 0..20 {
            let shares = split(&secret, &params(5, 3), &mut rng).unwrap();
            let known = [shares[0].clone(), shares[3].clone()];

            for byte_idx in 0..secret.len() {
                let mut outputs = [false; 256];
                for guess in 0..=255u8 {
                    let mut fake = shares[2].clone();
                    fake.values[byte_idx] = guess;
                    let candidate = combine(&[known[0].clone(), known[1].clone(), fake], None)
                        .unwrap();
                    outputs[candidate[byte_idx] as usize] = true;
                }
                assert!(outputs.iter().all(|&hit| hit));
            }
        }
    }

    #[test]
    fn single_share_values_are_not_the_secret() {
        // Statistical smoke test: across many splits, one share's byte equals the
        // secret byte about 1/256 of the time, never systematically.
        let secret = [0x99u8; 64];
        let mut rng = rng(10);
        let mut equal = 0usize;
        let trials = 200;
        for _ in 0..trials {
            let shares = split(&secret, &params(3, 2), &mut rng).unwrap();
            equal += shares[0].values().iter().filter(|&&v| v == 0x99).count();
        }
        let total = trials * secret.len();
        assert!(equal < total / 32, "{equal} of {total} bytes leaked");
    }

    #[test]
    fn parameter_validation() {
        assert_eq!(
            VaultParameters::new(3, 5),
            Err(ShamirError::InvalidParameters {
                total: 3,
                threshold: 5
            })
        );
        assert_eq!(
            VaultParameters::new(1, 1),
            Err(ShamirError::InvalidParameters {
                total: 1,
                threshold: 1
            })
        );
        assert!(VaultParameters::new(3, 1).is_err());
        assert!(VaultParameters::new(256, 2).is_err());
        assert!(VaultParameters::new(2, 2).is_ok());
        assert!(VaultParameters::new(255, 255).is_ok());
    }

    #[test]
    fn split_revalidates_deserialized_parameters() {
        let bogus = VaultParameters {
            total_shares: 3,
            threshold: 5,
        };
        assert!(matches!(
            split(&[1, 2, 3], &bogus, &mut rng(11)),
            Err(ShamirError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn empty_secret_rejected() {
        assert_eq!(
            split(&[], &params(3, 2), &mut rng(12)),
            Err(ShamirError::EmptySecret)
        );
    }

    #[test]
    fn single_share_is_insufficient() {
        let shares = split(&[1u8; 32], &params(3, 2), &mut rng(13)).unwrap();
        assert_eq!(
            combine(&shares[..1], None),
            Err(ShamirError::InsufficientShares(1))
        );
        assert_eq!(combine(&[], Some(2)), Err(ShamirError::InsufficientShares(0)));
    }

    #[test]
    fn duplicate_share_indices_rejected() {
        let share = Share::new(1, vec![42]);
        assert_eq!(
            combine(&[share.clone(), share], None),
            Err(ShamirError::Inconsistent(Inconsistency::DuplicateIndex(1)))
        );
    }

    #[test]
    fn zero_index_rejected() {
        let shares = [Share::new(0, vec![1]), Share::new(2, vec![2])];
        assert_eq!(
            combine(&shares, None),
            Err(ShamirError::Inconsistent(Inconsistency::ZeroIndex))
        );
    }

    #[test]
    fn inconsistent_payload_lengths_rejected() {
        let shares = [Share::new(1, vec![1, 2, 3]), Share::new(2, vec![4, 5])];
        assert_eq!(
            combine(&shares, None),
            Err(ShamirError::Inconsistent(Inconsistency::PayloadLength {
                expected: 3,
                got: 2
            }))
        );
    }

    #[test]
    fn inconsistent_bit_lengths_rejected() {
        let mut odd = Share::new(2, vec![4]);
        odd.bit_length = 7;
        let shares = [Share::new(1, vec![1]), odd];
        assert_eq!(
            combine(&shares, None),
            Err(ShamirError::Inconsistent(Inconsistency::BitLength {
                expected: 8,
                got: 7
            }))
        );
    }

    #[test]
    fn share_debug_hides_payload() {
        let share = Share::new(3, vec![0xDE, 0xAD]);
        assert_eq!(format!("{share:?}"), "Share { index: 3, bit_length: 8, len: 2 }");
    }

    #[test]
    fn all_zeros_and_all_ones_secrets() {
        for fill in [0x00u8, 0xFF] {
            let secret = [fill; 32];
            let shares = split(&secret, &params(5, 3), &mut rng(14)).unwrap();
            let recovered = combine(&shares[2..5], Some(3)).unwrap();
            assert_eq!(secret.as_slice(), recovered.as_slice());
        }
    }
}
