//! # GF(2^8) Arithmetic
//!
//! Byte-wise arithmetic in the Galois field with 256 elements, using the
//! irreducible polynomial `x^8 + x^4 + x^3 + x + 1` (0x11B), the same field
//! AES uses. The generator is 3 (0x03), which generates the full
//! multiplicative group of order 255.
//!
//! Multiplication and division go through log/exp lookup tables. Both
//! tables are built by `const fn` at compile time and live in read-only
//! statics, so any number of threads can use them without locking.
//!
//! Every function here works on plain `u8`. The secret-sharing engine is
//! the only intended caller; nothing in this module knows about thresholds
//! or share indices.

use thiserror::Error;

/// Errors from field arithmetic.
///
/// With validated inputs the sharing engine never triggers these. If one
/// surfaces to a caller, treat it as a bug, not as bad user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("division by zero in GF(256)")]
    DivisionByZero,

    #[error("zero has no multiplicative inverse in GF(256)")]
    ZeroHasNoInverse,
}

/// Irreducible polynomial: x^8 + x^4 + x^3 + x + 1.
pub const MODULUS: u16 = 0x11B;

/// Order of the multiplicative group.
const GROUP_ORDER: usize = 255;

/// Exponentiation table: EXP[i] = g^i mod p, where g = 0x03.
/// Length 512 so a sum of two logs never needs reducing.
const fn build_exp_table() -> [u8; 512] {
    let mut table = [0u8; 512];
    let mut val: u16 = 1;
    let mut i = 0;
    while i < GROUP_ORDER {
        table[i] = val as u8;
        table[i + GROUP_ORDER] = val as u8;
        // val * 3 = val * 2 + val
        val = (val << 1) ^ val;
        if val >= 256 {
            val ^= MODULUS;
        }
        i += 1;
    }
    table
}

/// Logarithm table: LOG[EXP[i]] = i. LOG[0] is unused.
const fn build_log_table() -> [u8; 256] {
    let exp = build_exp_table();
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < GROUP_ORDER {
        table[exp[i] as usize] = i as u8;
        i += 1;
    }
    table
}

static EXP: [u8; 512] = build_exp_table();
static LOG: [u8; 256] = build_log_table();

/// Add two elements. Addition is XOR and is its own inverse.
#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Subtract two elements. Identical to [`add`] in characteristic 2.
#[inline]
pub fn sub(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Multiply two elements via the log/exp tables.
#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    EXP[LOG[a as usize] as usize + LOG[b as usize] as usize]
}

/// Divide `a` by `b`.
#[inline]
pub fn div(a: u8, b: u8) -> Result<u8, FieldError> {
    if b == 0 {
        return Err(FieldError::DivisionByZero);
    }
    if a == 0 {
        return Ok(0);
    }
    Ok(EXP[GROUP_ORDER + LOG[a as usize] as usize - LOG[b as usize] as usize])
}

/// Raise `a` to the `k`-th power. `a^0 == 1` for every `a`, including zero.
pub fn pow(a: u8, k: u32) -> u8 {
    if k == 0 {
        return 1;
    }
    if a == 0 {
        return 0;
    }
    let log = (LOG[a as usize] as u64 * k as u64) % GROUP_ORDER as u64;
    EXP[log as usize]
}

/// Multiplicative inverse of `a`.
pub fn inverse(a: u8) -> Result<u8, FieldError> {
    if a == 0 {
        return Err(FieldError::ZeroHasNoInverse);
    }
    Ok(EXP[GROUP_ORDER - LOG[a as usize] as usize])
}

/// Evaluate a polynomial at `x` using Horner's method.
///
/// `coefficients[0]` is the constant term (the secret byte),
/// `coefficients[1]` the x^1 coefficient, and so on.
pub fn eval_polynomial(coefficients: &[u8], x: u8) -> u8 {
    coefficients
        .iter()
        .rev()
        .fold(0u8, |acc, &coeff| add(mul(acc, x), coeff))
}

/// Lagrange interpolation at x = 0.
///
/// Given points `(xs[i], ys[i])` on one polynomial, returns its value at
/// zero without rebuilding the polynomial:
///
/// ```text
/// f(0) = Σ_i y_i · Π_{j≠i} (0 - x_j) / (x_i - x_j)
/// ```
///
/// Duplicate x-coordinates make a denominator vanish and come back as
/// [`FieldError::DivisionByZero`].
pub fn lagrange_interpolate_at_zero(xs: &[u8], ys: &[u8]) -> Result<u8, FieldError> {
    debug_assert_eq!(xs.len(), ys.len());
    let mut secret = 0u8;

    for (i, (&xi, &yi)) in xs.iter().zip(ys).enumerate() {
        let mut numerator = 1u8;
        let mut denominator = 1u8;

        for (j, &xj) in xs.iter().enumerate() {
            if i == j {
                continue;
            }
            // 0 - x_j == x_j
            numerator = mul(numerator, xj);
            denominator = mul(denominator, sub(xi, xj));
        }

        let basis = div(numerator, denominator)?;
        secret = add(secret, mul(yi, basis));
    }

    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Carry-less "Russian peasant" multiply, used as an oracle for the tables.
    fn slow_mul(mut a: u8, mut b: u8) -> u8 {
        let mut result = 0u8;
        while b != 0 {
            if b & 1 != 0 {
                result ^= a;
            }
            let carry = a & 0x80;
            a <<= 1;
            if carry != 0 {
                a ^= 0x1B;
            }
            b >>= 1;
        }
        result
    }

    #[test]
    fn add_is_xor() {
        assert_eq!(add(0xFF, 0xFF), 0);
        assert_eq!(add(0xAB, 0x00), 0xAB);
        assert_eq!(add(0x53, 0xCA), 0x99);
    }

    #[test]
    fn add_is_self_inverse() {
        for a in 0..=255u8 {
            assert_eq!(add(add(a, 0x5C), 0x5C), a);
        }
    }

    #[test]
    fn mul_matches_slow_multiply() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                assert_eq!(mul(a, b), slow_mul(a, b), "a={a:#04x} b={b:#04x}");
            }
        }
    }

    #[test]
    fn mul_known_aes_vector() {
        // FIPS-197 section 4.2: {57} • {83} = {c1}
        assert_eq!(mul(0x57, 0x83), 0xC1);
    }

    #[test]
    fn mul_zero() {
        for i in 0..=255u8 {
            assert_eq!(mul(i, 0), 0);
            assert_eq!(mul(0, i), 0);
        }
    }

    #[test]
    fn mul_div_inverse() {
        for a in 0..=255u8 {
            for b in 1..=255u8 {
                assert_eq!(div(mul(a, b), b), Ok(a));
            }
        }
    }

    #[test]
    fn div_by_zero_fails() {
        assert_eq!(div(7, 0), Err(FieldError::DivisionByZero));
        assert_eq!(div(0, 0), Err(FieldError::DivisionByZero));
    }

    #[test]
    fn inverse_round_trips() {
        for a in 1..=255u8 {
            let inv = inverse(a).unwrap();
            assert_eq!(mul(a, inv), 1);
        }
        assert_eq!(inverse(0), Err(FieldError::ZeroHasNoInverse));
    }

    #[test]
    fn pow_matches_repeated_multiplication() {
        for a in [0u8, 1, 2, 3, 0x53, 0xFF] {
            let mut acc = 1u8;
            for k in 0..600u32 {
                assert_eq!(pow(a, k), acc, "a={a} k={k}");
                acc = mul(acc, a);
            }
        }
    }

    #[test]
    fn generator_has_full_order() {
        let mut seen = [false; 256];
        for k in 0..255u32 {
            let v = pow(3, k);
            assert!(!seen[v as usize]);
            seen[v as usize] = true;
        }
        assert!(!seen[0]);
    }

    #[test]
    fn polynomial_eval_constant() {
        assert_eq!(eval_polynomial(&[42], 1), 42);
        assert_eq!(eval_polynomial(&[42], 100), 42);
    }

    #[test]
    fn polynomial_eval_at_zero_is_constant_term() {
        assert_eq!(eval_polynomial(&[0x17, 0xA3, 0x5E], 0), 0x17);
    }

    #[test]
    fn lagrange_recovers_constant() {
        let xs = [1, 2, 3];
        let ys = [42, 42, 42];
        assert_eq!(lagrange_interpolate_at_zero(&xs, &ys), Ok(42));
    }

    #[test]
    fn lagrange_recovers_polynomial_constant_term() {
        let coeffs = [0xC3, 0x11, 0x7F];
        let xs = [4u8, 9, 200];
        let ys: Vec<u8> = xs.iter().map(|&x| eval_polynomial(&coeffs, x)).collect();
        assert_eq!(lagrange_interpolate_at_zero(&xs, &ys), Ok(0xC3));
    }

    #[test]
    fn lagrange_duplicate_x_is_division_by_zero() {
        assert_eq!(
            lagrange_interpolate_at_zero(&[5, 5], &[1, 2]),
            Err(FieldError::DivisionByZero)
        );
    }
}
