//! The design philosophy underlying `fingerprint_verify` is pedagogical, yet mathematically rigorous.
//! Each module encapsulates one randomized verification idea, illustrating how a cheap
//! computation over a prime field can stand in for an expensive exact one.
//!
//! This crate aspires to bridge gaps between theoretical exposition and practical engineering,
//! serving both as a didactic resource and a foundation for probabilistic checking.
//! Finite field arithmetic.
//!
//! This module provides arithmetic in the prime field `Z_p`.  The
//! [`Field`](struct.Field.html) type encapsulates the modulus and exposes
//! addition, subtraction, negation, multiplication, exponentiation and
//! inversion.  Every result is reduced into the canonical range `[0, p)`,
//! and products are formed in `u128` so that `p²` never overflows.

use crate::error::{EngineError, Result};

/// The fixed prime used by every verifier unless a caller builds its own
/// [`Field`]: `p = 10⁹ + 7`.
pub const MODULUS: u64 = 1_000_000_007;

/// A finite field defined by an odd prime modulus.
///
/// The `Field` type stores the modulus `p` and provides elementary
/// arithmetic operations over the integers modulo `p`.  It does not
/// perform primality testing; [`Field::default`] yields the documented
/// [`MODULUS`], and callers supplying their own modulus are responsible
/// for its primality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    p: u64,
}

impl Default for Field {
    fn default() -> Self {
        Field { p: MODULUS }
    }
}

impl Field {
    /// Creates a new finite field with the given modulus.
    ///
    /// # Panics
    ///
    /// Panics if the modulus is less than 3 or even.  Only odd primes are
    /// supported.
    pub fn new(p: u64) -> Self {
        assert!(p >= 3 && p % 2 == 1, "p must be an odd prime >= 3");
        Field { p }
    }

    /// Returns the modulus of the field.
    #[inline]
    pub fn modulus(&self) -> u64 {
        self.p
    }

    /// Returns `true` when `a` already lies in `[0, p)`.
    #[inline]
    pub fn is_canonical(&self, a: u64) -> bool {
        a < self.p
    }

    /// Reduces an arbitrary unsigned integer into the field.
    #[inline]
    pub fn reduce(&self, a: u64) -> u64 {
        a % self.p
    }

    /// Maps a signed integer into the field.
    ///
    /// Negative inputs are lifted by adding `p` after the remainder, so the
    /// result is canonical regardless of the sign of `a`.
    #[inline]
    pub fn from_signed(&self, a: i64) -> u64 {
        let p = self.p as i128;
        (((a as i128 % p) + p) % p) as u64
    }

    /// Adds two field elements.
    ///
    /// Moduli above `2^63` make the raw sum carry out of `u64`; the carry
    /// means the true sum exceeds `p`, so one subtraction restores it.
    #[inline]
    pub fn add(&self, a: u64, b: u64) -> u64 {
        let (s, carry) = (a % self.p).overflowing_add(b % self.p);
        if carry || s >= self.p {
            s.wrapping_sub(self.p)
        } else {
            s
        }
    }

    /// Subtracts `b` from `a`.
    #[inline]
    pub fn sub(&self, a: u64, b: u64) -> u64 {
        let a = a % self.p;
        let b = b % self.p;
        if a >= b {
            a - b
        } else {
            self.p - (b - a)
        }
    }

    /// Returns the additive inverse of `a`.
    #[inline]
    pub fn neg(&self, a: u64) -> u64 {
        self.sub(0, a)
    }

    /// Multiplies two field elements.
    #[inline]
    pub fn mul(&self, a: u64, b: u64) -> u64 {
        let a = a % self.p;
        let b = b % self.p;
        ((a as u128 * b as u128) % self.p as u128) as u64
    }

    /// Computes the multiplicative inverse of `a`.
    ///
    /// Uses Fermat's little theorem, `a^(p-2) ≡ a⁻¹ (mod p)`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DivisionByZero`] if `a ≡ 0 (mod p)`.
    #[inline]
    pub fn inv(&self, a: u64) -> Result<u64> {
        let a = a % self.p;
        if a == 0 {
            return Err(EngineError::DivisionByZero);
        }
        Ok(self.pow(a, self.p - 2))
    }

    /// Divides `a` by `b`, i.e. multiplies by the inverse of `b`.
    #[inline]
    pub fn div(&self, a: u64, b: u64) -> Result<u64> {
        Ok(self.mul(a, self.inv(b)?))
    }

    /// Exponentiates `a` by `e` modulo `p`.
    ///
    /// `pow(a, 0)` is `1` for every `a`, including zero.
    #[inline]
    pub fn pow(&self, mut a: u64, mut e: u64) -> u64 {
        a %= self.p;
        let mut result = 1u64;
        while e > 0 {
            if e & 1 == 1 {
                result = self.mul(result, a);
            }
            a = self.mul(a, a);
            e >>= 1;
        }
        result
    }
}
