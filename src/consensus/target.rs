//! 256-bit difficulty targets and their compact encoding
//!
//! A target is the threshold a block hash must not exceed. On the wire it
//! travels as the 32-bit compact form: one exponent byte and a 24-bit
//! mantissa whose top bit doubles as a sign flag. The codec here is
//! byte-for-byte compatible with the compact form serialized in block
//! headers, so every shift and truncation matters.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Not, Sub};

/// 256-bit unsigned integer used for difficulty targets and accumulated work.
///
/// One type covers both roles, the way the chain-selection math expects:
/// a block's proof is derived from its target, and chain work is a sum of
/// proofs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Target(U256);

/// Accumulated proof-of-work, summed over a chain.
pub type Work = Target;

impl Target {
    /// The zero target. Invalid as a difficulty threshold; used as the
    /// "no work" value.
    pub fn zero() -> Self {
        Target(U256::zero())
    }

    /// The value one.
    pub fn one() -> Self {
        Target(U256::one())
    }

    /// True if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Decode the compact form, reporting the sign and overflow conditions.
    ///
    /// Returns `(value, negative, overflow)`. The value is the mantissa
    /// shifted by the exponent; `negative` is set when the mantissa is
    /// non-zero and carries the sign bit; `overflow` is set when the
    /// shifted mantissa cannot fit in 256 bits.
    pub fn decode_compact(compact: u32) -> (Target, bool, bool) {
        let size = (compact >> 24) as usize;
        let word = compact & 0x007f_ffff;
        let value = if size <= 3 {
            Target(U256::from(word >> (8 * (3 - size))))
        } else {
            Target(U256::from(word) << (8 * (size - 3)))
        };
        let negative = word != 0 && (compact & 0x0080_0000) != 0;
        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));
        (value, negative, overflow)
    }

    /// Decode the compact form, ignoring the sign and overflow flags.
    ///
    /// Used where the compact value was already validated when the block
    /// was stored; retarget arithmetic only wants the magnitude.
    pub fn from_compact(compact: u32) -> Target {
        Self::decode_compact(compact).0
    }

    /// Encode into the canonical compact form.
    ///
    /// Picks the smallest exponent that fits the mantissa in 23 bits. If
    /// the mantissa's top bit would be set, the exponent is bumped and
    /// the mantissa shifted down a byte so the result cannot read as
    /// negative. Zero encodes to `0`.
    pub fn to_compact(self) -> u32 {
        let mut size = (self.bit_len() + 7) / 8;
        let mut compact: u64 = if size <= 3 {
            self.low_u64() << (8 * (3 - size))
        } else {
            (self.0 >> (8 * (size - 3))).low_u64()
        };
        if compact & 0x0080_0000 != 0 {
            compact >>= 8;
            size += 1;
        }
        ((size as u32) << 24) | (compact as u32 & 0x007f_ffff)
    }

    /// The low 64 bits of the value.
    pub fn low_u64(self) -> u64 {
        self.0.low_u64()
    }

    /// Number of significant bits.
    pub fn bit_len(self) -> usize {
        self.0.bits()
    }
}

impl From<U256> for Target {
    fn from(value: U256) -> Self {
        Target(value)
    }
}

impl From<Target> for U256 {
    fn from(value: Target) -> Self {
        value.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:064x}", self.0)
    }
}

impl Add for Target {
    type Output = Target;
    fn add(self, rhs: Self) -> Target {
        Target(self.0 + rhs.0)
    }
}

impl Sub for Target {
    type Output = Target;
    fn sub(self, rhs: Self) -> Target {
        Target(self.0 - rhs.0)
    }
}

impl Mul<u64> for Target {
    type Output = Target;
    fn mul(self, rhs: u64) -> Target {
        Target(self.0 * U256::from(rhs))
    }
}

impl Div<u64> for Target {
    type Output = Target;
    fn div(self, rhs: u64) -> Target {
        Target(self.0 / U256::from(rhs))
    }
}

impl Div for Target {
    type Output = Target;
    fn div(self, rhs: Self) -> Target {
        Target(self.0 / rhs.0)
    }
}

impl Not for Target {
    type Output = Target;
    fn not(self) -> Target {
        Target(!self.0)
    }
}
