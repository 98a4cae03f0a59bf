//! Growable bit vectors for configuration-word values.
//!
//! Configuration words carry between 1 and 96 bits, so a plain `Vec<bool>`
//! backing keeps the code simple. The textual form prints the highest index
//! first, i.e. `BitVec` index 0 is the rightmost character of the printed
//! string — the same convention the device-configuration grammar uses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A vector of configuration bits.
///
/// Index 0 is the least significant bit. The [`fmt::Display`] and
/// [`FromStr`] implementations use the textual-config convention of
/// printing the most significant bit first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitVec {
    bits: Vec<bool>,
}

impl BitVec {
    /// Creates an empty bit vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bit vector of `len` bits, all zero.
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    /// Returns the number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns whether the vector holds no bits at all.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns whether every bit is zero (an empty vector counts as zero).
    pub fn is_all_zero(&self) -> bool {
        self.bits.iter().all(|&b| !b)
    }

    /// Gets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn get(&self, index: usize) -> bool {
        self.bits[index]
    }

    /// Sets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn set(&mut self, index: usize, value: bool) {
        self.bits[index] = value;
    }

    /// Appends a bit at the most significant end.
    pub fn push(&mut self, value: bool) {
        self.bits.push(value);
    }

    /// Returns an iterator over the bits, least significant first.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    /// Builds a bit vector from a `u64`, least significant bit at index 0.
    ///
    /// Bits at and above `len` are ignored.
    pub fn from_u64(value: u64, len: usize) -> Self {
        let mut v = Self::zeros(len);
        for i in 0..len.min(64) {
            if (value >> i) & 1 != 0 {
                v.bits[i] = true;
            }
        }
        v
    }

    /// Converts to a `u64`, if the vector is at most 64 bits wide.
    pub fn to_u64(&self) -> Option<u64> {
        if self.len() > 64 {
            return None;
        }
        let mut result = 0u64;
        for (i, bit) in self.iter().enumerate() {
            if bit {
                result |= 1 << i;
            }
        }
        Some(result)
    }
}

impl From<Vec<bool>> for BitVec {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl fmt::Display for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in self.bits.iter().rev() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Error produced when parsing a bit string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid character '{character}' in bit string")]
pub struct ParseBitVecError {
    /// The offending character.
    pub character: char,
}

impl FromStr for BitVec {
    type Err = ParseBitVecError;

    /// Parses a string of `0` and `1` characters, leftmost character most
    /// significant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = Vec::with_capacity(s.len());
        for c in s.chars().rev() {
            match c {
                '0' => bits.push(false),
                '1' => bits.push(true),
                other => return Err(ParseBitVecError { character: other }),
            }
        }
        Ok(Self { bits })
    }
}
