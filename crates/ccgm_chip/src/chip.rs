//! A named CCGM1A device: an ordered collection of dies.

use crate::die::Die;
use serde::{Deserialize, Serialize};

/// Error produced when constructing a [`Chip`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChipError {
    /// The requested die count is not one of 1, 2 or 4.
    #[error("unsupported die count {0}; CCGM1A parts have 1, 2 or 4 dies")]
    InvalidDieCount(usize),
    /// The device name is not a known CCGM1A part.
    #[error("unknown device name '{0}'")]
    UnknownDevice(String),
}

/// A CCGM1A-family chip.
///
/// Multi-die parts are laid out 1×N (stacked in y) for two dies and 2×2
/// for four; the linear die index is `die_x * (max_die_y + 1) + die_y`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chip {
    name: String,
    dies: Vec<Die>,
}

impl Chip {
    /// Creates an empty chip with the given die count (1, 2 or 4).
    pub fn new(die_count: usize) -> Result<Self, ChipError> {
        if !matches!(die_count, 1 | 2 | 4) {
            return Err(ChipError::InvalidDieCount(die_count));
        }
        Ok(Self {
            name: format!("CCGM1A{die_count}"),
            dies: (0..die_count).map(|_| Die::new()).collect(),
        })
    }

    /// Creates an empty chip from a device name of the form `CCGM1A<N>`.
    pub fn from_name(name: &str) -> Result<Self, ChipError> {
        let count = name
            .strip_prefix("CCGM1A")
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| ChipError::UnknownDevice(name.to_string()))?;
        Self::new(count).map_err(|_| ChipError::UnknownDevice(name.to_string()))
    }

    /// Returns the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of dies.
    pub fn die_count(&self) -> usize {
        self.dies.len()
    }

    /// Returns the highest die-grid column index.
    pub fn max_die_x(&self) -> usize {
        match self.dies.len() {
            4 => 1,
            _ => 0,
        }
    }

    /// Returns the highest die-grid row index.
    pub fn max_die_y(&self) -> usize {
        match self.dies.len() {
            1 => 0,
            _ => 1,
        }
    }

    /// Returns the die at the given linear index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.die_count()`.
    pub fn die(&self, index: usize) -> &Die {
        &self.dies[index]
    }

    /// Returns a mutable reference to the die at the given linear index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.die_count()`.
    pub fn die_mut(&mut self, index: usize) -> &mut Die {
        &mut self.dies[index]
    }

    /// Returns an iterator over the dies in index order.
    pub fn dies(&self) -> impl Iterator<Item = &Die> {
        self.dies.iter()
    }
}
