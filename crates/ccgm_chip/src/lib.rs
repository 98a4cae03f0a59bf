//! Device model for CCGM1A-family FPGAs.
//!
//! A [`Chip`] is a named device holding 1, 2 or 4 identical [`Die`]
//! instances. Each die owns the mutable byte blocks the bitstream codec
//! reads and writes: per-tile configuration latches, block-RAM
//! configuration and initial memory content, the die-level
//! PLL/clocking/status block, an optional SERDES block and the die-to-die
//! routing byte.
//!
//! The model is deliberately dumb: blocks are byte vectors addressed by
//! grid coordinates, and all interpretation of their content lives in the
//! bit-range databases and the codec.

#![warn(missing_docs)]

pub mod chip;
pub mod die;

pub use chip::{Chip, ChipError};
pub use die::Die;
