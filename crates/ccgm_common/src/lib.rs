//! Shared foundational types used across the CCGM bitstream toolkit.
//!
//! This crate provides the [`BitVec`] bit-vector type that backs
//! configuration-word values throughout the toolkit, together with its
//! textual printer/parser used by the device-configuration grammar.

#![warn(missing_docs)]

pub mod bitvec;

pub use bitvec::{BitVec, ParseBitVecError};
