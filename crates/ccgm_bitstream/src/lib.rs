//! Bitstream codec for CCGM1A-family FPGAs.
//!
//! The on-wire configuration format is a sequence of self-framing command
//! frames, each protected by a running CRC-16 (X.25):
//!
//! ```text
//! opcode | length | hdr_crc_lo | hdr_crc_hi | body... | crc_lo | crc_hi | nops/magic
//! ```
//!
//! The length field is one byte for every command except FRAM, which uses
//! a big-endian u16. CRC bytes disappear from the stream once a CFGMODE
//! frame selects the "unused" CRC mode.
//!
//! [`Bitstream::decode`] reconstructs a [`Chip`](ccgm_chip::Chip) from the
//! frame stream and [`Bitstream::encode`] emits a byte-identical stream
//! (modulo option-only frames) from the same model.

#![warn(missing_docs)]

mod cmds;

pub mod crc;
pub mod cursor;
pub mod decode;
pub mod encode;
pub mod error;
pub mod options;

pub use error::BitstreamError;
pub use options::{BitstreamOptions, CrcMode, SpiMode};

use ccgm_chip::Chip;
use std::io::{Read, Write};

/// A raw bitstream: the serialised on-wire configuration bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitstream {
    data: Vec<u8>,
}

impl Bitstream {
    /// Wraps raw bitstream bytes.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Reads a bitstream from a byte source.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures from the reader.
    pub fn read_from(reader: &mut impl Read) -> Result<Self, BitstreamError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self { data })
    }

    /// Writes the raw bitstream bytes to a sink.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures from the writer.
    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), BitstreamError> {
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the length of the stream in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether the stream is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Serialises a chip into a bitstream.
    pub fn encode(chip: &Chip, options: &BitstreamOptions) -> Self {
        Self {
            data: encode::encode_chip(chip, options),
        }
    }

    /// Deserialises the bitstream into a chip model.
    ///
    /// # Errors
    ///
    /// Fails fast on CRC mismatches and structural violations, reporting
    /// the byte offset.
    pub fn decode(&self) -> Result<Chip, BitstreamError> {
        decode::decode_chip(&self.data)
    }
}
