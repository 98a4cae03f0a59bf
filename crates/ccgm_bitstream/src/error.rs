//! Bitstream codec error types.

/// Errors produced while reading or interpreting a bitstream.
///
/// Parse failures are terminal for the current bitstream and carry the
/// byte offset at which they were detected.
#[derive(Debug, thiserror::Error)]
pub enum BitstreamError {
    /// A malformed frame: wrong length, unknown opcode, out-of-range
    /// coordinate or unexpected end of stream.
    #[error("{message} [at 0x{offset:08x}]")]
    Parse {
        /// Byte offset of the failure.
        offset: usize,
        /// Description of the failure.
        message: String,
    },
    /// A frame CRC did not match the running CRC.
    #[error("crc fail, calculated 0x{actual:04x} but expecting 0x{expected:04x} [at 0x{offset:08x}]")]
    CrcMismatch {
        /// Byte offset just past the CRC bytes.
        offset: usize,
        /// CRC stored in the stream.
        expected: u16,
        /// CRC calculated over the received bytes.
        actual: u16,
    },
    /// An I/O failure at the read/write boundary.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl BitstreamError {
    /// Creates a parse error at the given offset.
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }

    /// Returns the byte offset of the failure, when one is known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Parse { offset, .. } | Self::CrcMismatch { offset, .. } => Some(*offset),
            Self::Io(_) => None,
        }
    }
}
