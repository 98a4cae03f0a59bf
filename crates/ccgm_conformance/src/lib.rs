//! Conformance test helpers for the CCGM bitstream toolkit.
//!
//! Provides a frame splitter for inspecting encoded streams and builders
//! for tile latch blocks, shared by the integration suites in `tests/`.

#![warn(missing_docs)]

use ccgm_chip::die::LATCH_BLOCK_SIZE;

/// One command frame extracted from a bitstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The command opcode.
    pub opcode: u8,
    /// The frame body, without CRC bytes or trailing padding.
    pub body: Vec<u8>,
}

/// Splits a bitstream into frames, assuming CRC bytes are present.
///
/// # Panics
///
/// Panics if the stream is structurally truncated — acceptable in tests.
pub fn split_frames(data: &[u8]) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let opcode = data[pos];
        let (len, header) = if opcode == 0xd2 {
            (((data[pos + 1] as usize) << 8) | data[pos + 2] as usize, 3)
        } else {
            (data[pos + 1] as usize, 2)
        };
        let body_start = pos + header + 2;
        let body = data[body_start..body_start + len].to_vec();
        pos = body_start + len + 2 + trailing_pad(opcode);
        frames.push(Frame { opcode, body });
    }
    frames
}

/// Returns the trailing NOP/magic byte count of a command.
fn trailing_pad(opcode: u8) -> usize {
    match opcode {
        0xc1 => 6,         // PLL
        0xc2 => 4,         // CFGMODE
        0xd9 | 0xdb => 9,  // PATH, CHG_STATUS
        0xda => 2,         // JUMP
        0xde => 3,         // SLAVE_MODE
        _ => 0,
    }
}

/// Builds a full-size latch block with the given bytes set.
pub fn latch_block(set: &[(usize, u8)], ff_init: u8) -> Vec<u8> {
    let mut block = vec![0u8; LATCH_BLOCK_SIZE];
    for &(index, value) in set {
        block[index] = value;
    }
    block[LATCH_BLOCK_SIZE - 1] = ff_init;
    block
}
