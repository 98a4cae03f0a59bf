//! Encoder options controlling the optional frames of a bitstream.

/// CRC error behaviour selected through the CFGMODE frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcMode {
    /// Verify CRCs and stop on mismatch.
    Check,
    /// CRC bytes are present but mismatches are ignored by the device.
    Ignore,
    /// CRC bytes are omitted for the remainder of the stream.
    Unused,
}

impl CrcMode {
    /// Returns the CFGMODE body byte for this mode.
    pub fn mode_byte(self) -> u8 {
        match self {
            CrcMode::Check => 0x00,
            CrcMode::Ignore => 0x01,
            CrcMode::Unused => 0x02,
        }
    }
}

/// SPI bus width selected through the CFGMODE frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiMode {
    /// Single-lane SPI; no extra CFGMODE bytes.
    Single,
    /// Dual-lane SPI.
    Dual,
    /// Quad-lane SPI.
    Quad,
}

impl SpiMode {
    /// Returns the CFGMODE body bytes selecting this mode.
    pub fn mode_bytes(self) -> &'static [u8] {
        match self {
            SpiMode::Single => &[],
            SpiMode::Dual => &[0x50, 0x21, 0x18, 0x3B],
            SpiMode::Quad => &[0xF0, 0x23, 0x18, 0x6B],
        }
    }
}

/// Options for bitstream generation.
///
/// The defaults produce the plain configuration stream: no latch reset, no
/// CFGMODE frame, no reconfiguration support and no jump.
#[derive(Debug, Clone, Default)]
pub struct BitstreamOptions {
    /// Emit an initial CFGRST frame resetting all configuration latches.
    pub reset: bool,
    /// CRC error behaviour; `None` leaves the device default (check).
    pub crc_mode: Option<CrcMode>,
    /// SPI bus width; `None` leaves the device default (single).
    pub spi_mode: Option<SpiMode>,
    /// Enable CPE reconfiguration in the final status word.
    pub reconfig: bool,
    /// Background reconfiguration: keep the fabric running and jump back
    /// to the first CPE pass.
    pub background: bool,
    /// Boot address of a secondary bitstream to jump to.
    pub boot_addr: Option<u32>,
}

impl BitstreamOptions {
    /// Returns whether a CFGMODE frame must be emitted.
    pub fn wants_cfgmode(&self) -> bool {
        self.crc_mode.is_some() || self.spi_mode.is_some()
    }
}
