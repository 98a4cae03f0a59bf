//! Command opcodes and wire constants of the frame stream.

/// PLL configuration write (routed by the SPLL select latch).
pub(crate) const CMD_PLL: u8 = 0xc1;
/// Configuration-mode select: CRC behaviour and SPI width.
pub(crate) const CMD_CFGMODE: u8 = 0xc2;
/// Reset of all configuration latches.
pub(crate) const CMD_CFGRST: u8 = 0xc3;
/// Flash controller setup; no effect on the device model.
pub(crate) const CMD_FLASH: u8 = 0xc5;
/// Reserved; rejected by the decoder until semantics are confirmed.
pub(crate) const CMD_DLXP: u8 = 0xc6;
/// Reserved; rejected by the decoder until semantics are confirmed.
pub(crate) const CMD_DLYP: u8 = 0xc7;
/// Tile (latch) column/row select.
pub(crate) const CMD_LXLYS: u8 = 0xc8;
/// RAM data write address for the next FRAM.
pub(crate) const CMD_ACLCU: u8 = 0xc9;
/// Configuration-latch data write (tile or RAM, per selection mode).
pub(crate) const CMD_DLCU: u8 = 0xca;
/// Reserved; rejected by the decoder until semantics are confirmed.
pub(crate) const CMD_DRXP: u8 = 0xcc;
/// Block-RAM column/row select.
pub(crate) const CMD_RXRYS: u8 = 0xce;
/// Block-RAM memory content write (16-bit length field).
pub(crate) const CMD_FRAM: u8 = 0xd2;
/// SERDES configuration block.
pub(crate) const CMD_SERDES: u8 = 0xd7;
/// Die-to-die routing byte.
pub(crate) const CMD_D2D: u8 = 0xd8;
/// Die-grid navigation.
pub(crate) const CMD_PATH: u8 = 0xd9;
/// Jump to a flash address; ignored by the device model.
pub(crate) const CMD_JUMP: u8 = 0xda;
/// Status-word change.
pub(crate) const CMD_CHG_STATUS: u8 = 0xdb;
/// Reserved; rejected by the decoder until semantics are confirmed.
pub(crate) const CMD_WAIT_PLL: u8 = 0xdc;
/// PLL select latch.
pub(crate) const CMD_SPLL: u8 = 0xdd;
/// Slave-mode select; ignored by the device model.
pub(crate) const CMD_SLAVE_MODE: u8 = 0xde;

/// PATH token: return to die (0, 0).
pub(crate) const PATH_RESET: u8 = 0x01;
/// PATH token: move one die up (y += 1).
pub(crate) const PATH_UP: u8 = 0x02;
/// PATH token: move one die right (x += 1).
pub(crate) const PATH_RIGHT: u8 = 0x04;
/// PATH token: forward (reserved, no model effect).
pub(crate) const PATH_FORWARD: u8 = 0x08;
/// PATH token: program the die at the current grid position.
pub(crate) const PATH_PROGRAM: u8 = 0x10;

/// Status flag: no operation.
pub(crate) const CFG_NONE: u8 = 0x00;
/// Status flag: reset CPE state after configuration.
pub(crate) const CFG_CPE_RESET: u8 = 0x01;
/// Status flag: configuration complete.
pub(crate) const CFG_DONE: u8 = 0x02;
/// Status flag: enable CPE reconfiguration.
pub(crate) const CFG_CPE_CFG: u8 = 0x04;
/// Status flag: reconfiguration from a boot address.
pub(crate) const CFG_RECONFIG: u8 = 0x08;
/// Status flag: stop the configuration clock.
pub(crate) const CFG_STOP: u8 = 0x10;
/// Status flag: fill block-RAM content.
pub(crate) const CFG_FILL_RAM: u8 = 0x20;
/// Status flag: SERDES configuration present.
pub(crate) const CFG_SERDES: u8 = 0x40;

/// Autonomous configuration-clock bit in the PLL control status bytes.
pub(crate) const PLL_CTRL_AUTONOMOUS: u8 = 0x08;

/// The magic byte interleaved in PATH and CHG_STATUS trailing padding.
pub(crate) const MAGIC_PAD: u8 = 0x33;

/// Returns the number of trailing NOP/magic bytes following a command's
/// body CRC. These bytes are CRC-covered skips on the decode side.
pub(crate) fn trailing_skip(cmd: u8) -> usize {
    match cmd {
        CMD_PLL => 6,
        CMD_CFGMODE => 4,
        CMD_PATH | CMD_CHG_STATUS => 9,
        CMD_JUMP => 2,
        CMD_SLAVE_MODE => 3,
        _ => 0,
    }
}

/// Returns whether `cmd` is reserved: named in the command set but with
/// unconfirmed semantics, so the decoder rejects it.
pub(crate) fn is_reserved(cmd: u8) -> bool {
    matches!(cmd, CMD_DLXP | CMD_DLYP | CMD_DRXP | CMD_WAIT_PLL)
}

/// Returns whether `cmd` is a command the decoder understands.
pub(crate) fn is_known(cmd: u8) -> bool {
    matches!(
        cmd,
        CMD_PLL
            | CMD_CFGMODE
            | CMD_CFGRST
            | CMD_FLASH
            | CMD_LXLYS
            | CMD_ACLCU
            | CMD_DLCU
            | CMD_RXRYS
            | CMD_FRAM
            | CMD_SERDES
            | CMD_D2D
            | CMD_PATH
            | CMD_JUMP
            | CMD_CHG_STATUS
            | CMD_SPLL
            | CMD_SLAVE_MODE
    )
}
