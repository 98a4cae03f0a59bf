//! Bitstream decoder.
//!
//! Decoding runs in two passes over the frame stream. The sizing pass
//! walks every frame without touching model state, tracking PATH
//! navigation tokens to discover the die grid. The decode pass then
//! allocates the chip and runs the per-opcode state machine that fills in
//! tiles, block RAM and die-level configuration.
//!
//! Latch frames are iteration-aware: a tile may be written up to three
//! times, and on the third write the decoder reconstructs the per-CPE
//! flip-flop initial states from the bytes that differ between the second
//! and third pass.

use crate::cmds::{
    is_known, is_reserved, trailing_skip, CMD_ACLCU, CMD_CFGMODE, CMD_CFGRST, CMD_CHG_STATUS,
    CMD_D2D, CMD_DLCU, CMD_FLASH, CMD_FRAM, CMD_JUMP, CMD_LXLYS, CMD_PATH, CMD_PLL, CMD_RXRYS,
    CMD_SERDES, CMD_SLAVE_MODE, CMD_SPLL, PATH_FORWARD, PATH_PROGRAM, PATH_RESET, PATH_RIGHT,
    PATH_UP,
};
use crate::cursor::Reader;
use crate::error::BitstreamError;
use ccgm_chip::die::{
    FF_INIT_RESET, FF_INIT_SET, MAX_COLS, MAX_RAM_COLS, MAX_RAM_ROWS, MAX_ROWS, MEMORY_SIZE,
    RAM_BLOCK_SIZE, SERDES_CFG_SIZE, STATUS_CFG_SIZE,
};
use ccgm_chip::Chip;
use std::collections::HashMap;

/// Decodes a bitstream into a [`Chip`].
///
/// # Errors
///
/// Fails on any CRC mismatch or structural violation, reporting the byte
/// offset; no partial chip is returned.
pub fn decode_chip(data: &[u8]) -> Result<Chip, BitstreamError> {
    let (max_die_x, max_die_y) = scan_die_grid(data)?;
    let die_count = (max_die_x + 1) * (max_die_y + 1);
    let mut chip = Chip::new(die_count).map_err(|_| {
        BitstreamError::parse(
            0,
            format!(
                "bitstream programs an unsupported {}x{} die grid",
                max_die_x + 1,
                max_die_y + 1
            ),
        )
    })?;

    let mut rd = Reader::new(data);
    let mut is_block_ram = false;
    let mut x_pos: usize = 0;
    let mut y_pos: usize = 0;
    let mut pll_select: u8 = 0x0F;
    let mut aclcu: u16 = 0;
    let mut die_index: usize = 0;
    let mut die_x: usize = 0;
    let mut die_y: usize = 0;
    let mut tile_iteration: HashMap<(usize, usize), u8> = HashMap::new();

    while !rd.is_at_end() {
        let (offset, cmd, len) = read_frame_header(&mut rd)?;
        validate_length(cmd, len, is_block_ram, offset)?;
        rd.check_crc()?;
        let body = rd.read_block(len)?;
        rd.check_crc()?;
        rd.skip(trailing_skip(cmd))?;

        match cmd {
            CMD_DLCU => {
                let die = chip.die_mut(die_index);
                if is_block_ram {
                    die.write_ram(x_pos, y_pos, &body);
                } else {
                    let counter = tile_iteration
                        .entry((x_pos, y_pos))
                        .and_modify(|c| *c += 1)
                        .or_insert(0);
                    let iteration = *counter;
                    if iteration > 2 {
                        return Err(BitstreamError::parse(
                            offset,
                            format!("tile {x_pos},{y_pos} received more than three configuration passes"),
                        ));
                    }
                    if iteration == 2 {
                        // The third pass restores the CPE bytes the second
                        // pass cleared; the difference encodes the FF
                        // initial states.
                        let mut padded = body.clone();
                        padded.resize(40, 0);
                        let previous = die.latch(x_pos, y_pos);
                        let mut prev = [0u8; 4];
                        for (i, slot) in prev.iter_mut().enumerate() {
                            *slot = previous.get(i * 10 + 8).copied().unwrap_or(0);
                        }
                        let mut ff_init = 0u8;
                        for i in 0..4 {
                            let v = padded[i * 10 + 8] ^ prev[i];
                            if v & 0x30 != 0 {
                                ff_init |= FF_INIT_RESET << (i * 2);
                            } else if v & 0xC0 != 0 {
                                ff_init |= FF_INIT_SET << (i * 2);
                            } else if v != 0 {
                                return Err(BitstreamError::parse(
                                    offset,
                                    format!("unknown CPE state 0x{v:02x} at tile {x_pos},{y_pos}"),
                                ));
                            }
                        }
                        die.write_ff_init(x_pos, y_pos, ff_init);
                    }
                    die.write_latch(x_pos, y_pos, &body);
                }
            }
            CMD_LXLYS => {
                let x = body[0] as usize;
                let y = body[1] as usize;
                if x >= MAX_COLS {
                    return Err(BitstreamError::parse(
                        offset,
                        format!("Tile column (X) must be in range 0-81, current value {x}"),
                    ));
                }
                if y >= MAX_ROWS {
                    return Err(BitstreamError::parse(
                        offset,
                        format!("Tile row (Y) must be in range 0-65, current value {y}"),
                    ));
                }
                is_block_ram = false;
                x_pos = x;
                y_pos = y;
            }
            CMD_RXRYS => {
                let x = body[0] as usize;
                let y = body[1] as usize;
                if x >= MAX_RAM_COLS {
                    return Err(BitstreamError::parse(
                        offset,
                        format!("RAM column (X) must be in range 0-3, current value {x}"),
                    ));
                }
                if y >= MAX_RAM_ROWS {
                    return Err(BitstreamError::parse(
                        offset,
                        format!("RAM row (Y) must be in range 0-7, current value {y}"),
                    ));
                }
                is_block_ram = true;
                x_pos = x;
                y_pos = y;
            }
            CMD_ACLCU => {
                aclcu = u16::from(body[0]) << 8 | u16::from(body[1]);
            }
            CMD_FRAM => {
                if x_pos >= MAX_RAM_COLS || y_pos >= MAX_RAM_ROWS {
                    return Err(BitstreamError::parse(
                        offset,
                        "FRAM data without a preceding RAM selection",
                    ));
                }
                if aclcu as usize + len > MEMORY_SIZE {
                    return Err(BitstreamError::parse(
                        offset,
                        "FRAM data runs past the end of RAM",
                    ));
                }
                chip.die_mut(die_index).write_ram_data(x_pos, y_pos, &body, aclcu);
            }
            CMD_SPLL => {
                pll_select = body[0];
            }
            CMD_PLL => {
                chip.die_mut(die_index).write_pll_select(pll_select, &body);
            }
            CMD_SERDES => {
                chip.die_mut(die_index).write_serdes_cfg(&body);
            }
            CMD_D2D => {
                chip.die_mut(die_index).set_d2d(body[0]);
            }
            CMD_CHG_STATUS => {
                chip.die_mut(die_index).write_status(&body);
            }
            CMD_CFGMODE => {
                if body.len() > 1 && body[1] == 0x02 {
                    rd.set_crc_unused();
                }
            }
            CMD_PATH => {
                match body[0] {
                    PATH_RESET => {
                        die_x = 0;
                        die_y = 0;
                    }
                    PATH_UP => die_y += 1,
                    PATH_RIGHT => die_x += 1,
                    PATH_FORWARD => {}
                    PATH_PROGRAM => {
                        let index = die_x * (max_die_y + 1) + die_y;
                        if index >= chip.die_count() {
                            return Err(BitstreamError::parse(
                                offset,
                                format!(
                                    "PATH selects die {index} outside the {}-die grid",
                                    chip.die_count()
                                ),
                            ));
                        }
                        die_index = index;
                    }
                    other => {
                        return Err(BitstreamError::parse(
                            offset,
                            format!("unknown PATH direction 0x{other:02x}"),
                        ));
                    }
                }
                tile_iteration.clear();
            }
            // No model effect.
            CMD_CFGRST | CMD_FLASH | CMD_JUMP | CMD_SLAVE_MODE => {}
            _ => {}
        }
    }
    Ok(chip)
}

/// Sizing pass: derives the die grid from PATH navigation tokens.
///
/// Returns `(max_die_x, max_die_y)` observed under a program token; a
/// stream that never programs a die yields a single-die grid.
fn scan_die_grid(data: &[u8]) -> Result<(usize, usize), BitstreamError> {
    let mut rd = Reader::new(data);
    let (mut die_x, mut die_y) = (0usize, 0usize);
    let (mut max_x, mut max_y) = (0usize, 0usize);
    let mut programmed = false;
    while !rd.is_at_end() {
        let (offset, cmd, len) = read_frame_header(&mut rd)?;
        rd.check_crc()?;
        let body = rd.read_block(len)?;
        rd.check_crc()?;
        rd.skip(trailing_skip(cmd))?;
        match cmd {
            CMD_PATH => {
                let token = *body.first().ok_or_else(|| {
                    BitstreamError::parse(offset, "PATH data must be one byte long")
                })?;
                match token {
                    PATH_RESET => {
                        die_x = 0;
                        die_y = 0;
                    }
                    PATH_UP => die_y += 1,
                    PATH_RIGHT => die_x += 1,
                    PATH_FORWARD => {}
                    PATH_PROGRAM => {
                        max_x = max_x.max(die_x);
                        max_y = max_y.max(die_y);
                        programmed = true;
                    }
                    other => {
                        return Err(BitstreamError::parse(
                            offset,
                            format!("unknown PATH direction 0x{other:02x}"),
                        ));
                    }
                }
            }
            CMD_CFGMODE => {
                if body.len() > 1 && body[1] == 0x02 {
                    rd.set_crc_unused();
                }
            }
            _ => {}
        }
    }
    if programmed {
        Ok((max_x, max_y))
    } else {
        Ok((0, 0))
    }
}

/// Reads one frame header: opcode and body length.
///
/// The header CRC is left unchecked so callers can validate the length
/// first. Unknown and reserved opcodes fail here.
fn read_frame_header(rd: &mut Reader) -> Result<(usize, u8, usize), BitstreamError> {
    rd.reset_crc();
    let offset = rd.offset();
    let cmd = rd.read_byte()?;
    if is_reserved(cmd) {
        return Err(BitstreamError::parse(
            offset,
            format!("reserved command 0x{cmd:02x}"),
        ));
    }
    if !is_known(cmd) {
        return Err(BitstreamError::parse(
            offset,
            format!("unhandled command 0x{cmd:02x}"),
        ));
    }
    let len = if cmd == CMD_FRAM {
        rd.read_be_u16()? as usize
    } else {
        rd.read_byte()? as usize
    };
    Ok((offset, cmd, len))
}

/// Validates a frame's body length against its command's contract.
fn validate_length(
    cmd: u8,
    len: usize,
    is_block_ram: bool,
    offset: usize,
) -> Result<(), BitstreamError> {
    let message = match cmd {
        CMD_PLL if len < 12 => "PLL data smaller than expected",
        CMD_PLL if len > 24 => "PLL data longer than expected",
        CMD_CFGMODE if len > 20 => "CFGMODE data longer than expected",
        CMD_CFGRST if len > 1 => "CFGRST data must be up to one byte long",
        CMD_FLASH if len > 11 => "FLASH data longer than expected",
        CMD_LXLYS if len != 2 => "LXLYS data must be two bytes long",
        CMD_ACLCU if len != 2 => "ACLCU data must be two bytes long",
        CMD_RXRYS if len != 2 => "RXRYS data must be two bytes long",
        CMD_DLCU if is_block_ram && len > RAM_BLOCK_SIZE => {
            "RAM configuration must be up to 27 bytes"
        }
        CMD_DLCU if !is_block_ram && len > 112 => "Tile configuration must be up to 112 bytes",
        CMD_FRAM if len > MEMORY_SIZE => "FRAM data longer than expected",
        CMD_SERDES if len != SERDES_CFG_SIZE => "SERDES data must be 186 bytes long",
        CMD_D2D if len != 1 => "D2D data must be one byte long",
        CMD_PATH if len != 1 => "PATH data must be one byte long",
        CMD_JUMP if len > 4 => "JUMP data longer than expected",
        CMD_CHG_STATUS if len > STATUS_CFG_SIZE => "CHG_STATUS data longer than expected",
        CMD_SPLL if len != 1 => "SPLL data must be one byte long",
        CMD_SLAVE_MODE if len > 1 => "SLAVE_MODE must be up to one byte long",
        _ => return Ok(()),
    };
    Err(BitstreamError::parse(offset, message))
}
