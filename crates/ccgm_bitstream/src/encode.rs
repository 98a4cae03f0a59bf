//! Bitstream encoder.
//!
//! Emits dies from the highest index down to die 0, each with a PATH
//! navigation prefix, optional option frames, PLL setup, block-RAM
//! configuration and content, the three-pass tile serialisation, the
//! SERDES block and the closing status word. Die 0 closes the stream and
//! optionally jumps to a boot or scrub address.
//!
//! The three-pass tile serialisation realises flip-flop initial states:
//! pass 0 writes a tile's routing with the CPE bytes dropped, pass 1
//! writes the CPE bytes with the initial-state control bits cleared, and
//! pass 2 restores them. Tiles without initial states collapse to two (or
//! one) passes.

use crate::cmds::{
    CFG_CPE_CFG, CFG_CPE_RESET, CFG_DONE, CFG_FILL_RAM, CFG_NONE, CFG_RECONFIG, CFG_SERDES,
    CFG_STOP, CMD_DLCU, CMD_FRAM, PATH_PROGRAM, PATH_RESET, PATH_RIGHT, PATH_UP,
    PLL_CTRL_AUTONOMOUS,
};
use crate::cursor::Writer;
use crate::options::{BitstreamOptions, CrcMode, SpiMode};
use ccgm_chip::die::{
    is_edge_location, CLKIN_CFG_SIZE, FF_INIT_RESET, FF_INIT_SET, GLBOUT_CFG_SIZE, MAX_COLS,
    MAX_PLL, MAX_RAM_COLS, MAX_RAM_ROWS, MAX_ROWS, MEMORY_SIZE, PLL_CFG_SIZE, STATUS_CFG_SIZE,
};
use ccgm_chip::{Chip, Die};

/// Encodes a chip into bitstream bytes.
pub fn encode_chip(chip: &Chip, options: &BitstreamOptions) -> Vec<u8> {
    let mut wr = Writer::new();
    let max_die_y = chip.max_die_y();
    let mut scrubaddr: Option<usize> = None;

    for d in (0..chip.die_count()).rev() {
        let die = chip.die(d);
        let die_x = d / (max_die_y + 1);
        let die_y = d % (max_die_y + 1);

        if chip.die_count() > 1 {
            wr.write_cmd_path(PATH_RESET);
        }
        for _ in 0..die_y {
            wr.write_cmd_path(PATH_UP);
        }
        for _ in 0..die_x {
            wr.write_cmd_path(PATH_RIGHT);
        }
        wr.write_cmd_path(PATH_PROGRAM);

        if options.reset {
            wr.write_cmd_cfgrst(0x01);
        }
        if options.wants_cfgmode() {
            let crc_byte = options.crc_mode.unwrap_or(CrcMode::Check).mode_byte();
            let spi_bytes = options.spi_mode.map_or(&[][..], SpiMode::mode_bytes);
            wr.write_cmd_cfgmode(crc_byte, spi_bytes);
            if options.crc_mode == Some(CrcMode::Unused) {
                wr.set_crc_unused();
            }
        }
        if die.d2d() != 0 {
            wr.write_cmd_d2d(die.d2d());
        }

        let pll_written = write_pll_setup(&mut wr, die);
        let autonomous = (options.background || options.boot_addr.is_some()) && !pll_written;

        if write_ram_blocks(&mut wr, die) {
            wr.write_cmd_chg_status(&status_body(die, CFG_FILL_RAM, autonomous));
            write_ram_data(&mut wr, die);
            wr.write_cmd_chg_status(&status_body(die, CFG_NONE, autonomous));
        }

        write_latch_iterations(&mut wr, die, &mut scrubaddr);

        let has_serdes = !die.serdes_cfg().is_empty();
        if has_serdes {
            wr.write_cmd_serdes(die.serdes_cfg());
        }

        let mut flags = CFG_CPE_RESET;
        if d == 0 {
            flags |= CFG_DONE;
            if !options.background {
                flags |= CFG_STOP;
            }
            if options.boot_addr.is_some() {
                flags |= CFG_RECONFIG;
            }
            if options.reconfig {
                flags |= CFG_CPE_CFG;
            }
        }
        if has_serdes {
            flags |= CFG_SERDES;
        }
        wr.write_cmd_chg_status(&status_body(die, flags, autonomous));
        if d == 0 && die.is_using_cfg_gpios() {
            wr.write_cmd_chg_status(&status_body(die, CFG_DONE, autonomous));
        }

        if d == 0 {
            if let Some(addr) = options.boot_addr {
                if !options.background {
                    wr.write_cmd_jump(addr);
                }
            } else if options.background {
                if let Some(addr) = scrubaddr {
                    wr.write_cmd_jump(addr as u32);
                }
            }
        }
    }
    wr.into_bytes()
}

/// Emits SPLL/PLL frames for every populated PLL slot.
///
/// Returns whether any PLL is configured. If none is, a single PLL frame
/// for slot 0 still carries the CLKIN/GLBOUT tail.
fn write_pll_setup(wr: &mut Writer, die: &Die) -> bool {
    let mut size = PLL_CFG_SIZE;
    if !die.is_clkin_cfg_empty() {
        size += CLKIN_CFG_SIZE;
    }
    if !die.is_glbout_cfg_empty() {
        size += GLBOUT_CFG_SIZE;
    }
    let mut written = false;
    for i in 0..MAX_PLL {
        let cfg_a = !die.is_pll_cfg_empty(i * 2);
        let cfg_b = !die.is_pll_cfg_empty(i * 2 + 1);
        if cfg_a || cfg_b {
            wr.write_cmd_spll(1 << i);
            wr.write_cmd_pll(i * 2, die.die_cfg(), size);
            if cfg_b {
                wr.write_cmd_spll((1 << i) | (1 << (i + 4)));
                wr.write_cmd_pll(i * 2 + 1, die.die_cfg(), size);
            }
            written = true;
        }
    }
    if !written {
        wr.write_cmd_pll(0, die.die_cfg(), size);
    }
    written
}

/// Emits RXRYS/DLCU pairs for every populated RAM configuration block,
/// highest coordinates first. Returns whether anything was written.
fn write_ram_blocks(wr: &mut Writer, die: &Die) -> bool {
    let mut written = false;
    for y in (0..MAX_RAM_ROWS).rev() {
        for x in (0..MAX_RAM_COLS).rev() {
            if die.is_ram_empty(x, y) {
                continue;
            }
            let mut data = die.ram(x, y).to_vec();
            trim_trailing_zeros(&mut data);
            wr.write_cmd_rxrys(x as u8, y as u8);
            wr.write_header(CMD_DLCU, data.len() as u16);
            wr.write_bytes(&data);
            wr.insert_crc();
            written = true;
        }
    }
    written
}

/// Emits the RAM initial-memory images as full-size FRAM frames.
fn write_ram_data(wr: &mut Writer, die: &Die) {
    for y in (0..MAX_RAM_ROWS).rev() {
        for x in (0..MAX_RAM_COLS).rev() {
            if die.is_ram_data_empty(x, y) {
                continue;
            }
            wr.write_cmd_rxrys(x as u8, y as u8);
            wr.write_cmd_aclcu(0);
            wr.write_header(CMD_FRAM, MEMORY_SIZE as u16);
            wr.write_bytes(die.ram_data(x, y));
            wr.insert_crc();
        }
    }
}

/// The three-pass tile emission.
///
/// `scrubaddr` receives the stream offset of the first pass-1 frame, used
/// as the jump target for background reconfiguration.
fn write_latch_iterations(wr: &mut Writer, die: &Die, scrubaddr: &mut Option<usize>) {
    for iteration in 0..3 {
        for y in 0..MAX_ROWS {
            for x in 0..MAX_COLS {
                if die.is_latch_empty(x, y) {
                    continue;
                }
                let edge = is_edge_location(x, y);
                // Only tiles with CPE content need the extra passes.
                if iteration != 0 && (edge || die.is_cpe_empty(x, y)) {
                    continue;
                }
                let mut data = die.latch(x, y).to_vec();
                let ff_init = data.pop().unwrap_or(0);
                if !edge {
                    match iteration {
                        0 => {
                            // The first pass does not set up the CPEs.
                            data[..40].fill(0);
                            // A tile with FF initialisation must still get
                            // its three frames even with nothing to write.
                            if ff_init == 0 && data.iter().all(|&b| b == 0) {
                                continue;
                            }
                        }
                        1 => {
                            if ff_init != 0 {
                                // Only CPE data, with the initial-state
                                // control bits cleared.
                                data.truncate(40);
                                for i in 0..4 {
                                    match (ff_init >> (i * 2)) & 0x03 {
                                        FF_INIT_RESET => data[i * 10 + 8] &= !0x30,
                                        FF_INIT_SET => data[i * 10 + 8] &= !0xC0,
                                        _ => {}
                                    }
                                }
                            }
                        }
                        _ => {
                            // The third pass exists only to realise FF
                            // initial states.
                            if ff_init == 0 {
                                continue;
                            }
                            data.truncate(40);
                        }
                    }
                }
                trim_trailing_zeros(&mut data);
                if iteration == 1 && scrubaddr.is_none() {
                    *scrubaddr = Some(wr.len());
                }
                wr.write_cmd_lxlys(x as u8, y as u8);
                wr.write_header(CMD_DLCU, data.len() as u16);
                wr.write_bytes(&data);
                wr.insert_crc();
            }
        }
    }
}

/// Builds a CHG_STATUS body: the flag word followed by the die's status
/// region.
fn status_body(die: &Die, flags: u8, autonomous: bool) -> [u8; STATUS_CFG_SIZE] {
    let mut body = [0u8; STATUS_CFG_SIZE];
    body.copy_from_slice(die.status());
    body[0] = flags;
    if autonomous {
        body[4] |= PLL_CTRL_AUTONOMOUS;
        body[5] |= PLL_CTRL_AUTONOMOUS;
    }
    body
}

fn trim_trailing_zeros(data: &mut Vec<u8>) {
    while data.last() == Some(&0) {
        data.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_chip;
    use ccgm_chip::die::LATCH_BLOCK_SIZE;

    /// Counts DLCU frames in a stream by walking the frame structure.
    fn count_dlcu(data: &[u8]) -> usize {
        let mut count = 0;
        let mut pos = 0;
        while pos < data.len() {
            let cmd = data[pos];
            let (len, header) = if cmd == CMD_FRAM {
                ((data[pos + 1] as usize) << 8 | data[pos + 2] as usize, 3)
            } else {
                (data[pos + 1] as usize, 2)
            };
            if cmd == CMD_DLCU {
                count += 1;
            }
            pos += header + 2 + len + 2 + crate::cmds::trailing_skip(cmd);
        }
        count
    }

    fn core_block(cpe: &[(usize, u8)], routing: &[(usize, u8)], ff_init: u8) -> Vec<u8> {
        let mut block = vec![0u8; LATCH_BLOCK_SIZE];
        for &(i, v) in cpe {
            block[i] = v;
        }
        for &(i, v) in routing {
            block[i] = v;
        }
        block[LATCH_BLOCK_SIZE - 1] = ff_init;
        block
    }

    #[test]
    fn tile_without_ff_init_emits_at_most_two_frames() {
        let mut chip = Chip::new(1).unwrap();
        chip.die_mut(0).write_latch(
            1,
            1,
            &core_block(&[(0, 0x01), (8, 0x30)], &[(45, 0x10)], 0),
        );
        let data = encode_chip(&chip, &BitstreamOptions::default());
        assert_eq!(count_dlcu(&data), 2);
    }

    #[test]
    fn tile_with_ff_init_emits_exactly_three_frames() {
        let mut chip = Chip::new(1).unwrap();
        chip.die_mut(0).write_latch(
            1,
            1,
            &core_block(&[(0, 0x01), (8, 0x30)], &[(45, 0x10)], FF_INIT_RESET),
        );
        let data = encode_chip(&chip, &BitstreamOptions::default());
        assert_eq!(count_dlcu(&data), 3);
    }

    #[test]
    fn cpe_only_tile_with_ff_init_still_emits_three_frames() {
        let mut chip = Chip::new(1).unwrap();
        chip.die_mut(0)
            .write_latch(1, 1, &core_block(&[(0, 0x01), (8, 0x30)], &[], FF_INIT_RESET));
        let data = encode_chip(&chip, &BitstreamOptions::default());
        assert_eq!(count_dlcu(&data), 3);
        let back = decode_chip(&data).unwrap();
        assert_eq!(back.die(0).ff_init(1, 1), FF_INIT_RESET);
    }

    #[test]
    fn edge_tile_emits_a_single_frame() {
        let mut chip = Chip::new(1).unwrap();
        let mut block = vec![0u8; LATCH_BLOCK_SIZE];
        block[0] = 0x7F; // GPIO bits
        chip.die_mut(0).write_latch(0, 5, &block);
        let data = encode_chip(&chip, &BitstreamOptions::default());
        assert_eq!(count_dlcu(&data), 1);
    }

    #[test]
    fn roundtrip_restores_ff_init_matrix() {
        // Sweep all four CPE fields through none/reset/set combinations.
        for ff in [
            0x00u8,
            FF_INIT_RESET,
            FF_INIT_SET << 2,
            FF_INIT_RESET << 4 | FF_INIT_SET << 6,
            FF_INIT_RESET | FF_INIT_RESET << 2 | FF_INIT_SET << 4 | FF_INIT_SET << 6,
        ] {
            let mut chip = Chip::new(1).unwrap();
            // Every CPE state byte carries both control-bit groups so any
            // of the three initial states is representable.
            let block = core_block(
                &[(8, 0xF0), (18, 0xF0), (28, 0xF0), (38, 0xF0)],
                &[(50, 0x01)],
                ff,
            );
            chip.die_mut(0).write_latch(2, 2, &block);
            let data = encode_chip(&chip, &BitstreamOptions::default());
            let back = decode_chip(&data).unwrap();
            assert_eq!(back.die(0).ff_init(2, 2), ff, "ff_init 0x{ff:02x}");
            assert_eq!(back.die(0).latch(2, 2), chip.die(0).latch(2, 2));
        }
    }

    #[test]
    fn decode_encode_is_byte_identical() {
        let mut chip = Chip::new(1).unwrap();
        chip.die_mut(0).write_latch(
            1,
            1,
            &core_block(&[(0, 0xA5), (8, 0x30)], &[(60, 0x08)], FF_INIT_RESET),
        );
        let mut edge_block = vec![0u8; LATCH_BLOCK_SIZE];
        edge_block[13] = 0x44;
        chip.die_mut(0).write_latch(5, 0, &edge_block);
        chip.die_mut(0).write_ram(2, 3, &[0xAA; 27]);
        chip.die_mut(0).write_ram_data(2, 3, &[0x01, 0x02], 0);
        let first = encode_chip(&chip, &BitstreamOptions::default());
        let decoded = decode_chip(&first).unwrap();
        let second = encode_chip(&decoded, &BitstreamOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn reencoded_stream_passes_crc_verification() {
        let mut chip = Chip::new(2).unwrap();
        chip.die_mut(1)
            .write_latch(3, 3, &core_block(&[(0, 0x11), (8, 0x30)], &[(41, 0x02)], 0));
        let first = encode_chip(&chip, &BitstreamOptions::default());
        let decoded = decode_chip(&first).unwrap();
        let second = encode_chip(&decoded, &BitstreamOptions::default());
        // decode verifies every frame CRC on the way through.
        decode_chip(&second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn background_jump_targets_first_pass_one_frame() {
        let mut chip = Chip::new(1).unwrap();
        chip.die_mut(0)
            .write_latch(1, 1, &core_block(&[(0, 0x01)], &[(45, 0x10)], 0));
        let options = BitstreamOptions {
            background: true,
            ..Default::default()
        };
        let data = encode_chip(&chip, &options);
        // The stream must end with a JUMP frame: opcode, len 4, hdr CRC,
        // 4 address bytes, body CRC, 2 NOPs.
        let jump = &data[data.len() - 12..];
        assert_eq!(jump[0], crate::cmds::CMD_JUMP);
        let addr = u32::from_le_bytes([jump[4], jump[5], jump[6], jump[7]]) as usize;
        // The target must be an LXLYS frame boundary.
        assert_eq!(data[addr], crate::cmds::CMD_LXLYS);
    }

    #[test]
    fn bootaddr_jump_and_reconfig_flags() {
        let chip = Chip::new(1).unwrap();
        let options = BitstreamOptions {
            boot_addr: Some(0x0001_0000),
            reconfig: true,
            ..Default::default()
        };
        let data = encode_chip(&chip, &options);
        let jump = &data[data.len() - 12..];
        assert_eq!(jump[0], crate::cmds::CMD_JUMP);
        assert_eq!(&jump[4..8], &[0x00, 0x00, 0x01, 0x00]);
        // Status flags: CPE_RESET | DONE | STOP | RECONFIG | CPE_CFG.
        let decoded = decode_chip(&data).unwrap();
        assert_eq!(decoded.die(0).status()[0], 0x13 | CFG_RECONFIG | CFG_CPE_CFG);
    }

    #[test]
    fn serdes_block_is_emitted_with_its_flag() {
        let mut chip = Chip::new(1).unwrap();
        chip.die_mut(0).write_serdes_cfg(&[0x21; 186]);
        let data = encode_chip(&chip, &BitstreamOptions::default());
        let decoded = decode_chip(&data).unwrap();
        assert_eq!(decoded.die(0).serdes_cfg(), chip.die(0).serdes_cfg());
        assert_eq!(decoded.die(0).status()[0], 0x13 | CFG_SERDES);
    }

    #[test]
    fn d2d_byte_roundtrips() {
        let mut chip = Chip::new(2).unwrap();
        chip.die_mut(1).set_d2d(0x81);
        let data = encode_chip(&chip, &BitstreamOptions::default());
        let decoded = decode_chip(&data).unwrap();
        assert_eq!(decoded.die(1).d2d(), 0x81);
        assert_eq!(decoded.die(0).d2d(), 0);
    }

    #[test]
    fn pll_slots_roundtrip() {
        let mut chip = Chip::new(1).unwrap();
        let mut body_a = [0u8; PLL_CFG_SIZE];
        body_a[0] = 0x5A;
        chip.die_mut(0).write_pll_select(0x02, &body_a); // PLL 1 slot A
        let mut body_b = [0u8; PLL_CFG_SIZE];
        body_b[0] = 0xA5;
        chip.die_mut(0).write_pll_select(0x02 | 0x20, &body_b); // PLL 1 slot B
        let data = encode_chip(&chip, &BitstreamOptions::default());
        let decoded = decode_chip(&data).unwrap();
        assert_eq!(decoded.die(0).die_cfg()[2 * PLL_CFG_SIZE], 0x5A);
        assert_eq!(decoded.die(0).die_cfg()[3 * PLL_CFG_SIZE], 0xA5);
    }

    #[test]
    fn autonomous_clock_bits_set_without_pll() {
        let chip = Chip::new(1).unwrap();
        let options = BitstreamOptions {
            background: true,
            ..Default::default()
        };
        let data = encode_chip(&chip, &options);
        let decoded = decode_chip(&data).unwrap();
        assert_eq!(decoded.die(0).status()[4] & PLL_CTRL_AUTONOMOUS, PLL_CTRL_AUTONOMOUS);
        assert_eq!(decoded.die(0).status()[5] & PLL_CTRL_AUTONOMOUS, PLL_CTRL_AUTONOMOUS);
    }
}
