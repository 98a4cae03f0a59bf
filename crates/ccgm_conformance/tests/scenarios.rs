//! End-to-end bitstream scenarios.
//!
//! Each test builds a chip, encodes it and checks the literal frame
//! sequence the encoder must produce, then (where applicable) decodes the
//! stream back and compares against the source model.

use ccgm_bitstream::{Bitstream, BitstreamOptions, CrcMode};
use ccgm_chip::die::{FF_INIT_RESET, MEMORY_SIZE, RAM_BLOCK_SIZE};
use ccgm_chip::Chip;
use ccgm_conformance::{latch_block, split_frames, Frame};

const CMD_PLL: u8 = 0xc1;
const CMD_LXLYS: u8 = 0xc8;
const CMD_ACLCU: u8 = 0xc9;
const CMD_DLCU: u8 = 0xca;
const CMD_RXRYS: u8 = 0xce;
const CMD_FRAM: u8 = 0xd2;
const CMD_PATH: u8 = 0xd9;
const CMD_CHG_STATUS: u8 = 0xdb;

fn dlcu_frames(frames: &[Frame]) -> Vec<&Frame> {
    frames.iter().filter(|f| f.opcode == CMD_DLCU).collect()
}

/// S1: an empty single-die chip.
#[test]
fn s1_empty_single_die_chip() {
    let chip = Chip::new(1).unwrap();
    let data = Bitstream::encode(&chip, &BitstreamOptions::default());
    let bytes = data.as_bytes();

    // The stream begins with the PATH program frame header.
    assert_eq!(bytes[0], 0xd9);
    assert_eq!(bytes[1], 0x01);

    // And ends with a 12-byte CHG_STATUS carrying
    // CFG_CPE_RESET | CFG_DONE | CFG_STOP.
    let frames = split_frames(bytes);
    let status = frames.last().unwrap();
    assert_eq!(status.opcode, CMD_CHG_STATUS);
    assert_eq!(status.body.len(), 12);
    assert_eq!(status.body[0], 0x13);
    // GPIO bank-enable defaults.
    assert_eq!(status.body[2], 0x33);
    assert_eq!(status.body[3], 0x33);
}

/// S2: a single latch without FF initialisation collapses to one frame.
#[test]
fn s2_single_latch_no_ff_init() {
    let mut chip = Chip::new(1).unwrap();
    chip.die_mut(0).write_latch(1, 1, &latch_block(&[(0, 0x01)], 0));

    let data = Bitstream::encode(&chip, &BitstreamOptions::default());
    let frames = split_frames(data.as_bytes());
    let dlcus = dlcu_frames(&frames);
    assert_eq!(dlcus.len(), 1);
    assert_eq!(dlcus[0].body, vec![0x01]);

    // Preceded by LXLYS 01 01.
    let position = frames.iter().position(|f| f.opcode == CMD_DLCU).unwrap();
    assert_eq!(frames[position - 1].opcode, CMD_LXLYS);
    assert_eq!(frames[position - 1].body, vec![0x01, 0x01]);

    let decoded = data.decode().unwrap();
    assert_eq!(decoded.die(0).latch(1, 1), chip.die(0).latch(1, 1));
    assert_eq!(decoded.die(0).ff_init(1, 1), 0);
}

/// S3: a latch with FF reset on CPE 0 takes exactly three frames.
#[test]
fn s3_single_latch_with_ff_reset() {
    let mut chip = Chip::new(1).unwrap();
    // CPE 0 carries its initial-state control bits at byte 8.
    chip.die_mut(0)
        .write_latch(1, 1, &latch_block(&[(0, 0x01), (8, 0x30)], FF_INIT_RESET));

    let data = Bitstream::encode(&chip, &BitstreamOptions::default());
    let frames = split_frames(data.as_bytes());
    let dlcus = dlcu_frames(&frames);
    assert_eq!(dlcus.len(), 3);

    // The middle pass writes the CPE bytes with bits 0x30 cleared; the
    // final pass restores them.
    let mut middle = dlcus[1].body.clone();
    middle.resize(40, 0);
    let mut last = dlcus[2].body.clone();
    last.resize(40, 0);
    assert_eq!(middle[8], last[8] & !0x30);
    assert_eq!(last[8], 0x30);

    let decoded = data.decode().unwrap();
    assert_eq!(decoded.die(0).ff_init(1, 1), 0x02);
    assert_eq!(decoded.die(0).latch(1, 1), chip.die(0).latch(1, 1));
}

/// S4: RAM configuration followed by RAM content.
#[test]
fn s4_ram_write_then_data() {
    let mut chip = Chip::new(1).unwrap();
    let mut ram_cfg = vec![0u8; RAM_BLOCK_SIZE];
    ram_cfg[0] = 0xAA;
    ram_cfg[1] = 0x55;
    ram_cfg[RAM_BLOCK_SIZE - 1] = 0x01;
    chip.die_mut(0).write_ram(2, 3, &ram_cfg);
    chip.die_mut(0).write_ram_data(2, 3, &[0x01], 0);

    let data = Bitstream::encode(&chip, &BitstreamOptions::default());
    let frames = split_frames(data.as_bytes());
    let opcodes: Vec<u8> = frames.iter().map(|f| f.opcode).collect();
    assert_eq!(
        opcodes,
        [
            CMD_PATH,       // program die 0
            CMD_PLL,        // empty PLL carrier
            CMD_RXRYS,      // select RAM 2,3
            CMD_DLCU,       // RAM configuration
            CMD_CHG_STATUS, // CFG_FILL_RAM
            CMD_RXRYS,      // select RAM 2,3 again
            CMD_ACLCU,      // address 0
            CMD_FRAM,       // full memory image
            CMD_CHG_STATUS, // CFG_NONE
            CMD_CHG_STATUS, // final status
        ]
    );
    assert_eq!(frames[2].body, vec![0x02, 0x03]);
    assert_eq!(frames[3].body.len(), RAM_BLOCK_SIZE);
    assert_eq!(frames[4].body[0], 0x20);
    assert_eq!(frames[5].body, vec![0x02, 0x03]);
    assert_eq!(frames[6].body, vec![0x00, 0x00]);
    assert_eq!(frames[7].body.len(), MEMORY_SIZE);
    assert_eq!(frames[8].body[0], 0x00);

    let decoded = data.decode().unwrap();
    assert_eq!(decoded.die(0).ram(2, 3), chip.die(0).ram(2, 3));
    assert_eq!(decoded.die(0).ram_data(2, 3), chip.die(0).ram_data(2, 3));
}

/// S5: a two-die chip navigates to the top die first.
#[test]
fn s5_two_die_chip() {
    let mut chip = Chip::new(2).unwrap();
    chip.die_mut(1).write_latch(1, 1, &latch_block(&[(0, 0x01)], 0));

    let data = Bitstream::encode(&chip, &BitstreamOptions::default());
    let frames = split_frames(data.as_bytes());
    let path_tokens: Vec<u8> = frames
        .iter()
        .filter(|f| f.opcode == CMD_PATH)
        .map(|f| f.body[0])
        .collect();
    assert_eq!(path_tokens, [0x01, 0x02, 0x10, 0x01, 0x10]);

    // The tile frames come from die 1, before die 0's navigation.
    let dlcu_pos = frames.iter().position(|f| f.opcode == CMD_DLCU).unwrap();
    let die0_nav = frames
        .iter()
        .rposition(|f| f.opcode == CMD_PATH && f.body[0] == 0x01)
        .unwrap();
    assert!(dlcu_pos < die0_nav);

    // Die 0 closes the stream with the full status word.
    let status = frames.last().unwrap();
    assert_eq!(status.opcode, CMD_CHG_STATUS);
    assert_eq!(status.body[0], 0x13);

    let decoded = data.decode().unwrap();
    assert_eq!(decoded.die_count(), 2);
    assert_eq!(decoded.die(1).latch(1, 1), chip.die(1).latch(1, 1));
    assert!(decoded.die(0).is_latch_empty(1, 1));
}

/// S6: CRC mode "unused" strips every subsequent CRC byte.
#[test]
fn s6_crcmode_unused() {
    let chip = Chip::new(1).unwrap();
    let options = BitstreamOptions {
        crc_mode: Some(CrcMode::Unused),
        ..Default::default()
    };
    let data = Bitstream::encode(&chip, &options);
    let bytes = data.as_bytes();

    // PATH program frame, fully CRC-protected: 16 bytes.
    assert_eq!(bytes[0], CMD_PATH);
    // CFGMODE frame with body FF 02, still CRC-protected.
    assert_eq!(bytes[16], 0xc2);
    assert_eq!(bytes[17], 0x02);
    assert_eq!(bytes[20], 0xFF);
    assert_eq!(bytes[21], 0x02);
    // From here on no CRC bytes: the empty PLL frame is opcode, length,
    // 12 body bytes and 6 NOPs.
    let pll = &bytes[28..48];
    assert_eq!(pll[0], CMD_PLL);
    assert_eq!(pll[1], 12);
    assert!(pll[2..].iter().all(|&b| b == 0));
    // Final CHG_STATUS without CRCs: opcode, length, 12 bytes, 9 pad.
    let status = &bytes[48..];
    assert_eq!(status.len(), 2 + 12 + 9);
    assert_eq!(status[0], CMD_CHG_STATUS);
    assert_eq!(status[2], 0x13);

    // The decoder accepts the stream by suppressing its CRC checks too.
    let decoded = data.decode().unwrap();
    assert_eq!(decoded.die_count(), 1);
}
