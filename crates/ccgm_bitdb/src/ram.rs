//! Bit layout of a block-RAM configuration block.

use crate::base::BitDatabase;
use crate::error::DatabaseError;
use ccgm_chip::die::RAM_BLOCK_SIZE;

/// The 27 single-byte RAM configuration registers, in block order.
const RAM_REGISTERS: [&str; RAM_BLOCK_SIZE] = [
    "RAM_cfg_forward_a_addr",
    "RAM_cfg_forward_b_addr",
    "RAM_cfg_forward_a0_clk",
    "RAM_cfg_forward_a0_en",
    "RAM_cfg_forward_a0_we",
    "RAM_cfg_forward_a1_clk",
    "RAM_cfg_forward_a1_en",
    "RAM_cfg_forward_a1_we",
    "RAM_cfg_forward_b0_clk",
    "RAM_cfg_forward_b0_en",
    "RAM_cfg_forward_b0_we",
    "RAM_cfg_forward_b1_clk",
    "RAM_cfg_forward_b1_en",
    "RAM_cfg_forward_b1_we",
    "RAM_cfg_sram_mode_i_cfg",
    "RAM_cfg_in_out_cfg",
    "RAM_cfg_out_cfg",
    "RAM_cfg_out_b1_cfg",
    "RAM_cfg_wrmode_outreg",
    "RAM_cfg_inversion",
    "RAM_cfg_inv_ecc_dyn",
    "RAM_cfg_fifo_sync_empty",
    "RAM_cfg_fifo_empty",
    "RAM_cfg_fifo_aync_full",
    "RAM_cfg_fifo_full",
    "RAM_cfg_sram_delay",
    "RAM_cfg_datbm_cascade",
];

impl BitDatabase {
    /// Builds the block-RAM configuration database: one 8-bit word per
    /// hardware register.
    pub fn ram() -> Result<Self, DatabaseError> {
        let mut db = Self::with_bits(RAM_BLOCK_SIZE * 8);
        for (i, name) in RAM_REGISTERS.iter().enumerate() {
            db.add_word(*name, i * 8, 8)?;
        }
        db.add_unknowns();
        Ok(db)
    }
}
