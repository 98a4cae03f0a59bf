//! Bit layout of the SERDES configuration block.
//!
//! The SERDES is configured through a register file of 16-bit registers;
//! the 186-byte block is their packed image.

use crate::base::BitDatabase;
use crate::error::DatabaseError;
use ccgm_chip::die::SERDES_CFG_SIZE;

impl BitDatabase {
    /// Builds the SERDES configuration database: one word per 16-bit
    /// register.
    pub fn serdes() -> Result<Self, DatabaseError> {
        let mut db = Self::with_bits(SERDES_CFG_SIZE * 8);
        for i in 0..SERDES_CFG_SIZE / 2 {
            db.add_word(format!("SERDES_REG_{i:02}"), i * 16, 16)?;
        }
        db.add_unknowns();
        Ok(db)
    }
}
