//! Bit layout of the die-level configuration block.
//!
//! The block packs 4 PLL instances with two slots each, the CLKIN and
//! GLBOUT clock routing bytes, and the status region holding the GPIO
//! bank-enable bits and per-PLL control bytes.

use crate::base::BitDatabase;
use crate::error::DatabaseError;
use ccgm_chip::die::{DIE_CONFIG_SIZE, MAX_PLL, STATUS_CFG_START};

impl BitDatabase {
    /// Builds the die-level configuration database.
    pub fn die_config() -> Result<Self, DatabaseError> {
        let mut db = Self::with_bits(DIE_CONFIG_SIZE * 8);
        let mut pos = 0;
        for i in 0..MAX_PLL {
            db.add_word(format!("PLL{i}.CFG_A"), pos, 96)?;
            pos += 96;
            db.add_word(format!("PLL{i}.CFG_B"), pos, 96)?;
            pos += 96;
        }
        for i in 0..MAX_PLL {
            db.add_word(format!("CLKIN.PLL{i}"), pos + i * 8, 8)?;
        }
        pos += 32;
        for i in 0..MAX_PLL {
            db.add_word(format!("GLBOUT.PLL{i}"), pos + i * 16, 16)?;
        }

        let pos = STATUS_CFG_START * 8;
        db.add_word("GPIO.BANK_S1", pos + 16, 1)?;
        db.add_word("GPIO.BANK_S2", pos + 17, 1)?;
        db.add_word("GPIO.BANK_CFG", pos + 19, 1)?;
        db.add_word("GPIO.BANK_E1", pos + 20, 1)?;
        db.add_word("GPIO.BANK_E2", pos + 21, 1)?;
        db.add_word("GPIO.BANK_N1", pos + 24, 1)?;
        db.add_word("GPIO.BANK_N2", pos + 25, 1)?;
        db.add_word("GPIO.BANK_W1", pos + 28, 1)?;
        db.add_word("GPIO.BANK_W2", pos + 29, 1)?;

        let mut pos = pos + 32;
        for i in 0..MAX_PLL {
            db.add_word(format!("PLL{i}.CTRL_A"), pos, 8)?;
            db.add_word(format!("PLL{i}.CTRL_B"), pos + 8, 8)?;
            pos += 16;
        }

        db.add_unknowns();
        Ok(db)
    }
}
