//! Bit layout of a tile's configuration latches.
//!
//! The layout depends on the tile position. Interior ("core") tiles carry
//! four CPEs, input/output routing muxes and the per-CPE FF-init fields;
//! edge tiles instead carry GPIO and edge-termination blocks. Every tile
//! ends with the switchbox words shared by all positions.

use crate::base::BitDatabase;
use crate::error::DatabaseError;
use ccgm_chip::die::{LATCH_BLOCK_SIZE, MAX_COLS, MAX_ROWS};

impl BitDatabase {
    /// Builds the latch-block database for the tile at `(x, y)`.
    ///
    /// Classification precedence is bottom edge, left edge, top edge,
    /// right edge, then core.
    pub fn tile(x: usize, y: usize) -> Result<Self, DatabaseError> {
        let mut db = Self::with_bits(LATCH_BLOCK_SIZE * 8);
        let mut is_core = false;

        if y == 0 {
            db.add_word("BES1", 13 * 8, 48)?;
            db.add_word("BES2", 19 * 8, 48)?;
        } else if x == 0 {
            db.add_word("LES1", 13 * 8, 24)?;
            db.add_word("LES2", 16 * 8, 24)?;
        } else if y == MAX_ROWS - 1 {
            db.add_word("TES1", 13 * 8, 24)?;
            db.add_word("TES2", 16 * 8, 24)?;
        } else if x == MAX_COLS - 1 {
            db.add_word("RES1", 13 * 8, 24)?;
            db.add_word("RES2", 16 * 8, 24)?;
        } else {
            is_core = true;
            for i in 0..4 {
                db.add_word(format!("CPE_{}", i + 1), 10 * i * 8, 80)?;
                db.add_word(
                    format!("CPE_{}.FF_INIT", i + 1),
                    (LATCH_BLOCK_SIZE - 1) * 8 + i * 2,
                    2,
                )?;
            }
            // Two 3-bit input muxes per byte: planes 2j+1 and 2j+2.
            let mut pos = 40;
            for i in 0..4 {
                for j in 0..3 {
                    db.add_word(format!("INMUX_{}_{:02}", i + 1, j * 2 + 1), pos * 8, 3)?;
                    db.add_word(format!("INMUX_{}_{:02}", i + 1, j * 2 + 2), pos * 8 + 3, 3)?;
                    pos += 1;
                }
            }
            let mut pos = 54;
            for i in 0..4 {
                db.add_word(format!("OUTMUX_{}_01", i + 1), pos * 8, 3)?;
                db.add_word(format!("OUTMUX_{}_02", i + 1), pos * 8 + 3, 3)?;
                pos += 1;
            }
        }
        if !is_core {
            db.add_word("GPIO", 0, 72)?;
            db.add_word("EDGE_IO_1", 9 * 8, 16)?;
            db.add_word("EDGE_IO_2", 11 * 8, 16)?;
        }

        // Switchboxes are present on every tile. Each big-switchbox group
        // spans 5 bytes with the drive bits interleaved between the pair.
        let mut pos = 64;
        for k in 0..6 {
            db.add_word(format!("SB_BIG_{:02}", k * 2 + 1), pos * 8, 15)?;
            db.add_word(format!("SB_DRIVE_{:02}", k * 2 + 1), (pos + 2) * 8, 4)?;
            db.add_word(format!("SB_DRIVE_{:02}", k * 2 + 2), (pos + 2) * 8 + 4, 4)?;
            db.add_word(format!("SB_BIG_{:02}", k * 2 + 2), (pos + 3) * 8, 15)?;
            pos += 5;
        }
        for k in 0..6 {
            db.add_word(format!("SB_SML_{:02}", k * 2 + 1), pos * 8, 12)?;
            db.add_word(format!("SB_SML_{:02}", k * 2 + 2), (pos + 1) * 8 + 4, 12)?;
            pos += 3;
        }

        db.add_unknowns();
        Ok(db)
    }
}
