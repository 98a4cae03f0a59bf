//! A single die: tile latches, block RAM, PLL/status configuration.

use serde::{Deserialize, Serialize};

/// Number of tile rows on a die.
pub const MAX_ROWS: usize = 66;
/// Number of tile columns on a die.
pub const MAX_COLS: usize = 82;
/// Number of block-RAM rows on a die.
pub const MAX_RAM_ROWS: usize = 8;
/// Number of block-RAM columns on a die.
pub const MAX_RAM_COLS: usize = 4;
/// Size of one tile's latch block: 112 configuration bytes plus one
/// trailing byte packing the per-CPE flip-flop initial states.
pub const LATCH_BLOCK_SIZE: usize = 113;
/// Size of one block-RAM configuration block in bytes.
pub const RAM_BLOCK_SIZE: usize = 27;
/// Size of one block-RAM initial-memory image in bytes.
pub const MEMORY_SIZE: usize = 5120;
/// Size of one PLL configuration slot in bytes.
pub const PLL_CFG_SIZE: usize = 12;
/// Number of PLL instances per die.
pub const MAX_PLL: usize = 4;
/// Size of the clock-input configuration in bytes.
pub const CLKIN_CFG_SIZE: usize = 4;
/// Size of the global-output configuration in bytes.
pub const GLBOUT_CFG_SIZE: usize = 8;
/// Byte offset of the status region within the die configuration block.
pub const STATUS_CFG_START: usize = PLL_CFG_SIZE * MAX_PLL * 2 + CLKIN_CFG_SIZE + GLBOUT_CFG_SIZE;
/// Size of the status region in bytes.
pub const STATUS_CFG_SIZE: usize = 12;
/// Total size of the die configuration block in bytes.
pub const DIE_CONFIG_SIZE: usize = STATUS_CFG_START + STATUS_CFG_SIZE + 1;
/// Size of the SERDES configuration block in bytes.
pub const SERDES_CFG_SIZE: usize = 186;

/// Flip-flop initial state: leave untouched.
pub const FF_INIT_NONE: u8 = 0;
/// Flip-flop initial state: reset after configuration.
pub const FF_INIT_RESET: u8 = 2;
/// Flip-flop initial state: set after configuration.
pub const FF_INIT_SET: u8 = 3;

/// Byte offset of the CLKIN configuration within the die config block.
const CLKIN_CFG_START: usize = PLL_CFG_SIZE * MAX_PLL * 2;
/// Byte offset of the GLBOUT configuration within the die config block.
const GLBOUT_CFG_START: usize = CLKIN_CFG_START + CLKIN_CFG_SIZE;
/// Default GPIO bank-enable bytes in the status region (all banks on).
const BANK_ENABLE_DEFAULT: u8 = 0x33;

/// Returns whether `(x, y)` is on the die's edge.
///
/// Edge tiles never carry CPE logic; only interior tiles do.
pub fn is_edge_location(x: usize, y: usize) -> bool {
    x == 0 || x == MAX_COLS - 1 || y == 0 || y == MAX_ROWS - 1
}

/// One die of a CCGM1A chip.
///
/// Blocks are stored as byte vectors that start empty and are grown to
/// their fixed size on first write; an empty (or all-zero) vector means the
/// entity is unused. Decoders may supply short blocks — the tail stays
/// zero-filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Die {
    latch: Vec<Vec<u8>>,
    ram: Vec<Vec<u8>>,
    ram_data: Vec<Vec<u8>>,
    die_cfg: Vec<u8>,
    serdes_cfg: Vec<u8>,
    d2d: u8,
}

impl Default for Die {
    fn default() -> Self {
        Self::new()
    }
}

impl Die {
    /// Creates an empty die.
    ///
    /// The die configuration starts all-zero apart from the GPIO
    /// bank-enable defaults in the status region.
    pub fn new() -> Self {
        let mut die_cfg = vec![0u8; DIE_CONFIG_SIZE];
        die_cfg[STATUS_CFG_START + 2] = BANK_ENABLE_DEFAULT;
        die_cfg[STATUS_CFG_START + 3] = BANK_ENABLE_DEFAULT;
        Self {
            latch: vec![Vec::new(); MAX_ROWS * MAX_COLS],
            ram: vec![Vec::new(); MAX_RAM_ROWS * MAX_RAM_COLS],
            ram_data: vec![Vec::new(); MAX_RAM_ROWS * MAX_RAM_COLS],
            die_cfg,
            serdes_cfg: Vec::new(),
            d2d: 0,
        }
    }

    fn latch_index(x: usize, y: usize) -> usize {
        assert!(x < MAX_COLS && y < MAX_ROWS, "tile ({x},{y}) out of range");
        y * MAX_COLS + x
    }

    fn ram_index(x: usize, y: usize) -> usize {
        assert!(
            x < MAX_RAM_COLS && y < MAX_RAM_ROWS,
            "RAM ({x},{y}) out of range"
        );
        y * MAX_RAM_COLS + x
    }

    /// Returns the latch block for tile `(x, y)`; empty if unused.
    pub fn latch(&self, x: usize, y: usize) -> &[u8] {
        &self.latch[Self::latch_index(x, y)]
    }

    /// Returns whether tile `(x, y)` carries no configuration.
    pub fn is_latch_empty(&self, x: usize, y: usize) -> bool {
        self.latch(x, y).iter().all(|&b| b == 0)
    }

    /// Returns whether the CPE bytes (`[0..40)`) of tile `(x, y)` are all
    /// zero.
    pub fn is_cpe_empty(&self, x: usize, y: usize) -> bool {
        let block = self.latch(x, y);
        block.iter().take(40).all(|&b| b == 0)
    }

    /// Writes a latch block prefix at tile `(x, y)`.
    ///
    /// The block is grown to [`LATCH_BLOCK_SIZE`] with zero fill before the
    /// prefix is copied; bytes past `data.len()` keep their previous value.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of range or `data` is longer than
    /// the block.
    pub fn write_latch(&mut self, x: usize, y: usize, data: &[u8]) {
        assert!(data.len() <= LATCH_BLOCK_SIZE, "latch block too long");
        let block = &mut self.latch[Self::latch_index(x, y)];
        block.resize(LATCH_BLOCK_SIZE, 0);
        block[..data.len()].copy_from_slice(data);
    }

    /// Writes the packed flip-flop initial-state byte of tile `(x, y)`.
    pub fn write_ff_init(&mut self, x: usize, y: usize, value: u8) {
        let block = &mut self.latch[Self::latch_index(x, y)];
        block.resize(LATCH_BLOCK_SIZE, 0);
        block[LATCH_BLOCK_SIZE - 1] = value;
    }

    /// Returns the packed flip-flop initial-state byte of tile `(x, y)`.
    pub fn ff_init(&self, x: usize, y: usize) -> u8 {
        self.latch(x, y).last().copied().unwrap_or(0)
    }

    /// Returns the RAM configuration block at `(x, y)`; empty if unused.
    pub fn ram(&self, x: usize, y: usize) -> &[u8] {
        &self.ram[Self::ram_index(x, y)]
    }

    /// Returns whether the RAM block at `(x, y)` carries no configuration.
    pub fn is_ram_empty(&self, x: usize, y: usize) -> bool {
        self.ram(x, y).iter().all(|&b| b == 0)
    }

    /// Writes a RAM configuration block prefix at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of range or `data` is longer than
    /// [`RAM_BLOCK_SIZE`].
    pub fn write_ram(&mut self, x: usize, y: usize, data: &[u8]) {
        assert!(data.len() <= RAM_BLOCK_SIZE, "RAM block too long");
        let block = &mut self.ram[Self::ram_index(x, y)];
        block.resize(RAM_BLOCK_SIZE, 0);
        block[..data.len()].copy_from_slice(data);
    }

    /// Returns the RAM initial-memory image at `(x, y)`; empty if unused.
    pub fn ram_data(&self, x: usize, y: usize) -> &[u8] {
        &self.ram_data[Self::ram_index(x, y)]
    }

    /// Returns whether the RAM at `(x, y)` has no initial-memory content.
    pub fn is_ram_data_empty(&self, x: usize, y: usize) -> bool {
        self.ram_data(x, y).iter().all(|&b| b == 0)
    }

    /// Writes RAM initial-memory bytes at `(x, y)` starting at `addr`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of range or the write would run past
    /// [`MEMORY_SIZE`].
    pub fn write_ram_data(&mut self, x: usize, y: usize, data: &[u8], addr: u16) {
        let addr = addr as usize;
        assert!(addr + data.len() <= MEMORY_SIZE, "RAM data out of range");
        let block = &mut self.ram_data[Self::ram_index(x, y)];
        block.resize(MEMORY_SIZE, 0);
        block[addr..addr + data.len()].copy_from_slice(data);
    }

    /// Returns the die configuration block.
    pub fn die_cfg(&self) -> &[u8] {
        &self.die_cfg
    }

    /// Returns whether PLL configuration slot `slot` (0..8) is all zero.
    pub fn is_pll_cfg_empty(&self, slot: usize) -> bool {
        assert!(slot < MAX_PLL * 2, "PLL slot out of range");
        let start = slot * PLL_CFG_SIZE;
        self.die_cfg[start..start + PLL_CFG_SIZE]
            .iter()
            .all(|&b| b == 0)
    }

    /// Returns whether the clock-input configuration is all zero.
    pub fn is_clkin_cfg_empty(&self) -> bool {
        self.die_cfg[CLKIN_CFG_START..CLKIN_CFG_START + CLKIN_CFG_SIZE]
            .iter()
            .all(|&b| b == 0)
    }

    /// Returns whether the global-output configuration is all zero.
    pub fn is_glbout_cfg_empty(&self) -> bool {
        self.die_cfg[GLBOUT_CFG_START..GLBOUT_CFG_START + GLBOUT_CFG_SIZE]
            .iter()
            .all(|&b| b == 0)
    }

    /// Writes a PLL command body under the given select latch.
    ///
    /// Bit `i` of `select` routes the first [`PLL_CFG_SIZE`] bytes to PLL
    /// `i`; bit `i + 4` picks slot B instead of slot A. Any bytes past the
    /// PLL slot are the shared CLKIN/GLBOUT tail and land at byte offset
    /// [`PLL_CFG_SIZE`]` * `[`MAX_PLL`]` * 2`.
    ///
    /// # Panics
    ///
    /// Panics if `data` is shorter than one PLL slot or the tail would run
    /// past the status region.
    pub fn write_pll_select(&mut self, select: u8, data: &[u8]) {
        assert!(data.len() >= PLL_CFG_SIZE, "PLL body too short");
        assert!(
            data.len() <= PLL_CFG_SIZE + CLKIN_CFG_SIZE + GLBOUT_CFG_SIZE,
            "PLL body too long"
        );
        for i in 0..MAX_PLL {
            if select & (1 << i) != 0 {
                let slot = i * 2 + ((select >> (i + 4)) & 1) as usize;
                let start = slot * PLL_CFG_SIZE;
                self.die_cfg[start..start + PLL_CFG_SIZE].copy_from_slice(&data[..PLL_CFG_SIZE]);
            }
        }
        let tail = &data[PLL_CFG_SIZE..];
        self.die_cfg[CLKIN_CFG_START..CLKIN_CFG_START + tail.len()].copy_from_slice(tail);
    }

    /// Returns the status region of the die configuration.
    pub fn status(&self) -> &[u8] {
        &self.die_cfg[STATUS_CFG_START..STATUS_CFG_START + STATUS_CFG_SIZE]
    }

    /// Writes a status-word prefix into the die configuration.
    ///
    /// # Panics
    ///
    /// Panics if `data` is longer than [`STATUS_CFG_SIZE`].
    pub fn write_status(&mut self, data: &[u8]) {
        assert!(data.len() <= STATUS_CFG_SIZE, "status word too long");
        self.die_cfg[STATUS_CFG_START..STATUS_CFG_START + data.len()].copy_from_slice(data);
    }

    /// Returns whether configuration uses the dedicated CFG GPIO bank.
    pub fn is_using_cfg_gpios(&self) -> bool {
        self.die_cfg[STATUS_CFG_START + 2] & 0x08 != 0
    }

    /// Returns the SERDES block; empty when absent.
    pub fn serdes_cfg(&self) -> &[u8] {
        &self.serdes_cfg
    }

    /// Returns whether the SERDES block is absent or all zero.
    pub fn is_serdes_empty(&self) -> bool {
        self.serdes_cfg.iter().all(|&b| b == 0)
    }

    /// Installs the SERDES block.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not exactly [`SERDES_CFG_SIZE`] bytes.
    pub fn write_serdes_cfg(&mut self, data: &[u8]) {
        assert_eq!(data.len(), SERDES_CFG_SIZE, "SERDES block size mismatch");
        self.serdes_cfg = data.to_vec();
    }

    /// Returns the die-to-die routing byte.
    pub fn d2d(&self) -> u8 {
        self.d2d
    }

    /// Sets the die-to-die routing byte.
    pub fn set_d2d(&mut self, value: u8) {
        self.d2d = value;
    }
}
