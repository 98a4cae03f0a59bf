//! Textual device-configuration format for CCGM1A chips.
//!
//! The format is line-oriented, with sections separated by blank lines:
//!
//! ```text
//! .device CCGM1A1
//!
//! .tile <die> <x> <y>
//! <word_name> <bit_string>
//! ...
//!
//! .bram <die> <x> <y>
//! <word_name> <bit_string>
//! ...
//!
//! .bram_init <die> <x> <y>
//! <hex_byte> <hex_byte> ...      (32 bytes per line)
//! ```
//!
//! Bit strings print the most significant bit first. [`ChipConfig`]
//! converts between this text form and the [`Chip`](ccgm_chip::Chip)
//! model by running every block through the bit-range databases.

#![warn(missing_docs)]

use ccgm_bitdb::{BitDatabase, DatabaseError, TileConfig};
use ccgm_chip::die::{MAX_COLS, MAX_RAM_COLS, MAX_RAM_ROWS, MAX_ROWS, MEMORY_SIZE};
use ccgm_chip::{Chip, ChipError};
use ccgm_common::BitVec;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Errors produced while parsing or converting a textual configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A section verb the grammar does not know.
    #[error("unrecognised config entry {verb}")]
    UnknownVerb {
        /// The offending verb.
        verb: String,
    },
    /// A malformed line.
    #[error("line {line}: {message}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },
    /// A RAM initialisation block longer than the device memory.
    #[error("RAM init data for {die} {x} {y} is {len} bytes, more than the {MEMORY_SIZE}-byte memory")]
    RamInitTooLong {
        /// Die index.
        die: usize,
        /// RAM column.
        x: usize,
        /// RAM row.
        y: usize,
        /// Length of the supplied data.
        len: usize,
    },
    /// A database lookup or translation failure.
    #[error(transparent)]
    Database(#[from] DatabaseError),
    /// An invalid device name.
    #[error(transparent)]
    Chip(#[from] ChipError),
}

/// A block location within the chip: die index plus grid coordinates.
///
/// Ordered by die, then row, then column — the order sections appear in
/// the textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CfgLoc {
    /// Die index.
    pub die: usize,
    /// Grid row.
    pub y: usize,
    /// Grid column.
    pub x: usize,
}

impl CfgLoc {
    /// Creates a location.
    pub fn new(die: usize, x: usize, y: usize) -> Self {
        Self { die, y, x }
    }
}

/// A chip configuration in its textual, named-word representation.
#[derive(Debug, Clone, Default)]
pub struct ChipConfig {
    /// The device name (`CCGM1A<N>`).
    pub chip_name: String,
    /// Tile configurations by location.
    pub tiles: BTreeMap<CfgLoc, TileConfig>,
    /// Block-RAM configurations by location.
    pub brams: BTreeMap<CfgLoc, TileConfig>,
    /// Block-RAM initial memory content by location.
    pub bram_data: BTreeMap<CfgLoc, Vec<u8>>,
}

impl ChipConfig {
    /// Builds a chip from this configuration.
    ///
    /// Locations outside the device grid are ignored, matching the
    /// decoder's grid walk.
    ///
    /// # Errors
    ///
    /// Fails on an unknown device name, an unknown word name or an
    /// oversized RAM initialisation block.
    pub fn to_chip(&self) -> Result<Chip, ConfigError> {
        let mut chip = Chip::from_name(&self.chip_name)?;
        let ram_db = BitDatabase::ram()?;
        for d in 0..chip.die_count() {
            for y in 0..MAX_ROWS {
                for x in 0..MAX_COLS {
                    if let Some(cfg) = self.tiles.get(&CfgLoc::new(d, x, y)) {
                        let db = BitDatabase::tile(x, y)?;
                        let data = db.config_to_data(cfg)?;
                        chip.die_mut(d).write_latch(x, y, &data);
                    }
                }
            }
            for y in 0..MAX_RAM_ROWS {
                for x in 0..MAX_RAM_COLS {
                    let loc = CfgLoc::new(d, x, y);
                    if let Some(cfg) = self.brams.get(&loc) {
                        let data = ram_db.config_to_data(cfg)?;
                        chip.die_mut(d).write_ram(x, y, &data);
                    }
                    if let Some(data) = self.bram_data.get(&loc) {
                        if data.len() > MEMORY_SIZE {
                            return Err(ConfigError::RamInitTooLong {
                                die: d,
                                x,
                                y,
                                len: data.len(),
                            });
                        }
                        chip.die_mut(d).write_ram_data(x, y, data, 0);
                    }
                }
            }
        }
        Ok(chip)
    }

    /// Extracts the configuration of a chip.
    ///
    /// Empty blocks are omitted; RAM initialisation data is kept only for
    /// RAM blocks that also carry a configuration.
    ///
    /// # Errors
    ///
    /// Fails only on a database construction inconsistency.
    pub fn from_chip(chip: &Chip) -> Result<Self, ConfigError> {
        let mut config = ChipConfig {
            chip_name: chip.name().to_string(),
            ..Default::default()
        };
        let ram_db = BitDatabase::ram()?;
        for d in 0..chip.die_count() {
            let die = chip.die(d);
            for y in 0..MAX_ROWS {
                for x in 0..MAX_COLS {
                    if !die.is_latch_empty(x, y) {
                        let db = BitDatabase::tile(x, y)?;
                        config
                            .tiles
                            .insert(CfgLoc::new(d, x, y), db.data_to_config(die.latch(x, y)));
                    }
                }
            }
            for y in 0..MAX_RAM_ROWS {
                for x in 0..MAX_RAM_COLS {
                    if !die.is_ram_empty(x, y) {
                        let loc = CfgLoc::new(d, x, y);
                        config
                            .brams
                            .insert(loc, ram_db.data_to_config(die.ram(x, y)));
                        if !die.is_ram_data_empty(x, y) {
                            config.bram_data.insert(loc, die.ram_data(x, y).to_vec());
                        }
                    }
                }
            }
        }
        Ok(config)
    }
}

impl fmt::Display for ChipConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".device {}", self.chip_name)?;
        writeln!(f)?;
        for (loc, tile) in &self.tiles {
            if !tile.is_empty() {
                writeln!(f, ".tile {} {} {}", loc.die, loc.x, loc.y)?;
                write!(f, "{tile}")?;
                writeln!(f)?;
            }
        }
        for (loc, bram) in &self.brams {
            if !bram.is_empty() {
                writeln!(f, ".bram {} {} {}", loc.die, loc.x, loc.y)?;
                write!(f, "{bram}")?;
                writeln!(f)?;
            }
        }
        for (loc, data) in &self.bram_data {
            if !data.iter().all(|&b| b == 0) {
                writeln!(f, ".bram_init {} {} {}", loc.die, loc.x, loc.y)?;
                for (i, byte) in data.iter().enumerate() {
                    write!(f, "{byte:02x}")?;
                    if i % 32 == 31 {
                        writeln!(f)?;
                    } else {
                        write!(f, " ")?;
                    }
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

type Lines<'a> = std::iter::Peekable<std::iter::Enumerate<std::str::Lines<'a>>>;

fn malformed(line: usize, message: impl Into<String>) -> ConfigError {
    ConfigError::Malformed {
        line: line + 1,
        message: message.into(),
    }
}

/// Parses the `<die> <x> <y>` operands of a section verb.
fn parse_loc<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<CfgLoc, ConfigError> {
    let mut next_number = |what: &str| {
        tokens
            .next()
            .ok_or_else(|| malformed(line, format!("missing {what}")))?
            .parse::<usize>()
            .map_err(|_| malformed(line, format!("invalid {what}")))
    };
    let die = next_number("die index")?;
    let x = next_number("column")?;
    let y = next_number("row")?;
    Ok(CfgLoc::new(die, x, y))
}

/// Parses configuration-word lines until a blank line or the next section.
fn parse_words(lines: &mut Lines) -> Result<TileConfig, ConfigError> {
    let mut config = TileConfig::new();
    while let Some(&(idx, raw)) = lines.peek() {
        let line = raw.trim();
        if line.is_empty() {
            lines.next();
            break;
        }
        if line.starts_with('.') {
            break;
        }
        lines.next();
        let mut tokens = line.split_whitespace();
        let name = tokens.next().unwrap_or_default();
        let value = tokens
            .next()
            .ok_or_else(|| malformed(idx, format!("word {name} has no value")))?;
        if tokens.next().is_some() {
            return Err(malformed(idx, "trailing tokens after word value"));
        }
        let bits: BitVec = value
            .parse()
            .map_err(|e| malformed(idx, format!("word {name}: {e}")))?;
        config.add_word(name, bits);
    }
    Ok(config)
}

/// Parses hex-byte lines until a blank line or the next section.
fn parse_hex_block(lines: &mut Lines) -> Result<Vec<u8>, ConfigError> {
    let mut data = Vec::new();
    while let Some(&(idx, raw)) = lines.peek() {
        let line = raw.trim();
        if line.is_empty() {
            lines.next();
            break;
        }
        if line.starts_with('.') {
            break;
        }
        lines.next();
        for token in line.split_whitespace() {
            let byte = u8::from_str_radix(token, 16)
                .map_err(|_| malformed(idx, format!("invalid hex byte '{token}'")))?;
            data.push(byte);
        }
    }
    Ok(data)
}

impl FromStr for ChipConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config = ChipConfig::default();
        let mut lines: Lines = s.lines().enumerate().peekable();
        while let Some((idx, raw)) = lines.next() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let verb = tokens.next().unwrap_or_default();
            match verb {
                ".device" => {
                    config.chip_name = tokens
                        .next()
                        .ok_or_else(|| malformed(idx, ".device needs a name"))?
                        .to_string();
                }
                ".tile" => {
                    let loc = parse_loc(&mut tokens, idx)?;
                    let words = parse_words(&mut lines)?;
                    config.tiles.insert(loc, words);
                }
                ".bram" => {
                    let loc = parse_loc(&mut tokens, idx)?;
                    let words = parse_words(&mut lines)?;
                    config.brams.insert(loc, words);
                }
                ".bram_init" => {
                    let loc = parse_loc(&mut tokens, idx)?;
                    let data = parse_hex_block(&mut lines)?;
                    config.bram_data.insert(loc, data);
                }
                other => {
                    return Err(ConfigError::UnknownVerb {
                        verb: other.to_string(),
                    });
                }
            }
        }
        Ok(config)
    }
}
