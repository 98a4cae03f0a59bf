//! The generic name → bit-range database.

use crate::error::DatabaseError;
use crate::tile_config::TileConfig;
use ccgm_common::BitVec;
use std::collections::HashMap;

/// A contiguous bit range within a configuration block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordRange {
    /// First bit of the range.
    pub start: usize,
    /// Number of bits in the range.
    pub len: usize,
}

/// A name → bit-range map for one kind of configuration block.
///
/// Databases are immutable once built; the concrete constructors live in
/// the sibling modules ([`BitDatabase::tile`], [`BitDatabase::ram`],
/// [`BitDatabase::die_config`], [`BitDatabase::serdes`]). Words keep the
/// order they were registered in, and after construction every bit of the
/// block belongs to exactly one word.
#[derive(Debug, Clone)]
pub struct BitDatabase {
    num_bits: usize,
    known: Vec<bool>,
    words: Vec<(String, WordRange)>,
    index: HashMap<String, usize>,
}

impl BitDatabase {
    /// Creates an empty database covering `num_bits` bits.
    pub(crate) fn with_bits(num_bits: usize) -> Self {
        Self {
            num_bits,
            known: vec![false; num_bits],
            words: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registers a named word covering `len` bits starting at `start`.
    ///
    /// # Errors
    ///
    /// Fails if the name is already taken, a bit is already claimed, or
    /// the range runs past the end of the block.
    pub(crate) fn add_word(
        &mut self,
        name: impl Into<String>,
        start: usize,
        len: usize,
    ) -> Result<(), DatabaseError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(DatabaseError::DuplicateWord { name });
        }
        if start + len > self.num_bits {
            return Err(DatabaseError::OutOfRange {
                name,
                num_bits: self.num_bits,
            });
        }
        for bit in start..start + len {
            if self.known[bit] {
                return Err(DatabaseError::OverlappingBit { name, bit });
            }
        }
        for bit in start..start + len {
            self.known[bit] = true;
        }
        self.index.insert(name.clone(), self.words.len());
        self.words.push((name, WordRange { start, len }));
        Ok(())
    }

    /// Covers every still-unmapped bit with an `UNKNOWN_###` word.
    pub(crate) fn add_unknowns(&mut self) {
        for bit in 0..self.num_bits {
            if !self.known[bit] {
                let name = format!("UNKNOWN_{bit:03}");
                self.known[bit] = true;
                self.index.insert(name.clone(), self.words.len());
                self.words.push((name, WordRange { start: bit, len: 1 }));
            }
        }
    }

    /// Returns the number of bits in the block this database describes.
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Returns the words in registration order.
    pub fn words(&self) -> impl Iterator<Item = (&str, WordRange)> {
        self.words.iter().map(|(name, range)| (name.as_str(), *range))
    }

    /// Returns the bit range of the named word, if present.
    pub fn lookup(&self, name: &str) -> Option<WordRange> {
        self.index.get(name).map(|&i| self.words[i].1)
    }

    /// Expands a byte block into named configuration words.
    ///
    /// Bytes expand least-significant bit first. Words whose bits are all
    /// zero are omitted; the remaining words appear in database order.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not exactly `num_bits / 8` bytes long.
    pub fn data_to_config(&self, data: &[u8]) -> TileConfig {
        assert_eq!(
            data.len() * 8,
            self.num_bits,
            "block length does not match database"
        );
        let bits = bytes_to_bits(data);
        let mut cfg = TileConfig::new();
        for (name, range) in &self.words {
            let mut value = BitVec::zeros(range.len);
            let mut any = false;
            for i in 0..range.len {
                if bits[range.start + i] {
                    value.set(i, true);
                    any = true;
                }
            }
            if any {
                cfg.add_word(name.clone(), value);
            }
        }
        cfg
    }

    /// Packs named configuration words back into a byte block.
    ///
    /// Words absent from `cfg` pack as zero. A value narrower than its
    /// range is zero-extended.
    ///
    /// # Errors
    ///
    /// Fails if a word name is unknown or a value is wider than its range.
    pub fn config_to_data(&self, cfg: &TileConfig) -> Result<Vec<u8>, DatabaseError> {
        let mut bits = vec![false; self.num_bits];
        for word in cfg.words() {
            let range = self
                .lookup(&word.name)
                .ok_or_else(|| DatabaseError::UnknownWord {
                    name: word.name.clone(),
                })?;
            if word.value.len() > range.len {
                return Err(DatabaseError::WordTooWide {
                    name: word.name.clone(),
                    got: word.value.len(),
                    expected: range.len,
                });
            }
            for (i, bit) in word.value.iter().enumerate() {
                bits[range.start + i] = bit;
            }
        }
        Ok(bits_to_bytes(&bits))
    }
}

/// Expands bytes into bits, least significant bit of each byte first.
fn bytes_to_bits(data: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(data.len() * 8);
    for &byte in data {
        for i in 0..8 {
            bits.push(byte & (1 << i) != 0);
        }
    }
    bits
}

/// Packs bits into bytes, 8 bits per byte, least significant first.
fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; bits.len() / 8];
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            bytes[i / 8] |= 1 << (i % 8);
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_db() -> BitDatabase {
        let mut db = BitDatabase::with_bits(16);
        db.add_word("LOW", 0, 4).unwrap();
        db.add_word("HIGH", 8, 8).unwrap();
        db.add_unknowns();
        db
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut db = BitDatabase::with_bits(16);
        db.add_word("A", 0, 4).unwrap();
        let err = db.add_word("A", 8, 4).unwrap_err();
        assert!(matches!(err, DatabaseError::DuplicateWord { .. }));
    }

    #[test]
    fn overlapping_bit_rejected() {
        let mut db = BitDatabase::with_bits(16);
        db.add_word("A", 0, 8).unwrap();
        let err = db.add_word("B", 4, 8).unwrap_err();
        assert_eq!(
            err,
            DatabaseError::OverlappingBit {
                name: "B".into(),
                bit: 4
            }
        );
    }

    #[test]
    fn out_of_range_rejected() {
        let mut db = BitDatabase::with_bits(16);
        let err = db.add_word("A", 12, 8).unwrap_err();
        assert!(matches!(err, DatabaseError::OutOfRange { .. }));
    }

    #[test]
    fn unknowns_fill_every_gap() {
        let db = small_db();
        let covered: usize = db.words().map(|(_, r)| r.len).sum();
        assert_eq!(covered, db.num_bits());
        assert!(db.lookup("UNKNOWN_004").is_some());
        assert!(db.lookup("UNKNOWN_007").is_some());
        assert!(db.lookup("UNKNOWN_000").is_none());
    }

    #[test]
    fn words_partition_block() {
        let db = small_db();
        let mut seen = vec![0u8; db.num_bits()];
        for (_, range) in db.words() {
            for bit in range.start..range.start + range.len {
                seen[bit] += 1;
            }
        }
        assert!(seen.iter().all(|&count| count == 1));
    }

    #[test]
    fn data_to_config_skips_zero_words() {
        let db = small_db();
        let cfg = db.data_to_config(&[0x05, 0x00]);
        assert_eq!(cfg.len(), 1);
        assert_eq!(cfg.words()[0].name, "LOW");
        assert_eq!(cfg.words()[0].value.to_u64(), Some(5));
    }

    #[test]
    fn data_to_config_reports_unknown_bits() {
        let db = small_db();
        let cfg = db.data_to_config(&[0x10, 0x00]);
        assert_eq!(cfg.len(), 1);
        assert_eq!(cfg.words()[0].name, "UNKNOWN_004");
    }

    #[test]
    fn roundtrip_is_bit_exact() {
        let db = small_db();
        for data in [[0x00, 0x00], [0xFF, 0xFF], [0xA5, 0x3C], [0x10, 0x80]] {
            let cfg = db.data_to_config(&data);
            let back = db.config_to_data(&cfg).unwrap();
            assert_eq!(back, data);
        }
    }

    #[test]
    fn config_to_data_rejects_unknown_word() {
        let db = small_db();
        let mut cfg = TileConfig::new();
        cfg.add_word("NOT_A_WORD", BitVec::from_u64(1, 1));
        let err = db.config_to_data(&cfg).unwrap_err();
        assert_eq!(
            err,
            DatabaseError::UnknownWord {
                name: "NOT_A_WORD".into()
            }
        );
    }

    #[test]
    fn config_to_data_zero_extends_short_values() {
        let db = small_db();
        let mut cfg = TileConfig::new();
        cfg.add_word("HIGH", BitVec::from_u64(0x3, 2));
        let data = db.config_to_data(&cfg).unwrap();
        assert_eq!(data, vec![0x00, 0x03]);
    }

    #[test]
    fn config_to_data_rejects_wide_values() {
        let db = small_db();
        let mut cfg = TileConfig::new();
        cfg.add_word("LOW", BitVec::from_u64(0x1F, 5));
        let err = db.config_to_data(&cfg).unwrap_err();
        assert!(matches!(err, DatabaseError::WordTooWide { .. }));
    }

    #[test]
    fn bit_packing_is_lsb_first() {
        let bits = bytes_to_bits(&[0x01, 0x80]);
        assert!(bits[0]);
        assert!(!bits[1]);
        assert!(bits[15]);
        assert_eq!(bits_to_bytes(&bits), vec![0x01, 0x80]);
    }
}
