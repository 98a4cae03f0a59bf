//! Database error types.

/// Errors produced while building or using a bit-range database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatabaseError {
    /// A word with this name was already added to the database.
    #[error("word {name} already exists in database")]
    DuplicateWord {
        /// The conflicting word name.
        name: String,
    },
    /// A bit claimed by a new word is already mapped to another word.
    #[error("bit {bit} for word {name} already mapped")]
    OverlappingBit {
        /// The word being added.
        name: String,
        /// The already-claimed bit index.
        bit: usize,
    },
    /// A word range would extend past the end of the block.
    #[error("word {name} extends past the end of the block ({num_bits} bits)")]
    OutOfRange {
        /// The word being added.
        name: String,
        /// Total number of bits in the block.
        num_bits: usize,
    },
    /// A configuration refers to a word the database does not know.
    #[error("unknown configuration word {name}")]
    UnknownWord {
        /// The unknown word name.
        name: String,
    },
    /// A configuration word carries more bits than its range.
    #[error("value of word {name} is {got} bits wide but the range holds {expected}")]
    WordTooWide {
        /// The word name.
        name: String,
        /// Width of the supplied value.
        got: usize,
        /// Width of the database range.
        expected: usize,
    },
}
