//! Configuration words: the named, textual view of a configuration block.

use ccgm_common::BitVec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single named configuration word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigWord {
    /// The word name, as registered in the bit database.
    pub name: String,
    /// The word value, index 0 least significant.
    pub value: BitVec,
}

impl fmt::Display for ConfigWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.value)
    }
}

/// An ordered collection of configuration words for one block.
///
/// Words keep their insertion order, which for database output is the
/// database's own word order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileConfig {
    words: Vec<ConfigWord>,
}

impl TileConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a word.
    pub fn add_word(&mut self, name: impl Into<String>, value: BitVec) {
        self.words.push(ConfigWord {
            name: name.into(),
            value,
        });
    }

    /// Returns the words in insertion order.
    pub fn words(&self) -> &[ConfigWord] {
        &self.words
    }

    /// Returns the value of the named word, if present.
    pub fn get(&self, name: &str) -> Option<&BitVec> {
        self.words.iter().find(|w| w.name == name).map(|w| &w.value)
    }

    /// Returns whether the configuration holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }
}

impl fmt::Display for TileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in &self.words {
            writeln!(f, "{word}")?;
        }
        Ok(())
    }
}
