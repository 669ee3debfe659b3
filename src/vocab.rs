//! Character Vocabulary
//!
//! Builds the one-hot alphabet for a corpus: the distinct characters in
//! deterministically sorted order, with a stable char ↔ index mapping.
//! The alphabet's size becomes the model's `features` dimension, and its
//! ordering defines which one-hot position each character occupies.
//!
//! Because the vocabulary is built from the corpus itself, every symbol in
//! the corpus is encodable by construction; asking for a character outside
//! the alphabet is a caller bug and fails fast.
//!
//! ## Example
//!
//! ```rust
//! use puck::CharVocab;
//!
//! let vocab = CharVocab::build("abcabc");
//! assert_eq!(vocab.len(), 3);
//! assert_eq!(vocab.index_of('b'), Some(1));
//! assert_eq!(vocab.char_at(2), 'c');
//! ```

use crate::tensor::Matrix;
use std::collections::HashMap;

/// Sorted character alphabet with one-hot encoding
pub struct CharVocab {
    chars: Vec<char>,
    index: HashMap<char, usize>,
}

impl CharVocab {
    /// Build the alphabet from a corpus
    ///
    /// Distinct characters are sorted by code point, so the same corpus
    /// always yields the same index mapping.
    pub fn build(text: &str) -> Self {
        let mut chars: Vec<char> = text.chars().collect();
        chars.sort_unstable();
        chars.dedup();

        let index = chars.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self { chars, index }
    }

    /// Alphabet size (the model's `features` dimension)
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// True when the corpus had no characters at all
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Index of a character, if it is in the alphabet
    pub fn index_of(&self, ch: char) -> Option<usize> {
        self.index.get(&ch).copied()
    }

    /// Character at an alphabet index
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn char_at(&self, idx: usize) -> char {
        self.chars[idx]
    }

    /// One-hot column vector for an alphabet index
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn one_hot(&self, idx: usize) -> Matrix {
        assert!(
            idx < self.len(),
            "index {} out of range for alphabet of {}",
            idx,
            self.len()
        );
        let mut m = Matrix::zeros(self.len(), 1);
        m.data[idx] = 1.0;
        m
    }

    /// Encode a text as a sequence of one-hot vectors
    ///
    /// # Panics
    ///
    /// Panics if the text contains a character outside the alphabet. Text
    /// encoded for training comes from the same corpus the vocabulary was
    /// built from, so this only fires on caller error.
    pub fn encode(&self, text: &str) -> Vec<Matrix> {
        text.chars()
            .map(|ch| {
                let idx = self
                    .index_of(ch)
                    .unwrap_or_else(|| panic!("character {:?} is not in the alphabet", ch));
                self.one_hot(idx)
            })
            .collect()
    }
}
