//! Lexical preprocessing: sentence segmentation and tokenization.
//!
//! # Responsibility
//! - Split raw text into sentences and typed tokens with character offsets.
//! - Stay independent of the inference adapter.
//!
//! # Invariants
//! - Offsets are Unicode scalar offsets, never byte offsets.
//! - Non-empty text always yields at least one sentence.

mod segment;
mod tokenize;

pub use segment::segment_sentences;
pub use tokenize::{classify_token, tokenize};

use crate::model::text::{Sentence, Token};

/// Sentences and tokens of one text.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalAnalysis {
    pub sentences: Vec<Sentence>,
    pub tokens: Vec<Token>,
}

impl LexicalAnalysis {
    /// Non-punctuation tokens in stream order.
    pub fn lexical_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|token| !token.is_punct())
    }
}

/// Segments and tokenizes `text` in one call.
pub fn preprocess(text: &str) -> LexicalAnalysis {
    let sentences = segment_sentences(text);
    let tokens = tokenize(text, &sentences);
    LexicalAnalysis { sentences, tokens }
}

/// Byte offset to character offset lookup for one text.
pub(crate) struct CharIndex {
    byte_starts: Vec<usize>,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            byte_starts: text.char_indices().map(|(byte, _)| byte).collect(),
        }
    }

    /// Character offset of the char starting at `byte` (or the text length).
    pub(crate) fn char_offset(&self, byte: usize) -> usize {
        self.byte_starts.partition_point(|&start| start < byte)
    }
}
