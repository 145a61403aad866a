//! Sentence segmentation.
//!
//! # Invariants
//! - A boundary is one or more terminators (`.`, `!`, `?`, `…`) followed by
//!   whitespace; terminators stay with the preceding sentence.
//! - Text after the last boundary becomes the final sentence.
//! - Whitespace-only pieces are dropped; kept pieces are trimmed and their
//!   offsets point at the trimmed span.

use crate::lexical::CharIndex;
use crate::model::text::Sentence;
use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?…]+\s+").expect("valid sentence boundary regex"));

/// Splits `text` into sentences with character offsets.
pub fn segment_sentences(text: &str) -> Vec<Sentence> {
    let index = CharIndex::new(text);
    let mut sentences = Vec::new();
    let mut cursor = 0usize;

    for boundary in SENTENCE_BOUNDARY_RE.find_iter(text) {
        let terminator_len = boundary.as_str().trim_end().len();
        push_piece(
            text,
            cursor,
            boundary.start() + terminator_len,
            &index,
            &mut sentences,
        );
        cursor = boundary.end();
    }
    push_piece(text, cursor, text.len(), &index, &mut sentences);

    sentences
}

fn push_piece(
    text: &str,
    byte_start: usize,
    byte_end: usize,
    index: &CharIndex,
    sentences: &mut Vec<Sentence>,
) {
    let piece = &text[byte_start..byte_end];
    let trimmed = piece.trim();
    if trimmed.is_empty() {
        return;
    }

    let leading = piece.len() - piece.trim_start().len();
    let start = byte_start + leading;
    let end = start + trimmed.len();
    sentences.push(Sentence::new(
        sentences.len(),
        trimmed,
        index.char_offset(start),
        index.char_offset(end),
    ));
}
