//! Sentence and token records produced by the lexical preprocessor.
//!
//! # Responsibility
//! - Define the value objects shared by analysis and mapping stages.
//! - Carry stable integer identities (`Sentence::id`, `Token::idx`).
//!
//! # Invariants
//! - `Token::char_start < Token::char_end`.
//! - `Token::sentence_id` always refers to an existing sentence.
//! - `TypeTag::Punct` tokens keep `salience == 0` and no embedding slice.

use serde::{Deserialize, Serialize};

/// Stable sentence identity (position in segmentation order).
pub type SentenceId = usize;

/// Stable token identity (position in the full token stream, punctuation included).
pub type TokenIdx = usize;

/// Refined token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TypeTag {
    Word,
    Number,
    Date,
    Url,
    Name,
    Punct,
}

impl TypeTag {
    /// Stable wire value used in JSON payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Word => "WORD",
            Self::Number => "NUMBER",
            Self::Date => "DATE",
            Self::Url => "URL",
            Self::Name => "NAME",
            Self::Punct => "PUNCT",
        }
    }

    /// Returns whether tokens with this tag take part in salience and layout.
    pub fn is_lexical(self) -> bool {
        self != Self::Punct
    }
}

/// One segmented sentence.
///
/// `start`/`end` are character offsets (Unicode scalar values) into the
/// original text, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub id: SentenceId,
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Whitespace-delimited word count of the trimmed sentence.
    pub word_count: usize,
    /// Signed sentiment in [-1, 1]; 0 until calibration runs.
    #[serde(default)]
    pub signed_sentiment: f64,
    /// Unsigned sentiment magnitude in [0, 1].
    #[serde(default)]
    pub score: f64,
}

impl Sentence {
    /// Creates an unscored sentence.
    pub fn new(id: SentenceId, text: impl Into<String>, start: usize, end: usize) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        Self {
            id,
            text,
            start,
            end,
            word_count,
            signed_sentiment: 0.0,
            score: 0.0,
        }
    }

    /// Character distance between this sentence span and `[start, end)`.
    ///
    /// Returns 0 for any overlap.
    pub fn gap_to(&self, start: usize, end: usize) -> usize {
        if end <= self.start {
            self.start - end
        } else if start >= self.end {
            start - self.end
        } else {
            0
        }
    }

    /// Returns whether `[start, end)` lies fully inside this sentence.
    pub fn contains_span(&self, start: usize, end: usize) -> bool {
        self.start <= start && end <= self.end
    }
}

/// One token of the full token stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub text: String,
    pub idx: TokenIdx,
    pub char_start: usize,
    pub char_end: usize,
    pub sentence_id: SentenceId,
    /// Length in characters.
    #[serde(default)]
    pub len: usize,
    pub type_tag: TypeTag,
    /// Semantic importance in [0, 1].
    #[serde(default)]
    pub salience: f64,
    /// Leading dimensions of the token embedding, when it was scored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_slice: Option<Vec<f64>>,
}

impl Token {
    pub fn is_punct(&self) -> bool {
        self.type_tag == TypeTag::Punct
    }
}

/// Resolves the sentence owning the character span `[start, end)`.
///
/// `sentences` must be ordered by `start`. A containing sentence wins;
/// otherwise the neighbour with the smallest boundary gap is chosen, the
/// earlier one on ties. Returns `None` only when `sentences` is empty.
pub fn resolve_sentence(sentences: &[Sentence], start: usize, end: usize) -> Option<SentenceId> {
    if sentences.is_empty() {
        return None;
    }

    let pos = sentences.partition_point(|sentence| sentence.start <= start);
    let lo = pos.saturating_sub(1);
    let hi = (pos + 1).min(sentences.len());

    let mut best: Option<(usize, SentenceId)> = None;
    for sentence in &sentences[lo..hi] {
        if sentence.contains_span(start, end) {
            return Some(sentence.id);
        }
        let gap = sentence.gap_to(start, end);
        if best.map_or(true, |(best_gap, _)| gap < best_gap) {
            best = Some((gap, sentence.id));
        }
    }
    best.map(|(_, id)| id)
}
