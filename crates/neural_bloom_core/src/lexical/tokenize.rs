//! Single-pass tokenizer with refined type tags.
//!
//! # Invariants
//! - `idx` is the position in the full stream, punctuation included.
//! - Offsets are character offsets into the original text.
//! - Every token is assigned to the containing sentence, or the nearest one
//!   by boundary distance when no sentence contains it.

use crate::lexical::CharIndex;
use crate::model::text::{resolve_sentence, Sentence, Token, TypeTag};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?P<url>(?i:https?://|www\.)\S*[^\s.,;:!?)\]"'’])"#,
        r"|(?P<date>(?:\d{1,2}[./-]\d{1,2}[./-]\d{2,4}|\d{4}-\d{1,2}(?:-\d{1,2})?|\d{1,2}/\d{1,2})\b)",
        r"|(?P<number>\d+(?:[.,]\d+)*)",
        r"|(?P<word>\p{L}+(?:['’-]\p{L}+)*)",
        r"|(?P<punct>\p{P})",
        r"|(?P<other>\S)",
    ))
    .expect("valid token regex")
});
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Lu}\p{Ll}+(?:-\p{Lu}?\p{Ll}+)*$").expect("valid name regex"));

const YEAR_MIN: u32 = 1500;
const YEAR_MAX: u32 = 2100;

/// Month abbreviations (English and German), matched case-insensitively on
/// capitalized words only so that "may" or "mar" stay plain words.
const MONTH_ABBREVIATIONS: &[&str] = &[
    "jan", "feb", "mar", "mär", "apr", "may", "mai", "jun", "jul", "aug", "sep", "sept", "oct",
    "okt", "nov", "dec", "dez",
];

/// Raw match class before refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawKind {
    Url,
    Date,
    Number,
    Word,
    Punct,
    Other,
}

impl RawKind {
    fn of(caps: &Captures<'_>) -> Self {
        if caps.name("url").is_some() {
            Self::Url
        } else if caps.name("date").is_some() {
            Self::Date
        } else if caps.name("number").is_some() {
            Self::Number
        } else if caps.name("word").is_some() {
            Self::Word
        } else if caps.name("punct").is_some() {
            Self::Punct
        } else {
            Self::Other
        }
    }
}

/// Tokenizes `text`, assigning each token to one of `sentences`.
///
/// `sentences` must come from [`segment_sentences`](crate::lexical::segment_sentences)
/// on the same text (ordered by start).
pub fn tokenize(text: &str, sentences: &[Sentence]) -> Vec<Token> {
    let index = CharIndex::new(text);

    TOKEN_RE
        .captures_iter(text)
        .enumerate()
        .filter_map(|(idx, caps)| {
            let whole = caps.get(0)?;
            let raw = whole.as_str();
            let char_start = index.char_offset(whole.start());
            let char_end = index.char_offset(whole.end());
            Some(Token {
                text: raw.to_string(),
                idx,
                char_start,
                char_end,
                sentence_id: resolve_sentence(sentences, char_start, char_end).unwrap_or(0),
                len: raw.chars().count(),
                type_tag: refine(RawKind::of(&caps), raw),
                salience: 0.0,
                embedding_slice: None,
            })
        })
        .collect()
}

/// Classifies one token text the way the tokenizer would.
pub fn classify_token(raw: &str) -> TypeTag {
    match TOKEN_RE.captures(raw) {
        Some(caps) if caps.get(0).map(|m| m.as_str()) == Some(raw) => {
            refine(RawKind::of(&caps), raw)
        }
        _ => TypeTag::Word,
    }
}

fn refine(kind: RawKind, raw: &str) -> TypeTag {
    match kind {
        RawKind::Url => TypeTag::Url,
        RawKind::Date => TypeTag::Date,
        RawKind::Number if is_year(raw) => TypeTag::Date,
        RawKind::Number => TypeTag::Number,
        RawKind::Word if is_month_abbreviation(raw) => TypeTag::Date,
        RawKind::Word if NAME_RE.is_match(raw) => TypeTag::Name,
        RawKind::Word => TypeTag::Word,
        RawKind::Punct | RawKind::Other => TypeTag::Punct,
    }
}

fn is_year(raw: &str) -> bool {
    raw.len() == 4
        && raw.bytes().all(|b| b.is_ascii_digit())
        && raw
            .parse::<u32>()
            .map(|year| (YEAR_MIN..=YEAR_MAX).contains(&year))
            .unwrap_or(false)
}

fn is_month_abbreviation(raw: &str) -> bool {
    let starts_upper = raw.chars().next().is_some_and(char::is_uppercase);
    starts_upper && MONTH_ABBREVIATIONS.contains(&raw.to_lowercase().as_str())
}
