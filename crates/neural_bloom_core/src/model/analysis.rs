//! Analysis aggregate handed from the analyzer to the bloom mapper.
//!
//! # Responsibility
//! - Define the mapper input contract (`AnalysisResult`) and its parts.
//! - Build every `AnalysisResult` through one validating factory that fills
//!   documented defaults, so mapping code never re-checks shapes.
//!
//! # Invariants
//! - `embedding` is never empty; missing input becomes `EMBEDDING_DIM` zeros.
//! - All floats are finite and clamped into their documented ranges.
//! - Sentences are ordered by `start`, ids are unique.
//! - Tokens are ordered by `idx`, indices are unique, spans are non-empty,
//!   and every `sentence_id` names an existing sentence.
//! - `AnalysisResult` is immutable after construction.

use crate::mapping::seed::topic_hash;
use crate::model::text::{resolve_sentence, Sentence, SentenceId, Token, TokenIdx};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Dimensionality of document embeddings expected by the mapper.
pub const EMBEDDING_DIM: usize = 384;

/// Document-level sentiment label after calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Maps a signed value onto a label with a symmetric neutral dead-zone.
    pub fn from_signed(value: f64, margin: f64) -> Self {
        if value > margin {
            Self::Positive
        } else if value < -margin {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    /// Particle flow direction: `+1` positive, `-1` negative, `0` neutral.
    pub fn direction(self) -> i8 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
            Self::Neutral => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
        }
    }
}

/// Calibrated document sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentSentiment {
    pub label: SentimentLabel,
    /// Confidence in [0, 1].
    pub score: f64,
}

impl Default for DocumentSentiment {
    fn default() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.5,
        }
    }
}

/// Corpus-level statistics computed without the inference adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStats {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_word_length: f64,
    pub unique_words: usize,
    /// Type-token ratio in [0, 1].
    pub lexical_diversity: f64,
    /// Exclamation/all-caps intensity in [0, 1].
    pub emphasis_score: f64,
    /// Question intensity in [0, 1].
    pub question_score: f64,
    pub mean_sentence_length: f64,
    pub variance_sentence_length: f64,
    pub std_sentence_length: f64,
    pub punctuation_per_word: f64,
}

/// Emotion categories detected by keyword hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Emotion {
    Joy,
    Anger,
    Sadness,
    Fear,
}

impl Emotion {
    pub const ALL: [Emotion; 4] = [Self::Joy, Self::Anger, Self::Sadness, Self::Fear];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Joy => "joy",
            Self::Anger => "anger",
            Self::Sadness => "sadness",
            Self::Fear => "fear",
        }
    }
}

/// Binary emotion flags, serialized as `0|1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionHints {
    #[serde(with = "flag")]
    pub joy: bool,
    #[serde(with = "flag")]
    pub anger: bool,
    #[serde(with = "flag")]
    pub sadness: bool,
    #[serde(with = "flag")]
    pub fear: bool,
}

impl EmotionHints {
    pub fn is_active(&self, emotion: Emotion) -> bool {
        match emotion {
            Emotion::Joy => self.joy,
            Emotion::Anger => self.anger,
            Emotion::Sadness => self.sadness,
            Emotion::Fear => self.fear,
        }
    }

    pub fn set(&mut self, emotion: Emotion, active: bool) {
        match emotion {
            Emotion::Joy => self.joy = active,
            Emotion::Anger => self.anger = active,
            Emotion::Sadness => self.sadness = active,
            Emotion::Fear => self.fear = active,
        }
    }

    /// Active emotions in the fixed `Emotion::ALL` order.
    pub fn active(&self) -> impl Iterator<Item = Emotion> + '_ {
        Emotion::ALL
            .into_iter()
            .filter(move |emotion| self.is_active(*emotion))
    }
}

mod flag {
    use super::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}

/// Reproducibility hints threaded into the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hints {
    pub emotion_hints: EmotionHints,
    pub topic_hash: u64,
}

/// Unvalidated hint input; `topic_hash` is derived from the embedding when absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HintParts {
    pub emotion_hints: EmotionHints,
    pub topic_hash: Option<u64>,
}

/// Unvalidated analysis input accepted by [`AnalysisResult::from_parts`].
///
/// This is also the JSON shape of the mapper input contract.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisParts {
    pub embedding: Vec<f64>,
    pub sentiment: DocumentSentiment,
    pub stats: TextStats,
    pub hints: HintParts,
    pub sentences: Vec<Sentence>,
    pub tokens: Vec<Token>,
}

/// Validation failures raised by the analysis factory.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisValidationError {
    /// A numeric field is NaN or infinite.
    NonFiniteValue(&'static str),
    DuplicateSentenceId(SentenceId),
    InvalidSentenceSpan {
        id: SentenceId,
        start: usize,
        end: usize,
    },
    DuplicateTokenIdx(TokenIdx),
    InvalidTokenSpan {
        idx: TokenIdx,
        start: usize,
        end: usize,
    },
    /// Tokens were supplied without any sentence to attach them to.
    MissingSentences,
    /// JSON payload could not be decoded.
    Json(String),
}

impl Display for AnalysisValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteValue(field) => write!(f, "non-finite value in `{field}`"),
            Self::DuplicateSentenceId(id) => write!(f, "duplicate sentence id: {id}"),
            Self::InvalidSentenceSpan { id, start, end } => {
                write!(f, "sentence {id} has invalid span {start}..{end}")
            }
            Self::DuplicateTokenIdx(idx) => write!(f, "duplicate token idx: {idx}"),
            Self::InvalidTokenSpan { idx, start, end } => {
                write!(f, "token {idx} has invalid span {start}..{end}")
            }
            Self::MissingSentences => write!(f, "tokens present but no sentences"),
            Self::Json(message) => write!(f, "invalid analysis json: {message}"),
        }
    }
}

impl Error for AnalysisValidationError {}

/// Immutable analysis aggregate consumed by the bloom mapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    embedding: Vec<f64>,
    sentiment: DocumentSentiment,
    stats: TextStats,
    hints: Hints,
    sentences: Vec<Sentence>,
    tokens: Vec<Token>,
}

impl<'de> Deserialize<'de> for AnalysisResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parts = AnalysisParts::deserialize(deserializer)?;
        Self::from_parts(parts).map_err(serde::de::Error::custom)
    }
}

impl AnalysisResult {
    /// Validates `parts` and fills documented defaults.
    ///
    /// # Defaults and repairs
    /// - Empty embedding becomes `EMBEDDING_DIM` zeros.
    /// - Missing `topic_hash` is derived from the embedding.
    /// - Scores are clamped into their ranges; punctuation loses salience.
    /// - Zero token `len` is recomputed from the token text.
    /// - Unknown token `sentence_id` is reassigned to the nearest sentence.
    ///
    /// # Errors
    /// - Non-finite numbers, duplicate ids/indices, inverted spans, or tokens
    ///   without sentences.
    pub fn from_parts(parts: AnalysisParts) -> Result<Self, AnalysisValidationError> {
        let AnalysisParts {
            embedding,
            sentiment,
            stats,
            hints,
            sentences,
            tokens,
        } = parts;

        let embedding = normalize_embedding(embedding)?;
        let sentiment = normalize_sentiment(sentiment)?;
        let stats = normalize_stats(stats)?;
        let sentences = normalize_sentences(sentences)?;
        let tokens = normalize_tokens(tokens, &sentences)?;
        let hints = Hints {
            emotion_hints: hints.emotion_hints,
            topic_hash: hints
                .topic_hash
                .unwrap_or_else(|| topic_hash(embedding.as_slice())),
        };

        Ok(Self {
            embedding,
            sentiment,
            stats,
            hints,
            sentences,
            tokens,
        })
    }

    /// Decodes and validates a mapper-input JSON document.
    pub fn from_json(json: &str) -> Result<Self, AnalysisValidationError> {
        let parts: AnalysisParts = serde_json::from_str(json)
            .map_err(|err| AnalysisValidationError::Json(err.to_string()))?;
        Self::from_parts(parts)
    }

    pub fn embedding(&self) -> &[f64] {
        &self.embedding
    }

    /// Embedding component `index`, or 0 beyond the vector length.
    pub fn embedding_component(&self, index: usize) -> f64 {
        self.embedding.get(index).copied().unwrap_or(0.0)
    }

    pub fn sentiment(&self) -> DocumentSentiment {
        self.sentiment
    }

    pub fn stats(&self) -> &TextStats {
        &self.stats
    }

    pub fn hints(&self) -> Hints {
        self.hints
    }

    pub fn topic_hash(&self) -> u64 {
        self.hints.topic_hash
    }

    /// Sentences ordered by start offset.
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Tokens ordered by `idx`.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Tokens that take part in salience and layout.
    pub fn lexical_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|token| !token.is_punct())
    }
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn ensure_finite(value: f64, field: &'static str) -> Result<f64, AnalysisValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisValidationError::NonFiniteValue(field))
    }
}

fn normalize_embedding(embedding: Vec<f64>) -> Result<Vec<f64>, AnalysisValidationError> {
    if embedding.is_empty() {
        return Ok(vec![0.0; EMBEDDING_DIM]);
    }
    if embedding.iter().any(|value| !value.is_finite()) {
        return Err(AnalysisValidationError::NonFiniteValue("embedding"));
    }
    Ok(embedding)
}

fn normalize_sentiment(
    sentiment: DocumentSentiment,
) -> Result<DocumentSentiment, AnalysisValidationError> {
    Ok(DocumentSentiment {
        label: sentiment.label,
        score: clamp01(ensure_finite(sentiment.score, "sentiment.score")?),
    })
}

fn normalize_stats(stats: TextStats) -> Result<TextStats, AnalysisValidationError> {
    Ok(TextStats {
        avg_word_length: ensure_finite(stats.avg_word_length, "stats.avgWordLength")?.max(0.0),
        lexical_diversity: clamp01(ensure_finite(
            stats.lexical_diversity,
            "stats.lexicalDiversity",
        )?),
        emphasis_score: clamp01(ensure_finite(stats.emphasis_score, "stats.emphasisScore")?),
        question_score: clamp01(ensure_finite(stats.question_score, "stats.questionScore")?),
        mean_sentence_length: ensure_finite(
            stats.mean_sentence_length,
            "stats.meanSentenceLength",
        )?
        .max(0.0),
        variance_sentence_length: ensure_finite(
            stats.variance_sentence_length,
            "stats.varianceSentenceLength",
        )?
        .max(0.0),
        std_sentence_length: ensure_finite(
            stats.std_sentence_length,
            "stats.stdSentenceLength",
        )?
        .max(0.0),
        punctuation_per_word: ensure_finite(
            stats.punctuation_per_word,
            "stats.punctuationPerWord",
        )?
        .max(0.0),
        ..stats
    })
}

fn normalize_sentences(
    mut sentences: Vec<Sentence>,
) -> Result<Vec<Sentence>, AnalysisValidationError> {
    let mut seen = BTreeSet::new();
    for sentence in &mut sentences {
        if !seen.insert(sentence.id) {
            return Err(AnalysisValidationError::DuplicateSentenceId(sentence.id));
        }
        if sentence.start > sentence.end {
            return Err(AnalysisValidationError::InvalidSentenceSpan {
                id: sentence.id,
                start: sentence.start,
                end: sentence.end,
            });
        }
        let signed = ensure_finite(sentence.signed_sentiment, "sentences.signedSentiment")?;
        let score = ensure_finite(sentence.score, "sentences.score")?;
        sentence.signed_sentiment = signed.clamp(-1.0, 1.0);
        sentence.score = clamp01(score.abs());
    }

    sentences.sort_by_key(|sentence| (sentence.start, sentence.id));
    Ok(sentences)
}

fn normalize_tokens(
    mut tokens: Vec<Token>,
    sentences: &[Sentence],
) -> Result<Vec<Token>, AnalysisValidationError> {
    if !tokens.is_empty() && sentences.is_empty() {
        return Err(AnalysisValidationError::MissingSentences);
    }

    let sentence_ids: BTreeSet<SentenceId> = sentences.iter().map(|s| s.id).collect();
    let mut seen = BTreeSet::new();
    let mut repaired = 0usize;

    for token in &mut tokens {
        if !seen.insert(token.idx) {
            return Err(AnalysisValidationError::DuplicateTokenIdx(token.idx));
        }
        if token.char_start >= token.char_end {
            return Err(AnalysisValidationError::InvalidTokenSpan {
                idx: token.idx,
                start: token.char_start,
                end: token.char_end,
            });
        }
        if token.len == 0 {
            token.len = token.text.chars().count();
        }

        if token.is_punct() {
            token.salience = 0.0;
            token.embedding_slice = None;
        } else {
            token.salience = clamp01(ensure_finite(token.salience, "tokens.salience")?);
            if let Some(slice) = &token.embedding_slice {
                if slice.iter().any(|value| !value.is_finite()) {
                    return Err(AnalysisValidationError::NonFiniteValue(
                        "tokens.embeddingSlice",
                    ));
                }
            }
        }

        if !sentence_ids.contains(&token.sentence_id) {
            if let Some(id) = resolve_sentence(sentences, token.char_start, token.char_end) {
                token.sentence_id = id;
                repaired += 1;
            }
        }
    }

    if repaired > 0 {
        warn!(
            "event=token_sentence_repair module=model status=repaired count={}",
            repaired
        );
    }

    tokens.sort_by_key(|token| token.idx);
    Ok(tokens)
}
