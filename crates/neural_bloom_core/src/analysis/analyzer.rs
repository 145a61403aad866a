//! Text analysis use-case.
//!
//! # Responsibility
//! - Orchestrate lexical preprocessing, statistics, emotion hints and the
//!   adapter calls into one validated `AnalysisResult`.
//! - Offer the documented fallback result when the adapter fails.
//!
//! # Invariants
//! - Empty or whitespace-only text yields `Ok(None)`, never an error.
//! - Any adapter failure aborts the whole analysis; no partial result escapes.
//! - Logs carry counts and labels only, never user text.

use crate::analysis::config::{AnalyzerConfig, ConfigError};
use crate::analysis::salience::{score_salience, SalienceLimits};
use crate::analysis::sentiment::{apply_sentence_scores, calibrate};
use crate::features::{compute_stats, EmotionLexicon};
use crate::inference::{embed_one, sentiment_in_batches, AdapterError, InferenceAdapter};
use crate::lexical::preprocess;
use crate::model::analysis::{
    AnalysisParts, AnalysisResult, AnalysisValidationError, DocumentSentiment, HintParts,
};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for analysis calls.
pub type AnalyzeResult<T> = Result<T, AnalyzeError>;

/// Analysis failure.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeError {
    /// The inference adapter failed or is not ready.
    Adapter(AdapterError),
    /// The assembled result violated an invariant.
    Validation(AnalysisValidationError),
}

impl Display for AnalyzeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Adapter(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AnalyzeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Adapter(err) => Some(err),
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<AdapterError> for AnalyzeError {
    fn from(value: AdapterError) -> Self {
        Self::Adapter(value)
    }
}

impl From<AnalysisValidationError> for AnalyzeError {
    fn from(value: AnalysisValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Analyzer facade over one inference adapter.
pub struct TextAnalyzer<A: InferenceAdapter> {
    adapter: A,
    config: AnalyzerConfig,
    emotions: EmotionLexicon,
}

impl<A: InferenceAdapter> TextAnalyzer<A> {
    /// Creates an analyzer with default limits.
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            config: AnalyzerConfig::default(),
            emotions: EmotionLexicon::default(),
        }
    }

    /// Creates an analyzer with validated custom limits.
    pub fn with_config(adapter: A, config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            adapter,
            config,
            emotions: EmotionLexicon::default(),
        })
    }

    /// Replaces the emotion keyword table.
    pub fn with_emotion_lexicon(mut self, emotions: EmotionLexicon) -> Self {
        self.emotions = emotions;
        self
    }

    /// Initializes the adapter; safe to call repeatedly.
    pub fn initialize(&mut self) -> AnalyzeResult<()> {
        if self.adapter.is_ready() {
            return Ok(());
        }
        self.adapter.initialize().map_err(|err| {
            error!(
                "event=adapter_init module=analysis status=error adapter={} error_kind={}",
                self.adapter.adapter_id(),
                adapter_error_kind(&err)
            );
            AnalyzeError::from(err)
        })
    }

    pub fn is_ready(&self) -> bool {
        self.adapter.is_ready()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes `text` end to end.
    ///
    /// # Errors
    /// - `AnalyzeError::Adapter` when any adapter call fails.
    /// - `AnalyzeError::Validation` when the assembled result is inconsistent.
    pub fn analyze(&self, text: &str) -> AnalyzeResult<Option<AnalysisResult>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        self.run(text).map(Some).map_err(|err| {
            let kind = match &err {
                AnalyzeError::Adapter(inner) => adapter_error_kind(inner),
                AnalyzeError::Validation(_) => "validation",
            };
            error!(
                "event=analyze module=analysis status=error adapter={} error_kind={}",
                self.adapter.adapter_id(),
                kind
            );
            err
        })
    }

    /// Like [`Self::analyze`], but substitutes the fallback result when the
    /// adapter fails.
    pub fn analyze_or_fallback(&self, text: &str) -> AnalyzeResult<Option<AnalysisResult>> {
        match self.analyze(text) {
            Err(AnalyzeError::Adapter(err)) => {
                warn!(
                    "event=analysis_fallback module=analysis status=degraded error_kind={}",
                    adapter_error_kind(&err)
                );
                fallback_with(text, &self.emotions)
            }
            other => other,
        }
    }

    fn run(&self, text: &str) -> AnalyzeResult<AnalysisResult> {
        let config = &self.config;
        let mut lexical = preprocess(text);
        let stats = compute_stats(&lexical);
        let emotion_hints = self.emotions.detect(text);

        let document = truncate_chars(text, config.max_document_chars);
        let embedding = embed_one(&self.adapter, &document)?;

        let sentence_texts: Vec<String> = lexical
            .sentences
            .iter()
            .take(config.max_sentences)
            .map(|sentence| truncate_chars(&sentence.text, config.max_sentence_chars))
            .collect();
        let sentence_refs: Vec<&str> = sentence_texts.iter().map(String::as_str).collect();
        let predictions =
            sentiment_in_batches(&self.adapter, &sentence_refs, config.sentiment_batch_size)?;
        let calibrated = calibrate(&predictions, config.neutral_margin);
        apply_sentence_scores(&mut lexical.sentences, &calibrated.sentence_signed);

        let scored = score_salience(
            &self.adapter,
            &mut lexical.tokens,
            &embedding,
            SalienceLimits {
                max_tokens: config.max_salience_tokens,
                batch_size: config.embedding_batch_size,
                slice_dims: config.embedding_slice_dims,
            },
        )?;

        let result = AnalysisResult::from_parts(AnalysisParts {
            embedding,
            sentiment: calibrated.document,
            stats,
            hints: HintParts {
                emotion_hints,
                topic_hash: None,
            },
            sentences: lexical.sentences,
            tokens: lexical.tokens,
        })?;

        info!(
            "event=analyze module=analysis status=ok adapter={} sentences={} tokens={} scored_tokens={} label={}",
            self.adapter.adapter_id(),
            result.sentences().len(),
            result.tokens().len(),
            scored,
            result.sentiment().label.as_str()
        );
        Ok(result)
    }
}

/// Adapter-free analysis: zero embedding, NEUTRAL at 0.5, stats from text.
///
/// Returns `Ok(None)` for empty or whitespace-only text.
pub fn fallback_analysis(text: &str) -> AnalyzeResult<Option<AnalysisResult>> {
    fallback_with(text, &EmotionLexicon::default())
}

fn fallback_with(text: &str, emotions: &EmotionLexicon) -> AnalyzeResult<Option<AnalysisResult>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let lexical = preprocess(text);
    let stats = compute_stats(&lexical);
    let result = AnalysisResult::from_parts(AnalysisParts {
        embedding: Vec::new(),
        sentiment: DocumentSentiment::default(),
        stats,
        hints: HintParts {
            emotion_hints: emotions.detect(text),
            topic_hash: None,
        },
        sentences: lexical.sentences,
        tokens: lexical.tokens,
    })?;
    Ok(Some(result))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn adapter_error_kind(err: &AdapterError) -> &'static str {
    match err {
        AdapterError::NotReady => "not_ready",
        AdapterError::Backend(_) => "backend",
        AdapterError::BatchMismatch { .. } => "batch_mismatch",
        AdapterError::DimensionMismatch { .. } => "dimension_mismatch",
        AdapterError::NonFiniteOutput(_) => "non_finite",
    }
}
