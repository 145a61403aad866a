//! Inference adapter boundary.
//!
//! # Responsibility
//! - Define the black-box capability the analyzer depends on: text in,
//!   normalized embeddings and polar sentiment scores out.
//! - Validate adapter output shapes at the boundary and batch requests.
//!
//! # Invariants
//! - Batch helpers return exactly one output per input or an error.
//! - A failed batch fails the whole call; nothing is zero-filled.
//! - Embeddings crossing the boundary have `dimension()` finite components.

mod lexical;

pub use lexical::LexicalAdapter;

use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for adapter calls.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Adapter-boundary failure.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterError {
    /// `initialize()` has not completed.
    NotReady,
    /// Backend threw, timed out or is unavailable.
    Backend(String),
    /// Output count differs from input count.
    BatchMismatch { expected: usize, got: usize },
    /// Embedding length differs from the declared dimension.
    DimensionMismatch { expected: usize, got: usize },
    /// Output contains NaN or infinite values.
    NonFiniteOutput(&'static str),
}

impl Display for AdapterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady => write!(f, "inference adapter is not initialized"),
            Self::Backend(message) => write!(f, "inference backend failed: {message}"),
            Self::BatchMismatch { expected, got } => {
                write!(f, "adapter returned {got} outputs for {expected} inputs")
            }
            Self::DimensionMismatch { expected, got } => {
                write!(f, "embedding has {got} dimensions, expected {expected}")
            }
            Self::NonFiniteOutput(what) => write!(f, "adapter returned non-finite {what}"),
        }
    }
}

impl Error for AdapterError {}

/// Binary sentiment polarity reported by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// Parses backend labels such as `POSITIVE`, `LABEL_NEG` or `neg`.
    pub fn parse(label: &str) -> Option<Self> {
        let upper = label.trim().to_ascii_uppercase();
        if upper.contains("NEG") {
            Some(Self::Negative)
        } else if upper.contains("POS") {
            Some(Self::Positive)
        } else {
            None
        }
    }
}

/// One sentiment output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentPrediction {
    pub label: Polarity,
    /// Confidence in [0, 1].
    pub score: f64,
}

impl SentimentPrediction {
    pub fn new(label: Polarity, score: f64) -> Self {
        Self { label, score }
    }

    /// `score` for positive, `-score` for negative.
    pub fn signed(&self) -> f64 {
        match self.label {
            Polarity::Positive => self.score,
            Polarity::Negative => -self.score,
        }
    }
}

/// Black-box embedding and sentiment capability.
///
/// Implementations own their model lifecycle: `initialize()` loads or
/// connects once, `is_ready()` reports whether calls may proceed.
pub trait InferenceAdapter {
    /// Stable identifier used in diagnostics.
    fn adapter_id(&self) -> &str;

    fn initialize(&mut self) -> AdapterResult<()>;

    fn is_ready(&self) -> bool;

    /// Fixed embedding dimensionality.
    fn dimension(&self) -> usize;

    /// Mean-pooled, L2-normalized embeddings, one per input.
    fn embed_batch(&self, texts: &[&str]) -> AdapterResult<Vec<Vec<f64>>>;

    /// Polar sentiment, one per input.
    fn sentiment_batch(&self, texts: &[&str]) -> AdapterResult<Vec<SentimentPrediction>>;

    fn embed(&self, text: &str) -> AdapterResult<Vec<f64>> {
        let mut out = self.embed_batch(&[text])?;
        if out.len() != 1 {
            return Err(AdapterError::BatchMismatch {
                expected: 1,
                got: out.len(),
            });
        }
        Ok(out.remove(0))
    }

    fn sentiment(&self, text: &str) -> AdapterResult<SentimentPrediction> {
        let out = self.sentiment_batch(&[text])?;
        match out.as_slice() {
            [one] => Ok(*one),
            other => Err(AdapterError::BatchMismatch {
                expected: 1,
                got: other.len(),
            }),
        }
    }
}

/// Embeds `texts` in chunks of `batch_size`, validating every chunk.
pub fn embed_in_batches<A: InferenceAdapter + ?Sized>(
    adapter: &A,
    texts: &[&str],
    batch_size: usize,
) -> AdapterResult<Vec<Vec<f64>>> {
    ensure_ready(adapter)?;
    let dimension = adapter.dimension();
    let mut out = Vec::with_capacity(texts.len());

    for chunk in texts.chunks(batch_size.max(1)) {
        let vectors = adapter.embed_batch(chunk)?;
        if vectors.len() != chunk.len() {
            return Err(AdapterError::BatchMismatch {
                expected: chunk.len(),
                got: vectors.len(),
            });
        }
        for vector in &vectors {
            validate_embedding(vector, dimension)?;
        }
        out.extend(vectors);
    }

    debug!(
        "event=embed_batches module=inference status=ok adapter={} inputs={}",
        adapter.adapter_id(),
        texts.len()
    );
    Ok(out)
}

/// Scores `texts` in chunks of `batch_size`, validating every chunk.
///
/// Scores are clamped into [0, 1].
pub fn sentiment_in_batches<A: InferenceAdapter + ?Sized>(
    adapter: &A,
    texts: &[&str],
    batch_size: usize,
) -> AdapterResult<Vec<SentimentPrediction>> {
    ensure_ready(adapter)?;
    let mut out = Vec::with_capacity(texts.len());

    for chunk in texts.chunks(batch_size.max(1)) {
        let predictions = adapter.sentiment_batch(chunk)?;
        if predictions.len() != chunk.len() {
            return Err(AdapterError::BatchMismatch {
                expected: chunk.len(),
                got: predictions.len(),
            });
        }
        for prediction in predictions {
            if !prediction.score.is_finite() {
                return Err(AdapterError::NonFiniteOutput("sentiment score"));
            }
            out.push(SentimentPrediction::new(
                prediction.label,
                prediction.score.clamp(0.0, 1.0),
            ));
        }
    }

    debug!(
        "event=sentiment_batches module=inference status=ok adapter={} inputs={}",
        adapter.adapter_id(),
        texts.len()
    );
    Ok(out)
}

/// Embeds one text with the same validation as [`embed_in_batches`].
pub fn embed_one<A: InferenceAdapter + ?Sized>(adapter: &A, text: &str) -> AdapterResult<Vec<f64>> {
    ensure_ready(adapter)?;
    let vector = adapter.embed(text)?;
    validate_embedding(&vector, adapter.dimension())?;
    Ok(vector)
}

fn ensure_ready<A: InferenceAdapter + ?Sized>(adapter: &A) -> AdapterResult<()> {
    if adapter.is_ready() {
        Ok(())
    } else {
        Err(AdapterError::NotReady)
    }
}

fn validate_embedding(vector: &[f64], dimension: usize) -> AdapterResult<()> {
    if vector.len() != dimension {
        return Err(AdapterError::DimensionMismatch {
            expected: dimension,
            got: vector.len(),
        });
    }
    if vector.iter().any(|value| !value.is_finite()) {
        return Err(AdapterError::NonFiniteOutput("embedding"));
    }
    Ok(())
}

/// Cosine similarity; 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
