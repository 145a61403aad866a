//! Deterministic offline adapter.
//!
//! Embeddings are feature-hashed (blake3) over lowercase words and their
//! character trigrams, summed and L2-normalized. Sentiment is a small
//! polarity lexicon with one-token negation. This is a stable baseline for
//! the CLI and for tests, not a neural model.

use super::{AdapterError, AdapterResult, InferenceAdapter, Polarity, SentimentPrediction};
use crate::model::analysis::EMBEDDING_DIM;
use blake3::Hasher;
use log::info;

const ADAPTER_ID: &str = "lexical-hash-v1";
const TRIGRAM_WEIGHT: f64 = 0.5;

const POSITIVE_WORDS: &[&str] = &[
    "love", "loved", "like", "great", "good", "happy", "joy", "wonderful", "excellent",
    "amazing", "beautiful", "best", "delight", "glad", "awesome", "fantastic", "nice", "hope",
    "calm", "bright", "gut", "schön", "liebe", "freude", "glücklich", "toll", "super",
    "wunderbar",
];

const NEGATIVE_WORDS: &[&str] = &[
    "hate", "bad", "terrible", "awful", "sad", "angry", "worst", "horrible", "fear", "ugly",
    "pain", "fail", "failed", "wrong", "poor", "lonely", "tired", "schlecht", "traurig", "hass",
    "wut", "angst", "schrecklich", "müde",
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "isn't", "wasn't", "nicht", "kein", "keine", "nie",
];

/// Feature-hashing embedding and lexicon sentiment adapter.
#[derive(Debug, Clone)]
pub struct LexicalAdapter {
    dimension: usize,
    ready: bool,
}

impl Default for LexicalAdapter {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM)
    }
}

impl LexicalAdapter {
    /// Creates an uninitialized adapter producing `dimension`-sized vectors.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ready: false,
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.dimension];
        if self.dimension == 0 {
            return vector;
        }

        for word in words(text) {
            self.accumulate(&mut vector, word.as_bytes(), 1.0);
            let padded: Vec<char> = format!("<{word}>").chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                self.accumulate(&mut vector, gram.as_bytes(), TRIGRAM_WEIGHT);
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }

    fn accumulate(&self, vector: &mut [f64], feature: &[u8], weight: f64) {
        let mut hasher = Hasher::new();
        hasher.update(feature);
        let hash = hasher.finalize();
        let bytes = hash.as_bytes();

        let mut bucket = [0u8; 8];
        bucket.copy_from_slice(&bytes[..8]);
        let idx = (u64::from_le_bytes(bucket) % self.dimension as u64) as usize;
        let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }

    fn score_text(text: &str) -> SentimentPrediction {
        let mut positive = 0u32;
        let mut negative = 0u32;
        let mut negate = false;

        for word in words(text) {
            let polarity = if POSITIVE_WORDS.contains(&word.as_str()) {
                Some(Polarity::Positive)
            } else if NEGATIVE_WORDS.contains(&word.as_str()) {
                Some(Polarity::Negative)
            } else {
                None
            };

            match (polarity, negate) {
                (Some(Polarity::Positive), false) | (Some(Polarity::Negative), true) => {
                    positive += 1
                }
                (Some(Polarity::Negative), false) | (Some(Polarity::Positive), true) => {
                    negative += 1
                }
                (None, _) => {}
            }
            negate = NEGATORS.contains(&word.as_str());
        }

        let total = positive + negative;
        if total == 0 {
            return SentimentPrediction::new(Polarity::Positive, 0.0);
        }

        let net = f64::from(positive) - f64::from(negative);
        let total = f64::from(total);
        let score = (net.abs() / total) * (1.0 - 0.5f64.powf(total));
        let label = if net >= 0.0 {
            Polarity::Positive
        } else {
            Polarity::Negative
        };
        SentimentPrediction::new(label, score)
    }

    fn ensure_ready(&self) -> AdapterResult<()> {
        if self.ready {
            Ok(())
        } else {
            Err(AdapterError::NotReady)
        }
    }
}

impl InferenceAdapter for LexicalAdapter {
    fn adapter_id(&self) -> &str {
        ADAPTER_ID
    }

    fn initialize(&mut self) -> AdapterResult<()> {
        if !self.ready {
            self.ready = true;
            info!(
                "event=adapter_init module=inference status=ok adapter={} dimension={}",
                ADAPTER_ID, self.dimension
            );
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_batch(&self, texts: &[&str]) -> AdapterResult<Vec<Vec<f64>>> {
        self.ensure_ready()?;
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn sentiment_batch(&self, texts: &[&str]) -> AdapterResult<Vec<SentimentPrediction>> {
        self.ensure_ready()?;
        Ok(texts.iter().map(|text| Self::score_text(text)).collect())
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase().replace('’', "'"))
}
