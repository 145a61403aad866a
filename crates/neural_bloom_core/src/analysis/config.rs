//! Analyzer tuning knobs.
//!
//! # Invariants
//! - Every field has a default; a partial JSON document is a valid config.
//! - Batch sizes and caps are non-zero, `neutral_margin` lies in [0, 1).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Limits and batch sizes used by [`crate::TextAnalyzer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Sentences that receive sentiment scores.
    pub max_sentences: usize,
    /// Characters of each sentence sent to the sentiment backend.
    pub max_sentence_chars: usize,
    /// Characters of the document sent to the embedding backend.
    pub max_document_chars: usize,
    /// Non-punctuation tokens that receive salience scores.
    pub max_salience_tokens: usize,
    pub sentiment_batch_size: usize,
    pub embedding_batch_size: usize,
    /// Dead-zone around zero for the document label.
    pub neutral_margin: f64,
    /// Leading token embedding dimensions kept as `embedding_slice`.
    pub embedding_slice_dims: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_sentences: 60,
            max_sentence_chars: 400,
            max_document_chars: 2000,
            max_salience_tokens: 256,
            sentiment_batch_size: 16,
            embedding_batch_size: 32,
            neutral_margin: 0.15,
            embedding_slice_dims: 8,
        }
    }
}

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    /// A field holds an unusable value.
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    /// The JSON document could not be decoded.
    Json(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "invalid analyzer config `{field}`: {reason}")
            }
            Self::Json(err) => write!(f, "invalid analyzer config json: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl AnalyzerConfig {
    /// Decodes a (possibly partial) JSON config and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks caps, batch sizes and margin.
    ///
    /// # Errors
    /// - Any cap or batch size is zero.
    /// - `neutral_margin` is non-finite or outside [0, 1).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("max_sentences", self.max_sentences),
            ("max_sentence_chars", self.max_sentence_chars),
            ("max_document_chars", self.max_document_chars),
            ("max_salience_tokens", self.max_salience_tokens),
            ("sentiment_batch_size", self.sentiment_batch_size),
            ("embedding_batch_size", self.embedding_batch_size),
        ];
        if let Some((field, _)) = non_zero.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::InvalidValue {
                field,
                reason: "must be greater than zero",
            });
        }

        if !self.neutral_margin.is_finite() || !(0.0..1.0).contains(&self.neutral_margin) {
            return Err(ConfigError::InvalidValue {
                field: "neutral_margin",
                reason: "must lie in [0, 1)",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalyzerConfig, ConfigError};

    #[test]
    fn defaults_are_valid() {
        AnalyzerConfig::default()
            .validate()
            .expect("default config should validate");
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = AnalyzerConfig::from_json(r#"{"sentiment_batch_size": 4}"#)
            .expect("partial config should load");
        assert_eq!(config.sentiment_batch_size, 4);
        assert_eq!(config.embedding_batch_size, 32);
        assert_eq!(config.max_sentences, 60);
    }

    #[test]
    fn rejects_zero_batch_size() {
        let err = AnalyzerConfig::from_json(r#"{"embedding_batch_size": 0}"#)
            .expect_err("zero batch must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "embedding_batch_size",
                ..
            }
        ));
    }

    #[test]
    fn rejects_margin_of_one() {
        let config = AnalyzerConfig {
            neutral_margin: 1.0,
            ..AnalyzerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = AnalyzerConfig::from_json("{not json").expect_err("bad json");
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
