//! Core pipeline for Neural Bloom: text analysis and deterministic mapping
//! of text features onto 3D bloom visual parameters.
//! This crate is the single source of truth for every mapping invariant.

pub mod analysis;
pub mod features;
pub mod inference;
pub mod lexical;
pub mod logging;
pub mod mapping;
pub mod model;
pub mod pipeline;

pub use analysis::{
    fallback_analysis, AnalyzeError, AnalyzeResult, AnalyzerConfig, ConfigError, TextAnalyzer,
};
pub use features::{compute_stats, EmotionLexicon};
pub use inference::{
    AdapterError, AdapterResult, InferenceAdapter, LexicalAdapter, Polarity, SentimentPrediction,
};
pub use lexical::{preprocess, LexicalAnalysis};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use mapping::color::{hex_to_rgb, hsl_to_hex, hsl_to_rgb, mix_colors, ColorParseError, Hsl, Rgb};
pub use mapping::{build_skeleton, map_to_bloom, topic_hash, SeededRng, Skeleton};
pub use model::analysis::{
    AnalysisParts, AnalysisResult, AnalysisValidationError, DocumentSentiment, Emotion,
    EmotionHints, SentimentLabel, TextStats, EMBEDDING_DIM,
};
pub use model::bloom::BloomData;
pub use model::text::{Sentence, SentenceId, Token, TokenIdx, TypeTag};
pub use pipeline::{visualize, visualize_or_fallback};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
