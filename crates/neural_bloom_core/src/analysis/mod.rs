//! Text analysis: configuration, sentiment calibration, salience and the
//! analyzer use-case that ties them to an inference adapter.

pub mod analyzer;
pub mod config;
pub mod salience;
pub mod sentiment;

pub use analyzer::{fallback_analysis, AnalyzeError, AnalyzeResult, TextAnalyzer};
pub use config::{AnalyzerConfig, ConfigError};
