//! One-call text to bloom pipeline.

use crate::analysis::{AnalyzeResult, TextAnalyzer};
use crate::inference::InferenceAdapter;
use crate::mapping::map_to_bloom;
use crate::model::bloom::BloomData;

/// Analyzes `text` and maps the result to bloom parameters.
///
/// Returns `Ok(None)` for empty or whitespace-only text.
///
/// # Errors
/// - Propagates analysis failures, including adapter errors.
pub fn visualize<A: InferenceAdapter>(
    analyzer: &TextAnalyzer<A>,
    text: &str,
) -> AnalyzeResult<Option<BloomData>> {
    Ok(analyzer.analyze(text)?.as_ref().map(map_to_bloom))
}

/// Like [`visualize`], but falls back to the adapter-free analysis when the
/// adapter fails.
pub fn visualize_or_fallback<A: InferenceAdapter>(
    analyzer: &TextAnalyzer<A>,
    text: &str,
) -> AnalyzeResult<Option<BloomData>> {
    Ok(analyzer.analyze_or_fallback(text)?.as_ref().map(map_to_bloom))
}
