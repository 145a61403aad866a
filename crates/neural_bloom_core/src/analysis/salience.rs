//! Token salience: similarity of each token to the whole document.
//!
//! # Invariants
//! - Only the first `max_tokens` non-punctuation tokens are scored.
//! - Scored salience is min-max normalized into [0, 1]; a flat distribution
//!   yields 0.5 for every scored token.
//! - Unscored tokens keep salience 0 and no embedding slice.

use crate::inference::{cosine_similarity, embed_in_batches, AdapterResult, InferenceAdapter};
use crate::model::text::Token;

/// Salience scoring limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalienceLimits {
    pub max_tokens: usize,
    pub batch_size: usize,
    pub slice_dims: usize,
}

/// Scores `tokens` in place against `document_embedding`.
///
/// Returns the number of tokens that were scored.
///
/// # Errors
/// - Propagates any adapter failure; tokens are left untouched in that case.
pub fn score_salience<A: InferenceAdapter + ?Sized>(
    adapter: &A,
    tokens: &mut [Token],
    document_embedding: &[f64],
    limits: SalienceLimits,
) -> AdapterResult<usize> {
    let positions: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| !token.is_punct())
        .map(|(pos, _)| pos)
        .take(limits.max_tokens)
        .collect();

    let texts: Vec<&str> = positions
        .iter()
        .map(|&pos| tokens[pos].text.as_str())
        .collect();
    let vectors = embed_in_batches(adapter, &texts, limits.batch_size)?;

    let similarities: Vec<f64> = vectors
        .iter()
        .map(|vector| cosine_similarity(vector, document_embedding))
        .collect();
    let normalized = min_max_normalize(&similarities);

    for token in tokens.iter_mut() {
        token.salience = 0.0;
        token.embedding_slice = None;
    }
    for ((pos, vector), salience) in positions.iter().zip(&vectors).zip(normalized) {
        let token = &mut tokens[*pos];
        token.salience = salience;
        token.embedding_slice = Some(vector.iter().take(limits.slice_dims).copied().collect());
    }

    Ok(positions.len())
}

/// Rescales values into [0, 1]; equal values all map to 0.5.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|value| {
            if span > 0.0 {
                ((value - min) / span).clamp(0.0, 1.0)
            } else {
                0.5
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::min_max_normalize;

    #[test]
    fn normalizes_to_unit_range() {
        assert_eq!(min_max_normalize(&[-0.5, 0.0, 0.5]), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn flat_values_map_to_half() {
        assert_eq!(min_max_normalize(&[0.3, 0.3]), vec![0.5, 0.5]);
        assert_eq!(min_max_normalize(&[0.9]), vec![0.5]);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(min_max_normalize(&[]).is_empty());
    }
}
