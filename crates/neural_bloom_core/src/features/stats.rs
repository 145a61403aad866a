//! Corpus-level statistics from lexical output.
//!
//! # Invariants
//! - `word_count` counts non-punctuation tokens only.
//! - Ratio denominators are guarded by `max(1, ..)`; scores stay in [0, 1].
//! - Sentence length moments use population variance over sentence word counts.

use crate::lexical::LexicalAnalysis;
use crate::model::analysis::TextStats;
use std::collections::HashSet;

const ALL_CAPS_MIN_LEN: usize = 3;
const ALL_CAPS_WEIGHT: f64 = 0.5;

/// Computes [`TextStats`] for one preprocessed text.
pub fn compute_stats(lexical: &LexicalAnalysis) -> TextStats {
    let words: Vec<&str> = lexical
        .lexical_tokens()
        .map(|token| token.text.as_str())
        .collect();
    let word_count = words.len();
    let sentence_count = lexical.sentences.len();
    let sentence_denominator = sentence_count.max(1) as f64;

    let total_word_chars: usize = words.iter().map(|word| word.chars().count()).sum();
    let avg_word_length = if word_count > 0 {
        total_word_chars as f64 / word_count as f64
    } else {
        0.0
    };

    let unique_words = words
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<HashSet<_>>()
        .len();
    let lexical_diversity = if word_count > 0 {
        unique_words as f64 / word_count as f64
    } else {
        0.0
    };

    let punct_count = lexical.tokens.len() - word_count;
    let exclamations = count_punct(lexical, "!");
    let questions = count_punct(lexical, "?");
    let all_caps = words.iter().filter(|word| is_all_caps(word)).count();

    let emphasis_score =
        ((exclamations as f64 + all_caps as f64 * ALL_CAPS_WEIGHT) / sentence_denominator).min(1.0);
    let question_score = (questions as f64 / sentence_denominator).min(1.0);

    let lengths: Vec<f64> = lexical
        .sentences
        .iter()
        .map(|sentence| sentence.word_count as f64)
        .collect();
    let (mean_sentence_length, variance_sentence_length) = mean_and_variance(&lengths);

    TextStats {
        word_count,
        sentence_count,
        avg_word_length,
        unique_words,
        lexical_diversity,
        emphasis_score,
        question_score,
        mean_sentence_length,
        variance_sentence_length,
        std_sentence_length: variance_sentence_length.sqrt(),
        punctuation_per_word: if word_count > 0 {
            punct_count as f64 / word_count as f64
        } else {
            0.0
        },
    }
}

fn count_punct(lexical: &LexicalAnalysis, mark: &str) -> usize {
    lexical
        .tokens
        .iter()
        .filter(|token| token.is_punct() && token.text == mark)
        .count()
}

fn is_all_caps(word: &str) -> bool {
    word.chars().count() >= ALL_CAPS_MIN_LEN
        && word.chars().all(|c| c.is_alphabetic() && c.is_uppercase())
}

fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance)
}
