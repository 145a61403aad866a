//! Adapter-free text features.
//!
//! # Responsibility
//! - Compute statistics and emotion hints from text and lexical output alone.
//! - Stay usable when the inference adapter fails (fallback analysis).

pub mod emotion;
pub mod stats;

pub use emotion::EmotionLexicon;
pub use stats::compute_stats;
