//! Keyword-based emotion hints.
//!
//! The keyword table is a replaceable policy, not a classifier. The default
//! table mixes English and German stems and matches substrings of the
//! lowercased text.

use crate::model::analysis::{Emotion, EmotionHints};
use regex::Regex;

const DEFAULT_RULES: &[(Emotion, &str)] = &[
    (Emotion::Anger, r"wut|angry|furious|rage|zorn"),
    (Emotion::Joy, r"freude|joy|glücklich|happy|delight|euphor"),
    (Emotion::Sadness, r"traurig|sad|melanch|trauer|sorrow"),
    (Emotion::Fear, r"angst|fear|furcht|anxious|panic"),
];

/// Emotion keyword policy table.
#[derive(Debug, Clone)]
pub struct EmotionLexicon {
    rules: Vec<(Emotion, Regex)>,
}

impl Default for EmotionLexicon {
    fn default() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(emotion, pattern)| {
                (
                    *emotion,
                    Regex::new(pattern).expect("valid default emotion pattern"),
                )
            })
            .collect();
        Self { rules }
    }
}

impl EmotionLexicon {
    /// Builds a custom table from `(emotion, regex)` pairs.
    ///
    /// Patterns are matched against lowercased text.
    pub fn from_patterns<'a>(
        patterns: impl IntoIterator<Item = (Emotion, &'a str)>,
    ) -> Result<Self, regex::Error> {
        let rules = patterns
            .into_iter()
            .map(|(emotion, pattern)| Regex::new(pattern).map(|re| (emotion, re)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Flags every emotion whose pattern matches the lowercased text.
    pub fn detect(&self, text: &str) -> EmotionHints {
        let lower = text.to_lowercase();
        let mut hints = EmotionHints::default();
        for (emotion, pattern) in &self.rules {
            if pattern.is_match(&lower) {
                hints.set(*emotion, true);
            }
        }
        hints
    }
}
