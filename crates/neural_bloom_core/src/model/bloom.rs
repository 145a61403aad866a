//! Bloom visual parameter tree produced by the mapper.
//!
//! # Responsibility
//! - Define the renderer-facing output contract (`BloomData`).
//!
//! # Invariants
//! - Every numeric field is pre-clamped by the mapper; renderers do not clamp.
//! - Values hold no back-references into the analysis input.
//! - Links only join tokens sharing one `sentence_id`.

use crate::mapping::color::Hsl;
use crate::model::analysis::{EmotionHints, SentimentLabel};
use crate::model::text::{SentenceId, TokenIdx, TypeTag};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full mapper output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomData {
    pub structure: BloomStructure,
    pub energy: Energy,
    pub metadata: BloomMetadata,
}

impl BloomData {
    /// Compact JSON encoding of the output contract.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Indented JSON encoding for human inspection.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Global branching structure plus per-sentence and per-token layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomStructure {
    /// Main branch count in [3, 16].
    pub branches: u32,
    /// Recursion depth in [2, 7].
    pub complexity: u32,
    /// Branch symmetry in [0.40, 0.95].
    pub symmetry: f64,
    /// Branch angle in degrees, [15, 75].
    pub angle: f64,
    /// Sentiment palette color, `#rrggbb`.
    pub color: String,
    pub rings: Vec<Ring>,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub highlights: Vec<Highlight>,
}

/// One ring per sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub id: SentenceId,
    pub radius: f64,
    pub thickness: f64,
    /// Radians in [0, π/2).
    pub tilt: f64,
    pub opacity: f64,
    pub color: String,
    pub hsl: Hsl,
}

/// One node per non-punctuation token, in polar coordinates on its ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub token_idx: TokenIdx,
    pub radius: f64,
    pub theta: f64,
    pub size: f64,
    pub salience: f64,
    pub color: String,
    pub hsl: Hsl,
    pub type_tag: TypeTag,
    pub sentence_id: SentenceId,
}

/// Edge between two temporally adjacent tokens of one sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub a: TokenIdx,
    pub b: TokenIdx,
    pub weight: f64,
}

/// Emphasized marker for one of the most salient tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub token_idx: TokenIdx,
    pub text: String,
    /// 0-based salience rank.
    pub rank: usize,
    pub sentence_id: SentenceId,
    pub radius: f64,
    pub theta: f64,
    pub size: f64,
    pub glow: f64,
    pub salience: f64,
    pub color: String,
}

/// Particle system parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Energy {
    /// Flow speed in [0, 1].
    pub speed: f64,
    /// Aggregate particle count in [50, 400].
    pub count: u32,
    /// `+1` upward, `-1` spiral downward, `0` floating.
    pub direction: i8,
    /// Oscillation driven by question intensity, [0, 1].
    pub question_factor: f64,
    /// Size spread driven by sentence-length variation, [0, 1].
    pub variance_factor: f64,
    pub tokens: Vec<TokenParticle>,
}

/// One particle per non-punctuation token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenParticle {
    pub token_idx: TokenIdx,
    pub size: f64,
    pub speed: f64,
    /// Hue offset from the global base hue, in turns, [-0.15, 0.15].
    pub hue_bias: f64,
    pub direction: i8,
}

/// Explainability metadata for legends and inspection panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloomMetadata {
    /// Deterministic identity of this bloom.
    pub bloom_id: Uuid,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    pub word_count: usize,
    pub sentence_count: usize,
    pub token_count: usize,
    pub mean_sentence_length: f64,
    pub variance_sentence_length: f64,
    pub lexical_diversity: f64,
    pub question_score: f64,
    pub emphasis_score: f64,
    pub topic_hash: u64,
    pub emotion_hints: EmotionHints,
    /// Global particle base hue in turns.
    pub base_hue: f64,
    pub mapping_notes: MappingNotes,
}

/// Short legend describing how each parameter was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingNotes {
    pub branches: String,
    pub complexity: String,
    pub symmetry: String,
    pub angle: String,
    pub color: String,
    pub energy: String,
    pub rings: String,
    pub nodes: String,
}

impl Default for MappingNotes {
    fn default() -> Self {
        Self {
            branches: "log2(1 + sentences) * 4 + sentence length variance".to_string(),
            complexity: "word count / 25 + sentence length variance".to_string(),
            symmetry: "lexical diversity (type-token ratio)".to_string(),
            angle: "embedding[0] + topic hash".to_string(),
            color: "sentiment palette shifted by emotion hints".to_string(),
            energy: "speed = max(confidence, emphasis), direction = sentiment".to_string(),
            rings: "one per sentence; hue = topic, lightness = valence".to_string(),
            nodes: "one per word; saturation = salience, hue bias = token type".to_string(),
        }
    }
}
