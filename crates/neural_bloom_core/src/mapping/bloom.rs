//! Analysis result to bloom parameter mapping.
//!
//! # Responsibility
//! - Convert one validated `AnalysisResult` into a bounded `BloomData` tree.
//!
//! # Invariants
//! - Pure: the only randomness is a `SeededRng` seeded by the topic hash,
//!   drawn in a fixed order (nodes, then highlights).
//! - Ring radius strictly increases with sentence order.
//! - Links only join index-adjacent tokens of the same sentence.
//! - Every emitted number is already clamped to its documented range.

use crate::mapping::color::{
    base_hue, clamp01, salience_saturation, sentiment_to_color, type_hue_bias, valence_lightness,
    wrap_hue, Hsl,
};
use crate::mapping::seed::SeededRng;
use crate::model::analysis::{AnalysisResult, SentimentLabel};
use crate::model::bloom::{
    BloomData, BloomMetadata, BloomStructure, Energy, Highlight, Link, MappingNotes, Node, Ring,
    TokenParticle,
};
use crate::model::text::{SentenceId, Token, TokenIdx};
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{FRAC_PI_2, TAU};
use uuid::Uuid;

const BLOOM_NAMESPACE: Uuid = Uuid::from_u128(0x6e62_6c6f_6f6d_4e42_8a1d_3f2b_9c4e_7a15);

const MAX_HIGHLIGHTS: usize = 24;
const NODE_JITTER: f64 = 0.05;
const PARTICLE_NEUTRAL_MARGIN: f64 = 0.15;
const HUE_BIAS_LIMIT: f64 = 0.15;
// Keeps the word-count term below the 0.35 ring spacing.
const RING_WORD_CAP: usize = 60;

/// Per-sentence layout shared by rings, nodes, links and particles.
struct RingLayout<'a> {
    index: usize,
    id: SentenceId,
    radius: f64,
    hue: f64,
    signed: f64,
    score: f64,
    /// Whitespace word count of the sentence; sets the angular slot count.
    word_count: usize,
    tokens: Vec<&'a Token>,
}

/// Maps an analysis result onto bloom visual parameters.
pub fn map_to_bloom(analysis: &AnalysisResult) -> BloomData {
    let stats = analysis.stats();
    let sentiment = analysis.sentiment();
    let hints = analysis.hints();
    let topic = hints.topic_hash;
    let emotions = hints.emotion_hints;
    let mut rng = SeededRng::new(topic);

    let variance_term = stats.variance_sentence_length.sqrt().min(3.0);
    let branches = ((1.0 + stats.sentence_count as f64).log2() * 4.0 + variance_term)
        .round()
        .clamp(3.0, 16.0) as u32;
    let complexity = (stats.word_count as f64 / 25.0 + variance_term)
        .round()
        .clamp(2.0, 7.0) as u32;
    let symmetry = stats.lexical_diversity.clamp(0.40, 0.95);
    let angle = (20.0
        + (analysis.embedding_component(0) + 1.0) * 25.0
        + (topic % 15) as f64 * 0.3)
        .clamp(15.0, 75.0);

    let layouts = ring_layouts(analysis);

    let rings: Vec<Ring> = layouts
        .iter()
        .map(|layout| {
            let mean_salience = if layout.tokens.is_empty() {
                0.0
            } else {
                layout.tokens.iter().map(|t| t.salience).sum::<f64>() / layout.tokens.len() as f64
            };
            let hsl = Hsl::new(
                layout.hue,
                salience_saturation(mean_salience),
                valence_lightness(layout.signed),
            )
            .with_emotions(&emotions);
            let i = layout.index as f64;
            Ring {
                id: layout.id,
                radius: layout.radius,
                thickness: 0.02 + clamp01(layout.score) * 0.06,
                tilt: ((topic % 23) as f64 * 0.03 + i * 0.07) % FRAC_PI_2,
                opacity: 0.25 - (i * 0.03).min(0.18),
                color: hsl.to_hex(),
                hsl,
            }
        })
        .collect();

    let mut node_colors: HashMap<TokenIdx, Hsl> = HashMap::new();
    let mut nodes = Vec::new();
    for layout in &layouts {
        let slots = layout.word_count.max(2) as f64;
        for (k, token) in layout.tokens.iter().enumerate() {
            let theta = (TAU * k as f64 / slots + rng.jitter(NODE_JITTER)).rem_euclid(TAU);
            let radius = layout.radius + rng.jitter(NODE_JITTER);
            let hsl = Hsl::new(
                layout.hue + type_hue_bias(token.type_tag),
                salience_saturation(token.salience),
                valence_lightness(layout.signed),
            )
            .with_emotions(&emotions);
            node_colors.insert(token.idx, hsl);
            nodes.push(Node {
                token_idx: token.idx,
                radius,
                theta,
                size: 0.04 + token.len as f64 * 0.01,
                salience: token.salience,
                color: hsl.to_hex(),
                hsl,
                type_tag: token.type_tag,
                sentence_id: layout.id,
            });
        }
    }

    let highlights = highlights(&layouts, &node_colors, &mut rng);

    let links: Vec<Link> = layouts
        .iter()
        .flat_map(|layout| {
            // Both endpoints share the sentence, so the endpoint mean is the sentence weight.
            let weight = 0.3 + 0.7 * clamp01(layout.score);
            layout.tokens.windows(2).map(move |pair| Link {
                a: pair[0].idx,
                b: pair[1].idx,
                weight,
            })
        })
        .collect();

    let base = base_hue(sentiment.label);
    let particles: Vec<TokenParticle> = layouts
        .iter()
        .flat_map(|layout| layout.tokens.iter().map(move |token| (layout, *token)))
        .map(|(layout, token)| {
            let hue = node_colors
                .get(&token.idx)
                .map_or(layout.hue, |hsl| hsl.h);
            TokenParticle {
                token_idx: token.idx,
                size: 0.1 + token.len as f64 * 0.03,
                speed: 0.5 + clamp01(token.salience) * 0.9,
                hue_bias: hue_bias(hue, base),
                direction: SentimentLabel::from_signed(layout.signed, PARTICLE_NEUTRAL_MARGIN)
                    .direction(),
            }
        })
        .collect();

    let energy = Energy {
        speed: clamp01(sentiment.score.max(stats.emphasis_score)),
        count: (stats.word_count.saturating_mul(2)).clamp(50, 400) as u32,
        direction: sentiment.label.direction(),
        question_factor: clamp01(stats.question_score),
        variance_factor: clamp01(
            stats.std_sentence_length / stats.mean_sentence_length.max(1.0),
        ),
        tokens: particles,
    };

    let token_count = analysis.tokens().len();
    let metadata = BloomMetadata {
        bloom_id: bloom_id(analysis, token_count),
        sentiment: sentiment.label,
        confidence: sentiment.score,
        word_count: stats.word_count,
        sentence_count: stats.sentence_count,
        token_count,
        mean_sentence_length: stats.mean_sentence_length,
        variance_sentence_length: stats.variance_sentence_length,
        lexical_diversity: stats.lexical_diversity,
        question_score: stats.question_score,
        emphasis_score: stats.emphasis_score,
        topic_hash: topic,
        emotion_hints: emotions,
        base_hue: base,
        mapping_notes: MappingNotes::default(),
    };

    BloomData {
        structure: BloomStructure {
            branches,
            complexity,
            symmetry,
            angle,
            color: sentiment_to_color(sentiment, &emotions).to_string(),
            rings,
            nodes,
            links,
            highlights,
        },
        energy,
        metadata,
    }
}

fn ring_layouts(analysis: &AnalysisResult) -> Vec<RingLayout<'_>> {
    let topic = analysis.topic_hash();
    let hue_base = (analysis.embedding_component(0) * 120.0
        + analysis.embedding_component(1) * 180.0
        + analysis.embedding_component(2) * 240.0)
        * 0.5
        + (topic % 13) as f64 * 2.1;

    let mut grouped: BTreeMap<SentenceId, Vec<&Token>> = BTreeMap::new();
    for token in analysis.lexical_tokens() {
        grouped.entry(token.sentence_id).or_default().push(token);
    }

    analysis
        .sentences()
        .iter()
        .enumerate()
        .map(|(index, sentence)| {
            let i = index as f64;
            RingLayout {
                index,
                id: sentence.id,
                radius: 1.2 + i * 0.35 + sentence.word_count.min(RING_WORD_CAP) as f64 * 0.005,
                hue: wrap_hue(hue_base + i * 23.7),
                signed: sentence.signed_sentiment,
                score: sentence.score,
                word_count: sentence.word_count,
                tokens: grouped.remove(&sentence.id).unwrap_or_default(),
            }
        })
        .collect()
}

fn highlights(
    layouts: &[RingLayout<'_>],
    node_colors: &HashMap<TokenIdx, Hsl>,
    rng: &mut SeededRng,
) -> Vec<Highlight> {
    let mut ranked: Vec<(&RingLayout<'_>, &Token)> = layouts
        .iter()
        .flat_map(|layout| layout.tokens.iter().map(move |token| (layout, *token)))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| {
        b.salience
            .total_cmp(&a.salience)
            .then_with(|| a.idx.cmp(&b.idx))
    });

    ranked
        .into_iter()
        .take(MAX_HIGHLIGHTS)
        .enumerate()
        .map(|(rank, (layout, token))| {
            let frac = rng.next_f64();
            let slots = layout.word_count.max(6) as f64;
            let salience = clamp01(token.salience);
            Highlight {
                token_idx: token.idx,
                text: token.text.clone(),
                rank,
                sentence_id: layout.id,
                radius: layout.radius,
                theta: (TAU * (rank as f64 + frac) / slots).rem_euclid(TAU),
                size: 0.08 + token.len as f64 * 0.02 + salience * 0.12,
                glow: 0.3 + salience * 0.7,
                salience,
                color: node_colors
                    .get(&token.idx)
                    .map(|hsl| hsl.to_hex())
                    .unwrap_or_default(),
            }
        })
        .collect()
}

/// Token hue offset from the base hue, in turns, wrapped and bounded.
fn hue_bias(hue_degrees: f64, base_turns: f64) -> f64 {
    let delta = (hue_degrees / 360.0 - base_turns + 0.5).rem_euclid(1.0) - 0.5;
    delta.clamp(-HUE_BIAS_LIMIT, HUE_BIAS_LIMIT)
}

fn bloom_id(analysis: &AnalysisResult, token_count: usize) -> Uuid {
    let stats = analysis.stats();
    let name = format!(
        "{}:{}:{}:{}:{}",
        analysis.topic_hash(),
        analysis.sentiment().label.as_str(),
        stats.sentence_count,
        stats.word_count,
        token_count
    );
    Uuid::new_v5(&BLOOM_NAMESPACE, name.as_bytes())
}
