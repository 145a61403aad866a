//! Deterministic topic hash and seeded pseudo-random stream.
//!
//! # Invariants
//! - `topic_hash` depends only on the first `TOPIC_DIMS` embedding values.
//! - The same seed always yields the same `SeededRng` sequence.
//! - Mapping code never draws randomness from any other source.

/// Number of leading embedding dimensions folded into the topic hash.
pub const TOPIC_DIMS: usize = 12;

const HASH_INITIAL: u64 = 7;
const HASH_MULTIPLIER: u64 = 131;
const HASH_BUCKET: u64 = 997;
const HASH_MODULUS: u64 = 2_147_483_647;

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;
const LCG_SCALE: f64 = 4_294_967_296.0;

/// Folds the leading embedding dimensions into a bounded integer.
///
/// Returns 7 for an empty embedding.
pub fn topic_hash(embedding: &[f64]) -> u64 {
    embedding
        .iter()
        .take(TOPIC_DIMS)
        .enumerate()
        .map(|(i, value)| {
            let folded = ((value + 1.0) * 1000.0 + i as f64 * 97.0).floor().abs();
            folded as u64 % HASH_BUCKET
        })
        .fold(HASH_INITIAL, |hash, bucket| {
            (hash * HASH_MULTIPLIER + bucket) % HASH_MODULUS
        })
}

/// Linear congruential generator producing floats in [0, 1).
///
/// `state = (1664525 * state + 1013904223) mod 2^32`, output `state / 2^32`.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Seeds the stream with the low 32 bits of `seed`; a zero seed becomes 1.
    pub fn new(seed: u64) -> Self {
        let state = seed as u32;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Next value in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        f64::from(self.state) / LCG_SCALE
    }

    /// Symmetric offset in [-amplitude, amplitude).
    pub fn jitter(&mut self, amplitude: f64) -> f64 {
        (self.next_f64() - 0.5) * 2.0 * amplitude
    }
}

impl Iterator for SeededRng {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}
