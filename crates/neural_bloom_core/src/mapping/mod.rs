//! Deterministic mapping from analysis features to visual parameters.
//!
//! # Responsibility
//! - Map `AnalysisResult` to `BloomData` (`bloom`).
//! - Provide the HSL color model (`color`) and seeded randomness (`seed`).
//! - Generate the procedural branch skeleton (`geometry`).
//!
//! # Invariants
//! - Everything here is pure and synchronous; equal inputs give equal outputs.

pub mod bloom;
pub mod color;
pub mod geometry;
pub mod seed;

pub use bloom::map_to_bloom;
pub use geometry::{build_skeleton, line_width, Segment, Skeleton, Vec3};
pub use seed::{topic_hash, SeededRng};
