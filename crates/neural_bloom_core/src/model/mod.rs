//! Domain model for the text-to-bloom pipeline.
//!
//! # Responsibility
//! - Define the value objects passed between lexical, analysis and mapping
//!   stages.
//! - Keep one validated shape per stage boundary.
//!
//! # Invariants
//! - Every entity is owned by the call that created it; nothing is shared or
//!   mutated across calls.
//! - Token `idx` and sentence `id` are the only cross-reference keys.

pub mod analysis;
pub mod bloom;
pub mod text;
