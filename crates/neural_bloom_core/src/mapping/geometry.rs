//! Procedural branching skeleton for a bloom structure.
//!
//! Produces renderer-agnostic line segments and glow points. The generator
//! draws from a `SeededRng` seeded by the topic hash in a fixed recursion
//! order, so identical inputs always produce identical geometry.

use crate::mapping::seed::SeededRng;
use crate::model::bloom::BloomStructure;
use serde::{Deserialize, Serialize};

const ORIGIN: Vec3 = Vec3::new(0.0, -3.0, 0.0);
const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);
const MAIN_JITTER: f64 = 0.15;
const GLOW_JITTER: f64 = 0.05;
const ENERGY_DECAY: f64 = 0.9;

/// Plain 3D vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector; the zero vector is returned unchanged.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            self.scale(1.0 / len)
        } else {
            self
        }
    }

    pub fn lerp(self, other: Self, t: f64) -> Self {
        self.add(other.add(self.scale(-1.0)).scale(t))
    }

    /// Rotates around the unit `axis` by `angle` radians (Rodrigues).
    pub fn rotate_around(self, axis: Self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        self.scale(cos)
            .add(axis.cross(self).scale(sin))
            .add(axis.scale(axis.dot(self) * (1.0 - cos)))
    }
}

/// One branch segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
    /// Remaining recursion depth when the segment was emitted.
    pub depth: u32,
}

/// Branch segments plus glow points sampled along them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skeleton {
    pub segments: Vec<Segment>,
    pub glow_points: Vec<Vec3>,
}

/// Builds the branching skeleton for `structure`.
pub fn build_skeleton(structure: &BloomStructure, topic_hash: u64) -> Skeleton {
    let mut builder = SkeletonBuilder {
        rng: SeededRng::new(topic_hash),
        angle: structure.angle.to_radians(),
        symmetry: structure.symmetry,
        skeleton: Skeleton {
            segments: Vec::new(),
            glow_points: Vec::new(),
        },
    };

    let branches = structure.branches.max(1);
    for i in 0..branches {
        let turn = f64::from(i) * std::f64::consts::TAU / f64::from(branches);
        let main = UP.rotate_around(UP, turn);
        let jitter_x = builder.rng.jitter(MAIN_JITTER);
        let jitter_z = builder.rng.jitter(MAIN_JITTER);
        let direction = main.add(Vec3::new(jitter_x, 0.0, jitter_z)).normalize();
        builder.branch(ORIGIN, direction, structure.complexity, 1.0);
    }

    builder.skeleton
}

/// Suggested line width from mean sentence length, in [1.5, 4].
pub fn line_width(mean_sentence_length: f64) -> f64 {
    (mean_sentence_length / 8.0).clamp(1.5, 4.0)
}

struct SkeletonBuilder {
    rng: SeededRng,
    angle: f64,
    symmetry: f64,
    skeleton: Skeleton,
}

impl SkeletonBuilder {
    fn branch(&mut self, start: Vec3, direction: Vec3, depth: u32, energy: f64) {
        if depth == 0 {
            return;
        }

        let length = (2.0 + energy * 0.5) / f64::from(depth).powf(0.7);
        let end = start.add(direction.scale(length));
        self.skeleton.segments.push(Segment { start, end, depth });

        let steps = ((length * 5.0).floor() as usize).max(3);
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            let noise = self.noise(GLOW_JITTER, GLOW_JITTER, GLOW_JITTER);
            self.skeleton.glow_points.push(start.lerp(end, t).add(noise));
        }

        let children = if depth > 1 { 2 } else { 1 };
        for child in 0..children {
            let axis_x = self.rng.next_f64() - 0.5;
            let axis_z = self.rng.next_f64() - 0.5;
            let axis = Vec3::new(axis_x, 1.0, axis_z).normalize();
            let turn = if child == 0 {
                self.angle
            } else {
                -self.angle * self.symmetry
            };
            let drift = self.noise(0.1, 0.05, 0.1);
            let child_direction = direction.rotate_around(axis, turn).add(drift).normalize();
            self.branch(end, child_direction, depth - 1, energy * ENERGY_DECAY);
        }
    }

    fn noise(&mut self, x: f64, y: f64, z: f64) -> Vec3 {
        let dx = self.rng.jitter(x);
        let dy = self.rng.jitter(y);
        let dz = self.rng.jitter(z);
        Vec3::new(dx, dy, dz)
    }
}
