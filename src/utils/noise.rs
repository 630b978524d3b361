//! Deterministic scalar noise fields.
//!
//! The engine only needs a deterministic-per-input scalar function over 1D
//! and 2D coordinates with a range of roughly `[-1, 1]`. [`NoiseField`] is the
//! seam; [`GradientNoise`] is the default implementation backed by the
//! `noise` crate.

use noise::{NoiseFn, OpenSimplex, Perlin};
use serde::{Deserialize, Serialize};

/// A deterministic scalar noise field.
///
/// Same inputs must produce the same output for the lifetime of the field.
pub trait NoiseField: Send + Sync {
    /// Samples the field at a 2D coordinate.
    fn sample2(&self, x: f32, y: f32) -> f32;

    /// Samples the field along a 1D line.
    fn sample1(&self, x: f32) -> f32 {
        self.sample2(x, 0.0)
    }
}

/// Which gradient noise generator backs a [`GradientNoise`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    #[default]
    Simplex,
    Perlin,
}

/// Simplex or Perlin noise from the `noise` crate.
#[derive(Clone)]
pub enum GradientNoise {
    Simplex(OpenSimplex),
    Perlin(Perlin),
}

impl GradientNoise {
    #[must_use]
    pub fn new(kind: NoiseKind, seed: u32) -> Self {
        match kind {
            NoiseKind::Simplex => GradientNoise::Simplex(OpenSimplex::new(seed)),
            NoiseKind::Perlin => GradientNoise::Perlin(Perlin::new(seed)),
        }
    }
}

impl std::fmt::Debug for GradientNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradientNoise::Simplex(_) => f.write_str("GradientNoise::Simplex"),
            GradientNoise::Perlin(_) => f.write_str("GradientNoise::Perlin"),
        }
    }
}

impl NoiseField for GradientNoise {
    fn sample2(&self, x: f32, y: f32) -> f32 {
        let point = [f64::from(x), f64::from(y)];
        let value = match self {
            GradientNoise::Simplex(n) => n.get(point),
            GradientNoise::Perlin(n) => n.get(point),
        };
        (value as f32).clamp(-1.0, 1.0)
    }
}

/// A field that is zero everywhere. Useful for tests and flat layouts.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatNoise;

impl NoiseField for FlatNoise {
    fn sample2(&self, _x: f32, _y: f32) -> f32 {
        0.0
    }
}
