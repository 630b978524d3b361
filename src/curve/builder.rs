use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::errors::{FormationError, Result};
use crate::utils::{Easing, NoiseField};

/// Shape parameters for the approach paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveShape {
    /// Number of control vertices per curve. Must be odd and at least 3.
    pub vertex_count: usize,
    /// Off-screen X extreme the path starts from (mirrored at the far end).
    pub origin_extent: f32,
    /// Y scale reached at the extremes. `1.0` keeps rows parallel.
    pub spread: f32,
    pub spread_easing: Easing,
    pub noise_frequency: f32,
    pub noise_amplitude: f32,
    /// Envelope of the Y wobble, `0` at rest and `1` at the extremes.
    pub noise_easing: Easing,
    /// Z offset reached at the extremes.
    pub edge_depth: f32,
    pub depth_easing: Easing,
}

impl Default for CurveShape {
    fn default() -> Self {
        Self {
            vertex_count: 51,
            origin_extent: 12.0,
            spread: 1.6,
            spread_easing: Easing::QuadIn,
            noise_frequency: 0.35,
            noise_amplitude: 1.2,
            noise_easing: Easing::QuartOut,
            edge_depth: 0.6,
            depth_easing: Easing::SineIn,
        }
    }
}

impl CurveShape {
    pub fn validate(&self) -> Result<()> {
        if self.vertex_count < 3 || self.vertex_count % 2 == 0 {
            return Err(FormationError::InvalidVertexCount(self.vertex_count));
        }
        if !(self.origin_extent.is_finite() && self.origin_extent > 0.0) {
            return Err(FormationError::invalid(
                "curve.origin_extent",
                format!("must be positive and finite, got {}", self.origin_extent),
            ));
        }
        for (field, value) in [
            ("curve.spread", self.spread),
            ("curve.noise_frequency", self.noise_frequency),
            ("curve.noise_amplitude", self.noise_amplitude),
            ("curve.edge_depth", self.edge_depth),
        ] {
            if !value.is_finite() {
                return Err(FormationError::invalid(field, format!("must be finite, got {value}")));
            }
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn center_index(&self) -> usize {
        (self.vertex_count - 1) / 2
    }
}

/// Synthesizes approach paths ending at a rest position.
///
/// The path runs from `-origin_extent` on X through the rest vertex at the
/// center index and out to `+origin_extent`. Progress `0.5` on the sampled
/// curve is therefore the rest pose.
pub struct CurveBuilder<'a> {
    shape: CurveShape,
    noise: &'a dyn NoiseField,
}

impl<'a> CurveBuilder<'a> {
    pub fn new(shape: CurveShape, noise: &'a dyn NoiseField) -> Result<Self> {
        shape.validate()?;
        Ok(Self { shape, noise })
    }

    #[must_use]
    pub fn shape(&self) -> &CurveShape {
        &self.shape
    }

    /// Builds the control vertices for one instance resting at `rest`.
    #[must_use]
    pub fn build(&self, rest: Vec3, origin_extent: f32) -> Vec<Vec3> {
        let shape = &self.shape;
        let center = shape.center_index();
        let half = center as f32;

        (0..shape.vertex_count)
            .map(|i| {
                if i == center {
                    return rest;
                }

                let (from, to, s) = if i < center {
                    (-origin_extent, rest.x, i as f32 / half)
                } else {
                    (rest.x, origin_extent, (i - center) as f32 / half)
                };
                let x = from + (to - from) * s;

                // 0 at the rest vertex, 1 at either extreme
                let u = (i as f32 - half).abs() / half;

                let scale = 1.0 + (shape.spread - 1.0) * shape.spread_easing.apply(u);
                let wobble = self.noise.sample2(
                    x * shape.noise_frequency,
                    rest.y * shape.noise_frequency,
                ) * shape.noise_amplitude
                    * shape.noise_easing.apply(u);
                let y = rest.y * scale + wobble;

                let z = rest.z + shape.edge_depth * shape.depth_easing.apply(u);

                Vec3::new(x, y, z)
            })
            .collect()
    }
}
