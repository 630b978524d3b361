//! Per-frame curve deformation.
//!
//! Every frame, each working vertex is pushed away from the pointer, relaxed
//! toward its pristine target, and then the damped traveling wave is added on
//! top to produce the resolved vertex:
//!
//! ```text
//! working  <- push(working, pointer)      (only inside the displacement radius)
//! working  <- relax(working, target)      (only while farther than REST_EPSILON)
//! resolved  = working + Z * damped_wave(|working.xy|, t)
//! ```
//!
//! The wave never enters the working buffer, so relaxation converges the same
//! way whether or not a wave is configured.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::errors::{FormationError, Result};

/// Distance below which a working vertex counts as relaxed.
pub const REST_EPSILON: f32 = 0.01;

/// Pointer/vertex distances below this are treated as coincident.
const COINCIDENT_EPSILON: f32 = 1e-6;

/// Interpolation factor for push and relaxation blends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blend {
    /// Fixed fraction per frame, in `(0, 1]`.
    Constant(f32),
    /// Rate per second, applied as `min(1, rate * dt)`.
    PerSecond(f32),
}

impl Blend {
    #[must_use]
    pub fn amount(self, dt: f32) -> f32 {
        match self {
            Blend::Constant(k) => k,
            Blend::PerSecond(rate) => (rate * dt.max(0.0)).min(1.0),
        }
    }

    fn validate(self, field: &'static str) -> Result<()> {
        let ok = match self {
            Blend::Constant(k) => k > 0.0 && k <= 1.0,
            Blend::PerSecond(rate) => rate.is_finite() && rate > 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(FormationError::invalid(
                field,
                format!("{self:?} is outside the legal range"),
            ))
        }
    }
}

/// Damped traveling wave perturbing vertex depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    /// Spatial frequency (cycles per world unit).
    pub frequency: f32,
    /// Temporal phase speed (radians per second).
    pub speed: f32,
    pub amplitude: f32,
    /// Spatial decay rate. `0` disables the falloff.
    pub attenuation: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            frequency: 0.25,
            speed: 2.0,
            amplitude: 0.15,
            attenuation: 0.2,
        }
    }
}

impl WaveParams {
    /// A wave that contributes nothing.
    pub const NONE: Self = Self {
        frequency: 0.0,
        speed: 0.0,
        amplitude: 0.0,
        attenuation: 0.0,
    };

    /// `exp(-d * attenuation) * cos(2π * d * frequency - t * speed) * amplitude`
    #[must_use]
    pub fn damped_wave(&self, distance: f32, time: f32) -> f32 {
        (-distance * self.attenuation).exp()
            * (TAU * distance * self.frequency - time * self.speed).cos()
            * self.amplitude
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("wave.frequency", self.frequency),
            ("wave.speed", self.speed),
            ("wave.amplitude", self.amplitude),
        ] {
            if !value.is_finite() {
                return Err(FormationError::invalid(field, format!("must be finite, got {value}")));
            }
        }
        if !(self.attenuation.is_finite() && self.attenuation >= 0.0) {
            return Err(FormationError::invalid(
                "wave.attenuation",
                format!("must be non-negative, got {}", self.attenuation),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeformationConfig {
    /// Vertices closer than this to the pointer are pushed out to it.
    pub displacement_radius: f32,
    pub push: Blend,
    pub relax: Blend,
    pub wave: WaveParams,
}

impl Default for DeformationConfig {
    fn default() -> Self {
        Self {
            displacement_radius: 1.2,
            push: Blend::Constant(0.2),
            relax: Blend::PerSecond(3.0),
            wave: WaveParams::default(),
        }
    }
}

impl DeformationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.displacement_radius.is_nan() || self.displacement_radius < 0.0 {
            return Err(FormationError::NegativeRadius(self.displacement_radius));
        }
        self.push.validate("deformation.push")?;
        self.relax.validate("deformation.relax")?;
        self.wave.validate()
    }
}

/// Applies pointer push, relaxation and the wave to curves.
#[derive(Debug, Clone, Copy)]
pub struct DeformationUpdater {
    config: DeformationConfig,
}

impl DeformationUpdater {
    #[must_use]
    pub fn new(config: DeformationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &DeformationConfig {
        &self.config
    }

    pub(crate) fn config_mut(&mut self) -> &mut DeformationConfig {
        &mut self.config
    }

    /// Runs one deformation step on `curve`.
    ///
    /// `pointer` is the pointer's world position for this frame, if known.
    pub fn apply(&self, curve: &mut Curve, pointer: Option<Vec3>, dt: f32, elapsed: f32) {
        let radius = self.config.displacement_radius;
        let push = self.config.push.amount(dt);
        let relax = self.config.relax.amount(dt);
        let wave = &self.config.wave;

        let (target, working, resolved) = curve.buffers_mut();

        for ((rest, vertex), out) in target.iter().zip(working.iter_mut()).zip(resolved.iter_mut()) {
            if let Some(pointer) = pointer {
                *vertex = push_away(*vertex, pointer, radius, push);
            }

            if vertex.distance(*rest) > REST_EPSILON {
                *vertex = vertex.lerp(*rest, relax);
            }

            let distance = Vec2::new(vertex.x, vertex.y).length();
            *out = *vertex + Vec3::Z * wave.damped_wave(distance, elapsed);
        }
    }
}

/// Blends `vertex` toward the point at exactly `radius` from `pointer`.
///
/// Vertices outside the radius, or coincident with the pointer, are returned
/// unchanged.
fn push_away(vertex: Vec3, pointer: Vec3, radius: f32, amount: f32) -> Vec3 {
    let offset = vertex - pointer;
    let distance = offset.length();
    if distance >= radius || distance < COINCIDENT_EPSILON {
        return vertex;
    }
    let edge = pointer + offset / distance * radius;
    vertex.lerp(edge, amount)
}
