//! Formation configuration.
//!
//! [`FormationConfig`] gathers every tunable of the engine. All sections derive
//! `serde` with field defaults, so a JSON file only needs the values it
//! overrides:
//!
//! ```json
//! {
//!   "duration": 2.0,
//!   "transition_policy": "half_range",
//!   "curve": { "vertex_count": 31 },
//!   "delay": { "factor": 0.5, "shaping": { "power": { "exponent": 1.5 } } },
//!   "deformation": { "relax": { "per_second": 4.0 } }
//! }
//! ```
//!
//! Values are checked by [`FormationConfig::validate`] when a formation is
//! built; nothing is silently coerced.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::animation::{DelayConfig, DelayMetric, DelayShaping, TransitionPolicy};
use crate::curve::CurveShape;
use crate::deform::{Blend, DeformationConfig, WaveParams};
use crate::errors::{FormationError, Result};
use crate::utils::{NoiseField, NoiseKind};

/// Resting depth of each instance, drawn from the shape noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthNoise {
    pub frequency: f32,
    pub amplitude: f32,
}

impl Default for DepthNoise {
    fn default() -> Self {
        Self {
            frequency: 0.3,
            amplitude: 0.0,
        }
    }
}

impl DepthNoise {
    #[must_use]
    pub fn sample(&self, point: Vec2, noise: &dyn NoiseField) -> f32 {
        if self.amplitude == 0.0 {
            return 0.0;
        }
        noise.sample2(point.x * self.frequency, point.y * self.frequency) * self.amplitude
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    // === Layout ===
    /// Height of the sampled area; width is `area_height * aspect_ratio`.
    pub area_height: f32,
    pub aspect_ratio: f32,
    pub min_separation: f32,
    pub max_separation: f32,
    /// Optional cap on the number of instances kept from the sampler.
    pub max_instances: Option<usize>,

    // === Determinism ===
    /// Seeds the layout sampler and the instance-cap shuffle. Noise fields
    /// take a 32-bit seed, see [`FormationConfig::noise_seed`].
    pub seed: u64,
    pub noise: NoiseKind,

    // === Animation ===
    /// Seconds each instance takes to cover its transition window.
    pub duration: f32,
    /// Progress every instance starts at.
    pub initial_progress: f32,
    pub transition_policy: TransitionPolicy,
    pub instance_scale: f32,

    pub curve: CurveShape,
    pub rest_depth: DepthNoise,
    pub delay: DelayConfig,
    pub deformation: DeformationConfig,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            area_height: 6.0,
            aspect_ratio: 16.0 / 9.0,
            min_separation: 0.12,
            max_separation: 0.24,
            max_instances: None,
            seed: 0x5EED,
            noise: NoiseKind::Simplex,
            duration: 1.3,
            initial_progress: 0.0,
            transition_policy: TransitionPolicy::Snapshot,
            instance_scale: 0.05,
            curve: CurveShape::default(),
            rest_depth: DepthNoise::default(),
            delay: DelayConfig::default(),
            deformation: DeformationConfig::default(),
        }
    }
}

impl FormationConfig {
    /// Instanced-sphere preset: snapshot transitions, noise-driven delays,
    /// a visible depth wave.
    #[must_use]
    pub fn sphere() -> Self {
        Self {
            duration: 1.3,
            transition_policy: TransitionPolicy::Snapshot,
            instance_scale: 0.05,
            rest_depth: DepthNoise {
                frequency: 0.3,
                amplitude: 0.25,
            },
            delay: DelayConfig {
                factor: 1.2,
                metric: DelayMetric::Noise,
                shaping: DelayShaping::Identity,
                noise_frequency: 0.25,
            },
            deformation: DeformationConfig {
                displacement_radius: 1.2,
                push: Blend::Constant(0.2),
                relax: Blend::PerSecond(3.0),
                wave: WaveParams {
                    frequency: 0.25,
                    speed: 2.0,
                    amplitude: 0.15,
                    attenuation: 0.2,
                },
            },
            ..Self::default()
        }
    }

    /// Static-mesh box preset: half-range enter/exit sweeps, center-out delays.
    #[must_use]
    pub fn boxes() -> Self {
        Self {
            min_separation: 0.2,
            max_separation: 0.35,
            duration: 2.0,
            transition_policy: TransitionPolicy::HalfRange,
            instance_scale: 0.1,
            curve: CurveShape {
                vertex_count: 31,
                spread: 1.3,
                noise_amplitude: 0.8,
                edge_depth: -0.4,
                ..CurveShape::default()
            },
            delay: DelayConfig {
                factor: 0.6,
                metric: DelayMetric::Distance,
                shaping: DelayShaping::Logarithm,
                noise_frequency: 0.25,
            },
            deformation: DeformationConfig {
                displacement_radius: 0.9,
                push: Blend::Constant(0.35),
                relax: Blend::Constant(0.08),
                wave: WaveParams {
                    frequency: 0.18,
                    speed: 1.4,
                    amplitude: 0.08,
                    attenuation: 0.35,
                },
            },
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `seed` folded to 32 bits, so every bit of it reaches the noise field.
    #[must_use]
    pub fn noise_seed(&self) -> u32 {
        (self.seed ^ (self.seed >> 32)) as u32
    }

    /// Bounding rectangle of the sampled layout.
    #[must_use]
    pub fn area_size(&self) -> Vec2 {
        Vec2::new(self.area_height * self.aspect_ratio, self.area_height)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.area_height.is_finite() && self.area_height > 0.0) {
            return Err(FormationError::invalid(
                "area_height",
                format!("must be positive, got {}", self.area_height),
            ));
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(FormationError::invalid(
                "aspect_ratio",
                format!("must be positive, got {}", self.aspect_ratio),
            ));
        }
        if !(self.min_separation.is_finite() && self.min_separation > 0.0) {
            return Err(FormationError::invalid(
                "min_separation",
                format!("must be positive, got {}", self.min_separation),
            ));
        }
        if !(self.max_separation.is_finite() && self.max_separation >= self.min_separation) {
            return Err(FormationError::invalid(
                "max_separation",
                format!(
                    "must be at least min_separation ({}), got {}",
                    self.min_separation, self.max_separation
                ),
            ));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(FormationError::NonPositiveDuration(self.duration));
        }
        if !(0.0..=1.0).contains(&self.initial_progress) {
            return Err(FormationError::invalid(
                "initial_progress",
                format!("must lie in [0, 1], got {}", self.initial_progress),
            ));
        }
        if !(self.instance_scale.is_finite() && self.instance_scale > 0.0) {
            return Err(FormationError::invalid(
                "instance_scale",
                format!("must be positive, got {}", self.instance_scale),
            ));
        }
        if !(self.rest_depth.frequency.is_finite() && self.rest_depth.amplitude.is_finite()) {
            return Err(FormationError::invalid("rest_depth", "values must be finite"));
        }
        self.curve.validate()?;
        self.delay.validate()?;
        self.deformation.validate()
    }
}
