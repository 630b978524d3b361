use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::errors::{FormationError, Result};
use crate::utils::NoiseField;

/// Offset applied before sampling the delay noise, so the delay field is
/// decorrelated from the depth/shape noise sampled at the same point.
const DELAY_NOISE_OFFSET: Vec2 = Vec2::new(173.31, -91.7);

/// Spatial attribute a delay is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayMetric {
    /// Distance from the formation center.
    #[default]
    Distance,
    /// Noise field remapped to `[0, 1]`.
    Noise,
}

/// Curve applied to the metric before scaling by the delay factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayShaping {
    #[default]
    Identity,
    Power { exponent: f32 },
    /// `ln(m + 1)`
    Logarithm,
}

impl DelayShaping {
    #[must_use]
    pub fn apply(self, metric: f32) -> f32 {
        match self {
            DelayShaping::Identity => metric,
            DelayShaping::Power { exponent } => metric.max(0.0).powf(exponent),
            DelayShaping::Logarithm => metric.max(0.0).ln_1p(),
        }
    }

    pub fn validate(self) -> Result<()> {
        if let DelayShaping::Power { exponent } = self
            && !(exponent.is_finite() && exponent > 0.0)
        {
            return Err(FormationError::invalid(
                "delay.shaping",
                format!("power exponent must be positive, got {exponent}"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Seconds of delay per unit of shaped metric.
    pub factor: f32,
    pub metric: DelayMetric,
    pub shaping: DelayShaping,
    /// Spatial frequency used by [`DelayMetric::Noise`].
    pub noise_frequency: f32,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            factor: 0.35,
            metric: DelayMetric::Distance,
            shaping: DelayShaping::Logarithm,
            noise_frequency: 0.25,
        }
    }
}

impl DelayConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.factor.is_finite() && self.factor >= 0.0) {
            return Err(FormationError::invalid(
                "delay.factor",
                format!("must be non-negative and finite, got {}", self.factor),
            ));
        }
        if !self.noise_frequency.is_finite() {
            return Err(FormationError::invalid(
                "delay.noise_frequency",
                format!("must be finite, got {}", self.noise_frequency),
            ));
        }
        self.shaping.validate()
    }
}

/// Derives per-instance start offsets from the sample layout.
#[derive(Debug, Clone, Copy)]
pub struct DelayScheduler {
    config: DelayConfig,
}

impl DelayScheduler {
    #[must_use]
    pub fn new(config: DelayConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &DelayConfig {
        &self.config
    }

    /// Raw (un-normalized) delay of a single point.
    #[must_use]
    pub fn compute(&self, point: Vec2, noise: &dyn NoiseField) -> f32 {
        let metric = match self.config.metric {
            DelayMetric::Distance => point.length(),
            DelayMetric::Noise => {
                let p = point * self.config.noise_frequency + DELAY_NOISE_OFFSET;
                (noise.sample2(p.x, p.y) + 1.0) * 0.5
            }
        };
        self.config.shaping.apply(metric) * self.config.factor
    }

    /// Delays for every point, normalized so the earliest is exactly zero.
    #[must_use]
    pub fn compute_all(&self, points: &[Vec2], noise: &dyn NoiseField) -> Vec<f32> {
        let mut delays: Vec<f32> = points.iter().map(|p| self.compute(*p, noise)).collect();
        normalize(&mut delays);
        delays
    }
}

/// Shifts `delays` so the minimum becomes exactly `0.0`.
///
/// Relative ordering is preserved. Empty input is left untouched.
pub fn normalize(delays: &mut [f32]) {
    let Some(min) = delays.iter().copied().reduce(f32::min) else {
        return;
    };
    for delay in delays.iter_mut() {
        *delay -= min;
    }
}
