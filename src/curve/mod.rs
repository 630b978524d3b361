//! Approach Curves
//!
//! Each instance travels along its own [`Curve`]: an odd-length sequence of
//! control vertices sampled as a Catmull-Rom spline. Progress `0` and `1` are
//! the off-screen extremes, `0.5` is the rest pose.
//!
//! A curve keeps three vertex buffers:
//!
//! - **target**: the pristine shape produced by [`CurveBuilder`], never mutated
//! - **working**: pointer displacement and relaxation act here
//! - **resolved**: working plus the wave term; this is what gets sampled
//!
//! Debug renderers can read all three through the accessors.

pub mod builder;
pub mod spline;

pub use builder::{CurveBuilder, CurveShape};
pub use spline::CurveSample;

use glam::Vec3;

#[derive(Debug, Clone)]
pub struct Curve {
    target: Vec<Vec3>,
    working: Vec<Vec3>,
    resolved: Vec<Vec3>,
}

impl Curve {
    #[must_use]
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self {
            working: vertices.clone(),
            resolved: vertices.clone(),
            target: vertices,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.target.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn center_index(&self) -> usize {
        self.target.len().saturating_sub(1) / 2
    }

    /// The pristine rest vertex.
    #[must_use]
    pub fn rest_vertex(&self) -> Option<Vec3> {
        self.target.get(self.center_index()).copied()
    }

    #[must_use]
    pub fn target(&self) -> &[Vec3] {
        &self.target
    }

    #[must_use]
    pub fn working(&self) -> &[Vec3] {
        &self.working
    }

    #[must_use]
    pub fn resolved(&self) -> &[Vec3] {
        &self.resolved
    }

    /// Splits into `(target, working, resolved)` for the deformation pass.
    pub(crate) fn buffers_mut(&mut self) -> (&[Vec3], &mut [Vec3], &mut [Vec3]) {
        (&self.target, &mut self.working, &mut self.resolved)
    }

    /// Drops all deformation and snaps back to the pristine shape.
    pub fn reset(&mut self) {
        self.working.copy_from_slice(&self.target);
        self.resolved.copy_from_slice(&self.target);
    }

    /// Samples the resolved (deformed) curve.
    #[must_use]
    pub fn sample(&self, progress: f32) -> CurveSample {
        spline::sample(&self.resolved, progress)
    }
}
